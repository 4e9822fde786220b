//! The plan walker: compiled [`servflow_plan::Plan`] in, [`BuiltResponse`]
//! out (§4.G), plus the sub-execution plumbing the parallel reference
//! action and agent tool loop both drive (§4.D, §5).

mod conditional;
mod error;
mod runtime;
mod sub_executor;

pub use error::RuntimeError;
pub use runtime::Runtime;
pub use sub_executor::PlanSubExecutor;
