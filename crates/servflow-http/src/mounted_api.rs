//! A compiled plan paired with the runtime that walks it — one per
//! configured API (§4.I).

use std::sync::Arc;

use servflow_plan::Plan;
use servflow_runtime::{PlanSubExecutor, Runtime};

#[derive(Clone)]
pub struct MountedApi {
    pub plan: Arc<Plan>,
    pub runtime: Arc<Runtime>,
}

impl MountedApi {
    pub fn new(plan: Plan, runtime: Runtime) -> Self {
        Self { plan: Arc::new(plan), runtime: Arc::new(runtime) }
    }

    pub fn sub_executor(&self) -> Arc<PlanSubExecutor> {
        Arc::new(PlanSubExecutor::new(Arc::clone(&self.plan), Arc::clone(&self.runtime)))
    }
}
