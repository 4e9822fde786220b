//! The HTTP and in-process MCP bindings for a compiled plan (§4.I):
//! mounts each configured API's `<method> <listenPath>` onto an axum
//! router, wires `header`/`param`/`urlparam`/`body` into the
//! [`servflow_context::RequestContext`] it builds per request, and
//! exposes `mcp`-bound APIs as in-process callable tools.

mod handler;
mod mcp;
mod mounted_api;
mod router;

pub use mcp::{McpToolDescriptor, McpToolDispatcher, MountedMcpDispatcher};
pub use mounted_api::MountedApi;
pub use router::build_router;
