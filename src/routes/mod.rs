//! Route handlers behind [`handle_request`](crate::handle_request).
//! Every handler returns a JSON string; failures are `{"error": ...}`.

pub mod payload;
pub mod sweep;
pub mod transform;
pub mod util;
