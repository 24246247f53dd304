//! API layer
//!
//! HTTP handlers for:
//! - The explanation session (paste, language, regenerate, reset)
//! - Metrics (Prometheus)

mod dto;
pub mod metrics;
mod session;

pub use dto::*;

pub use metrics::metrics_router;
pub use session::session_router;
