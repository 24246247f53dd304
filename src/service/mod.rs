//! Service layer
//!
//! Contains the pipeline logic separated from HTTP handlers.
//! Services orchestrate cast resolution, explanation and the session.

mod cast;
mod explain;
mod session;

pub use cast::{CastResolver, merge_quote};
pub use explain::{Explainer, Explanation};
pub use session::{GenerationJob, SessionController, SessionMachine, SessionView, Ticket};
