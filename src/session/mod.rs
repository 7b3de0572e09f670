//! Boundary with the spatial runtime.
//!
//! This module contains the handle types the runtime mints, the traits the
//! core consumes from it, the one-shot request plumbing used for its
//! asynchronous calls, and the discrete events it delivers.

pub mod events;
pub mod pending;
pub mod provider;
pub mod types;

pub use events::{AppEvent, EventQueue};
pub use pending::{request, Completer, Pending, PollResult};
pub use provider::{CycleFrame, HitResult, TrackingSessionProvider};
pub use types::{HitTestSource, ReferenceSpace, ReferenceSpaceKind, SessionId};
