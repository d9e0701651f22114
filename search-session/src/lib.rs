//! Search-as-you-type session state.
//!
//! Keystrokes pass through a [`Debouncer`]; every search and preview request
//! is numbered by a [`RequestSequencer`] so that only the most recently
//! issued request can update what is on screen.

mod debounce;
mod load_state;
mod session;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use load_state::{Failure, FailureKind, LoadState, RequestSequencer};
pub use session::{Completion, PreviewTicket, SearchTicket, Session};
