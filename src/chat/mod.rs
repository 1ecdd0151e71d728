pub mod merge;
pub mod session;

pub use merge::{EventOutcome, ECHO_TOLERANCE_SECS};
pub use session::ChatSession;
