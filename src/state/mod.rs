// ============================================================================
// STATE MODULE - Shared state with Rc<RefCell> + change notifications
// ============================================================================

pub mod reactivity;
pub mod session_guard;
pub mod session_store;

pub use reactivity::Subscribers;
pub use session_guard::{SessionExpiryHandler, SessionGuard};
pub use session_store::{OtpVerification, SessionStore};
