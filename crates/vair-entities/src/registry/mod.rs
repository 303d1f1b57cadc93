//! Session table shared by both virtual links

pub mod rnti_alloc;
pub mod session_registry;

pub use rnti_alloc::RntiAllocator;
pub use session_registry::{AttachOutcome, RegistryErr, SessionInfo, SessionRegistry};
