//! Core utilities for the virtual air interface
//!
//! This crate provides fundamental types used across the virtual eNB stack:
//! - DeviceId, the persistent identity a simulated UE attaches with
//! - Rnti, the short-lived session handle
//! - Logical channel ids and their routing thresholds
//! - RRC establishment causes carried in attach frames
//! - Logging setup and warning macros

pub mod debug;
pub mod device_id;
pub mod establishment_cause;
pub mod lcid;
pub mod rnti;

// Re-export commonly used items
pub use device_id::{DeviceId, DEVICE_ID_LEN};
pub use establishment_cause::EstablishmentCause;
pub use lcid::Lcid;
pub use rnti::Rnti;

/// Thread label used in log lines of the session-layer (RRC-facing) link
pub const RRC_NET_LABEL: &str = "RrcNet";
/// Thread label used in log lines of the dynamic-handle (RLC-facing) link
pub const RLC_NET_LABEL: &str = "RlcNet";
