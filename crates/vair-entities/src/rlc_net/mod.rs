//! Dynamic-handle (RLC-facing) virtual link
//!
//! Devices ask for an rnti over this link and exchange PDUs tagged with it. System
//! information and paging from the upper layer are broadcast to every device holding a
//! handle.

mod broadcast;
mod downlink;
pub mod entity;
mod uplink;

pub use entity::{RlcNet, RlcNetProtocol};
