//! Session-layer (RRC-facing) virtual link
//!
//! Binds a device's persistent identity to an rnti on ATTACH, routes uplink signalling
//! and user data by logical channel, and frames downlink PDUs back to the device.

mod downlink;
pub mod entity;
mod uplink;

pub use entity::{RrcCollaborators, RrcNet, RrcNetProtocol};
