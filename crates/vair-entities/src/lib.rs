//! Virtual air interface entities
//!
//! Both links run over UDP with one receive thread and one send thread each, and share
//! a single session registry:
//! - rrc_net: session layer (attach, signalling, user data, bearer setup)
//! - rlc_net: dynamic handle assignment and SI/paging broadcast

pub mod dl_queue;
pub mod errors;
pub mod metrics;
pub mod network;
pub mod registry;
pub mod rlc_net;
pub mod rrc_net;

pub use dl_queue::{DownlinkQueue, QueueErr};
pub use errors::LinkErr;
pub use metrics::LinkMetrics;
pub use registry::{AttachOutcome, RegistryErr, RntiAllocator, SessionRegistry};
pub use rlc_net::RlcNet;
pub use rrc_net::{RrcCollaborators, RrcNet};
