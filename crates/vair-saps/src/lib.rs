//! Call boundaries between the virtual air interface and the layers it serves.
//!
//! The S1AP, GTPU and PDCP/RRC layers are external collaborators. Each boundary
//! is a trait the virtual links call into, plus the plain value types carried
//! across it. Downlink envelopes travel the other way, from the upper layers into
//! the links' send queues.

pub mod dlmsg;
pub mod gtpu;
pub mod rlc_upper;
pub mod s1ap;

pub use dlmsg::*;
pub use gtpu::{BearerControl, UserPlaneSink};
pub use rlc_upper::LinkUpperLayer;
pub use s1ap::SignallingSink;
