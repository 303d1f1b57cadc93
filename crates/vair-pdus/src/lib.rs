//! Wire formats of the virtual air interface
//!
//! - FrameBuf: owned frame buffer with checked header push/pull
//! - rrc: session-layer headers (attach, signalling, data, paging, release)
//! - rlc: dynamic-handle layer PDUs (handle request/grant/release, broadcast)
//!
//! All multi-byte integers are big-endian.

pub mod frame_buf;
pub mod frame_err;
pub mod rlc;
pub mod rrc;

pub use frame_buf::FrameBuf;
pub use frame_err::FrameErr;
