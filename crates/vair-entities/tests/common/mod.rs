#![allow(dead_code)]

pub mod link_test;
pub mod recorder;

pub use link_test::*;
pub use recorder::{Call, Recorder};
