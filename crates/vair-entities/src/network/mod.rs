pub mod link;
pub mod transports;
