use thiserror::Error;

/// Errors raised while framing or parsing a datagram
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameErr {
    #[error("frame too short: need {needed} bytes, have {available}")]
    TooShort { needed: usize, available: usize },

    #[error("unknown frame type 0x{0:02x}")]
    UnknownType(u8),

    #[error("invalid value {value} for field {field}")]
    InvalidValue { field: &'static str, value: u64 },

    #[error("no headroom for header: need {needed} bytes, have {available}")]
    NoHeadroom { needed: usize, available: usize },
}

/// Fails with FrameErr::TooShort unless `buf` holds at least `needed` bytes
#[inline]
pub fn ensure_len(buf: &[u8], needed: usize) -> Result<(), FrameErr> {
    if buf.len() < needed {
        Err(FrameErr::TooShort { needed, available: buf.len() })
    } else {
        Ok(())
    }
}
