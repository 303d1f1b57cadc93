use bytes::Bytes;

use crate::FrameErr;

/// Headroom reserved in front of a payload, enough for any header of either link
pub const DEFAULT_HEADROOM: usize = 32;

/// Owned frame under construction or being parsed.
///
/// The valid frame is `data[head..tail]`. Bytes in front of `head` are headroom into
/// which headers are pushed; pulling a header advances `head`. Both operations are
/// bounds-checked and report a FrameErr instead of touching memory outside the frame.
#[derive(Clone)]
pub struct FrameBuf {
    data: Vec<u8>,
    head: usize,
    tail: usize,
}

impl FrameBuf {
    /// Copies `payload` into a new buffer, leaving `headroom` bytes free in front of it
    pub fn with_headroom(headroom: usize, payload: &[u8]) -> Self {
        let mut data = vec![0u8; headroom + payload.len()];
        data[headroom..].copy_from_slice(payload);
        Self { head: headroom, tail: data.len(), data }
    }

    /// Frame for an outgoing payload with the default headroom
    pub fn from_payload(payload: &[u8]) -> Self {
        Self::with_headroom(DEFAULT_HEADROOM, payload)
    }

    /// Wraps a received datagram. Takes ownership without copying, no headroom.
    pub fn from_datagram(datagram: Vec<u8>) -> Self {
        Self { head: 0, tail: datagram.len(), data: datagram }
    }

    pub fn len(&self) -> usize {
        self.tail - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn headroom(&self) -> usize {
        self.head
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.head..self.tail]
    }

    /// Prepends `header` to the frame
    pub fn push_front(&mut self, header: &[u8]) -> Result<(), FrameErr> {
        if header.len() > self.head {
            return Err(FrameErr::NoHeadroom { needed: header.len(), available: self.head });
        }
        let start = self.head - header.len();
        self.data[start..self.head].copy_from_slice(header);
        self.head = start;
        Ok(())
    }

    /// Strips `n` bytes from the front of the frame and returns them
    pub fn pull_front(&mut self, n: usize) -> Result<&[u8], FrameErr> {
        if n > self.len() {
            return Err(FrameErr::TooShort { needed: n, available: self.len() });
        }
        let start = self.head;
        self.head += n;
        Ok(&self.data[start..self.head])
    }

    /// Shrinks the frame to its first `len` bytes. Longer lengths leave it as is.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.tail = self.head + len;
        }
    }

    /// Hands the remaining frame out as Bytes, without copying
    pub fn into_bytes(self) -> Bytes {
        let (head, tail) = (self.head, self.tail);
        Bytes::from(self.data).slice(head..tail)
    }
}

impl core::fmt::Debug for FrameBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "FrameBuf {{ len: {}, headroom: {} }}", self.len(), self.headroom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_then_pull() {
        let mut frame = FrameBuf::with_headroom(4, b"payload");
        frame.push_front(&[0xAA, 0xBB]).unwrap();
        assert_eq!(frame.headroom(), 2);
        assert_eq!(frame.as_slice(), b"\xAA\xBBpayload");

        let hdr = frame.pull_front(2).unwrap().to_vec();
        assert_eq!(hdr, vec![0xAA, 0xBB]);
        assert_eq!(frame.into_bytes(), Bytes::from_static(b"payload"));
    }

    #[test]
    fn test_push_without_headroom_fails() {
        let mut frame = FrameBuf::with_headroom(3, b"x");
        let err = frame.push_front(&[0u8; 4]).unwrap_err();
        assert_eq!(err, FrameErr::NoHeadroom { needed: 4, available: 3 });
        // Frame unchanged
        assert_eq!(frame.as_slice(), b"x");
        assert_eq!(frame.headroom(), 3);
    }

    #[test]
    fn test_pull_past_end_fails() {
        let mut frame = FrameBuf::from_datagram(vec![1, 2, 3]);
        assert_eq!(frame.pull_front(4).unwrap_err(), FrameErr::TooShort { needed: 4, available: 3 });
        assert_eq!(frame.pull_front(3).unwrap(), &[1, 2, 3]);
        assert!(frame.is_empty());
        assert!(frame.into_bytes().is_empty());
    }

    #[test]
    fn test_truncate() {
        let mut frame = FrameBuf::from_datagram(vec![1, 2, 3, 4, 5]);
        frame.pull_front(1).unwrap();
        frame.truncate(2);
        assert_eq!(frame.as_slice(), &[2, 3]);
        frame.truncate(10);
        assert_eq!(frame.len(), 2);
    }
}
