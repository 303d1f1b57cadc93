//! Session-layer frames
//!
//! Uplink header, 25 bytes:
//! ```text
//! | type (1) | source_ip (4) | source_port (2) | device_id (15) | lcid (2) | cause (1) |
//! ```
//! Downlink header, 18 bytes:
//! ```text
//! | type (1) | device_id (15) | lcid (2) |
//! ```

use std::net::{Ipv4Addr, SocketAddrV4};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use vair_core::{DeviceId, EstablishmentCause, Lcid, DEVICE_ID_LEN};

use crate::frame_err::ensure_len;
use crate::{FrameBuf, FrameErr};

pub const RRC_UL_HEADER_LEN: usize = 1 + 4 + 2 + DEVICE_ID_LEN + 2 + 1;
pub const RRC_DL_HEADER_LEN: usize = 1 + DEVICE_ID_LEN + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RrcMsgType {
    Attach,
    Normal,
    Data,
    Paging,
    Release,
}

impl RrcMsgType {
    pub fn into_raw(self) -> u8 {
        match self {
            RrcMsgType::Attach => 0x01,
            RrcMsgType::Normal => 0x02,
            RrcMsgType::Data => 0x03,
            RrcMsgType::Paging => 0x04,
            RrcMsgType::Release => 0x05,
        }
    }

    pub fn try_from_raw(raw: u8) -> Result<Self, FrameErr> {
        match raw {
            0x01 => Ok(RrcMsgType::Attach),
            0x02 => Ok(RrcMsgType::Normal),
            0x03 => Ok(RrcMsgType::Data),
            0x04 => Ok(RrcMsgType::Paging),
            0x05 => Ok(RrcMsgType::Release),
            _ => Err(FrameErr::UnknownType(raw)),
        }
    }

    /// Downlink frame type for an ordinary PDU on `lcid`
    pub fn for_lcid(lcid: Lcid) -> Self {
        if vair_core::lcid::is_signalling(lcid) { RrcMsgType::Normal } else { RrcMsgType::Data }
    }
}

/// Header of every uplink session-layer frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrcUlHeader {
    pub msg_type: RrcMsgType,
    /// Address the device reports for itself
    pub source: SocketAddrV4,
    pub device_id: DeviceId,
    pub lcid: Lcid,
    pub cause: EstablishmentCause,
}

impl RrcUlHeader {
    pub fn encode(&self) -> [u8; RRC_UL_HEADER_LEN] {
        let mut hdr = [0u8; RRC_UL_HEADER_LEN];
        let mut w = &mut hdr[..];
        w.put_u8(self.msg_type.into_raw());
        w.put_slice(&self.source.ip().octets());
        w.put_u16(self.source.port());
        w.put_slice(self.device_id.as_bytes());
        w.put_u16(self.lcid);
        w.put_u8(self.cause.into_raw());
        hdr
    }

    pub fn decode(buf: &[u8]) -> Result<Self, FrameErr> {
        ensure_len(buf, RRC_UL_HEADER_LEN)?;
        let mut r = buf;

        let msg_type = RrcMsgType::try_from_raw(r.get_u8())?;
        let mut ip = [0u8; 4];
        r.copy_to_slice(&mut ip);
        let port = r.get_u16();
        let mut id = [0u8; DEVICE_ID_LEN];
        r.copy_to_slice(&mut id);
        let lcid = r.get_u16();
        let raw_cause = r.get_u8();
        let cause = EstablishmentCause::try_from_raw(raw_cause)
            .ok_or(FrameErr::InvalidValue { field: "establishment_cause", value: raw_cause as u64 })?;

        Ok(Self {
            msg_type,
            source: SocketAddrV4::new(Ipv4Addr::from(ip), port),
            device_id: DeviceId::new(id),
            lcid,
            cause,
        })
    }

    /// Strips the header from a received frame, leaving the payload in `frame`
    pub fn pull(frame: &mut FrameBuf) -> Result<Self, FrameErr> {
        let hdr = Self::decode(frame.as_slice())?;
        frame.pull_front(RRC_UL_HEADER_LEN)?;
        Ok(hdr)
    }
}

/// Header of every downlink session-layer frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrcDlHeader {
    pub msg_type: RrcMsgType,
    pub device_id: DeviceId,
    pub lcid: Lcid,
}

impl RrcDlHeader {
    pub fn encode(&self) -> [u8; RRC_DL_HEADER_LEN] {
        encode_header(self.msg_type, &self.device_id, self.lcid)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, FrameErr> {
        decode_header(buf).map(|(hdr, _)| hdr)
    }

    /// Prepends the header to an outgoing frame
    pub fn push(&self, frame: &mut FrameBuf) -> Result<(), FrameErr> {
        frame.push_front(&self.encode())
    }
}

/// Encodes a downlink header
pub fn encode_header(msg_type: RrcMsgType, device_id: &DeviceId, lcid: Lcid) -> [u8; RRC_DL_HEADER_LEN] {
    let mut hdr = [0u8; RRC_DL_HEADER_LEN];
    let mut w = &mut hdr[..];
    w.put_u8(msg_type.into_raw());
    w.put_slice(device_id.as_bytes());
    w.put_u16(lcid);
    hdr
}

/// Decodes a downlink header, returning it along with the payload that follows
pub fn decode_header(buf: &[u8]) -> Result<(RrcDlHeader, &[u8]), FrameErr> {
    ensure_len(buf, RRC_DL_HEADER_LEN)?;
    let mut r = buf;
    let msg_type = RrcMsgType::try_from_raw(r.get_u8())?;
    let mut id = [0u8; DEVICE_ID_LEN];
    r.copy_to_slice(&mut id);
    let lcid = r.get_u16();
    Ok((RrcDlHeader { msg_type, device_id: DeviceId::new(id), lcid }, r))
}

/// Builds a complete uplink datagram. Used by device-side tooling and tests.
pub fn build_ul_frame(hdr: &RrcUlHeader, payload: &[u8]) -> Bytes {
    let mut frame = BytesMut::with_capacity(RRC_UL_HEADER_LEN + payload.len());
    frame.put_slice(&hdr.encode());
    frame.put_slice(payload);
    frame.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_device() -> DeviceId {
        DeviceId::from_digits("001010123456789").unwrap()
    }

    #[test]
    fn test_ul_header_layout() {
        let hdr = RrcUlHeader {
            msg_type: RrcMsgType::Attach,
            source: SocketAddrV4::new(Ipv4Addr::new(1, 2, 3, 4), 5000),
            device_id: test_device(),
            lcid: 0x0102,
            cause: EstablishmentCause::MoSignalling,
        };
        let raw = hdr.encode();
        assert_eq!(raw.len(), 25);
        assert_eq!(raw[0], 0x01);
        assert_eq!(&raw[1..5], &[1, 2, 3, 4]);
        // Port 5000 = 0x1388, big-endian
        assert_eq!(&raw[5..7], &[0x13, 0x88]);
        assert_eq!(&raw[7..22], test_device().as_bytes());
        assert_eq!(&raw[22..24], &[0x01, 0x02]);
        assert_eq!(raw[24], 3);
        assert_eq!(RrcUlHeader::decode(&raw).unwrap(), hdr);
    }

    #[test]
    fn test_dl_header_roundtrip_with_payload() {
        let mut frame = FrameBuf::from_payload(b"nas");
        let hdr = RrcDlHeader { msg_type: RrcMsgType::Data, device_id: test_device(), lcid: 5 };
        hdr.push(&mut frame).unwrap();
        assert_eq!(frame.len(), RRC_DL_HEADER_LEN + 3);

        let bytes = frame.into_bytes();
        let (decoded, rest) = decode_header(&bytes).unwrap();
        assert_eq!(decoded, hdr);
        assert_eq!(rest, b"nas");
    }

    #[test]
    fn test_short_frames_rejected() {
        let raw = [0x02u8; RRC_UL_HEADER_LEN - 1];
        assert_eq!(
            RrcUlHeader::decode(&raw),
            Err(FrameErr::TooShort { needed: RRC_UL_HEADER_LEN, available: RRC_UL_HEADER_LEN - 1 })
        );
        assert!(decode_header(&raw[..RRC_DL_HEADER_LEN - 1]).is_err());
        assert!(RrcDlHeader::decode(&[]).is_err());
    }

    #[test]
    fn test_unknown_type_and_cause() {
        let mut raw = [0u8; RRC_UL_HEADER_LEN];
        raw[0] = 0x09;
        assert_eq!(RrcUlHeader::decode(&raw), Err(FrameErr::UnknownType(0x09)));

        raw[0] = 0x02;
        raw[24] = 6;
        assert_eq!(
            RrcUlHeader::decode(&raw),
            Err(FrameErr::InvalidValue { field: "establishment_cause", value: 6 })
        );
    }

    #[test]
    fn test_pull_leaves_payload() {
        let hdr = RrcUlHeader {
            msg_type: RrcMsgType::Data,
            source: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
            device_id: test_device(),
            lcid: 7,
            cause: EstablishmentCause::MoData,
        };
        let datagram = build_ul_frame(&hdr, b"user data");
        assert_eq!(datagram.len(), RRC_UL_HEADER_LEN + 9);
        let mut frame = FrameBuf::from_datagram(datagram.to_vec());
        assert_eq!(RrcUlHeader::pull(&mut frame).unwrap(), hdr);
        assert_eq!(frame.as_slice(), b"user data");
    }

    #[test]
    fn test_msg_type_for_lcid() {
        assert_eq!(RrcMsgType::for_lcid(0), RrcMsgType::Normal);
        assert_eq!(RrcMsgType::for_lcid(2), RrcMsgType::Normal);
        assert_eq!(RrcMsgType::for_lcid(3), RrcMsgType::Data);
    }
}
