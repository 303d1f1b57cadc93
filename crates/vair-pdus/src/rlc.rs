//! Dynamic-handle layer PDUs
//!
//! Every PDU starts with a one-byte type. Uplink bodies:
//! - NORMAL `rnti u16, lcid u16, payload..`
//! - REQUEST_RNTI `ip[4], port u16`
//! - RELEASE_RNTI `rnti u16`
//!
//! Downlink bodies:
//! - NORMAL `rnti u16, lcid u16, payload..`
//! - GRANT `rnti u16`
//! - REJECT (empty)
//! - RELEASE `rnti u16`
//! - SYSTEM_INFO `rnti u16 (SI-RNTI), payload..`
//! - PAGING `rnti u16 (P-RNTI), payload..`

use std::net::{Ipv4Addr, SocketAddrV4};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use vair_core::{Lcid, Rnti};

use crate::frame_err::ensure_len;
use crate::FrameErr;

const UL_NORMAL: u8 = 0x00;
const UL_REQUEST_RNTI: u8 = 0x01;
const UL_RELEASE_RNTI: u8 = 0x02;

const DL_NORMAL: u8 = 0x00;
const DL_GRANT: u8 = 0x01;
const DL_REJECT: u8 = 0x02;
const DL_RELEASE: u8 = 0x03;
const DL_SYSTEM_INFO: u8 = 0x04;
const DL_PAGING: u8 = 0x05;

/// Length of the NORMAL PDU header: type, rnti, lcid
pub const RLC_DATA_HEADER_LEN: usize = 1 + 2 + 2;
/// Length of the broadcast PDU header: type, sentinel rnti
pub const RLC_BCAST_HEADER_LEN: usize = 1 + 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlcUlPdu {
    Normal { rnti: Rnti, lcid: Lcid, payload: Bytes },
    RequestRnti { addr: SocketAddrV4 },
    ReleaseRnti { rnti: Rnti },
}

impl RlcUlPdu {
    pub fn decode(datagram: Bytes) -> Result<Self, FrameErr> {
        ensure_len(&datagram, 1)?;
        let mut r = datagram;
        match r.get_u8() {
            UL_NORMAL => {
                ensure_len(&r, 4)?;
                let rnti = Rnti(r.get_u16());
                let lcid = r.get_u16();
                Ok(RlcUlPdu::Normal { rnti, lcid, payload: r })
            }
            UL_REQUEST_RNTI => {
                ensure_len(&r, 6)?;
                let mut ip = [0u8; 4];
                r.copy_to_slice(&mut ip);
                let port = r.get_u16();
                Ok(RlcUlPdu::RequestRnti { addr: SocketAddrV4::new(Ipv4Addr::from(ip), port) })
            }
            UL_RELEASE_RNTI => {
                ensure_len(&r, 2)?;
                Ok(RlcUlPdu::ReleaseRnti { rnti: Rnti(r.get_u16()) })
            }
            other => Err(FrameErr::UnknownType(other)),
        }
    }

    pub fn encode(&self) -> Bytes {
        match self {
            RlcUlPdu::Normal { rnti, lcid, payload } => {
                let mut b = BytesMut::with_capacity(RLC_DATA_HEADER_LEN + payload.len());
                b.put_u8(UL_NORMAL);
                b.put_u16(rnti.0);
                b.put_u16(*lcid);
                b.put_slice(payload);
                b.freeze()
            }
            RlcUlPdu::RequestRnti { addr } => {
                let mut b = BytesMut::with_capacity(7);
                b.put_u8(UL_REQUEST_RNTI);
                b.put_slice(&addr.ip().octets());
                b.put_u16(addr.port());
                b.freeze()
            }
            RlcUlPdu::ReleaseRnti { rnti } => {
                let mut b = BytesMut::with_capacity(3);
                b.put_u8(UL_RELEASE_RNTI);
                b.put_u16(rnti.0);
                b.freeze()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlcDlPdu {
    Normal { rnti: Rnti, lcid: Lcid, payload: Bytes },
    Grant { rnti: Rnti },
    Reject,
    Release { rnti: Rnti },
    SystemInfo { payload: Bytes },
    Paging { payload: Bytes },
}

impl RlcDlPdu {
    pub fn encode(&self) -> Bytes {
        match self {
            RlcDlPdu::Normal { rnti, lcid, payload } => {
                let mut b = BytesMut::with_capacity(RLC_DATA_HEADER_LEN + payload.len());
                b.put_u8(DL_NORMAL);
                b.put_u16(rnti.0);
                b.put_u16(*lcid);
                b.put_slice(payload);
                b.freeze()
            }
            RlcDlPdu::Grant { rnti } => Self::encode_short(DL_GRANT, *rnti),
            RlcDlPdu::Reject => Bytes::from_static(&[DL_REJECT]),
            RlcDlPdu::Release { rnti } => Self::encode_short(DL_RELEASE, *rnti),
            RlcDlPdu::SystemInfo { payload } => Self::encode_bcast(DL_SYSTEM_INFO, Rnti::SI_RNTI, payload),
            RlcDlPdu::Paging { payload } => Self::encode_bcast(DL_PAGING, Rnti::P_RNTI, payload),
        }
    }

    pub fn decode(datagram: Bytes) -> Result<Self, FrameErr> {
        ensure_len(&datagram, 1)?;
        let mut r = datagram;
        match r.get_u8() {
            DL_NORMAL => {
                ensure_len(&r, 4)?;
                let rnti = Rnti(r.get_u16());
                let lcid = r.get_u16();
                Ok(RlcDlPdu::Normal { rnti, lcid, payload: r })
            }
            DL_GRANT => {
                ensure_len(&r, 2)?;
                Ok(RlcDlPdu::Grant { rnti: Rnti(r.get_u16()) })
            }
            DL_REJECT => Ok(RlcDlPdu::Reject),
            DL_RELEASE => {
                ensure_len(&r, 2)?;
                Ok(RlcDlPdu::Release { rnti: Rnti(r.get_u16()) })
            }
            DL_SYSTEM_INFO => {
                Self::check_sentinel(&mut r, Rnti::SI_RNTI)?;
                Ok(RlcDlPdu::SystemInfo { payload: r })
            }
            DL_PAGING => {
                Self::check_sentinel(&mut r, Rnti::P_RNTI)?;
                Ok(RlcDlPdu::Paging { payload: r })
            }
            other => Err(FrameErr::UnknownType(other)),
        }
    }

    fn encode_short(pdu_type: u8, rnti: Rnti) -> Bytes {
        let mut b = BytesMut::with_capacity(3);
        b.put_u8(pdu_type);
        b.put_u16(rnti.0);
        b.freeze()
    }

    fn encode_bcast(pdu_type: u8, sentinel: Rnti, payload: &[u8]) -> Bytes {
        let mut b = BytesMut::with_capacity(RLC_BCAST_HEADER_LEN + payload.len());
        b.put_u8(pdu_type);
        b.put_u16(sentinel.0);
        b.put_slice(payload);
        b.freeze()
    }

    fn check_sentinel(r: &mut Bytes, expected: Rnti) -> Result<(), FrameErr> {
        ensure_len(r, 2)?;
        let rnti = r.get_u16();
        if rnti != expected.0 {
            return Err(FrameErr::InvalidValue { field: "broadcast_rnti", value: rnti as u64 });
        }
        Ok(())
    }
}
