use core::fmt;

/// RRC establishment cause reported by a device on attach, as forwarded to S1AP
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EstablishmentCause {
    Emergency,
    HighPriorityAccess,
    MtAccess,
    MoSignalling,
    MoData,
    DelayTolerantAccess,
}

impl EstablishmentCause {
    pub fn into_raw(self) -> u8 {
        match self {
            EstablishmentCause::Emergency => 0,
            EstablishmentCause::HighPriorityAccess => 1,
            EstablishmentCause::MtAccess => 2,
            EstablishmentCause::MoSignalling => 3,
            EstablishmentCause::MoData => 4,
            EstablishmentCause::DelayTolerantAccess => 5,
        }
    }

    pub fn try_from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(EstablishmentCause::Emergency),
            1 => Some(EstablishmentCause::HighPriorityAccess),
            2 => Some(EstablishmentCause::MtAccess),
            3 => Some(EstablishmentCause::MoSignalling),
            4 => Some(EstablishmentCause::MoData),
            5 => Some(EstablishmentCause::DelayTolerantAccess),
            _ => None,
        }
    }
}

impl fmt::Display for EstablishmentCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstablishmentCause::Emergency => write!(f, "emergency"),
            EstablishmentCause::HighPriorityAccess => write!(f, "highPriorityAccess"),
            EstablishmentCause::MtAccess => write!(f, "mt-Access"),
            EstablishmentCause::MoSignalling => write!(f, "mo-Signalling"),
            EstablishmentCause::MoData => write!(f, "mo-Data"),
            EstablishmentCause::DelayTolerantAccess => write!(f, "delay-TolerantAccess"),
        }
    }
}
