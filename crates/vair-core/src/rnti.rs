use core::fmt;

/// Radio Network Temporary Identifier, the short-lived handle of an active session.
///
/// Values 1..=0xFFFE name sessions. 0x0000 and 0xFFFF are reserved and double as
/// the broadcast sentinels of the dynamic-handle protocol.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Rnti(pub u16);

impl Rnti {
    /// Lowest value that can be assigned to a session
    pub const FIRST: Rnti = Rnti(0x0001);
    /// Highest value that can be assigned to a session
    pub const LAST: Rnti = Rnti(0xFFFE);
    /// "No session". Also used as the paging broadcast sentinel (P-RNTI)
    pub const NONE: Rnti = Rnti(0x0000);
    pub const P_RNTI: Rnti = Rnti(0x0000);
    /// System information broadcast sentinel (SI-RNTI)
    pub const SI_RNTI: Rnti = Rnti(0xFFFF);

    /// Number of assignable values
    pub const CAPACITY: usize = (Self::LAST.0 - Self::FIRST.0) as usize + 1;

    pub fn value(self) -> u16 {
        self.0
    }

    /// True for values that may name a session
    pub fn is_assignable(self) -> bool {
        self >= Self::FIRST && self <= Self::LAST
    }
}

impl From<u16> for Rnti {
    fn from(v: u16) -> Self {
        Rnti(v)
    }
}

impl fmt::Display for Rnti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

impl fmt::Debug for Rnti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rnti(0x{:04x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignable_range() {
        assert_eq!(Rnti::CAPACITY, 65534);
        assert!(!Rnti::NONE.is_assignable());
        assert!(!Rnti::SI_RNTI.is_assignable());
        assert!(Rnti(1).is_assignable());
        assert!(Rnti(0xFFFE).is_assignable());
        assert_eq!(format!("{}", Rnti(0x46)), "0x0046");
    }
}
