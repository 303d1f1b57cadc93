use core::fmt;

/// Number of octets in a device identity
pub const DEVICE_ID_LEN: usize = 15;

/// Persistent identity a simulated UE presents when attaching.
///
/// The identity is opaque to the stack. It is used as the registry key for a
/// device independently of the network address the device currently uses.
/// Ordering is lexicographic over all octets.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DeviceId([u8; DEVICE_ID_LEN]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdErr {
    InvalidLength { expected: usize, found: usize },
    InvalidDigit { pos: usize },
}

impl fmt::Display for DeviceIdErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceIdErr::InvalidLength { expected, found } => {
                write!(f, "invalid device id length: expected {}, found {}", expected, found)
            }
            DeviceIdErr::InvalidDigit { pos } => write!(f, "invalid device id digit at position {}", pos),
        }
    }
}

impl std::error::Error for DeviceIdErr {}

impl DeviceId {
    pub const fn new(octets: [u8; DEVICE_ID_LEN]) -> Self {
        Self(octets)
    }

    pub fn as_bytes(&self) -> &[u8; DEVICE_ID_LEN] {
        &self.0
    }

    /// Builds an identity from up to 15 decimal digits, IMSI style.
    /// Shorter strings are left-padded with '0' so that "1001" and
    /// "000000000001001" name the same device.
    pub fn from_digits(digits: &str) -> Result<Self, DeviceIdErr> {
        let raw = digits.as_bytes();
        if raw.is_empty() || raw.len() > DEVICE_ID_LEN {
            return Err(DeviceIdErr::InvalidLength { expected: DEVICE_ID_LEN, found: raw.len() });
        }
        if let Some(pos) = raw.iter().position(|c| !c.is_ascii_digit()) {
            return Err(DeviceIdErr::InvalidDigit { pos });
        }
        let mut octets = [b'0'; DEVICE_ID_LEN];
        octets[DEVICE_ID_LEN - raw.len()..].copy_from_slice(raw);
        Ok(Self(octets))
    }
}

impl From<[u8; DEVICE_ID_LEN]> for DeviceId {
    fn from(octets: [u8; DEVICE_ID_LEN]) -> Self {
        Self(octets)
    }
}

impl TryFrom<&[u8]> for DeviceId {
    type Error = DeviceIdErr;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let octets: [u8; DEVICE_ID_LEN] = slice
            .try_into()
            .map_err(|_| DeviceIdErr::InvalidLength { expected: DEVICE_ID_LEN, found: slice.len() })?;
        Ok(Self(octets))
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0.iter() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self)
    }
}
