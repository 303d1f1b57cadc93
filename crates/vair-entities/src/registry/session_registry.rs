use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::net::SocketAddrV4;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use vair_config::StackConfig;
use vair_core::{DeviceId, EstablishmentCause, Lcid, Rnti};

use super::RntiAllocator;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryErr {
    #[error("no rnti available")]
    Full,
    #[error("unknown rnti {0}")]
    UnknownRnti(Rnti),
    #[error("rnti {0} is bound to a device")]
    Bound(Rnti),
}

/// Result of a successful attach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Fresh session
    New(Rnti),
    /// Device already had a session; it keeps its rnti, the address was updated
    Refreshed(Rnti),
}

impl AttachOutcome {
    pub fn rnti(self) -> Rnti {
        match self {
            AttachOutcome::New(rnti) | AttachOutcome::Refreshed(rnti) => rnti,
        }
    }
}

#[derive(Debug, Clone)]
struct Session {
    /// None for sessions created through the dynamic-handle link
    device_id: Option<DeviceId>,
    addr: SocketAddrV4,
    cause: Option<EstablishmentCause>,
    bearers: BTreeSet<Lcid>,
}

/// Copy of one session's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub rnti: Rnti,
    pub device_id: Option<DeviceId>,
    pub addr: SocketAddrV4,
    pub cause: Option<EstablishmentCause>,
    pub bearers: Vec<Lcid>,
}

#[derive(Default)]
struct Tables {
    by_rnti: BTreeMap<Rnti, Session>,
    by_device: HashMap<DeviceId, Rnti>,
}

/// Authoritative map between device identity, rnti and network address.
///
/// `by_device` is the exact inverse of the device-bound entries of `by_rnti`, and every
/// session has an address. Each operation runs in a single critical section under one
/// lock, so no caller can see a half-updated session. No I/O happens under the lock.
pub struct SessionRegistry {
    tables: RwLock<Tables>,
    alloc: RntiAllocator,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_allocator(RntiAllocator::default())
    }

    pub fn with_allocator(alloc: RntiAllocator) -> Self {
        Self { tables: RwLock::new(Tables::default()), alloc }
    }

    /// Registry handing out rntis from the configured range
    pub fn from_config(cfg: &StackConfig) -> Self {
        Self::with_allocator(RntiAllocator::with_range(cfg.link.rnti_first, cfg.link.rnti_last))
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Binds `device_id` to a session reachable at `addr`.
    /// A device that is already attached keeps its rnti and gets its address refreshed.
    pub fn attach(
        &self,
        device_id: DeviceId,
        addr: SocketAddrV4,
        cause: EstablishmentCause,
    ) -> Result<AttachOutcome, RegistryErr> {
        let mut t = self.write();

        if let Some(&rnti) = t.by_device.get(&device_id) {
            let Some(session) = t.by_rnti.get_mut(&rnti) else {
                // Cannot happen while the maps are kept in sync
                tracing::error!(rnti = %rnti, "registry: device {} maps to missing session", device_id);
                return Err(RegistryErr::UnknownRnti(rnti));
            };
            session.addr = addr;
            session.cause = Some(cause);
            return Ok(AttachOutcome::Refreshed(rnti));
        }

        let rnti = self.alloc.next_free(&t.by_rnti).ok_or(RegistryErr::Full)?;
        t.by_rnti.insert(
            rnti,
            Session { device_id: Some(device_id), addr, cause: Some(cause), bearers: BTreeSet::new() },
        );
        t.by_device.insert(device_id, rnti);
        Ok(AttachOutcome::New(rnti))
    }

    /// New session without a device identity
    pub fn allocate_anonymous(&self, addr: SocketAddrV4) -> Result<Rnti, RegistryErr> {
        let mut t = self.write();
        let rnti = self.alloc.next_free(&t.by_rnti).ok_or(RegistryErr::Full)?;
        t.by_rnti.insert(rnti, Session { device_id: None, addr, cause: None, bearers: BTreeSet::new() });
        Ok(rnti)
    }

    pub fn lookup_by_device(&self, device_id: &DeviceId) -> Option<Rnti> {
        self.read().by_device.get(device_id).copied()
    }

    pub fn lookup_address(&self, rnti: Rnti) -> Option<SocketAddrV4> {
        self.read().by_rnti.get(&rnti).map(|s| s.addr)
    }

    /// Device bound to `rnti`. None for unknown or anonymous sessions.
    pub fn lookup_device(&self, rnti: Rnti) -> Option<DeviceId> {
        self.read().by_rnti.get(&rnti).and_then(|s| s.device_id)
    }

    /// Address of `rnti` if it is an anonymous session
    pub fn lookup_anonymous_address(&self, rnti: Rnti) -> Option<SocketAddrV4> {
        self.read().by_rnti.get(&rnti).filter(|s| s.device_id.is_none()).map(|s| s.addr)
    }

    /// Anonymous session registered from `addr`, if any
    pub fn lookup_anonymous(&self, addr: SocketAddrV4) -> Option<Rnti> {
        self.read()
            .by_rnti
            .iter()
            .find(|(_, s)| s.device_id.is_none() && s.addr == addr)
            .map(|(&rnti, _)| rnti)
    }

    /// Snapshot of every anonymous session, in rnti order
    pub fn anonymous_addresses(&self) -> Vec<(Rnti, SocketAddrV4)> {
        self.read()
            .by_rnti
            .iter()
            .filter(|(_, s)| s.device_id.is_none())
            .map(|(&rnti, s)| (rnti, s.addr))
            .collect()
    }

    pub fn contains(&self, rnti: Rnti) -> bool {
        self.read().by_rnti.contains_key(&rnti)
    }

    pub fn session(&self, rnti: Rnti) -> Option<SessionInfo> {
        self.read().by_rnti.get(&rnti).map(|s| SessionInfo {
            rnti,
            device_id: s.device_id,
            addr: s.addr,
            cause: s.cause,
            bearers: s.bearers.iter().copied().collect(),
        })
    }

    pub fn update_address(&self, rnti: Rnti, addr: SocketAddrV4) -> Result<(), RegistryErr> {
        let mut t = self.write();
        let session = t.by_rnti.get_mut(&rnti).ok_or(RegistryErr::UnknownRnti(rnti))?;
        session.addr = addr;
        Ok(())
    }

    /// Removes the session and all its mappings. Releasing an unknown rnti changes nothing.
    pub fn release(&self, rnti: Rnti) -> Result<(), RegistryErr> {
        let mut t = self.write();
        let session = t.by_rnti.remove(&rnti).ok_or(RegistryErr::UnknownRnti(rnti))?;
        if let Some(device_id) = session.device_id {
            let removed = t.by_device.remove(&device_id);
            vair_core::assert_warn!(removed == Some(rnti), "device {} was not mapped to {}", device_id, rnti);
        }
        Ok(())
    }

    /// Removes `rnti` only if it has no device identity, returning its address.
    /// Sessions bound through attach are left untouched.
    pub fn release_anonymous(&self, rnti: Rnti) -> Result<SocketAddrV4, RegistryErr> {
        let mut t = self.write();
        let bound = t.by_rnti.get(&rnti).ok_or(RegistryErr::UnknownRnti(rnti))?.device_id.is_some();
        if bound {
            return Err(RegistryErr::Bound(rnti));
        }
        t.by_rnti.remove(&rnti).map(|s| s.addr).ok_or(RegistryErr::UnknownRnti(rnti))
    }

    pub fn add_bearer(&self, rnti: Rnti, lcid: Lcid) -> Result<(), RegistryErr> {
        let mut t = self.write();
        let session = t.by_rnti.get_mut(&rnti).ok_or(RegistryErr::UnknownRnti(rnti))?;
        session.bearers.insert(lcid);
        Ok(())
    }

    /// Returns whether the bearer existed
    pub fn remove_bearer(&self, rnti: Rnti, lcid: Lcid) -> Result<bool, RegistryErr> {
        let mut t = self.write();
        let session = t.by_rnti.get_mut(&rnti).ok_or(RegistryErr::UnknownRnti(rnti))?;
        Ok(session.bearers.remove(&lcid))
    }

    pub fn bearers(&self, rnti: Rnti) -> Result<Vec<Lcid>, RegistryErr> {
        let t = self.read();
        let session = t.by_rnti.get(&rnti).ok_or(RegistryErr::UnknownRnti(rnti))?;
        Ok(session.bearers.iter().copied().collect())
    }

    /// Drops every session. Used on shutdown.
    pub fn clear(&self) {
        let mut t = self.write();
        t.by_rnti.clear();
        t.by_device.clear();
    }

    pub fn len(&self) -> usize {
        self.read().by_rnti.len()
    }

    /// Sessions bound to a device
    pub fn device_count(&self) -> usize {
        self.read().by_device.len()
    }

    pub fn anonymous_count(&self) -> usize {
        let t = self.read();
        t.by_rnti.len() - t.by_device.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().by_rnti.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.alloc.capacity()
    }

    /// Checks that the device and rnti maps are mutual inverses
    pub fn is_consistent(&self) -> bool {
        let t = self.read();
        let bound = t.by_rnti.values().filter(|s| s.device_id.is_some()).count();
        bound == t.by_device.len()
            && t.by_device.iter().all(|(dev, rnti)| {
                t.by_rnti.get(rnti).and_then(|s| s.device_id.as_ref()) == Some(dev)
            })
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use vair_core::debug::setup_logging_verbose;

    fn dev(n: u64) -> DeviceId {
        DeviceId::from_digits(&n.to_string()).unwrap()
    }

    fn addr(port: u16) -> SocketAddrV4 {
        SocketAddrV4::new([1, 2, 3, 4].into(), port)
    }

    #[test]
    fn test_attach_assigns_lowest_rnti() {
        let reg = SessionRegistry::new();
        let out = reg.attach(dev(1), addr(5000), EstablishmentCause::MoSignalling).unwrap();
        assert_eq!(out, AttachOutcome::New(Rnti(1)));
        assert_eq!(reg.lookup_by_device(&dev(1)), Some(Rnti(1)));
        assert_eq!(reg.lookup_device(Rnti(1)), Some(dev(1)));
        assert_eq!(reg.lookup_address(Rnti(1)), Some(addr(5000)));

        assert_eq!(reg.attach(dev(2), addr(5001), EstablishmentCause::MoData).unwrap().rnti(), Rnti(2));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_reattach_keeps_rnti_and_updates_address() {
        let reg = SessionRegistry::new();
        reg.attach(dev(1), addr(5000), EstablishmentCause::MoSignalling).unwrap();
        let out = reg.attach(dev(1), addr(6000), EstablishmentCause::MtAccess).unwrap();
        assert_eq!(out, AttachOutcome::Refreshed(Rnti(1)));
        assert_eq!(reg.len(), 1);
        let s = reg.session(Rnti(1)).unwrap();
        assert_eq!(s.addr, addr(6000));
        assert_eq!(s.cause, Some(EstablishmentCause::MtAccess));
    }

    #[test]
    fn test_release_reuses_lowest_and_is_idempotent() {
        let reg = SessionRegistry::new();
        for i in 1..=3 {
            reg.attach(dev(i), addr(i as u16), EstablishmentCause::MoData).unwrap();
        }
        reg.release(Rnti(2)).unwrap();
        assert_eq!(reg.lookup_by_device(&dev(2)), None);
        assert_eq!(reg.lookup_address(Rnti(2)), None);
        assert_eq!(reg.release(Rnti(2)), Err(RegistryErr::UnknownRnti(Rnti(2))));
        assert_eq!(reg.len(), 2);

        assert_eq!(reg.attach(dev(9), addr(9), EstablishmentCause::MoData).unwrap(), AttachOutcome::New(Rnti(2)));
        assert!(reg.is_consistent());
    }

    #[test]
    fn test_full_registry_not_mutated() {
        let reg = SessionRegistry::with_allocator(RntiAllocator::with_range(1, 2));
        reg.attach(dev(1), addr(1), EstablishmentCause::MoData).unwrap();
        reg.allocate_anonymous(addr(2)).unwrap();
        assert_eq!(reg.attach(dev(3), addr(3), EstablishmentCause::MoData), Err(RegistryErr::Full));
        assert_eq!(reg.allocate_anonymous(addr(4)), Err(RegistryErr::Full));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.lookup_by_device(&dev(3)), None);
        // A known device can still re-attach
        assert!(reg.attach(dev(1), addr(10), EstablishmentCause::MoData).is_ok());
    }

    #[test]
    fn test_full_default_range() {
        let reg = SessionRegistry::new();
        for i in 0..Rnti::CAPACITY as u64 {
            reg.attach(dev(i), addr(1), EstablishmentCause::MoData).unwrap();
        }
        assert_eq!(reg.len(), 65534);
        assert_eq!(reg.attach(dev(999_999), addr(2), EstablishmentCause::MoData), Err(RegistryErr::Full));
        assert_eq!(reg.len(), 65534);
        assert_eq!(reg.lookup_by_device(&dev(999_999)), None);
    }

    #[test]
    fn test_anonymous_sessions() {
        let reg = SessionRegistry::new();
        let a = reg.allocate_anonymous(addr(7000)).unwrap();
        let b = reg.attach(dev(1), addr(7001), EstablishmentCause::MoData).unwrap().rnti();
        assert_ne!(a, b);
        assert_eq!(reg.lookup_device(a), None);
        assert_eq!(reg.lookup_anonymous(addr(7000)), Some(a));
        assert_eq!(reg.lookup_anonymous(addr(7001)), None);
        assert_eq!(reg.anonymous_addresses(), vec![(a, addr(7000))]);
        assert_eq!(reg.device_count(), 1);
        assert_eq!(reg.anonymous_count(), 1);
        assert!(reg.is_consistent());
    }

    #[test]
    fn test_release_anonymous_leaves_bound_sessions() {
        let reg = SessionRegistry::new();
        let anon = reg.allocate_anonymous(addr(7000)).unwrap();
        let bound = reg.attach(dev(1), addr(7001), EstablishmentCause::MoData).unwrap().rnti();

        assert_eq!(reg.lookup_anonymous_address(anon), Some(addr(7000)));
        assert_eq!(reg.lookup_anonymous_address(bound), None);

        assert_eq!(reg.release_anonymous(bound), Err(RegistryErr::Bound(bound)));
        assert_eq!(reg.lookup_by_device(&dev(1)), Some(bound));

        assert_eq!(reg.release_anonymous(anon), Ok(addr(7000)));
        assert_eq!(reg.release_anonymous(anon), Err(RegistryErr::UnknownRnti(anon)));
        assert_eq!(reg.len(), 1);
        assert!(reg.is_consistent());
    }

    #[test]
    fn test_bearers() {
        let reg = SessionRegistry::new();
        let rnti = reg.attach(dev(1), addr(1), EstablishmentCause::MoData).unwrap().rnti();
        reg.add_bearer(rnti, 4).unwrap();
        reg.add_bearer(rnti, 3).unwrap();
        assert_eq!(reg.bearers(rnti).unwrap(), vec![3, 4]);
        assert_eq!(reg.remove_bearer(rnti, 3), Ok(true));
        assert_eq!(reg.remove_bearer(rnti, 3), Ok(false));
        assert_eq!(reg.add_bearer(Rnti(99), 3), Err(RegistryErr::UnknownRnti(Rnti(99))));
    }

    #[test]
    fn test_random_sequences_keep_maps_inverse() {
        setup_logging_verbose();
        let reg = SessionRegistry::with_allocator(RntiAllocator::with_range(1, 64));
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..5000 {
            let device = dev(rng.random_range(0..100));
            match rng.random_range(0..4) {
                0 | 1 => {
                    let before = reg.lookup_by_device(&device);
                    match reg.attach(device, addr(rng.random()), EstablishmentCause::MoData) {
                        Ok(AttachOutcome::Refreshed(rnti)) => assert_eq!(before, Some(rnti)),
                        Ok(AttachOutcome::New(_)) => assert_eq!(before, None),
                        Err(e) => {
                            assert_eq!(e, RegistryErr::Full);
                            assert_eq!(reg.len(), 64);
                        }
                    }
                }
                2 => {
                    let _ = reg.allocate_anonymous(addr(rng.random()));
                }
                _ => {
                    let _ = reg.release(Rnti(rng.random_range(1..=64)));
                }
            }
            assert!(reg.is_consistent());
            assert!(reg.len() <= 64);
        }

        reg.clear();
        assert!(reg.is_empty());
        assert!(reg.is_consistent());
    }
}
