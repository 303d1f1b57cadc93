use std::collections::BTreeMap;

use vair_core::Rnti;

/// Picks the rnti for a new session: the lowest value in the configured range that no
/// live session holds. Only the registry calls this, with its table locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RntiAllocator {
    first: Rnti,
    last: Rnti,
}

impl RntiAllocator {
    /// Allocator over `first..=last`. Bounds are clamped to the assignable range.
    pub fn with_range(first: u16, last: u16) -> Self {
        let first = Rnti(first.max(Rnti::FIRST.0));
        let last = Rnti(last.min(Rnti::LAST.0));
        Self { first, last }
    }

    pub fn first(&self) -> Rnti {
        self.first
    }

    pub fn last(&self) -> Rnti {
        self.last
    }

    /// Number of rntis this allocator can hand out
    pub fn capacity(&self) -> usize {
        if self.first > self.last { 0 } else { (self.last.0 - self.first.0) as usize + 1 }
    }

    /// Lowest free rnti, or None if every value in range is taken
    pub fn next_free<V>(&self, in_use: &BTreeMap<Rnti, V>) -> Option<Rnti> {
        if self.first > self.last {
            return None;
        }

        // Densely packed from `first` up: the answer is right after the highest key
        if let (Some((&lo, _)), Some((&hi, _))) = (in_use.first_key_value(), in_use.last_key_value()) {
            if lo == self.first && hi <= self.last && (hi.0 - lo.0) as usize + 1 == in_use.len() {
                return if hi == self.last { None } else { Some(Rnti(hi.0 + 1)) };
            }
        }

        let mut candidate = self.first;
        for &taken in in_use.range(self.first..=self.last).map(|(k, _)| k) {
            if taken != candidate {
                // Gap below `taken`
                break;
            }
            if candidate == self.last {
                return None;
            }
            candidate = Rnti(candidate.0 + 1);
        }
        Some(candidate)
    }
}

impl Default for RntiAllocator {
    fn default() -> Self {
        Self { first: Rnti::FIRST, last: Rnti::LAST }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(rntis: &[u16]) -> BTreeMap<Rnti, ()> {
        rntis.iter().map(|&r| (Rnti(r), ())).collect()
    }

    #[test]
    fn test_lowest_free() {
        let alloc = RntiAllocator::default();
        assert_eq!(alloc.next_free(&used(&[])), Some(Rnti(1)));
        assert_eq!(alloc.next_free(&used(&[1, 2, 3])), Some(Rnti(4)));
        assert_eq!(alloc.next_free(&used(&[1, 3, 4])), Some(Rnti(2)));
        assert_eq!(alloc.next_free(&used(&[2, 3])), Some(Rnti(1)));
    }

    #[test]
    fn test_narrow_range() {
        let alloc = RntiAllocator::with_range(10, 12);
        assert_eq!(alloc.capacity(), 3);
        // Values outside the range do not matter
        assert_eq!(alloc.next_free(&used(&[1, 2, 10])), Some(Rnti(11)));
        assert_eq!(alloc.next_free(&used(&[10, 11, 12])), None);
        assert_eq!(alloc.next_free(&used(&[10, 11, 12, 13])), None);
    }

    #[test]
    fn test_full_space() {
        let alloc = RntiAllocator::default();
        assert_eq!(alloc.capacity(), Rnti::CAPACITY);
        let all: BTreeMap<Rnti, ()> = (1..=0xFFFEu16).map(|r| (Rnti(r), ())).collect();
        assert_eq!(alloc.next_free(&all), None);

        let mut almost = all.clone();
        almost.remove(&Rnti(0xFFFE));
        assert_eq!(alloc.next_free(&almost), Some(Rnti(0xFFFE)));
    }

    #[test]
    fn test_range_clamped() {
        let alloc = RntiAllocator::with_range(0, 0xFFFF);
        assert_eq!(alloc, RntiAllocator::default());
    }
}
