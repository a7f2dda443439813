use parking_lot::RwLock;

use crate::fingerprint::SLOT_COUNT;

type Slot = Option<Box<[u8]>>;

/// A fixed table of [`SLOT_COUNT`] slots behind one reader/writer lock.
///
/// Every accessor takes the lock for exactly one slot operation and releases
/// it when the guard goes out of scope, except [`Shard::sweep`], which holds
/// the write lock for the whole table.
pub(crate) struct Shard {
    slots: RwLock<Box<[Slot]>>,
}

impl Shard {
    pub(crate) fn new() -> Self {
        let slots: Box<[Slot]> = (0..SLOT_COUNT).map(|_| None).collect();
        Self {
            slots: RwLock::new(slots),
        }
    }

    /// True if the slot at `index` holds exactly `value`.
    pub(crate) fn holds(&self, index: u16, value: &[u8]) -> bool {
        let slots = self.slots.read();
        slots[usize::from(index)].as_deref() == Some(value)
    }

    /// Writes `value` if the slot is free or already holds it.
    pub(crate) fn claim(&self, index: u16, value: &[u8]) -> bool {
        let mut slots = self.slots.write();
        let slot = &mut slots[usize::from(index)];
        match slot.as_deref() {
            None => {
                *slot = Some(value.into());
                true
            }
            Some(current) => current == value,
        }
    }

    /// Unconditionally stores `value`, returning whatever it displaced.
    pub(crate) fn overwrite(&self, index: u16, value: &[u8]) -> Slot {
        let mut slots = self.slots.write();
        slots[usize::from(index)].replace(value.into())
    }

    /// Clears the slot if it holds `value`.
    pub(crate) fn release(&self, index: u16, value: &[u8]) -> bool {
        let mut slots = self.slots.write();
        let slot = &mut slots[usize::from(index)];
        if slot.as_deref() == Some(value) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Clears every occupied slot for which `evict` returns true.
    ///
    /// The write lock is held for the full scan. If `evict` panics the guard
    /// is dropped during unwinding; slots already cleared stay cleared and
    /// the rest are untouched.
    pub(crate) fn sweep<F>(&self, mut evict: F) -> usize
    where
        F: FnMut(&[u8]) -> bool,
    {
        let mut slots = self.slots.write();
        let mut evicted = 0;
        for slot in slots.iter_mut() {
            let hit = match slot.as_deref() {
                Some(value) => evict(value),
                None => false,
            };
            if hit {
                *slot = None;
                evicted += 1;
            }
        }
        evicted
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.read().iter().filter(|s| s.is_some()).count()
    }

    pub(crate) fn clear(&self) {
        let mut slots = self.slots.write();
        slots.iter_mut().for_each(|s| *s = None);
    }
}
