//! Fixed routing of hop records to per-switch slots.

use std::fmt;

use crate::decode::PerHopRecord;

/// Switch identities that own an output slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SwitchId {
    S1,
    S2,
    S3,
    S4,
}

impl SwitchId {
    pub const ALL: [SwitchId; 4] = [Self::S1, Self::S2, Self::S3, Self::S4];

    /// Map a raw `switch_id` to its slot; `None` for anything outside 1..=4.
    pub fn from_raw(id: u32) -> Option<Self> {
        match id {
            1 => Some(Self::S1),
            2 => Some(Self::S2),
            3 => Some(Self::S3),
            4 => Some(Self::S4),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::S1 => 1,
            Self::S2 => 2,
            Self::S3 => 3,
            Self::S4 => 4,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::S1 => 0,
            Self::S2 => 1,
            Self::S3 => 2,
            Self::S4 => 3,
        }
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}

/// One `T` per [`SwitchId`].
#[derive(Debug, Clone)]
pub struct SwitchDemux<T> {
    slots: [T; 4],
}

impl<T> SwitchDemux<T> {
    /// Slots in `SwitchId::ALL` order.
    pub fn new(slots: [T; 4]) -> Self {
        Self { slots }
    }

    pub fn try_from_fn<E>(mut f: impl FnMut(SwitchId) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            slots: [f(SwitchId::S1)?, f(SwitchId::S2)?, f(SwitchId::S3)?, f(SwitchId::S4)?],
        })
    }

    pub fn get(&self, id: SwitchId) -> &T {
        &self.slots[id.index()]
    }

    /// Slot owning this record, or `None` when the switch id is unroutable.
    pub fn route(&self, record: &PerHopRecord) -> Option<(SwitchId, &T)> {
        let id = SwitchId::from_raw(record.switch_id)?;
        Some((id, self.get(id)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SwitchId, &T)> {
        SwitchId::ALL.into_iter().zip(self.slots.iter())
    }
}
