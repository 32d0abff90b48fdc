//! Side table owning every tracked resource and its record

use crate::record::ResourceRecord;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Stable, generational identity of a pooled resource
    pub struct ResourceId;
}

pub(crate) struct Slot<T> {
    pub value: T,
    pub record: ResourceRecord,
    /// Whether the resource currently sits in its pool's free list.
    /// Tracked here as well as in the record because record updates can be
    /// switched off per pool.
    pub idle: bool,
}

pub(crate) struct ResourceArena<T> {
    slots: SlotMap<ResourceId, Slot<T>>,
}

impl<T> ResourceArena<T> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    pub fn insert(&mut self, value: T, record: ResourceRecord) -> ResourceId {
        self.slots.insert(Slot {
            value,
            record,
            idle: false,
        })
    }

    pub fn remove(&mut self, id: ResourceId) -> Option<Slot<T>> {
        self.slots.remove(id)
    }

    pub fn slot(&self, id: ResourceId) -> Option<&Slot<T>> {
        self.slots.get(id)
    }

    pub fn slot_mut(&mut self, id: ResourceId) -> Option<&mut Slot<T>> {
        self.slots.get_mut(id)
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.slots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Remove every resource matching the predicate
    pub fn drain_where<F>(&mut self, mut predicate: F) -> Vec<(ResourceId, Slot<T>)>
    where
        F: FnMut(&Slot<T>) -> bool,
    {
        let ids: Vec<ResourceId> = self
            .slots
            .iter()
            .filter(|(_, slot)| predicate(slot))
            .map(|(id, _)| id)
            .collect();

        ids.into_iter()
            .filter_map(|id| self.slots.remove(id).map(|slot| (id, slot)))
            .collect()
    }
}
