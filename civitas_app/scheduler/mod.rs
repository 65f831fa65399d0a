use std::sync::Arc;

pub mod construction;
pub mod staff_allocation;

pub use construction::{
    BuildingFactory, ConstructionListener, ConstructionScheduler, PlainBuildingFactory,
    WaitingBuilding,
};
pub use staff_allocation::{PendingAllocation, StaffAllocationListener, StaffAllocationScheduler};

/// Handle returned on subscription, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Subscribed listeners of one scheduler, in subscription order.
///
/// Dispatch always works on a [`Listeners::snapshot`] taken at the start of a
/// tick: changes made while it runs show up on the next tick.
pub struct Listeners<L: ?Sized> {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<L>)>,
}

impl<L: ?Sized> Listeners<L> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Arc<L>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn snapshot(&self) -> Vec<Arc<L>> {
        self.entries.iter().map(|(_, l)| l.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Self::new()
    }
}
