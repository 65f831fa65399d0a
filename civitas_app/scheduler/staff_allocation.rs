use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, instrument};

use civitas_core::{GameError, Result};
use civitas_game::models::{building::Building, city::City, city_registry::CityRegistry};
use civitas_types::{
    buildings::{BuildingPosition, Staff},
    common::CityId,
};

use super::{ListenerId, Listeners};
use crate::{clock::Clock, protocol::AllocationRecord};

pub trait StaffAllocationListener: Send + Sync {
    fn update_time(&self, _city: &City, _building: &Building, _remaining: Duration) {}

    fn staff_allocated(&self, city: &City, building: &Building, staff: Staff);
}

/// A staff change waiting for its duration to elapse.
///
/// Entries point at a slot rather than at a building, so an upgrade landing
/// on the same slot meanwhile is picked up on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAllocation {
    pub city: CityId,
    pub position: BuildingPosition,
    pub staff: Staff,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl PendingAllocation {
    /// `None` when the due time falls outside the calendar: such an entry
    /// never completes.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.started_at.checked_add_signed(self.duration)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at().is_some_and(|due| now >= due)
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match self.due_at() {
            Some(due) => due.signed_duration_since(now),
            None => Duration::MAX,
        }
    }

    pub fn to_record(&self) -> AllocationRecord {
        AllocationRecord::new(self.city, self.position, self.staff)
    }
}

/// Staff reassignments, completed by comparing the wall clock against each
/// entry's start time. Elapsed tick time is not used.
pub struct StaffAllocationScheduler {
    queue: Vec<PendingAllocation>,
    clock: Arc<dyn Clock>,
    listeners: Listeners<dyn StaffAllocationListener>,
}

impl StaffAllocationScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            queue: Vec::new(),
            clock,
            listeners: Listeners::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Arc<dyn StaffAllocationListener>) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Gives `building` its new staff at once and queues the confirmation.
    ///
    /// Bonuses keep using the previous staff until the entry completes.
    #[instrument(skip_all, fields(
        city = %building.city(),
        position = %building.position(),
        staff = %staff,
        duration_ms = duration.num_milliseconds(),
    ))]
    pub fn add(&mut self, building: &mut Building, staff: Staff, duration: Duration) -> Result<()> {
        building.validate_staff(staff)?;
        building.set_old_staff();
        building.set_staff(staff)?;

        self.queue.push(PendingAllocation {
            city: building.city(),
            position: building.position(),
            staff,
            started_at: self.clock.now(),
            duration,
        });
        debug!("Staff allocation queued");
        Ok(())
    }

    /// Same as [`StaffAllocationScheduler::add`], looking the building up by slot.
    pub fn allocate(
        &mut self,
        cities: &mut CityRegistry,
        city: CityId,
        position: BuildingPosition,
        staff: Staff,
        duration: Duration,
    ) -> Result<()> {
        let building = cities
            .get_mut(city)?
            .building_mut(position)
            .ok_or(GameError::EmptySlot { position })?;
        self.add(building, staff, duration)
    }

    /// Completes every entry whose time is up; the others report what is left.
    ///
    /// An entry whose slot can't be found anymore is dropped and logged, and
    /// the first such failure is returned once the whole queue was walked.
    pub fn tick(&mut self, cities: &mut CityRegistry, _elapsed: Duration) -> Result<()> {
        let listeners = self.listeners.snapshot();

        let mut failure = None;
        let mut idx = 0;
        while idx < self.queue.len() {
            let pending = self.queue[idx];
            let now = self.clock.now();

            if pending.is_due(now) {
                self.queue.remove(idx);
                if let Err(e) = Self::confirm(cities, &pending, &listeners) {
                    error!(
                        city = %pending.city,
                        position = %pending.position,
                        error = %e,
                        "Staff allocation failed"
                    );
                    failure.get_or_insert(e);
                }
                continue;
            }

            let building = cities
                .get(pending.city)
                .ok()
                .and_then(|city| city.building(pending.position).map(|b| (city, b)));
            if let Some((city, building)) = building {
                let remaining = pending.remaining(now);
                for listener in &listeners {
                    listener.update_time(city, building, remaining);
                }
            }
            idx += 1;
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn confirm(
        cities: &mut CityRegistry,
        pending: &PendingAllocation,
        listeners: &[Arc<dyn StaffAllocationListener>],
    ) -> Result<()> {
        let city = cities.get_mut(pending.city)?;
        let building = city
            .building_mut(pending.position)
            .ok_or(GameError::EmptySlot {
                position: pending.position,
            })?;
        building.set_old_staff();
        city.update_production();

        let city: &City = city;
        if let Some(building) = city.building(pending.position) {
            info!(building = %building, staff = %pending.staff, "Staff allocated");
            for listener in listeners {
                listener.staff_allocated(city, building, pending.staff);
            }
        }
        Ok(())
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingAllocation> {
        self.queue.iter()
    }

    pub fn pending_for_city(&self, city: CityId) -> Vec<&PendingAllocation> {
        self.queue.iter().filter(|p| p.city == city).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn records(&self) -> Vec<AllocationRecord> {
        self.queue.iter().map(PendingAllocation::to_record).collect()
    }
}
