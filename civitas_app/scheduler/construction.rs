use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use chrono::Duration;
use tracing::{debug, error, info, instrument};

use civitas_core::{GameError, Result};
use civitas_game::models::{building::Building, city::City, city_registry::CityRegistry};
use civitas_types::common::CityId;

use super::{ListenerId, Listeners};
use crate::protocol::ConstructionRecord;

/// Materializes a building once its construction completes.
///
/// Called exactly once per completed entry, never retried.
pub trait BuildingFactory: Send + Sync {
    fn create_building(&self, building: &Building) -> Result<Building>;
}

/// Installs the queued building as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainBuildingFactory;

impl BuildingFactory for PlainBuildingFactory {
    fn create_building(&self, building: &Building) -> Result<Building> {
        Ok(building.clone())
    }
}

pub trait ConstructionListener: Send + Sync {
    fn building_complete(&self, city: &City, building: &Building);

    fn building_in_construction(&self, _city: &City, _building: &Building, _remaining: Duration) {}
}

/// One pending construction.
#[derive(Debug, Clone)]
pub struct WaitingBuilding {
    id: u64,
    building: Building,
    remaining: Duration,
}

impl WaitingBuilding {
    pub fn building(&self) -> &Building {
        &self.building
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn to_record(&self) -> ConstructionRecord {
        ConstructionRecord::from_building(&self.building, self.remaining)
    }
}

/// FIFO queue of constructions, advanced by elapsed time.
///
/// `queue` and `by_city` always hold the same entries: every insert and
/// removal touches both.
pub struct ConstructionScheduler {
    queue: Vec<WaitingBuilding>,
    by_city: HashMap<CityId, BTreeSet<u64>>,
    next_id: u64,
    factory: Arc<dyn BuildingFactory>,
    listeners: Listeners<dyn ConstructionListener>,
}

impl ConstructionScheduler {
    pub fn new(factory: Arc<dyn BuildingFactory>) -> Self {
        Self {
            queue: Vec::new(),
            by_city: HashMap::new(),
            next_id: 0,
            factory,
            listeners: Listeners::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Arc<dyn ConstructionListener>) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Queues `building` for `delay`. A delay of zero or less installs it
    /// right away and notifies listeners before returning.
    #[instrument(skip_all, fields(
        city = %building.city(),
        position = %building.position(),
        building = %building.building_type(),
        level = %building.level(),
        delay_ms = delay.num_milliseconds(),
    ))]
    pub fn add(
        &mut self,
        cities: &mut CityRegistry,
        building: Building,
        delay: Duration,
    ) -> Result<()> {
        cities.get(building.city())?.check_slot(&building)?;

        if delay <= Duration::zero() {
            let listeners = self.listeners.snapshot();
            return self.complete(cities, &building, &listeners);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.by_city.entry(building.city()).or_default().insert(id);
        self.queue.push(WaitingBuilding {
            id,
            building,
            remaining: delay,
        });
        debug!("Construction queued");
        Ok(())
    }

    pub fn add_now(&mut self, cities: &mut CityRegistry, building: Building) -> Result<()> {
        self.add(cities, building, Duration::zero())
    }

    /// Advances every entry by `elapsed`, then walks the queue in FIFO
    /// order: due entries are installed and dropped, the others report their
    /// remaining time.
    ///
    /// A due entry is dropped before its building is materialized, so a
    /// failing factory is never called twice for it. Failures don't stop the
    /// walk: they are logged and the first one is returned once every entry
    /// has been handled.
    pub fn tick(&mut self, cities: &mut CityRegistry, elapsed: Duration) -> Result<()> {
        let listeners = self.listeners.snapshot();
        for entry in &mut self.queue {
            entry.remaining = advance(entry.remaining, elapsed);
        }

        let mut failure = None;
        let mut idx = 0;
        while idx < self.queue.len() {
            if self.queue[idx].remaining <= Duration::zero() {
                let done = self.queue.remove(idx);
                self.unindex(&done);
                if let Err(e) = self.complete(cities, &done.building, &listeners) {
                    error!(building = %done.building, error = %e, "Construction failed");
                    failure.get_or_insert(e);
                }
                continue;
            }

            let entry = &self.queue[idx];
            match cities.get(entry.building.city()) {
                Ok(city) => {
                    for listener in &listeners {
                        listener.building_in_construction(city, &entry.building, entry.remaining);
                    }
                }
                Err(e) => {
                    error!(building = %entry.building, error = %e, "Construction without a city");
                    failure.get_or_insert(e.into());
                }
            }
            idx += 1;
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn complete(
        &self,
        cities: &mut CityRegistry,
        building: &Building,
        listeners: &[Arc<dyn ConstructionListener>],
    ) -> Result<()> {
        let city = cities.get_mut(building.city())?;
        let mut built = self.factory.create_building(building)?;
        if let Some(current) = city.building(built.position()).filter(|b| **b == built) {
            built.carry_staff_from(current);
        }
        let position = built.position();
        city.create_construction(built)?;

        let city: &City = city;
        let installed = city
            .building(position)
            .ok_or(GameError::EmptySlot { position })?;
        info!(building = %installed, "Construction complete");

        for listener in listeners {
            listener.building_complete(city, installed);
        }
        Ok(())
    }

    fn unindex(&mut self, entry: &WaitingBuilding) {
        let city = entry.building.city();
        if let Some(ids) = self.by_city.get_mut(&city) {
            ids.remove(&entry.id);
            if ids.is_empty() {
                self.by_city.remove(&city);
            }
        }
    }

    /// Pending entries in FIFO order.
    pub fn pending(&self) -> impl Iterator<Item = &WaitingBuilding> {
        self.queue.iter()
    }

    pub fn pending_for_city(&self, city: CityId) -> Vec<&WaitingBuilding> {
        match self.by_city.get(&city) {
            Some(ids) => self.queue.iter().filter(|e| ids.contains(&e.id)).collect(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn records(&self) -> Vec<ConstructionRecord> {
        self.queue.iter().map(WaitingBuilding::to_record).collect()
    }
}

/// `remaining - elapsed`, saturating instead of overflowing.
fn advance(remaining: Duration, elapsed: Duration) -> Duration {
    match remaining.checked_sub(&elapsed) {
        Some(left) => left,
        None if elapsed > Duration::zero() => Duration::zero(),
        None => remaining,
    }
}
