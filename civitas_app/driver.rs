use std::{future::Future, time::Duration as StdDuration};

use chrono::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{error, info};

use civitas_core::Result;
use civitas_game::models::{building::Building, city_registry::CityRegistry};
use civitas_types::{
    buildings::{BuildingPosition, Staff},
    common::CityId,
};

use crate::scheduler::{ConstructionScheduler, StaffAllocationScheduler};

/// Drives both schedulers from a single thread, one frame at a time.
pub struct GameLoop {
    cities: CityRegistry,
    construction: ConstructionScheduler,
    staff: StaffAllocationScheduler,
}

impl GameLoop {
    pub fn new(
        cities: CityRegistry,
        construction: ConstructionScheduler,
        staff: StaffAllocationScheduler,
    ) -> Self {
        Self {
            cities,
            construction,
            staff,
        }
    }

    pub fn cities(&self) -> &CityRegistry {
        &self.cities
    }

    pub fn cities_mut(&mut self) -> &mut CityRegistry {
        &mut self.cities
    }

    pub fn construction(&self) -> &ConstructionScheduler {
        &self.construction
    }

    pub fn construction_mut(&mut self) -> &mut ConstructionScheduler {
        &mut self.construction
    }

    pub fn staff(&self) -> &StaffAllocationScheduler {
        &self.staff
    }

    pub fn staff_mut(&mut self) -> &mut StaffAllocationScheduler {
        &mut self.staff
    }

    pub fn build(&mut self, building: Building, delay: Duration) -> Result<()> {
        self.construction.add(&mut self.cities, building, delay)
    }

    pub fn allocate(
        &mut self,
        city: CityId,
        position: BuildingPosition,
        staff: Staff,
        duration: Duration,
    ) -> Result<()> {
        self.staff
            .allocate(&mut self.cities, city, position, staff, duration)
    }

    /// One frame: constructions first, then staff, then production. Every
    /// step runs even when an earlier one failed; the first error is returned.
    pub fn tick(&mut self, elapsed: Duration) -> Result<()> {
        let construction = self.construction.tick(&mut self.cities, elapsed);
        let staff = self.staff.tick(&mut self.cities, elapsed);
        self.produce(elapsed);
        construction.and(staff)
    }

    /// Credits every initialized city with what it produced over `elapsed`.
    fn produce(&mut self, elapsed: Duration) {
        for city in self.cities.cities_mut() {
            let delta = city.producer().production_deltas(elapsed);
            city.producer_mut().store(delta);
        }
    }

    /// Ticks every `frame` with the measured elapsed time until `shutdown`
    /// resolves. A failing tick is logged and the loop goes on.
    pub async fn run<F>(&mut self, frame: StdDuration, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut interval = time::interval(frame);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(frame_ms = frame.as_millis() as u64, "Game loop started");
        let mut last = Instant::now();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Game loop stopped");
                    return Ok(());
                }
                _ = interval.tick() => {
                    let now = Instant::now();
                    let elapsed = Duration::from_std(now - last).unwrap_or(Duration::zero());
                    last = now;

                    if let Err(e) = self.tick(elapsed) {
                        error!(error = %e, "Error while ticking the game loop");
                    }
                }
            }
        }
    }
}
