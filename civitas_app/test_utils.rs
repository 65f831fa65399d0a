#[cfg(any(test, feature = "test-utils"))]
#[cfg(not(tarpaulin_include))]
pub mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use civitas_core::{ApplicationError, Result};
    use civitas_game::models::{building::Building, city::City};
    use civitas_types::{
        buildings::{BuildingPosition, Level, Staff},
        common::CityId,
    };

    use crate::{
        clock::Clock,
        scheduler::{BuildingFactory, ConstructionListener, StaffAllocationListener},
    };

    /// Wall clock that only moves when told to.
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(start),
            }
        }

        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now = *now + by;
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    /// Counts materializations and installs the building unchanged, after
    /// failing the first `failures` calls.
    #[derive(Default)]
    pub struct RecordingBuildingFactory {
        created: AtomicUsize,
        failures: usize,
    }

    impl RecordingBuildingFactory {
        pub fn failing(failures: usize) -> Self {
            Self {
                created: AtomicUsize::new(0),
                failures,
            }
        }

        /// Calls received, failed ones included.
        pub fn created(&self) -> usize {
            self.created.load(Ordering::SeqCst)
        }
    }

    impl BuildingFactory for RecordingBuildingFactory {
        fn create_building(&self, building: &Building) -> Result<Building> {
            let call = self.created.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(ApplicationError::Unknown(format!("cannot create {building}")));
            }
            Ok(building.clone())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ConstructionEvent {
        Complete {
            city: CityId,
            position: BuildingPosition,
            level: Level,
        },
        Progress {
            city: CityId,
            position: BuildingPosition,
            remaining: Duration,
        },
    }

    #[derive(Default, Clone)]
    pub struct RecordingConstructionListener {
        events: Arc<Mutex<Vec<ConstructionEvent>>>,
    }

    impl RecordingConstructionListener {
        pub fn events(&self) -> Vec<ConstructionEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn completed(&self) -> usize {
            self.events()
                .iter()
                .filter(|e| matches!(e, ConstructionEvent::Complete { .. }))
                .count()
        }

        pub fn progressed(&self) -> usize {
            self.events()
                .iter()
                .filter(|e| matches!(e, ConstructionEvent::Progress { .. }))
                .count()
        }
    }

    impl ConstructionListener for RecordingConstructionListener {
        fn building_complete(&self, city: &City, building: &Building) {
            self.events.lock().unwrap().push(ConstructionEvent::Complete {
                city: city.id(),
                position: building.position(),
                level: building.level(),
            });
        }

        fn building_in_construction(&self, city: &City, building: &Building, remaining: Duration) {
            self.events.lock().unwrap().push(ConstructionEvent::Progress {
                city: city.id(),
                position: building.position(),
                remaining,
            });
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AllocationEvent {
        Allocated {
            city: CityId,
            position: BuildingPosition,
            staff: Staff,
        },
        UpdateTime {
            city: CityId,
            position: BuildingPosition,
            remaining: Duration,
        },
    }

    #[derive(Default, Clone)]
    pub struct RecordingAllocationListener {
        events: Arc<Mutex<Vec<AllocationEvent>>>,
    }

    impl RecordingAllocationListener {
        pub fn events(&self) -> Vec<AllocationEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn allocated(&self) -> usize {
            self.events()
                .iter()
                .filter(|e| matches!(e, AllocationEvent::Allocated { .. }))
                .count()
        }
    }

    impl StaffAllocationListener for RecordingAllocationListener {
        fn update_time(&self, city: &City, building: &Building, remaining: Duration) {
            self.events.lock().unwrap().push(AllocationEvent::UpdateTime {
                city: city.id(),
                position: building.position(),
                remaining,
            });
        }

        fn staff_allocated(&self, city: &City, building: &Building, staff: Staff) {
            self.events.lock().unwrap().push(AllocationEvent::Allocated {
                city: city.id(),
                position: building.position(),
                staff,
            });
        }
    }
}
