use chrono::Duration;
use tracing::{debug, info};

use civitas_app::scheduler::{ConstructionListener, StaffAllocationListener};
use civitas_game::models::{building::Building, city::City};
use civitas_types::buildings::Staff;

/// Reports scheduler events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogListener;

impl ConstructionListener for LogListener {
    fn building_complete(&self, city: &City, building: &Building) {
        let production = city.producer().production();
        info!(
            city = %city.id(),
            building = %building,
            metal = production.effective.metal,
            energy = production.effective.energy,
            food = production.effective.food,
            "Building complete"
        );
    }

    fn building_in_construction(&self, city: &City, building: &Building, remaining: Duration) {
        debug!(
            city = %city.id(),
            position = %building.position(),
            remaining_ms = remaining.num_milliseconds(),
            "Building in construction"
        );
    }
}

impl StaffAllocationListener for LogListener {
    fn update_time(&self, city: &City, building: &Building, remaining: Duration) {
        debug!(
            city = %city.id(),
            position = %building.position(),
            remaining_ms = remaining.num_milliseconds(),
            "Staff allocation pending"
        );
    }

    fn staff_allocated(&self, city: &City, building: &Building, staff: Staff) {
        info!(
            city = %city.id(),
            position = %building.position(),
            staff = %staff,
            allocated = city.allocated_staff(),
            "Staff allocated"
        );
    }
}
