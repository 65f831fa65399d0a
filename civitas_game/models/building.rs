use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use chrono::Duration;

use civitas_core::GameError;
use civitas_types::{
    buildings::{BuildingPosition, BuildingType, Level, Staff},
    common::{CityId, ResourceGroup},
};

use super::{bonus::BonusResources, building_data::BuildingData};

/// A building standing in one slot of a city.
///
/// `city`, `data` and `position` never change once created. `level` and
/// `staff` are validated against the type's data on every change. `old_staff`
/// keeps the last *confirmed* staff: while an allocation is pending, bonuses
/// are computed from it rather than from the provisional `staff`.
///
/// Equality and hashing only look at city, position and type, so the same
/// slot at two different levels is the same building.
#[derive(Debug, Clone)]
pub struct Building {
    city: CityId,
    data: Arc<BuildingData>,
    position: BuildingPosition,
    level: Level,
    staff: Staff,
    old_staff: Staff,
}

impl Building {
    pub fn new(
        city: CityId,
        data: Arc<BuildingData>,
        position: BuildingPosition,
        level: Level,
        staff: Staff,
    ) -> Result<Self, GameError> {
        let mut building = Self {
            city,
            data,
            position,
            level: Level::ZERO,
            staff: Staff::ZERO,
            old_staff: Staff::ZERO,
        };
        building.set_level(level)?;
        building.set_staff(staff)?;
        building.set_old_staff();
        Ok(building)
    }

    /// Returns this slot one level higher, staff carried over.
    pub fn upgraded(&self) -> Result<Self, GameError> {
        if self.is_max_level() {
            return Err(GameError::BuildingMaxLevelReached);
        }
        Building::new(
            self.city,
            self.data.clone(),
            self.position,
            self.level.next(),
            self.staff,
        )
    }

    pub fn set_level(&mut self, level: Level) -> Result<(), GameError> {
        if level > self.data.max_level() {
            return Err(GameError::InvalidBuildingLevel {
                building: self.data.building_type().name.to_string(),
                level,
                max_level: self.data.max_level(),
            });
        }
        self.level = level;
        Ok(())
    }

    pub fn set_staff(&mut self, staff: Staff) -> Result<(), GameError> {
        self.validate_staff(staff)?;
        self.staff = staff;
        Ok(())
    }

    /// Checks `staff` against the capacity of the current level.
    pub fn validate_staff(&self, staff: Staff) -> Result<(), GameError> {
        let max = self.max_population(self.level)?;
        if staff > max {
            return Err(GameError::InvalidStaff {
                building: self.data.building_type().name.to_string(),
                staff,
                max,
            });
        }
        Ok(())
    }

    /// Confirms the current staff.
    pub fn set_old_staff(&mut self) {
        self.old_staff = self.staff;
    }

    /// Takes over the staff of the building it replaces in the same slot,
    /// capped at this level's capacity.
    pub fn carry_staff_from(&mut self, previous: &Building) {
        let max = self.max_population(self.level).unwrap_or(Staff::ZERO);
        self.staff = previous.staff.min(max);
        self.old_staff = previous.old_staff.min(max);
    }

    pub fn city(&self) -> CityId {
        self.city
    }

    pub fn data(&self) -> &Arc<BuildingData> {
        &self.data
    }

    pub fn building_type(&self) -> &BuildingType {
        self.data.building_type()
    }

    pub fn position(&self) -> BuildingPosition {
        self.position
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn staff(&self) -> Staff {
        self.staff
    }

    pub fn old_staff(&self) -> Staff {
        self.old_staff
    }

    /// A building exists once it reached level 1.
    pub fn exists(&self) -> bool {
        !self.level.is_zero()
    }

    pub fn is_max_level(&self) -> bool {
        self.level == self.data.max_level()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_builder(&self) -> bool {
        self.data.is_builder()
    }

    pub fn time_to_build(&self, level: Level) -> Result<Duration, GameError> {
        self.data.time_to_build_for(level)
    }

    pub fn max_population(&self, level: Level) -> Result<Staff, GameError> {
        self.data.max_population(level)
    }

    pub fn level_bonus(&self) -> BonusResources {
        self.data.level_bonus(self.level)
    }

    pub fn staff_bonus(&self) -> BonusResources {
        self.data.staff_bonus(self.old_staff)
    }

    pub fn next_level_price(&self) -> Result<ResourceGroup, GameError> {
        if self.is_max_level() {
            return Err(GameError::BuildingMaxLevelReached);
        }
        self.data.price_for(self.level.next())
    }

    pub fn next_level_time_to_build(&self) -> Result<Duration, GameError> {
        if self.is_max_level() {
            return Err(GameError::BuildingMaxLevelReached);
        }
        self.data.time_to_build_for(self.level.next())
    }
}

impl PartialEq for Building {
    fn eq(&self, other: &Self) -> bool {
        self.city == other.city
            && self.position == other.position
            && self.building_type() == other.building_type()
    }
}

impl Eq for Building {}

impl Hash for Building {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.city.hash(state);
        self.position.hash(state);
        self.building_type().hash(state);
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Building: {}, level: {}, city: {}, position: {}",
            self.building_type(),
            self.level,
            self.city,
            self.position
        )
    }
}
