use std::sync::Arc;

use chrono::Duration;

use civitas_core::GameError;
use civitas_types::{
    buildings::{BuildingType, Instance, Level, Staff},
    common::ResourceGroup,
};

use super::bonus::{BonusFactory, BonusResources};

/// Price, build time and capacity of a building type at one level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelData {
    pub price: ResourceGroup,
    pub time_to_build: Duration,
    pub max_population: Staff,
}

impl LevelData {
    pub fn new(price: ResourceGroup, time_to_build: Duration, max_population: Staff) -> Self {
        Self {
            price,
            time_to_build,
            max_population,
        }
    }
}

/// Static description of a building type: one [`LevelData`] row per level
/// (row 0 is level 1) plus the bonus rules and a few flags.
#[derive(Debug, Clone)]
pub struct BuildingData {
    building_type: BuildingType,
    levels: Vec<LevelData>,
    bonus: Arc<dyn BonusFactory>,
    max_instances: Instance,
    required_level: Level,
    empty: bool,
    builder: bool,
    buildable: bool,
}

impl BuildingData {
    pub fn new(
        building_type: BuildingType,
        levels: Vec<LevelData>,
        bonus: Arc<dyn BonusFactory>,
    ) -> Result<Self, GameError> {
        if levels.is_empty() {
            return Err(GameError::EmptyLevelTable(building_type.name.to_string()));
        }

        Ok(Self {
            building_type,
            levels,
            bonus,
            max_instances: Instance::NO_LIMIT,
            required_level: Level::ZERO,
            empty: false,
            builder: false,
            buildable: true,
        })
    }

    /// Marks the type as an empty-slot placeholder. Placeholders can't be built.
    pub fn empty(mut self) -> Self {
        self.empty = true;
        self.buildable = false;
        self
    }

    /// Marks the type as able to produce entities.
    pub fn builder(mut self) -> Self {
        self.builder = true;
        self
    }

    pub fn buildable(mut self, buildable: bool) -> Self {
        self.buildable = buildable;
        self
    }

    pub fn with_max_instances(mut self, instances: Instance) -> Self {
        self.max_instances = instances;
        self
    }

    pub fn with_required_level(mut self, level: Level) -> Self {
        self.required_level = level;
        self
    }

    /// Returns the row matching `level`.
    ///
    /// Empty placeholder types always answer with the level 1 row, whatever
    /// the level asked for.
    pub fn for_level(&self, level: Level) -> Result<&LevelData, GameError> {
        if self.empty {
            return Ok(&self.levels[0]);
        }
        if level.is_zero() || level > self.max_level() {
            return Err(GameError::LevelOutOfRange {
                level,
                max_level: self.max_level(),
            });
        }
        Ok(&self.levels[level.value() as usize - 1])
    }

    pub fn building_type(&self) -> &BuildingType {
        &self.building_type
    }

    pub fn price(&self) -> ResourceGroup {
        self.levels[0].price
    }

    pub fn price_for(&self, level: Level) -> Result<ResourceGroup, GameError> {
        Ok(self.for_level(level)?.price)
    }

    pub fn time_to_build(&self) -> Duration {
        self.levels[0].time_to_build
    }

    pub fn time_to_build_for(&self, level: Level) -> Result<Duration, GameError> {
        Ok(self.for_level(level)?.time_to_build)
    }

    /// Staff capacity at `level`. An unbuilt (level 0) building holds nobody.
    pub fn max_population(&self, level: Level) -> Result<Staff, GameError> {
        if level.is_zero() && !self.empty {
            return Ok(Staff::ZERO);
        }
        Ok(self.for_level(level)?.max_population)
    }

    pub fn max_level(&self) -> Level {
        Level(self.levels.len().min(u8::MAX as usize) as u8)
    }

    pub fn level_bonus(&self, level: Level) -> BonusResources {
        self.bonus.level_bonus(level)
    }

    pub fn staff_bonus(&self, staff: Staff) -> BonusResources {
        self.bonus.staff_bonus(staff)
    }

    pub fn has_ratio_bonus(&self) -> bool {
        self.bonus.has_ratio_bonus()
    }

    pub fn max_instances(&self) -> Instance {
        self.max_instances
    }

    pub fn required_level(&self) -> Level {
        self.required_level
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn is_builder(&self) -> bool {
        self.builder
    }

    pub fn is_buildable(&self) -> bool {
        self.buildable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bonus::NoBonus;

    fn levels(count: u8) -> Vec<LevelData> {
        (1..=count)
            .map(|l| {
                LevelData::new(
                    ResourceGroup::new(l as u32 * 10, 0, 0),
                    Duration::seconds(l as i64 * 10),
                    Staff(l as u32 * 5),
                )
            })
            .collect()
    }

    fn farm(count: u8) -> BuildingData {
        BuildingData::new(BuildingType::new(7, "farm"), levels(count), Arc::new(NoBonus)).unwrap()
    }

    #[test]
    fn test_for_level_indexes_from_one() {
        let data = farm(5);
        assert_eq!(data.max_level(), Level(5));
        assert_eq!(data.price_for(Level(1)), Ok(ResourceGroup::new(10, 0, 0)));
        assert_eq!(data.price_for(Level(5)), Ok(ResourceGroup::new(50, 0, 0)));
        assert_eq!(data.time_to_build_for(Level(3)), Ok(Duration::seconds(30)));
        assert_eq!(data.max_population(Level(2)), Ok(Staff(10)));
        assert_eq!(data.price(), ResourceGroup::new(10, 0, 0));
        assert_eq!(data.time_to_build(), Duration::seconds(10));
    }

    #[test]
    fn test_for_level_out_of_range() {
        let data = farm(5);
        assert_eq!(
            data.for_level(Level(6)),
            Err(GameError::LevelOutOfRange {
                level: Level(6),
                max_level: Level(5)
            })
        );
        assert!(data.for_level(Level::ZERO).is_err());
    }

    #[test]
    fn test_unbuilt_level_has_no_capacity() {
        assert_eq!(farm(5).max_population(Level::ZERO), Ok(Staff::ZERO));
    }

    #[test]
    fn test_empty_type_always_answers_level_one() {
        let data = farm(3).empty();
        assert!(data.is_empty());
        assert!(!data.is_buildable());
        for level in 0..=10 {
            assert_eq!(
                data.price_for(Level(level)),
                Ok(ResourceGroup::new(10, 0, 0)),
                "level {level}"
            );
        }
        assert_eq!(data.max_population(Level::ZERO), Ok(Staff(5)));
    }

    #[test]
    fn test_empty_level_table_is_rejected() {
        let result = BuildingData::new(BuildingType::new(7, "farm"), vec![], Arc::new(NoBonus));
        assert!(matches!(result, Err(GameError::EmptyLevelTable(name)) if name == "farm"));
    }

    #[test]
    fn test_flags() {
        let data = farm(1)
            .builder()
            .buildable(false)
            .with_max_instances(Instance::UNIQUE)
            .with_required_level(Level(2));

        assert!(data.is_builder());
        assert!(!data.is_buildable());
        assert_eq!(data.max_instances(), Instance::UNIQUE);
        assert_eq!(data.required_level(), Level(2));
        assert!(!data.has_ratio_bonus());
    }
}
