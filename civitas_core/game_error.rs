use thiserror::Error;

use civitas_types::{
    buildings::{BuildingPosition, Level, Staff},
    common::CityId,
};

/// Errors for domain logic (game rules). All of them are precondition
/// violations: the caller asked for something the model forbids.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Building type id {0} already registered")]
    DuplicateBuildingType(u32),

    #[error("Building type name {0:?} already registered")]
    DuplicateBuildingTypeName(String),

    #[error("Building type {0} not registered")]
    BuildingTypeNotFound(u32),

    #[error("Building type {0:?} not registered")]
    BuildingTypeNameNotFound(String),

    #[error("No building data for type {0:?}")]
    BuildingDataNotFound(String),

    #[error("Building data for {0:?} needs at least one level")]
    EmptyLevelTable(String),

    #[error("Level {level} out of range 1..={max_level}")]
    LevelOutOfRange { level: Level, max_level: Level },

    #[error("{level} is an invalid level for {building} (max {max_level})")]
    InvalidBuildingLevel {
        building: String,
        level: Level,
        max_level: Level,
    },

    #[error("Staff {staff} exceeds max population {max} for {building}")]
    InvalidStaff {
        building: String,
        staff: Staff,
        max: Staff,
    },

    #[error("Building has already reached max level")]
    BuildingMaxLevelReached,

    #[error("City {0} already exists")]
    DuplicateCity(CityId),

    #[error("City {0} not found")]
    CityNotFound(CityId),

    #[error("Slot {position} out of range, city has {max} slots")]
    InvalidPosition {
        position: BuildingPosition,
        max: usize,
    },

    #[error("No buildings found on {position}")]
    EmptySlot { position: BuildingPosition },

    #[error("Building of city {building_city} can't be installed in city {city}")]
    CityMismatch { city: CityId, building_city: CityId },
}
