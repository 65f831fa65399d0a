use std::fmt;

use chrono::Duration;

use civitas_core::{GameError, MappingError};
use civitas_game::models::{building::Building, building_type::BuildingTypeRegistry, city::City};
use civitas_types::{
    buildings::{BuildingPosition, BuildingType, Level, Staff},
    common::CityId,
};

use super::mapper::{
    VAR_SEPARATOR, decode_building_type, decode_city_id, decode_level, decode_millis,
    decode_position, decode_staff, encode_building_type, encode_city_id, encode_level,
    encode_millis, encode_position, encode_staff, split_tokens,
};

/// A queued construction as sent over the wire:
/// `city_type_level_position_staff_remainingMillis`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionRecord {
    pub city: CityId,
    pub building_type: BuildingType,
    pub level: Level,
    pub position: BuildingPosition,
    pub staff: Staff,
    pub remaining: Duration,
}

impl ConstructionRecord {
    pub fn from_building(building: &Building, remaining: Duration) -> Self {
        Self {
            city: building.city(),
            building_type: building.building_type().clone(),
            level: building.level(),
            position: building.position(),
            staff: building.staff(),
            remaining,
        }
    }

    /// Rebuilds the queued building against the catalog of `city`.
    pub fn to_building(&self, city: &City) -> Result<Building, GameError> {
        if city.id() != self.city {
            return Err(GameError::CityMismatch {
                city: city.id(),
                building_city: self.city,
            });
        }
        let data = city
            .by_type(&self.building_type)
            .ok_or_else(|| GameError::BuildingDataNotFound(self.building_type.name.to_string()))?;

        Building::new(
            self.city,
            data.clone(),
            self.position,
            self.level,
            self.staff,
        )
    }

    pub fn encode(&self) -> String {
        [
            encode_city_id(self.city),
            encode_building_type(&self.building_type),
            encode_level(self.level),
            encode_position(self.position),
            encode_staff(self.staff),
            encode_millis(self.remaining),
        ]
        .join(&VAR_SEPARATOR.to_string())
    }

    pub fn decode(s: &str, types: &BuildingTypeRegistry) -> Result<Self, MappingError> {
        let tokens = split_tokens(s, VAR_SEPARATOR, 6)?;

        Ok(Self {
            city: decode_city_id(tokens[0])?,
            building_type: decode_building_type(tokens[1], types)?,
            level: decode_level(tokens[2])?,
            position: decode_position(tokens[3])?,
            staff: decode_staff(tokens[4])?,
            remaining: decode_millis(tokens[5])?,
        })
    }
}

impl fmt::Display for ConstructionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civitas_game::test_utils::{CityFactoryOptions, city_factory};

    fn registry() -> BuildingTypeRegistry {
        let mut types = BuildingTypeRegistry::new();
        types.register(7, "farm").unwrap();
        types.register(8, "mine").unwrap();
        types
    }

    fn record() -> ConstructionRecord {
        ConstructionRecord {
            city: CityId(3),
            building_type: BuildingType::new(7, "farm"),
            level: Level(2),
            position: BuildingPosition(1),
            staff: Staff(4),
            remaining: Duration::milliseconds(6000),
        }
    }

    #[test]
    fn test_encode() {
        assert_eq!(record().encode(), "3_7_2_1_4_6000");
        assert_eq!(record().to_string(), "3_7_2_1_4_6000");
    }

    #[test]
    fn test_decode_by_id_and_by_name() {
        let types = registry();
        assert_eq!(ConstructionRecord::decode("3_7_2_1_4_6000", &types), Ok(record()));
        assert_eq!(ConstructionRecord::decode("3_farm_2_1_4_6000", &types), Ok(record()));
    }

    #[test]
    fn test_decode_failures() {
        let types = registry();
        assert_eq!(
            ConstructionRecord::decode("3_7_2_1_4", &types),
            Err(MappingError::TokenCount {
                expected: 6,
                actual: 5
            })
        );
        assert!(matches!(
            ConstructionRecord::decode("3_7_two_1_4_6000", &types),
            Err(MappingError::InvalidToken { field: "level", .. })
        ));
        assert!(matches!(
            ConstructionRecord::decode("3_7_2_1_-4_6000", &types),
            Err(MappingError::InvalidToken { field: "staff", .. })
        ));
        assert_eq!(
            ConstructionRecord::decode("3_barracks_2_1_4_6000", &types),
            Err(MappingError::UnknownBuildingType("barracks".to_string()))
        );
    }

    #[test]
    fn test_building_conversions() {
        let city = city_factory(CityFactoryOptions {
            id: Some(CityId(3)),
            ..Default::default()
        });
        let building = record().to_building(&city).unwrap();
        assert_eq!(building.level(), Level(2));
        assert_eq!(building.staff(), Staff(4));

        let back = ConstructionRecord::from_building(&building, Duration::milliseconds(6000));
        assert_eq!(back, record());
    }

    #[test]
    fn test_to_building_checks_city_and_catalog() {
        let other = city_factory(CityFactoryOptions {
            id: Some(CityId(4)),
            ..Default::default()
        });
        assert!(matches!(
            record().to_building(&other),
            Err(GameError::CityMismatch { .. })
        ));

        let city = city_factory(CityFactoryOptions {
            id: Some(CityId(3)),
            ..Default::default()
        });
        let unknown = ConstructionRecord {
            building_type: BuildingType::new(30, "barracks"),
            ..record()
        };
        assert_eq!(
            unknown.to_building(&city).err(),
            Some(GameError::BuildingDataNotFound("barracks".to_string()))
        );
    }
}
