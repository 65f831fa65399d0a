use std::fmt;

use civitas_core::MappingError;
use civitas_game::models::building::Building;
use civitas_types::{
    buildings::{BuildingPosition, Staff},
    common::CityId,
};

use super::mapper::{
    OBJECTS_SEPARATOR, decode_city_id, decode_position, decode_staff, encode_city_id,
    encode_position, encode_staff, split_tokens,
};

/// A staff assignment as sent over the wire: `city@position@staff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationRecord {
    pub city: CityId,
    pub position: BuildingPosition,
    pub staff: Staff,
}

impl AllocationRecord {
    pub fn new(city: CityId, position: BuildingPosition, staff: Staff) -> Self {
        Self {
            city,
            position,
            staff,
        }
    }

    pub fn from_building(building: &Building) -> Self {
        Self::new(building.city(), building.position(), building.staff())
    }

    pub fn encode(&self) -> String {
        [
            encode_city_id(self.city),
            encode_position(self.position),
            encode_staff(self.staff),
        ]
        .join(&OBJECTS_SEPARATOR.to_string())
    }

    pub fn decode(s: &str) -> Result<Self, MappingError> {
        let tokens = split_tokens(s, OBJECTS_SEPARATOR, 3)?;

        Ok(Self {
            city: decode_city_id(tokens[0])?,
            position: decode_position(tokens[1])?,
            staff: decode_staff(tokens[2])?,
        })
    }
}

impl fmt::Display for AllocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civitas_game::test_utils::{BuildingFactoryOptions, building_factory};

    #[test]
    fn test_encode_decode() {
        let record = AllocationRecord::new(CityId(12), BuildingPosition(3), Staff(7));
        assert_eq!(record.encode(), "12@3@7");
        assert_eq!(AllocationRecord::decode("12@3@7"), Ok(record));
    }

    #[test]
    fn test_variable_separator_is_not_accepted() {
        assert_eq!(
            AllocationRecord::decode("12_3_7"),
            Err(MappingError::TokenCount {
                expected: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(matches!(
            AllocationRecord::decode("12@x@7"),
            Err(MappingError::InvalidToken { field: "position", .. })
        ));
        assert!(matches!(
            AllocationRecord::decode("12@3@-7"),
            Err(MappingError::InvalidToken { field: "staff", .. })
        ));
    }

    #[test]
    fn test_from_building() {
        let building = building_factory(BuildingFactoryOptions {
            city: Some(CityId(5)),
            position: Some(BuildingPosition(2)),
            staff: Some(Staff(3)),
            ..Default::default()
        });
        assert_eq!(
            AllocationRecord::from_building(&building),
            AllocationRecord::new(CityId(5), BuildingPosition(2), Staff(3))
        );
    }
}
