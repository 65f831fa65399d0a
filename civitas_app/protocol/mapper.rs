//! Scalar codecs used by the wire records. Every decoder is pure: it either
//! returns a value or a [`MappingError`] naming the offending token.

use std::str::FromStr;

use chrono::Duration;

use civitas_core::MappingError;
use civitas_game::models::building_type::BuildingTypeRegistry;
use civitas_types::{
    buildings::{BuildingPosition, BuildingType, Level, Staff},
    common::CityId,
};

/// Joins the fields of one record.
pub const VAR_SEPARATOR: char = '_';
/// Joins the fields of an allocation record.
pub const OBJECTS_SEPARATOR: char = '@';

/// Splits `s` on `separator`, requiring exactly `expected` tokens.
pub fn split_tokens(s: &str, separator: char, expected: usize) -> Result<Vec<&str>, MappingError> {
    let tokens: Vec<&str> = s.split(separator).collect();
    if tokens.len() != expected {
        return Err(MappingError::TokenCount {
            expected,
            actual: tokens.len(),
        });
    }
    Ok(tokens)
}

fn parse<T: FromStr>(field: &'static str, token: &str) -> Result<T, MappingError> {
    token.parse::<T>().map_err(|_| MappingError::InvalidToken {
        field,
        token: token.to_string(),
    })
}

pub fn encode_city_id(id: CityId) -> String {
    id.0.to_string()
}

pub fn decode_city_id(token: &str) -> Result<CityId, MappingError> {
    parse("city", token).map(CityId)
}

pub fn encode_building_type(building_type: &BuildingType) -> String {
    building_type.id.to_string()
}

/// Accepts either a registered id or a registered name.
pub fn decode_building_type(
    token: &str,
    types: &BuildingTypeRegistry,
) -> Result<BuildingType, MappingError> {
    let found = match token.parse::<u32>() {
        Ok(id) => types.value_of(id),
        Err(_) => types.by_name(token),
    };
    found.map_err(|_| MappingError::UnknownBuildingType(token.to_string()))
}

pub fn encode_level(level: Level) -> String {
    level.0.to_string()
}

pub fn decode_level(token: &str) -> Result<Level, MappingError> {
    parse("level", token).map(Level)
}

pub fn encode_position(position: BuildingPosition) -> String {
    position.0.to_string()
}

pub fn decode_position(token: &str) -> Result<BuildingPosition, MappingError> {
    parse("position", token).map(BuildingPosition)
}

pub fn encode_staff(staff: Staff) -> String {
    staff.0.to_string()
}

pub fn decode_staff(token: &str) -> Result<Staff, MappingError> {
    parse("staff", token).map(Staff)
}

pub fn encode_millis(duration: Duration) -> String {
    duration.num_milliseconds().to_string()
}

pub fn decode_millis(token: &str) -> Result<Duration, MappingError> {
    parse::<i64>("time", token).and_then(|ms| {
        Duration::try_milliseconds(ms).ok_or(MappingError::InvalidToken {
            field: "time",
            token: token.to_string(),
        })
    })
}
