use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Id reserved for the "no building" sentinel type.
pub const WORLD_TYPE_ID: u32 = 0;
pub const WORLD_TYPE_NAME: &str = "world";

/// A registered category of building.
///
/// Values are handed out by the building type registry, which guarantees that
/// both `id` and `name` are unique. Two types are equal only if they share both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildingType {
    pub id: u32,
    pub name: Arc<str>,
}

impl BuildingType {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: Arc::from(name),
        }
    }

    /// The "no building" sentinel.
    pub fn world() -> Self {
        Self::new(WORLD_TYPE_ID, WORLD_TYPE_NAME)
    }

    pub fn is_world(&self) -> bool {
        self.id == WORLD_TYPE_ID
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Progression tier of a building, 0 meaning "not built".
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Level(pub u8);

impl Level {
    pub const ZERO: Level = Level(0);
    pub const ONE: Level = Level(1);
    pub const MAX: Level = Level(u8::MAX);

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the next level, saturating at `u8::MAX`.
    pub fn next(&self) -> Level {
        Level(self.0.saturating_add(1))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of workers assigned to a building.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Staff(pub u32);

impl Staff {
    pub const ZERO: Staff = Staff(0);

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Staff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed slot index inside a city.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BuildingPosition(pub u8);

impl BuildingPosition {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BuildingPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many buildings of one type a city may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instance(u32);

impl Instance {
    pub const UNIQUE: Instance = Instance(1);
    pub const NO_LIMIT: Instance = Instance(u32::MAX);

    /// Returns `None` for 0, a type must allow at least one instance.
    pub fn new(number: u32) -> Option<Self> {
        (number > 0).then_some(Self(number))
    }

    pub fn number(&self) -> u32 {
        self.0
    }
}
