use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use civitas_types::{
    buildings::{Level, Staff},
    common::ResourceRates,
};

/// Production effect of a building.
///
/// `Flat` values are hourly amounts: positive components are inflow, negative
/// ones upkeep. `Ratio` values multiply the city's gross inflow (0.1 = +10%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BonusResources {
    Flat(ResourceRates),
    Ratio(ResourceRates),
}

impl BonusResources {
    pub fn none() -> Self {
        BonusResources::Flat(ResourceRates::ZERO)
    }
}

/// Computes the bonuses of a building type from its level and staff.
pub trait BonusFactory: Debug + Send + Sync {
    fn level_bonus(&self, level: Level) -> BonusResources;
    fn staff_bonus(&self, staff: Staff) -> BonusResources;
    fn has_ratio_bonus(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoBonus;

impl BonusFactory for NoBonus {
    fn level_bonus(&self, _level: Level) -> BonusResources {
        BonusResources::none()
    }

    fn staff_bonus(&self, _staff: Staff) -> BonusResources {
        BonusResources::none()
    }

    fn has_ratio_bonus(&self) -> bool {
        false
    }
}

/// Linear flat production: `per_level * level` plus `per_staff * staff`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatBonus {
    pub per_level: ResourceRates,
    pub per_staff: ResourceRates,
}

impl BonusFactory for FlatBonus {
    fn level_bonus(&self, level: Level) -> BonusResources {
        BonusResources::Flat(self.per_level * level.value() as f64)
    }

    fn staff_bonus(&self, staff: Staff) -> BonusResources {
        BonusResources::Flat(self.per_staff * staff.value() as f64)
    }

    fn has_ratio_bonus(&self) -> bool {
        false
    }
}

/// Linear ratio bonus: `per_level * level` plus `per_staff * staff`, applied
/// as a multiplier on the city's gross inflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioBonus {
    pub per_level: ResourceRates,
    pub per_staff: ResourceRates,
}

impl BonusFactory for RatioBonus {
    fn level_bonus(&self, level: Level) -> BonusResources {
        BonusResources::Ratio(self.per_level * level.value() as f64)
    }

    fn staff_bonus(&self, staff: Staff) -> BonusResources {
        BonusResources::Ratio(self.per_staff * staff.value() as f64)
    }

    fn has_ratio_bonus(&self) -> bool {
        true
    }
}
