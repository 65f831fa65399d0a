use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub u32);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Metal,
    Energy,
    Food,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Metal, ResourceKind::Energy, ResourceKind::Food];
}

/// Whole amounts of each resource, used for prices.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup(pub u32, pub u32, pub u32);

impl ResourceGroup {
    pub const fn new(metal: u32, energy: u32, food: u32) -> Self {
        Self(metal, energy, food)
    }
}

/// Signed per-resource quantities: balances, hourly rates and bonus values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceRates {
    pub metal: f64,
    pub energy: f64,
    pub food: f64,
}

impl ResourceRates {
    pub const ZERO: ResourceRates = ResourceRates::new(0.0, 0.0, 0.0);

    pub const fn new(metal: f64, energy: f64, food: f64) -> Self {
        Self {
            metal,
            energy,
            food,
        }
    }

    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Metal => self.metal,
            ResourceKind::Energy => self.energy,
            ResourceKind::Food => self.food,
        }
    }

    /// Applies `f` to each resource, building a new value.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.metal), f(self.energy), f(self.food))
    }

    /// Combines two values resource by resource.
    pub fn zip(&self, other: &ResourceRates, f: impl Fn(f64, f64) -> f64) -> Self {
        Self::new(
            f(self.metal, other.metal),
            f(self.energy, other.energy),
            f(self.food, other.food),
        )
    }

    pub fn any_negative(&self) -> bool {
        ResourceKind::ALL.iter().any(|kind| self.get(*kind) < 0.0)
    }
}

impl core::ops::Add for ResourceRates {
    type Output = ResourceRates;

    fn add(self, rhs: ResourceRates) -> Self::Output {
        self.zip(&rhs, |a, b| a + b)
    }
}

impl core::ops::AddAssign for ResourceRates {
    fn add_assign(&mut self, rhs: ResourceRates) {
        *self = *self + rhs;
    }
}

impl core::ops::Mul<f64> for ResourceRates {
    type Output = ResourceRates;

    fn mul(self, rhs: f64) -> Self::Output {
        self.map(|v| v * rhs)
    }
}
