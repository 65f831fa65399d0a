use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use civitas_types::common::{CityId, ResourceRates};

use super::{bonus::BonusResources, building::Building};

/// Hourly production of a city, split the way bonuses are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Production {
    pub inflow: ResourceRates,
    pub upkeep: ResourceRates,
    pub ratio: ResourceRates,
    pub effective: ResourceRates,
}

impl Production {
    /// Sums the level and staff bonuses of every built building.
    pub fn from_buildings<'a>(buildings: impl IntoIterator<Item = &'a Building>) -> Self {
        let mut production = Production::default();

        for building in buildings.into_iter().filter(|b| b.exists()) {
            for bonus in [building.level_bonus(), building.staff_bonus()] {
                match bonus {
                    BonusResources::Flat(values) => {
                        production.inflow += values.map(|v| v.max(0.0));
                        production.upkeep += values.map(|v| (-v).max(0.0));
                    }
                    BonusResources::Ratio(values) => production.ratio += values,
                }
            }
        }

        production.calculate_effective_production();
        production
    }

    pub fn calculate_effective_production(&mut self) {
        self.effective = self
            .inflow
            .zip(&self.ratio, |inflow, ratio| inflow * (ratio + 1.0))
            .zip(&self.upkeep, |gross, upkeep| gross - upkeep);
    }
}

/// Resource production of one city.
///
/// The producer never advances time by itself: it stays inactive until
/// [`ResourceProducer::set_initialized`] is called, then exposes its rates so
/// that an external production step can credit balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceProducer {
    owner: CityId,
    created_at: DateTime<Utc>,
    initialized: bool,
    balance: ResourceRates,
    production: Production,
}

impl ResourceProducer {
    pub fn new(owner: CityId, created_at: DateTime<Utc>, initial: ResourceRates) -> Self {
        Self {
            owner,
            created_at,
            initialized: false,
            balance: initial,
            production: Production::default(),
        }
    }

    pub fn owner(&self) -> CityId {
        self.owner
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn set_initialized(&mut self) {
        self.initialized = true;
    }

    pub fn balance(&self) -> ResourceRates {
        self.balance
    }

    pub fn production(&self) -> &Production {
        &self.production
    }

    pub fn update_production(&mut self, production: Production) {
        self.production = production;
    }

    /// True when upkeep beats production for any resource.
    pub fn has_negative_ratio(&self) -> bool {
        self.production.effective.any_negative()
    }

    /// Amounts produced over `elapsed`, nothing while inactive.
    pub fn production_deltas(&self, elapsed: Duration) -> ResourceRates {
        if !self.initialized {
            return ResourceRates::ZERO;
        }
        let hours = elapsed.num_milliseconds() as f64 / 3_600_000.0;
        self.production.effective * hours
    }

    pub fn store(&mut self, delta: ResourceRates) {
        self.balance += delta;
    }
}
