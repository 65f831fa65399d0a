use std::{fs, path::Path, sync::Arc};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;

use civitas_core::{AppError, Result};
use civitas_game::models::{
    bonus::{BonusFactory, FlatBonus, NoBonus, RatioBonus},
    building_data::{BuildingData, LevelData},
    building_type::BuildingTypeRegistry,
    catalog::Catalog,
    city::BuildingCatalog,
};
use civitas_types::{
    buildings::{BuildingPosition, Instance, Level, Staff},
    common::{ResourceGroup, ResourceRates},
    map::Point3D,
};

const DEFAULT_CATALOG: &str = include_str!("assets/default_catalog.json");

/// Building types, their level tables and the city slot layout, as loaded
/// at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDefinition {
    /// Name of the placeholder filling a slot with no override.
    pub empty_type: String,
    /// Offset of every slot from the city position.
    pub slots: Vec<Point3D>,
    #[serde(default)]
    pub slot_defaults: Vec<SlotDefinition>,
    pub buildings: Vec<BuildingDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDefinition {
    pub position: BuildingPosition,
    pub building_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingDefinition {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub empty: bool,
    #[serde(default)]
    pub builder: bool,
    pub buildable: Option<bool>,
    pub max_instances: Option<u32>,
    #[serde(default)]
    pub required_level: Level,
    #[serde(default)]
    pub bonus: BonusDefinition,
    pub levels: Vec<LevelDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BonusDefinition {
    #[default]
    None,
    Flat {
        per_level: ResourceRates,
        per_staff: ResourceRates,
    },
    Ratio {
        per_level: ResourceRates,
        per_staff: ResourceRates,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub price: ResourceGroup,
    pub time_to_build_ms: i64,
    pub max_population: Staff,
}

impl BonusDefinition {
    fn to_factory(&self) -> Arc<dyn BonusFactory> {
        match *self {
            BonusDefinition::None => Arc::new(NoBonus),
            BonusDefinition::Flat {
                per_level,
                per_staff,
            } => Arc::new(FlatBonus {
                per_level,
                per_staff,
            }),
            BonusDefinition::Ratio {
                per_level,
                per_staff,
            } => Arc::new(RatioBonus {
                per_level,
                per_staff,
            }),
        }
    }
}

impl LevelDefinition {
    fn to_level_data(&self, building: &str) -> Result<LevelData> {
        let time_to_build = Duration::try_milliseconds(self.time_to_build_ms)
            .filter(|d| *d >= Duration::zero())
            .ok_or_else(|| {
                AppError::InvalidCatalog(format!(
                    "{building}: invalid build time {}ms",
                    self.time_to_build_ms
                ))
            })?;

        Ok(LevelData::new(
            self.price,
            time_to_build,
            self.max_population,
        ))
    }
}

impl BuildingDefinition {
    fn to_building_data(&self, types: &mut BuildingTypeRegistry) -> Result<BuildingData> {
        if self.levels.len() > Level::MAX.0 as usize {
            return Err(AppError::InvalidCatalog(format!(
                "{}: {} levels, at most {} allowed",
                self.name,
                self.levels.len(),
                Level::MAX
            ))
            .into());
        }
        let building_type = types.register(self.id, &self.name)?;
        let levels = self
            .levels
            .iter()
            .map(|level| level.to_level_data(&self.name))
            .collect::<Result<Vec<_>>>()?;

        let mut data = BuildingData::new(building_type, levels, self.bonus.to_factory())?
            .with_required_level(self.required_level);
        if self.empty {
            data = data.empty();
        }
        if self.builder {
            data = data.builder();
        }
        if let Some(buildable) = self.buildable {
            data = data.buildable(buildable);
        }
        if let Some(number) = self.max_instances {
            let instances = Instance::new(number).ok_or_else(|| {
                AppError::InvalidCatalog(format!("{}: max_instances must be > 0", self.name))
            })?;
            data = data.with_max_instances(instances);
        }
        Ok(data)
    }
}

impl CatalogDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(DEFAULT_CATALOG)
    }

    /// Registers every building type in `types`, then builds the catalog.
    /// `types` is left untouched when the definition is invalid.
    pub fn build(&self, types: &mut BuildingTypeRegistry) -> Result<Catalog> {
        let mut staged = types.clone();
        let catalog = self.build_into(&mut staged)?;
        *types = staged;
        Ok(catalog)
    }

    fn build_into(&self, types: &mut BuildingTypeRegistry) -> Result<Catalog> {
        if self.slots.is_empty() || self.slots.len() > u8::MAX as usize + 1 {
            return Err(AppError::InvalidCatalog(format!(
                "a city needs between 1 and 256 slots, got {}",
                self.slots.len()
            ))
            .into());
        }

        let mut datas = BuildingCatalog::new();
        for building in &self.buildings {
            let data = building.to_building_data(types)?;
            datas.insert(data.building_type().clone(), Arc::new(data));
        }

        let empty_type = types.by_name(&self.empty_type)?;
        let mut catalog = Catalog::new(datas, empty_type)?;
        for slot in &self.slot_defaults {
            if slot.position.index() >= self.slots.len() {
                return Err(AppError::InvalidCatalog(format!(
                    "slot default for missing slot {}",
                    slot.position
                ))
                .into());
            }
            catalog = catalog.with_slot_default(slot.position, types.by_name(&slot.building_type)?)?;
        }

        info!(
            building_types = self.buildings.len(),
            slots = self.slots.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civitas_core::{ApplicationError, GameError};
    use civitas_game::models::catalog::CatalogFactory;
    use civitas_types::buildings::BuildingType;

    #[test]
    fn test_builtin_catalog() {
        let definition = CatalogDefinition::builtin().unwrap();
        let mut types = BuildingTypeRegistry::new();
        let catalog = definition.build(&mut types).unwrap();

        let farm = types.by_name("farm").unwrap();
        assert_eq!(farm, BuildingType::new(7, "farm"));
        let data = catalog.data(&farm).unwrap();
        assert_eq!(data.max_level(), Level(5));
        assert_eq!(data.time_to_build(), Duration::seconds(10));

        let hq = catalog.data(&types.by_name("headquarters").unwrap()).unwrap();
        assert!(hq.is_builder());
        assert!(hq.has_ratio_bonus());
        assert_eq!(hq.max_instances(), Instance::UNIQUE);

        assert_eq!(
            catalog.empty_type_for(BuildingPosition(5)).name.as_ref(),
            "wall_slot"
        );
        assert_eq!(catalog.empty_type_for(BuildingPosition(0)).name.as_ref(), "empty");
        assert_eq!(catalog.registered_data().len(), definition.buildings.len());
        assert!(types.contains(0));
    }

    #[test]
    fn test_duplicate_type_fails() {
        let json = r#"{
            "empty_type": "empty",
            "slots": [{ "x": 0.0, "y": 0.0, "z": 0.0 }],
            "buildings": [
                { "id": 1, "name": "empty", "empty": true,
                  "levels": [{ "price": [0, 0, 0], "time_to_build_ms": 0, "max_population": 0 }] },
                { "id": 1, "name": "farm",
                  "levels": [{ "price": [1, 1, 1], "time_to_build_ms": 10, "max_population": 1 }] }
            ]
        }"#;
        let definition = CatalogDefinition::from_json(json).unwrap();
        let result = definition.build(&mut BuildingTypeRegistry::new());
        assert!(matches!(
            result,
            Err(ApplicationError::Game(GameError::DuplicateBuildingType(1)))
        ));
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(matches!(
            CatalogDefinition::from_json("{ not json"),
            Err(ApplicationError::Json(_))
        ));

        let no_slots = r#"{ "empty_type": "empty", "slots": [], "buildings": [] }"#;
        let result = CatalogDefinition::from_json(no_slots)
            .unwrap()
            .build(&mut BuildingTypeRegistry::new());
        assert!(matches!(
            result,
            Err(ApplicationError::App(AppError::InvalidCatalog(_)))
        ));

        let negative_time = r#"{
            "empty_type": "empty",
            "slots": [{ "x": 0.0, "y": 0.0, "z": 0.0 }],
            "buildings": [
                { "id": 1, "name": "empty", "empty": true,
                  "levels": [{ "price": [0, 0, 0], "time_to_build_ms": -5, "max_population": 0 }] }
            ]
        }"#;
        let result = CatalogDefinition::from_json(negative_time)
            .unwrap()
            .build(&mut BuildingTypeRegistry::new());
        assert!(matches!(
            result,
            Err(ApplicationError::App(AppError::InvalidCatalog(_)))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = CatalogDefinition::from_file(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(ApplicationError::Io(_))));
    }

    #[test]
    fn test_failed_build_leaves_registry_untouched() {
        let json = r#"{
            "empty_type": "empty",
            "slots": [{ "x": 0.0, "y": 0.0, "z": 0.0 }],
            "buildings": [
                { "id": 1, "name": "empty", "empty": true,
                  "levels": [{ "price": [0, 0, 0], "time_to_build_ms": 0, "max_population": 0 }] },
                { "id": 7, "name": "farm",
                  "levels": [{ "price": [1, 1, 1], "time_to_build_ms": -1, "max_population": 1 }] }
            ]
        }"#;
        let mut types = BuildingTypeRegistry::new();
        let result = CatalogDefinition::from_json(json).unwrap().build(&mut types);

        assert!(result.is_err());
        assert_eq!(types.len(), 1);
        assert!(!types.contains(1));
    }

    #[test]
    fn test_too_many_levels() {
        let level = LevelDefinition {
            price: ResourceGroup::new(1, 1, 1),
            time_to_build_ms: 10,
            max_population: Staff(1),
        };
        let tall = BuildingDefinition {
            id: 7,
            name: "tower".to_string(),
            empty: false,
            builder: false,
            buildable: None,
            max_instances: None,
            required_level: Level::ZERO,
            bonus: BonusDefinition::None,
            levels: vec![level; 256],
        };
        let mut types = BuildingTypeRegistry::new();

        let result = tall.to_building_data(&mut types);
        assert!(matches!(
            result,
            Err(ApplicationError::App(AppError::InvalidCatalog(_)))
        ));
        assert!(!types.contains(7));

        let mut fits = tall.clone();
        fits.levels.truncate(255);
        let data = fits.to_building_data(&mut types).unwrap();
        assert_eq!(data.max_level(), Level(255));
    }
}
