use std::{collections::HashMap, sync::Arc};

use civitas_core::GameError;
use civitas_types::buildings::{BuildingPosition, BuildingType, Level, Staff};

use super::{
    building::Building,
    building_data::BuildingData,
    city::{BuildingCatalog, City},
};

/// Source of building data and of the placeholders filling a new city.
pub trait CatalogFactory: Send + Sync {
    fn registered_data(&self) -> &Arc<BuildingCatalog>;

    /// Fills every slot of `city` with its default empty placeholder.
    fn create_empty_city(&self, city: &mut City) -> Result<(), GameError>;
}

/// In-memory catalog built at bootstrap.
///
/// Every slot gets the `default_empty` placeholder unless an override says
/// otherwise (e.g. a slot that only accepts walls).
#[derive(Debug, Clone)]
pub struct Catalog {
    datas: Arc<BuildingCatalog>,
    default_empty: BuildingType,
    slot_defaults: HashMap<BuildingPosition, BuildingType>,
}

impl Catalog {
    /// `datas` must contain `default_empty`.
    pub fn new(datas: BuildingCatalog, default_empty: BuildingType) -> Result<Self, GameError> {
        if !datas.contains_key(&default_empty) {
            return Err(GameError::BuildingDataNotFound(
                default_empty.name.to_string(),
            ));
        }

        Ok(Self {
            datas: Arc::new(datas),
            default_empty,
            slot_defaults: HashMap::new(),
        })
    }

    pub fn with_slot_default(
        mut self,
        position: BuildingPosition,
        building_type: BuildingType,
    ) -> Result<Self, GameError> {
        if !self.datas.contains_key(&building_type) {
            return Err(GameError::BuildingDataNotFound(
                building_type.name.to_string(),
            ));
        }
        self.slot_defaults.insert(position, building_type);
        Ok(self)
    }

    pub fn data(&self, building_type: &BuildingType) -> Option<&Arc<BuildingData>> {
        self.datas.get(building_type)
    }

    /// Placeholder type used for `position` in an empty city.
    pub fn empty_type_for(&self, position: BuildingPosition) -> &BuildingType {
        self.slot_defaults
            .get(&position)
            .unwrap_or(&self.default_empty)
    }
}

impl CatalogFactory for Catalog {
    fn registered_data(&self) -> &Arc<BuildingCatalog> {
        &self.datas
    }

    fn create_empty_city(&self, city: &mut City) -> Result<(), GameError> {
        let slots = city.max_buildings().min(u8::MAX as usize + 1);
        for idx in 0..slots {
            let position = BuildingPosition(idx as u8);
            let building_type = self.empty_type_for(position);
            let data = self
                .data(building_type)
                .ok_or_else(|| GameError::BuildingDataNotFound(building_type.name.to_string()))?;

            let placeholder =
                Building::new(city.id(), data.clone(), position, Level::ZERO, Staff::ZERO)?;
            city.create_construction(placeholder)?;
        }
        Ok(())
    }
}
