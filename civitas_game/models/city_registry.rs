use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use civitas_core::GameError;
use civitas_types::{
    buildings::BuildingType,
    common::{CityId, PlayerId, ResourceRates},
    map::Point3D,
};

use super::{building_data::BuildingData, catalog::CatalogFactory, city::City};

/// Builds a bare city (vacant slots) for an id and owner.
pub trait CityFactory: Send + Sync {
    fn create_city(&self, id: CityId, owner: PlayerId) -> City;
}

/// Places cities on a square grid derived from their id, every city sharing
/// the same slot layout.
pub struct LayoutCityFactory {
    catalog: Arc<dyn CatalogFactory>,
    offsets: Vec<Point3D>,
    world_size: u32,
    spacing: f32,
    initial_resources: ResourceRates,
}

impl LayoutCityFactory {
    pub fn new(
        catalog: Arc<dyn CatalogFactory>,
        offsets: Vec<Point3D>,
        world_size: u32,
        spacing: f32,
    ) -> Self {
        Self {
            catalog,
            offsets,
            world_size,
            spacing,
            initial_resources: ResourceRates::ZERO,
        }
    }

    pub fn with_initial_resources(mut self, resources: ResourceRates) -> Self {
        self.initial_resources = resources;
        self
    }
}

impl CityFactory for LayoutCityFactory {
    fn create_city(&self, id: CityId, owner: PlayerId) -> City {
        let position = Point3D::from_city_id(id, self.world_size, self.spacing);
        City::new(
            id,
            owner,
            position,
            self.initial_resources,
            &self.offsets,
            self.catalog.registered_data().clone(),
        )
    }
}

/// Owns every city, indexed by id and by owner.
pub struct CityRegistry {
    cities: HashMap<CityId, City>,
    by_owner: HashMap<PlayerId, BTreeSet<CityId>>,
    city_factory: Box<dyn CityFactory>,
    catalog: Arc<dyn CatalogFactory>,
}

impl CityRegistry {
    pub fn new(city_factory: Box<dyn CityFactory>, catalog: Arc<dyn CatalogFactory>) -> Self {
        Self {
            cities: HashMap::new(),
            by_owner: HashMap::new(),
            city_factory,
            catalog,
        }
    }

    /// Creates city `id` for `owner`. Slots stay vacant until
    /// [`CityRegistry::create_empty_city_buildings`] is called.
    pub fn create_city(&mut self, id: CityId, owner: PlayerId) -> Result<&mut City, GameError> {
        if self.cities.contains_key(&id) {
            return Err(GameError::DuplicateCity(id));
        }

        let city = self.city_factory.create_city(id, owner);
        self.by_owner.entry(owner).or_default().insert(id);
        Ok(self.cities.entry(id).or_insert(city))
    }

    pub fn get(&self, id: CityId) -> Result<&City, GameError> {
        self.cities.get(&id).ok_or(GameError::CityNotFound(id))
    }

    pub fn get_mut(&mut self, id: CityId) -> Result<&mut City, GameError> {
        self.cities.get_mut(&id).ok_or(GameError::CityNotFound(id))
    }

    /// Cities of `owner`, ordered by id. Empty for an unknown owner.
    pub fn cities_of(&self, owner: PlayerId) -> Vec<&City> {
        self.by_owner
            .get(&owner)
            .map(|ids| ids.iter().filter_map(|id| self.cities.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }

    pub fn cities_mut(&mut self) -> impl Iterator<Item = &mut City> {
        self.cities.values_mut()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn create_empty_city_buildings(&mut self, id: CityId) -> Result<(), GameError> {
        let city = self.cities.get_mut(&id).ok_or(GameError::CityNotFound(id))?;
        self.catalog.create_empty_city(city)
    }

    pub fn data(&self, building_type: &BuildingType) -> Result<&Arc<BuildingData>, GameError> {
        self.catalog
            .registered_data()
            .get(building_type)
            .ok_or_else(|| GameError::BuildingDataNotFound(building_type.name.to_string()))
    }
}
