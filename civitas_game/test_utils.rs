use std::sync::Arc;

use chrono::Duration;
use rand::Rng;

use civitas_types::{
    buildings::{BuildingPosition, BuildingType, Level, Staff},
    common::{CityId, PlayerId, ResourceGroup, ResourceRates},
    map::Point3D,
};

use crate::models::{
    bonus::{BonusFactory, FlatBonus, NoBonus},
    building::Building,
    building_data::{BuildingData, LevelData},
    catalog::{Catalog, CatalogFactory},
    city::{BuildingCatalog, City},
    city_registry::{CityRegistry, LayoutCityFactory},
};

#[derive(Default, Clone)]
pub struct BuildingDataFactoryOptions<'a> {
    pub id: Option<u32>,
    pub name: Option<&'a str>,
    pub max_level: Option<u8>,
    pub price: Option<ResourceGroup>,
    pub time_to_build: Option<Duration>,
    pub max_population: Option<Staff>,
    pub bonus: Option<Arc<dyn BonusFactory>>,
    pub empty: Option<bool>,
    pub buildable: Option<bool>,
}

#[derive(Default, Clone)]
pub struct BuildingFactoryOptions {
    pub city: Option<CityId>,
    pub data: Option<Arc<BuildingData>>,
    pub position: Option<BuildingPosition>,
    pub level: Option<Level>,
    pub staff: Option<Staff>,
}

#[derive(Default, Clone)]
pub struct CityFactoryOptions {
    pub id: Option<CityId>,
    pub owner: Option<PlayerId>,
    pub position: Option<Point3D>,
    pub offsets: Option<Vec<Point3D>>,
    pub catalog: Option<Catalog>,
    pub initial_resources: Option<ResourceRates>,
}

#[derive(Default, Clone)]
pub struct CityRegistryFactoryOptions {
    pub catalog: Option<Catalog>,
    pub offsets: Option<Vec<Point3D>>,
    pub world_size: Option<u32>,
    pub spacing: Option<f32>,
}

/// Every level shares the same row, so tests only set what they look at.
pub fn building_data_factory(options: BuildingDataFactoryOptions) -> Arc<BuildingData> {
    let mut rng = rand::thread_rng();
    let id = options.id.unwrap_or_else(|| rng.gen_range(1_000..1_000_000));
    let default_name = format!("building_{}", rng.r#gen::<u32>());
    let name = options.name.map_or(default_name, |s| s.to_string());

    let row = LevelData::new(
        options.price.unwrap_or(ResourceGroup::new(10, 10, 10)),
        options.time_to_build.unwrap_or(Duration::seconds(10)),
        options.max_population.unwrap_or(Staff(10)),
    );
    let levels = vec![row; options.max_level.unwrap_or(10) as usize];
    let bonus = options.bonus.unwrap_or_else(|| Arc::new(NoBonus));

    let mut data = BuildingData::new(BuildingType::new(id, &name), levels, bonus).unwrap();
    if options.empty.unwrap_or(false) {
        data = data.empty();
    }
    if let Some(buildable) = options.buildable {
        data = data.buildable(buildable);
    }
    Arc::new(data)
}

pub fn building_factory(options: BuildingFactoryOptions) -> Building {
    let data = options
        .data
        .unwrap_or_else(|| building_data_factory(Default::default()));

    Building::new(
        options.city.unwrap_or(CityId(1)),
        data,
        options.position.unwrap_or(BuildingPosition(0)),
        options.level.unwrap_or(Level::ONE),
        options.staff.unwrap_or(Staff::ZERO),
    )
    .unwrap()
}

/// Catalog with an `empty` placeholder (1), a `farm` (7) and a `mine` (8).
pub fn catalog_factory() -> Catalog {
    let empty = building_data_factory(BuildingDataFactoryOptions {
        id: Some(1),
        name: Some("empty"),
        max_level: Some(1),
        price: Some(ResourceGroup::default()),
        time_to_build: Some(Duration::zero()),
        max_population: Some(Staff::ZERO),
        empty: Some(true),
        ..Default::default()
    });
    let farm = building_data_factory(BuildingDataFactoryOptions {
        id: Some(7),
        name: Some("farm"),
        max_level: Some(5),
        bonus: Some(Arc::new(FlatBonus {
            per_level: ResourceRates::new(0.0, 0.0, 10.0),
            per_staff: ResourceRates::new(0.0, 0.0, 1.0),
        })),
        ..Default::default()
    });
    let mine = building_data_factory(BuildingDataFactoryOptions {
        id: Some(8),
        name: Some("mine"),
        max_level: Some(5),
        bonus: Some(Arc::new(FlatBonus {
            per_level: ResourceRates::new(10.0, 0.0, 0.0),
            per_staff: ResourceRates::new(1.0, 0.0, 0.0),
        })),
        ..Default::default()
    });

    let datas: BuildingCatalog = [empty, farm, mine]
        .into_iter()
        .map(|data| (data.building_type().clone(), data))
        .collect();

    Catalog::new(datas, BuildingType::new(1, "empty")).unwrap()
}

fn default_offsets() -> Vec<Point3D> {
    (0..5)
        .map(|slot| Point3D::new(slot as f32 * 10.0, 0.0, 0.0))
        .collect()
}

pub fn city_factory(options: CityFactoryOptions) -> City {
    let catalog = options.catalog.unwrap_or_else(catalog_factory);
    let offsets = options.offsets.unwrap_or_else(default_offsets);

    City::new(
        options.id.unwrap_or(CityId(1)),
        options.owner.unwrap_or_default(),
        options.position.unwrap_or(Point3D::ZERO),
        options.initial_resources.unwrap_or(ResourceRates::ZERO),
        &offsets,
        catalog.registered_data().clone(),
    )
}

pub fn city_registry_factory(options: CityRegistryFactoryOptions) -> CityRegistry {
    let catalog: Arc<dyn CatalogFactory> = Arc::new(options.catalog.unwrap_or_else(catalog_factory));
    let city_factory = LayoutCityFactory::new(
        catalog.clone(),
        options.offsets.unwrap_or_else(default_offsets),
        options.world_size.unwrap_or(100),
        options.spacing.unwrap_or(100.0),
    );

    CityRegistry::new(Box::new(city_factory), catalog)
}
