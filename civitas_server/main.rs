use std::{sync::Arc, time::Duration};

use civitas_app::{
    bootstrap::CatalogDefinition,
    clock::SystemClock,
    config::Config,
    driver::GameLoop,
    scheduler::{ConstructionScheduler, PlainBuildingFactory, StaffAllocationScheduler},
};
use civitas_core::{ApplicationError, Result};
use civitas_game::models::{
    building::Building,
    building_type::BuildingTypeRegistry,
    catalog::CatalogFactory,
    city_registry::{CityRegistry, LayoutCityFactory},
};
use civitas_types::{
    buildings::{BuildingPosition, Level, Staff},
    common::{CityId, PlayerId, ResourceRates},
};

mod listeners;
mod logs;
use listeners::LogListener;
use logs::setup_logging;

#[tokio::main]
#[cfg(not(tarpaulin_include))]
async fn main() -> Result<(), ApplicationError> {
    setup_logging();
    let config = Config::from_env();
    let (mut game, types) = setup_game(&config)?;

    seed_demo_city(&mut game, &types)?;

    game.run(Duration::from_millis(config.tick_millis), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Unable to listen for shutdown signal: {e}");
        }
    })
    .await
}

fn setup_game(config: &Config) -> Result<(GameLoop, BuildingTypeRegistry), ApplicationError> {
    let definition = match &config.catalog_path {
        Some(path) => {
            tracing::info!("Loading catalog from {}", path.display());
            CatalogDefinition::from_file(path)?
        }
        None => CatalogDefinition::builtin()?,
    };

    let mut types = BuildingTypeRegistry::new();
    let catalog: Arc<dyn CatalogFactory> = Arc::new(definition.build(&mut types)?);

    let city_factory = LayoutCityFactory::new(
        catalog.clone(),
        definition.slots.clone(),
        config.world_size,
        config.city_spacing,
    )
    .with_initial_resources(ResourceRates::new(500.0, 500.0, 500.0));
    let cities = CityRegistry::new(Box::new(city_factory), catalog);

    let mut construction = ConstructionScheduler::new(Arc::new(PlainBuildingFactory));
    construction.subscribe(Arc::new(LogListener));
    let mut staff = StaffAllocationScheduler::new(Arc::new(SystemClock));
    staff.subscribe(Arc::new(LogListener));

    Ok((GameLoop::new(cities, construction, staff), types))
}

/// One city with a farm and a mine under construction.
fn seed_demo_city(game: &mut GameLoop, types: &BuildingTypeRegistry) -> Result<()> {
    let city = CityId(1);
    game.cities_mut().create_city(city, PlayerId::new())?;
    game.cities_mut().create_empty_city_buildings(city)?;
    game.cities_mut().get_mut(city)?.initialize_producer();

    let headquarters = demo_building(game, types, city, "headquarters", 0)?;
    game.build(headquarters, chrono::Duration::zero())?;
    game.allocate(
        city,
        BuildingPosition(0),
        Staff(3),
        chrono::Duration::seconds(5),
    )?;

    for (name, slot) in [("farm", 1), ("mine", 2)] {
        let building = demo_building(game, types, city, name, slot)?;
        let delay = building.data().time_to_build();
        game.build(building, delay)?;
    }

    tracing::info!(
        allowed = ?game.cities().get(city)?.allowed_types(),
        "Demo city ready"
    );
    Ok(())
}

fn demo_building(
    game: &GameLoop,
    types: &BuildingTypeRegistry,
    city: CityId,
    name: &str,
    slot: u8,
) -> Result<Building> {
    let building_type = types.by_name(name)?;
    let data = game.cities().data(&building_type)?.clone();
    Ok(Building::new(
        city,
        data,
        BuildingPosition(slot),
        Level::ONE,
        Staff::ZERO,
    )?)
}
