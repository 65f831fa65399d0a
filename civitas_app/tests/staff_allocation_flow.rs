use std::sync::Arc;

use chrono::Duration;

use civitas_app::{
    bootstrap::CatalogDefinition,
    driver::GameLoop,
    scheduler::{ConstructionScheduler, PlainBuildingFactory, StaffAllocationScheduler},
    test_utils::tests::{AllocationEvent, ManualClock, RecordingAllocationListener},
};
use civitas_game::models::{
    building::Building,
    building_type::BuildingTypeRegistry,
    catalog::CatalogFactory,
    city_registry::{CityRegistry, LayoutCityFactory},
};
use civitas_types::{
    buildings::{BuildingPosition, Level, Staff},
    common::{CityId, PlayerId},
};

const CITY: CityId = CityId(3);

fn game() -> (GameLoop, BuildingTypeRegistry, Arc<ManualClock>, Arc<RecordingAllocationListener>) {
    let definition = CatalogDefinition::builtin().unwrap();
    let mut types = BuildingTypeRegistry::new();
    let catalog: Arc<dyn CatalogFactory> = Arc::new(definition.build(&mut types).unwrap());

    let factory = LayoutCityFactory::new(catalog.clone(), definition.slots.clone(), 100, 100.0);
    let mut cities = CityRegistry::new(Box::new(factory), catalog);
    cities.create_city(CITY, PlayerId::new()).unwrap();
    cities.create_empty_city_buildings(CITY).unwrap();

    let clock = Arc::new(ManualClock::default());
    let listener = Arc::new(RecordingAllocationListener::default());
    let mut staff = StaffAllocationScheduler::new(clock.clone());
    staff.subscribe(listener.clone());

    let mut game = GameLoop::new(
        cities,
        ConstructionScheduler::new(Arc::new(PlainBuildingFactory)),
        staff,
    );

    let farm = types.by_name("farm").unwrap();
    let data = game.cities().data(&farm).unwrap().clone();
    let building = Building::new(CITY, data, BuildingPosition(1), Level(1), Staff(2)).unwrap();
    game.build(building, Duration::zero()).unwrap();

    (game, types, clock, listener)
}

fn farm(game: &GameLoop) -> &Building {
    game.cities()
        .get(CITY)
        .unwrap()
        .building(BuildingPosition(1))
        .unwrap()
}

#[test]
fn staff_is_confirmed_once_the_duration_elapsed() {
    let (mut game, _, clock, listener) = game();
    assert_eq!(farm(&game).staff(), Staff(2));

    game.allocate(CITY, BuildingPosition(1), Staff(8), Duration::seconds(20))
        .unwrap();
    assert_eq!(farm(&game).staff(), Staff(8));
    assert_eq!(farm(&game).old_staff(), Staff(2));

    clock.advance(Duration::seconds(15));
    game.tick(Duration::seconds(15)).unwrap();
    assert_eq!(farm(&game).old_staff(), Staff(2));
    assert_eq!(
        listener.events(),
        vec![AllocationEvent::UpdateTime {
            city: CITY,
            position: BuildingPosition(1),
            remaining: Duration::seconds(5),
        }]
    );

    clock.advance(Duration::seconds(5));
    game.tick(Duration::seconds(5)).unwrap();
    assert_eq!(farm(&game).old_staff(), Staff(8));
    assert_eq!(farm(&game).staff(), Staff(8));
    assert_eq!(listener.allocated(), 1);

    clock.advance(Duration::seconds(60));
    game.tick(Duration::seconds(60)).unwrap();
    assert_eq!(listener.allocated(), 1);
}

#[test]
fn allocated_staff_counts_confirmed_workers_only() {
    let (mut game, _, clock, _) = game();
    let city = |game: &GameLoop| game.cities().get(CITY).unwrap().allocated_staff();
    assert_eq!(city(&game), 2);

    game.allocate(CITY, BuildingPosition(1), Staff(10), Duration::seconds(1))
        .unwrap();
    assert_eq!(city(&game), 2);

    clock.advance(Duration::seconds(1));
    game.tick(Duration::seconds(1)).unwrap();
    assert_eq!(city(&game), 10);
}

#[test]
fn wire_records_follow_the_queue() {
    let (mut game, _, _, _) = game();
    game.allocate(CITY, BuildingPosition(1), Staff(5), Duration::seconds(1))
        .unwrap();

    let wire: Vec<String> = game.staff().records().iter().map(|r| r.encode()).collect();
    assert_eq!(wire, vec!["3@1@5"]);
}

#[test]
fn upgrade_keeps_a_pending_allocation() {
    let (mut game, _, clock, listener) = game();
    let upgrade = farm(&game).upgraded().unwrap();
    game.build(upgrade, Duration::seconds(10)).unwrap();
    game.allocate(CITY, BuildingPosition(1), Staff(8), Duration::seconds(20))
        .unwrap();

    clock.advance(Duration::seconds(10));
    game.tick(Duration::seconds(10)).unwrap();
    assert_eq!(farm(&game).level(), Level(2));
    assert_eq!(farm(&game).staff(), Staff(8));
    assert_eq!(farm(&game).old_staff(), Staff(2));

    clock.advance(Duration::seconds(10));
    game.tick(Duration::seconds(10)).unwrap();
    assert_eq!(farm(&game).staff(), Staff(8));
    assert_eq!(farm(&game).old_staff(), Staff(8));
    assert_eq!(
        listener.events().last(),
        Some(&AllocationEvent::Allocated {
            city: CITY,
            position: BuildingPosition(1),
            staff: Staff(8),
        })
    );
}
