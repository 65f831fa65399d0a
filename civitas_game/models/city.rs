use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use chrono::Utc;

use civitas_core::GameError;
use civitas_types::{
    buildings::{BuildingPosition, BuildingType},
    common::{CityId, PlayerId, ResourceRates},
    map::Point3D,
};

use super::{
    building::Building,
    building_data::BuildingData,
    producer::{Production, ResourceProducer},
};

/// Building data available to a city, keyed by type.
pub type BuildingCatalog = BTreeMap<BuildingType, Arc<BuildingData>>;

/// A player-owned settlement: a fixed number of building slots plus the
/// resource producer fed by the buildings standing in them.
#[derive(Debug, Clone)]
pub struct City {
    id: CityId,
    owner: PlayerId,
    position: Point3D,
    slot_positions: Vec<Point3D>,
    buildings: Vec<Option<Building>>,
    datas: Arc<BuildingCatalog>,
    producer: ResourceProducer,
}

impl City {
    /// Returns a new city with one slot per offset. Each slot sits at the city
    /// position plus its offset; slots start vacant until the catalog fills
    /// them with placeholders.
    pub fn new(
        id: CityId,
        owner: PlayerId,
        position: Point3D,
        initial_resources: ResourceRates,
        offsets: &[Point3D],
        datas: Arc<BuildingCatalog>,
    ) -> Self {
        let slot_positions = offsets.iter().map(|o| o.add(&position)).collect();

        Self {
            id,
            owner,
            position,
            slot_positions,
            buildings: vec![None; offsets.len()],
            datas,
            producer: ResourceProducer::new(id, Utc::now(), initial_resources),
        }
    }

    pub fn id(&self) -> CityId {
        self.id
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn position(&self) -> Point3D {
        self.position
    }

    pub fn max_buildings(&self) -> usize {
        self.slot_positions.len()
    }

    /// World coordinates of a slot.
    pub fn building_position(&self, position: BuildingPosition) -> Result<Point3D, GameError> {
        self.slot_positions
            .get(position.index())
            .copied()
            .ok_or(GameError::InvalidPosition {
                position,
                max: self.max_buildings(),
            })
    }

    pub fn building(&self, position: BuildingPosition) -> Option<&Building> {
        self.buildings.get(position.index()).and_then(Option::as_ref)
    }

    pub fn building_mut(&mut self, position: BuildingPosition) -> Option<&mut Building> {
        self.buildings
            .get_mut(position.index())
            .and_then(Option::as_mut)
    }

    /// Every occupied slot, in slot order.
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter().flatten()
    }

    /// Puts `building` in its own slot, replacing whatever stood there.
    pub fn create_construction(&mut self, building: Building) -> Result<(), GameError> {
        self.check_slot(&building)?;
        let idx = building.position().index();
        self.buildings[idx] = Some(building);
        self.update_production();
        Ok(())
    }

    /// Fails if `building` can't be installed in this city.
    pub fn check_slot(&self, building: &Building) -> Result<(), GameError> {
        if building.city() != self.id {
            return Err(GameError::CityMismatch {
                city: self.id,
                building_city: building.city(),
            });
        }
        self.building_position(building.position())?;
        Ok(())
    }

    pub fn by_type(&self, building_type: &BuildingType) -> Option<&Arc<BuildingData>> {
        self.datas.get(building_type)
    }

    pub fn all_types(&self) -> Vec<Arc<BuildingData>> {
        self.datas.values().cloned().collect()
    }

    /// Buildable types not already standing in a built slot.
    pub fn allowed_types(&self) -> BTreeSet<BuildingType> {
        let built: BTreeSet<&BuildingType> = self
            .buildings()
            .filter(|b| b.exists() && !b.is_empty())
            .map(|b| b.building_type())
            .collect();

        self.datas
            .iter()
            .filter(|(t, data)| !t.is_world() && data.is_buildable() && !built.contains(t))
            .map(|(t, _)| t.clone())
            .collect()
    }

    /// Confirmed staff working across the city.
    pub fn allocated_staff(&self) -> u32 {
        self.buildings().map(|b| b.old_staff().value()).sum()
    }

    pub fn producer(&self) -> &ResourceProducer {
        &self.producer
    }

    pub fn producer_mut(&mut self) -> &mut ResourceProducer {
        &mut self.producer
    }

    pub fn initialize_producer(&mut self) {
        self.producer.set_initialized();
    }

    pub fn has_negative_production_ratio(&self) -> bool {
        self.producer.has_negative_ratio()
    }

    /// Recomputes production from the buildings currently standing.
    pub fn update_production(&mut self) {
        let production = Production::from_buildings(self.buildings.iter().flatten());
        self.producer.update_production(production);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::bonus::FlatBonus,
        test_utils::{
            BuildingDataFactoryOptions, BuildingFactoryOptions, CityFactoryOptions,
            building_data_factory, building_factory, city_factory,
        },
    };
    use civitas_types::buildings::{Level, Staff};

    #[test]
    fn test_new_city_slots() {
        let city = city_factory(CityFactoryOptions {
            position: Some(Point3D::new(100.0, 0.0, 50.0)),
            offsets: Some(vec![
                Point3D::new(1.0, 0.0, 0.0),
                Point3D::new(0.0, 0.0, 1.0),
                Point3D::new(-1.0, 0.0, 0.0),
            ]),
            ..Default::default()
        });

        assert_eq!(city.max_buildings(), 3);
        assert_eq!(
            city.building_position(BuildingPosition(1)),
            Ok(Point3D::new(100.0, 0.0, 51.0))
        );
        assert_eq!(
            city.building_position(BuildingPosition(3)),
            Err(GameError::InvalidPosition {
                position: BuildingPosition(3),
                max: 3
            })
        );
        assert_eq!(city.buildings().count(), 0);
        assert!(!city.producer().is_initialized());
    }

    #[test]
    fn test_create_construction_replaces_slot() {
        let mut city = city_factory(Default::default());
        let data = city.by_type(&BuildingType::new(7, "farm")).unwrap().clone();

        let first = building_factory(BuildingFactoryOptions {
            city: Some(city.id()),
            data: Some(data.clone()),
            position: Some(BuildingPosition(0)),
            level: Some(Level(1)),
            ..Default::default()
        });
        city.create_construction(first).unwrap();

        let second = building_factory(BuildingFactoryOptions {
            city: Some(city.id()),
            data: Some(data),
            position: Some(BuildingPosition(0)),
            level: Some(Level(2)),
            ..Default::default()
        });
        city.create_construction(second).unwrap();

        assert_eq!(city.buildings().count(), 1);
        assert_eq!(city.building(BuildingPosition(0)).unwrap().level(), Level(2));
    }

    #[test]
    fn test_create_construction_rejects_foreign_or_out_of_range() {
        let mut city = city_factory(Default::default());

        let foreign = building_factory(BuildingFactoryOptions {
            city: Some(CityId(999)),
            ..Default::default()
        });
        assert!(matches!(
            city.create_construction(foreign),
            Err(GameError::CityMismatch { .. })
        ));

        let outside = building_factory(BuildingFactoryOptions {
            city: Some(city.id()),
            position: Some(BuildingPosition(200)),
            ..Default::default()
        });
        assert!(matches!(
            city.create_construction(outside),
            Err(GameError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_allowed_types_excludes_built_and_world() {
        let mut city = city_factory(Default::default());
        let farm = BuildingType::new(7, "farm");
        let mine = BuildingType::new(8, "mine");

        let allowed = city.allowed_types();
        assert!(allowed.contains(&farm));
        assert!(allowed.contains(&mine));
        assert!(!allowed.contains(&BuildingType::world()));
        assert!(allowed.iter().all(|t| !t.is_world()));

        let data = city.by_type(&farm).unwrap().clone();
        city.create_construction(building_factory(BuildingFactoryOptions {
            city: Some(city.id()),
            data: Some(data),
            position: Some(BuildingPosition(1)),
            level: Some(Level(1)),
            ..Default::default()
        }))
        .unwrap();

        let allowed = city.allowed_types();
        assert!(!allowed.contains(&farm));
        assert!(allowed.contains(&mine));
    }

    #[test]
    fn test_allowed_types_ignores_unbuilt_slots() {
        let mut city = city_factory(Default::default());
        let farm = BuildingType::new(7, "farm");
        let data = city.by_type(&farm).unwrap().clone();

        city.create_construction(building_factory(BuildingFactoryOptions {
            city: Some(city.id()),
            data: Some(data),
            position: Some(BuildingPosition(1)),
            level: Some(Level::ZERO),
            ..Default::default()
        }))
        .unwrap();

        assert!(city.allowed_types().contains(&farm));
    }

    #[test]
    fn test_allocated_staff_counts_confirmed_staff() {
        let mut city = city_factory(Default::default());
        let data = city.by_type(&BuildingType::new(7, "farm")).unwrap().clone();

        for slot in 0..2 {
            city.create_construction(building_factory(BuildingFactoryOptions {
                city: Some(city.id()),
                data: Some(data.clone()),
                position: Some(BuildingPosition(slot)),
                level: Some(Level(1)),
                staff: Some(Staff(3)),
                ..Default::default()
            }))
            .unwrap();
        }
        assert_eq!(city.allocated_staff(), 6);

        let building = city.building_mut(BuildingPosition(0)).unwrap();
        building.set_staff(Staff(5)).unwrap();
        assert_eq!(city.allocated_staff(), 6);

        city.building_mut(BuildingPosition(0)).unwrap().set_old_staff();
        assert_eq!(city.allocated_staff(), 8);
    }

    #[test]
    fn test_negative_production_ratio_follows_buildings() {
        let mut city = city_factory(Default::default());
        assert!(!city.has_negative_production_ratio());

        let barracks = building_data_factory(BuildingDataFactoryOptions {
            id: Some(30),
            name: Some("barracks"),
            bonus: Some(Arc::new(FlatBonus {
                per_level: ResourceRates::new(0.0, 0.0, -5.0),
                per_staff: ResourceRates::ZERO,
            })),
            ..Default::default()
        });
        city.create_construction(building_factory(BuildingFactoryOptions {
            city: Some(city.id()),
            data: Some(barracks),
            position: Some(BuildingPosition(2)),
            level: Some(Level(1)),
            ..Default::default()
        }))
        .unwrap();

        assert!(city.has_negative_production_ratio());
    }

    #[test]
    fn test_initialize_producer() {
        let mut city = city_factory(Default::default());
        city.initialize_producer();
        assert!(city.producer().is_initialized());
    }
}
