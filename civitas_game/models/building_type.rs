use std::collections::{BTreeMap, HashMap};

use civitas_core::GameError;
use civitas_types::buildings::BuildingType;

/// Catalog of every known building type.
///
/// Built once at startup by the catalog bootstrap and then passed by reference
/// to whatever needs to resolve type ids (catalogs, wire decoders). Ids and
/// names are write-once: nothing can be re-registered or removed short of
/// [`BuildingTypeRegistry::clear`].
#[derive(Debug, Clone)]
pub struct BuildingTypeRegistry {
    by_id: BTreeMap<u32, BuildingType>,
    by_name: HashMap<String, u32>,
}

impl BuildingTypeRegistry {
    /// Returns a registry holding only the `world` sentinel.
    pub fn new() -> Self {
        let mut registry = Self {
            by_id: BTreeMap::new(),
            by_name: HashMap::new(),
        };
        registry.insert(BuildingType::world());
        registry
    }

    pub fn register(&mut self, id: u32, name: &str) -> Result<BuildingType, GameError> {
        if self.by_id.contains_key(&id) {
            return Err(GameError::DuplicateBuildingType(id));
        }
        if self.by_name.contains_key(name) {
            return Err(GameError::DuplicateBuildingTypeName(name.to_string()));
        }

        let building_type = BuildingType::new(id, name);
        self.insert(building_type.clone());
        Ok(building_type)
    }

    pub fn value_of(&self, id: u32) -> Result<BuildingType, GameError> {
        self.by_id
            .get(&id)
            .cloned()
            .ok_or(GameError::BuildingTypeNotFound(id))
    }

    pub fn by_name(&self, name: &str) -> Result<BuildingType, GameError> {
        self.by_name
            .get(name)
            .and_then(|id| self.by_id.get(id))
            .cloned()
            .ok_or_else(|| GameError::BuildingTypeNameNotFound(name.to_string()))
    }

    pub fn contains(&self, id: u32) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All registered types ordered by id, `world` included.
    pub fn types(&self) -> impl Iterator<Item = &BuildingType> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Forgets every registration except the `world` sentinel.
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_name.clear();
        self.insert(BuildingType::world());
    }

    fn insert(&mut self, building_type: BuildingType) {
        self.by_name
            .insert(building_type.name.to_string(), building_type.id);
        self.by_id.insert(building_type.id, building_type);
    }
}

impl Default for BuildingTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
