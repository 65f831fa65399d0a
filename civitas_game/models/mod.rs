pub mod bonus;
pub mod building;
pub mod building_data;
pub mod building_type;
pub mod catalog;
pub mod city;
pub mod city_registry;
pub mod producer;
