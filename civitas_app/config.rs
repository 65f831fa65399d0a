use dotenvy::dotenv;
use std::{env, path::PathBuf};

pub struct Config {
    pub tick_millis: u64,
    pub world_size: u32,
    pub city_spacing: f32,
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let tick_millis = match env::var("CIVITAS_TICK_MILLIS") {
            Ok(val) => val.parse::<u64>().unwrap_or(100).clamp(10, 1000),
            Err(_) => 100,
        };

        let world_size = match env::var("CIVITAS_WORLD_SIZE") {
            Ok(val) => val.parse::<u32>().ok().filter(|size| *size > 0).unwrap_or(100),
            Err(_) => 100,
        };

        let city_spacing = match env::var("CIVITAS_CITY_SPACING") {
            Ok(val) => val.parse::<f32>().unwrap_or(100.0),
            Err(_) => 100.0,
        };

        let catalog_path = match env::var("CIVITAS_CATALOG_PATH") {
            Ok(val) if !val.is_empty() => Some(PathBuf::from(val)),
            _ => None,
        };

        Self {
            tick_millis,
            world_size,
            city_spacing,
            catalog_path,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_millis: 100,
            world_size: 100,
            city_spacing: 100.0,
            catalog_path: None,
        }
    }
}
