pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod driver;
pub mod protocol;
pub mod scheduler;
pub mod test_utils;
