pub mod seed;
pub mod stats;
pub mod watering;
