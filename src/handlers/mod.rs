pub mod care_history;
pub mod health;
pub mod locations;
pub mod plant_types;
pub mod plants;
