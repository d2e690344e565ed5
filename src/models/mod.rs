pub mod care_event;
pub mod location;
pub mod plant;
pub mod plant_type;
