//! Starter plant types and locations, inserted when missing.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::image;
use crate::models::location::NewLocation;
use crate::models::plant_type::NewPlantType;
use crate::store::{PlantStore, StoreError};

pub const DEFAULT_PLANT_TYPES: &[(&str, &str)] = &[
    ("Succulent", "Low water requirement, ideal for dry climates."),
    ("Tropical", "High water requirement, prefers humid environments."),
    ("Herb", "Common for culinary uses, moderate water requirement."),
    ("Cacti", "Extremely low water requirement, thrives in arid conditions."),
];

pub const DEFAULT_LOCATIONS: &[&str] = &["Living Room", "Garden", "Kitchen"];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub plant_types_added: usize,
    pub locations_added: usize,
}

/// Inserts every default that is not already present (by case-insensitive
/// name). Default images are read from `<images_dir>/<name>.png` when a
/// directory is given.
pub async fn seed_defaults(
    store: &dyn PlantStore,
    images_dir: Option<&Path>,
    now: DateTime<Utc>,
) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    let existing_types = store.list_plant_types().await?;
    for (name, description) in DEFAULT_PLANT_TYPES {
        if existing_types
            .iter()
            .any(|t| t.name.to_lowercase() == name.to_lowercase())
        {
            continue;
        }

        let default_image_base64 = match images_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.png", name.to_lowercase()));
                let loaded = image::load_png_data_uri(&path)?;
                if loaded.is_none() {
                    tracing::warn!(path = %path.display(), "Default image missing");
                }
                loaded
            }
            None => None,
        };

        let new_type = NewPlantType {
            name: name.to_string(),
            description: description.to_string(),
            default_image_base64,
        };
        match store.insert_plant_type(new_type, now).await {
            Ok(_) => report.plant_types_added += 1,
            // another instance seeded it first
            Err(StoreError::DuplicateName { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let existing_locations = store.list_locations().await?;
    for name in DEFAULT_LOCATIONS {
        if existing_locations
            .iter()
            .any(|l| l.name.to_lowercase() == name.to_lowercase())
        {
            continue;
        }

        let new_location = NewLocation {
            name: name.to_string(),
        };
        match store.insert_location(new_location, now).await {
            Ok(_) => report.locations_added += 1,
            Err(StoreError::DuplicateName { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report)
}
