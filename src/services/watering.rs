//! Watering urgency: how far a plant is through its watering interval, which
//! status band that puts it in, and the note written when it gets watered.
//!
//! Everything here is a pure function of its inputs. `now` is always passed in
//! by the caller.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::care_event::{CareEvent, WATERING_CARE_TYPE};
use crate::models::plant::{Plant, PlantDetails};

/// Fraction of the interval after which a plant is "Due Soon".
pub const DUE_SOON_THRESHOLD: f64 = 0.7;
/// Fraction of the interval after which a plant is "Overdue".
pub const OVERDUE_THRESHOLD: f64 = 1.0;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Watering frequency must be a positive number of days, got {frequency_days}")]
pub struct InvalidScheduleError {
    pub frequency_days: i32,
}

/// Urgency band. Variants are declared from least to most urgent so the
/// derived `Ord` follows urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WateringStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Due Soon")]
    DueSoon,
    #[serde(rename = "Overdue")]
    Overdue,
}

impl WateringStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WateringStatus::Ok => "OK",
            WateringStatus::DueSoon => "Due Soon",
            WateringStatus::Overdue => "Overdue",
        }
    }
}

impl fmt::Display for WateringStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How timely a watering was, judged against the schedule it interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeliness {
    Early,
    OnTime,
    Late,
}

impl Timeliness {
    pub fn from_fraction(fraction: f64) -> Self {
        match classify(fraction) {
            WateringStatus::Overdue => Timeliness::Late,
            WateringStatus::DueSoon => Timeliness::OnTime,
            WateringStatus::Ok => Timeliness::Early,
        }
    }

    /// Text stored in the care event's `notes`.
    pub fn note(&self) -> &'static str {
        match self {
            Timeliness::Early => "Watered too early",
            Timeliness::OnTime => "Watered on time",
            Timeliness::Late => "Watered late",
        }
    }
}

/// The two inputs every urgency computation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WateringSchedule {
    /// `None` means the plant has never been watered.
    pub last_watered: Option<DateTime<Utc>>,
    pub frequency_days: i32,
}

impl WateringSchedule {
    pub fn new(last_watered: Option<DateTime<Utc>>, frequency_days: i32) -> Self {
        Self {
            last_watered,
            frequency_days,
        }
    }

    pub fn next_watering(&self) -> Option<DateTime<Utc>> {
        self.last_watered
            .map(|last| next_watering_date(last, self.frequency_days))
    }

    /// Never-watered plants are infinitely far through their interval.
    pub fn elapsed_fraction(&self, now: DateTime<Utc>) -> Result<f64, InvalidScheduleError> {
        match self.last_watered {
            Some(last) => elapsed_fraction(last, self.frequency_days, now),
            None => {
                ensure_positive(self.frequency_days)?;
                Ok(f64::INFINITY)
            }
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> Result<WateringStatus, InvalidScheduleError> {
        self.elapsed_fraction(now).map(classify)
    }

    /// Negative once the next watering is in the past. `None` sorts first.
    pub fn time_until_next_watering(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.next_watering().map(|next| next - now)
    }
}

/// Anything carrying a watering schedule can be ordered by urgency.
pub trait HasSchedule {
    fn schedule(&self) -> WateringSchedule;
}

impl<T: HasSchedule> HasSchedule for &T {
    fn schedule(&self) -> WateringSchedule {
        (**self).schedule()
    }
}

impl HasSchedule for WateringSchedule {
    fn schedule(&self) -> WateringSchedule {
        *self
    }
}

impl HasSchedule for Plant {
    fn schedule(&self) -> WateringSchedule {
        WateringSchedule::new(self.last_watered_date, self.watering_frequency_days)
    }
}

impl HasSchedule for PlantDetails {
    fn schedule(&self) -> WateringSchedule {
        self.plant.schedule()
    }
}

pub fn next_watering_date(last_watered: DateTime<Utc>, frequency_days: i32) -> DateTime<Utc> {
    last_watered + Duration::days(i64::from(frequency_days))
}

/// `(now - last_watered) / frequency_days`, clamped at zero when
/// `last_watered` lies in the future.
pub fn elapsed_fraction(
    last_watered: DateTime<Utc>,
    frequency_days: i32,
    now: DateTime<Utc>,
) -> Result<f64, InvalidScheduleError> {
    ensure_positive(frequency_days)?;
    let elapsed_ms = (now - last_watered).num_milliseconds().max(0);
    let interval_ms = i64::from(frequency_days) * MILLIS_PER_DAY;
    Ok(elapsed_ms as f64 / interval_ms as f64)
}

pub fn classify(fraction: f64) -> WateringStatus {
    if fraction >= OVERDUE_THRESHOLD {
        WateringStatus::Overdue
    } else if fraction >= DUE_SOON_THRESHOLD {
        WateringStatus::DueSoon
    } else {
        WateringStatus::Ok
    }
}

/// Stable sort, most overdue first.
pub fn order_by_urgency<T: HasSchedule>(mut plants: Vec<T>, now: DateTime<Utc>) -> Vec<T> {
    plants.sort_by_key(|p| p.schedule().time_until_next_watering(now));
    plants
}

/// Waters `plant` at `now`. The care event's note is judged on the schedule
/// as it stood before this watering.
pub fn record_watering(
    plant: &Plant,
    now: DateTime<Utc>,
) -> Result<(Plant, CareEvent), InvalidScheduleError> {
    let fraction = plant.schedule().elapsed_fraction(now)?;
    let timeliness = Timeliness::from_fraction(fraction);

    let mut watered = plant.clone();
    watered.last_watered_date = Some(now);

    let event = CareEvent::new(plant.id, WATERING_CARE_TYPE, timeliness.note(), now);

    Ok((watered, event))
}

fn ensure_positive(frequency_days: i32) -> Result<(), InvalidScheduleError> {
    if frequency_days <= 0 {
        return Err(InvalidScheduleError { frequency_days });
    }
    Ok(())
}
