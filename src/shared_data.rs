// src/shared_data.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the training dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficRecord {
    pub temperature: f64,
    pub day_of_week: String,
    pub location: String,
    pub time_of_day: String,
    pub traffic_volume: f64,
}

/// The model inputs: a training record without its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficFeatures {
    pub temperature: f64,
    pub day_of_week: String,
    pub location: String,
    pub time_of_day: String,
}

impl TrafficRecord {
    pub fn features(&self) -> TrafficFeatures {
        TrafficFeatures {
            temperature: self.temperature,
            day_of_week: self.day_of_week.clone(),
            location: self.location.clone(),
            time_of_day: self.time_of_day.clone(),
        }
    }

    /// Trims and lower-cases the categorical columns in place.
    pub fn normalize(&mut self) {
        self.day_of_week = normalize_category(&self.day_of_week);
        self.location = normalize_category(&self.location);
        self.time_of_day = normalize_category(&self.time_of_day);
    }
}

impl TrafficFeatures {
    /// Same normalization the trainer applies to every dataset row.
    pub fn normalized(&self) -> TrafficFeatures {
        TrafficFeatures {
            temperature: self.temperature,
            day_of_week: normalize_category(&self.day_of_week),
            location: normalize_category(&self.location),
            time_of_day: normalize_category(&self.time_of_day),
        }
    }

    pub fn category(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::DayOfWeek => &self.day_of_week,
            CategoricalField::Location => &self.location,
            CategoricalField::TimeOfDay => &self.time_of_day,
        }
    }
}

/// Normalization shared by training and inference. Must stay identical on both sides.
pub fn normalize_category(value: &str) -> String {
    value.trim().to_lowercase()
}

/// The one-hot encoded input columns, in feature-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    DayOfWeek,
    Location,
    TimeOfDay,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 3] = [
        CategoricalField::DayOfWeek,
        CategoricalField::Location,
        CategoricalField::TimeOfDay,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::DayOfWeek => "day_of_week",
            CategoricalField::Location => "location",
            CategoricalField::TimeOfDay => "time_of_day",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Successful `/predict` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub traffic_volume: i64,
}

/// Error response body for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
