// predictor/mod.rs
//
// Turns a raw request record into a rounded traffic volume. Validation runs
// before the model is touched, so every failure that reaches inference is a
// genuine internal error.

use crate::error::PredictionError;
use crate::model::FittedPipeline;
use crate::shared_data::TrafficFeatures;
use serde::Deserialize;
use serde_json::Value;

/// An unvalidated request body. Every field is optional here so that a missing
/// field surfaces as a typed `MissingField` rather than a generic parse error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PredictionRequest {
    pub temperature: Option<Value>,
    pub day_of_week: Option<Value>,
    pub location: Option<Value>,
    pub time_of_day: Option<Value>,
}

impl PredictionRequest {
    /// Parses a JSON body. The body must be an object; unknown keys are ignored.
    pub fn from_json(body: &[u8]) -> Result<Self, PredictionError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| PredictionError::MalformedBody(e.to_string()))?;
        if !value.is_object() {
            return Err(PredictionError::MalformedBody(
                "expected a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| PredictionError::MalformedBody(e.to_string()))
    }

    /// Builds a request from form fields, which always arrive as text.
    pub fn from_text_fields(
        temperature: Option<String>,
        day_of_week: Option<String>,
        location: Option<String>,
        time_of_day: Option<String>,
    ) -> Self {
        Self {
            temperature: temperature.map(Value::String),
            day_of_week: day_of_week.map(Value::String),
            location: location.map(Value::String),
            time_of_day: time_of_day.map(Value::String),
        }
    }

    /// Checks presence and types of every field.
    pub fn validate(self) -> Result<TrafficFeatures, PredictionError> {
        Ok(TrafficFeatures {
            temperature: parse_temperature(self.temperature)?,
            day_of_week: require_text("day_of_week", self.day_of_week)?,
            location: require_text("location", self.location)?,
            time_of_day: require_text("time_of_day", self.time_of_day)?,
        })
    }
}

fn parse_temperature(value: Option<Value>) -> Result<f64, PredictionError> {
    let invalid = |reason: String| PredictionError::InvalidField {
        field: "temperature",
        reason,
    };
    let temperature = match value {
        None | Some(Value::Null) => return Err(PredictionError::MissingField("temperature")),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| invalid(format!("{} is not representable as a float", n)))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(format!("could not convert '{}' to a number", s)))?,
        // Same coercion as a float() cast: true is 1, false is 0.
        Some(Value::Bool(b)) => {
            if b {
                1.0
            } else {
                0.0
            }
        }
        Some(other) => return Err(invalid(format!("expected a number, got {}", other))),
    };
    if !temperature.is_finite() {
        return Err(invalid("must be a finite number".to_string()));
    }
    Ok(temperature)
}

fn require_text(field: &'static str, value: Option<Value>) -> Result<String, PredictionError> {
    match value {
        None | Some(Value::Null) => Err(PredictionError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(PredictionError::InvalidField {
            field,
            reason: format!("expected a string, got {}", other),
        }),
    }
}

// 2^63; every f64 in [-2^63, 2^63) converts to i64 exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Rounds half to even, so 2.5 becomes 2 and 3.5 becomes 4. Values outside
/// the i64 range are rejected instead of saturating.
pub fn round_prediction(value: f64) -> Result<i64, PredictionError> {
    let rounded = value.round_ties_even();
    if !(-I64_BOUND..I64_BOUND).contains(&rounded) {
        return Err(PredictionError::OutOfRange(value));
    }
    Ok(rounded as i64)
}

/// Normalizes the categorical inputs the same way training did and runs the
/// fitted pipeline. Read-only against `model`.
pub fn predict(model: &FittedPipeline, input: &TrafficFeatures) -> Result<i64, PredictionError> {
    let normalized = input.normalized();
    let raw = model.predict(&normalized)?;
    round_prediction(raw)
}

/// Validation and prediction in one step, as used by both HTTP paths.
pub fn predict_request(
    model: &FittedPipeline,
    request: PredictionRequest,
) -> Result<i64, PredictionError> {
    let input = request.validate()?;
    predict(model, &input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_data::TrafficRecord;
    use crate::trainer::{fit_records, read_records};
    use serde_json::json;

    fn record(temp: f64, day: &str, loc: &str, tod: &str, volume: f64) -> TrafficRecord {
        TrafficRecord {
            temperature: temp,
            day_of_week: day.into(),
            location: loc.into(),
            time_of_day: tod.into(),
            traffic_volume: volume,
        }
    }

    fn model() -> FittedPipeline {
        fit_records(vec![
            record(70.0, "Monday", "Downtown", "Morning", 120.0),
            record(65.0, "Monday", "Downtown", "Evening", 95.0),
            record(80.0, "Tuesday", "Uptown", "Morning", 80.0),
            record(60.0, "Tuesday", "Downtown", "Evening", 70.0),
            record(75.0, "Monday", "Uptown", "Morning", 100.0),
            record(50.0, "Tuesday", "Uptown", "Evening", 40.0),
        ])
        .unwrap()
    }

    fn features(temp: f64, day: &str, loc: &str, tod: &str) -> TrafficFeatures {
        TrafficFeatures {
            temperature: temp,
            day_of_week: day.into(),
            location: loc.into(),
            time_of_day: tod.into(),
        }
    }

    fn request(body: Value) -> PredictionRequest {
        PredictionRequest::from_json(body.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn casing_in_the_request_does_not_change_the_prediction() {
        let model = model();
        let lower = predict(&model, &features(70.0, "monday", "downtown", "morning")).unwrap();
        for (day, loc, tod) in [
            ("Monday", "Downtown", "Morning"),
            ("MONDAY", "DOWNTOWN", "MORNING"),
            ("mOnDaY", "downTOWN", "Morning"),
        ] {
            assert_eq!(predict(&model, &features(70.0, day, loc, tod)).unwrap(), lower);
        }
    }

    #[test]
    fn repeated_predictions_are_identical() {
        let model = model();
        let input = features(68.0, "tuesday", "uptown", "evening");
        let first = predict(&model, &input).unwrap();
        for _ in 0..10 {
            assert_eq!(predict(&model, &input).unwrap(), first);
        }
    }

    #[test]
    fn single_training_row_is_reproduced() {
        let model = fit_records(vec![record(70.0, "Monday", "Downtown", "Morning", 120.0)]).unwrap();
        let input = request(json!({
            "temperature": 70,
            "day_of_week": "monday",
            "location": "downtown",
            "time_of_day": "morning"
        }));
        assert_eq!(predict_request(&model, input).unwrap(), 120);
    }

    #[test]
    fn extreme_temperatures_still_predict() {
        let model = model();
        for temp in [0.0, -40.0, 1.0e6] {
            assert!(predict(&model, &features(temp, "monday", "uptown", "evening")).is_ok());
        }
    }

    #[test]
    fn temperature_accepts_numeric_strings() {
        let input = request(json!({
            "temperature": " 71.5 ",
            "day_of_week": "Monday",
            "location": "Downtown",
            "time_of_day": "Morning"
        }))
        .validate()
        .unwrap();
        assert_eq!(input.temperature, 71.5);
        // Validation leaves casing alone; `predict` normalizes.
        assert_eq!(input.day_of_week, "Monday");
    }

    #[test]
    fn missing_and_null_fields_are_reported_by_name() {
        let err = request(json!({
            "day_of_week": "monday",
            "location": "downtown",
            "time_of_day": "morning"
        }))
        .validate()
        .unwrap_err();
        assert!(matches!(err, PredictionError::MissingField("temperature")));

        let err = request(json!({
            "temperature": 70,
            "day_of_week": "monday",
            "location": null,
            "time_of_day": "morning"
        }))
        .validate()
        .unwrap_err();
        assert!(matches!(err, PredictionError::MissingField("location")));
    }

    #[test]
    fn wrong_types_are_invalid_fields() {
        let err = request(json!({
            "temperature": "warm",
            "day_of_week": "monday",
            "location": "downtown",
            "time_of_day": "morning"
        }))
        .validate()
        .unwrap_err();
        assert!(matches!(
            err,
            PredictionError::InvalidField {
                field: "temperature",
                ..
            }
        ));

        let err = request(json!({
            "temperature": 70,
            "day_of_week": 1,
            "location": "downtown",
            "time_of_day": "morning"
        }))
        .validate()
        .unwrap_err();
        assert!(matches!(
            err,
            PredictionError::InvalidField {
                field: "day_of_week",
                ..
            }
        ));

        let err = request(json!({
            "temperature": "inf",
            "day_of_week": "monday",
            "location": "downtown",
            "time_of_day": "morning"
        }))
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn non_object_bodies_are_malformed() {
        for body in ["[1, 2]", "not json", "42", ""] {
            assert!(matches!(
                PredictionRequest::from_json(body.as_bytes()),
                Err(PredictionError::MalformedBody(_))
            ));
        }
    }

    #[test]
    fn unseen_category_is_rejected_with_its_name() {
        let model = model();
        let err = predict(&model, &features(70.0, "Monday", "Airport", "Morning")).unwrap_err();
        assert!(matches!(err, PredictionError::UnknownCategory(_)));
        assert!(err.to_string().contains("'airport'"));
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_prediction(2.5).unwrap(), 2);
        assert_eq!(round_prediction(3.5).unwrap(), 4);
        assert_eq!(round_prediction(119.6).unwrap(), 120);
        assert_eq!(round_prediction(-0.5).unwrap(), 0);
        assert_eq!(round_prediction(-1.5).unwrap(), -2);
    }

    #[test]
    fn rounding_rejects_values_beyond_i64() {
        assert_eq!(round_prediction(-I64_BOUND).unwrap(), i64::MIN);
        assert_eq!(round_prediction(1.0e18).unwrap(), 1_000_000_000_000_000_000);
        for value in [I64_BOUND, 2.0e30, -2.0e30] {
            assert!(matches!(
                round_prediction(value),
                Err(PredictionError::OutOfRange(v)) if v == value
            ));
        }
    }

    #[test]
    fn huge_temperature_is_reported_not_clamped() {
        // volume = 2 * temperature
        let model = fit_records(vec![
            record(10.0, "Monday", "Downtown", "Morning", 20.0),
            record(20.0, "Monday", "Downtown", "Morning", 40.0),
            record(30.0, "Monday", "Downtown", "Morning", 60.0),
        ])
        .unwrap();
        let err = predict(&model, &features(1.0e30, "monday", "downtown", "morning")).unwrap_err();
        assert!(matches!(err, PredictionError::OutOfRange(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn boolean_temperature_coerces_like_a_float_cast() {
        for (flag, expected) in [(true, 1.0), (false, 0.0)] {
            let input = request(json!({
                "temperature": flag,
                "day_of_week": "monday",
                "location": "downtown",
                "time_of_day": "morning"
            }))
            .validate()
            .unwrap();
            assert_eq!(input.temperature, expected);
        }
    }

    #[test]
    fn whitespace_in_dataset_cells_matches_any_request_spelling() {
        let csv = "temperature,day_of_week,location,time_of_day,traffic_volume\n\
                   70,Monday ,Downtown,Morning,120\n\
                   60,Tuesday, Uptown,Evening ,80\n";
        let model = fit_records(read_records(csv.as_bytes()).unwrap()).unwrap();
        let expected = predict(&model, &features(70.0, "monday", "downtown", "morning")).unwrap();
        for day in ["MONDAY ", " monday", "Monday"] {
            assert_eq!(
                predict(&model, &features(70.0, day, "Downtown", "Morning")).unwrap(),
                expected
            );
        }
        assert!(predict(&model, &features(60.0, "tuesday", "UPTOWN ", " evening")).is_ok());
    }

    #[test]
    fn form_fields_validate_like_json() {
        let input = PredictionRequest::from_text_fields(
            Some("70".into()),
            Some("Monday".into()),
            Some("Downtown".into()),
            None,
        );
        assert!(matches!(
            input.validate(),
            Err(PredictionError::MissingField("time_of_day"))
        ));
    }
}
