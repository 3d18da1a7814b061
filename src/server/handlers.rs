use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::error::PredictionError;
use crate::predictor::{predict_request, PredictionRequest};
use crate::server::page::{self, PageOutcome, HTML_CONTENT_TYPE};
use crate::server::SharedModel;
use crate::shared_data::PredictionResponse;

/// Urlencoded fields posted by the HTML form.
#[derive(Debug, Default, Deserialize)]
pub struct PredictionForm {
    pub temperature: Option<String>,
    pub day_of_week: Option<String>,
    pub location: Option<String>,
    pub time_of_day: Option<String>,
}

fn log_failure(err: &PredictionError) {
    if err.is_client_error() {
        log::warn!("Rejected prediction request: {}", err);
    } else {
        log::error!("Prediction failed: {}", err);
    }
}

// GET /
pub async fn home() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(HTML_CONTENT_TYPE)
        .body(page::render(None))
}

// POST /
pub async fn predict_form(model: SharedModel, form: web::Form<PredictionForm>) -> HttpResponse {
    let form = form.into_inner();
    let request = PredictionRequest::from_text_fields(
        form.temperature,
        form.day_of_week,
        form.location,
        form.time_of_day,
    );
    match predict_request(&model, request) {
        Ok(volume) => {
            log::debug!("Form prediction: {}", volume);
            HttpResponse::Ok()
                .content_type(HTML_CONTENT_TYPE)
                .body(page::render(Some(&PageOutcome::Prediction(volume))))
        }
        Err(err) => {
            log_failure(&err);
            HttpResponse::build(err.status_code())
                .content_type(HTML_CONTENT_TYPE)
                .body(page::render(Some(&PageOutcome::Error(err.to_string()))))
        }
    }
}

// POST /predict
pub async fn predict_json(
    req: HttpRequest,
    body: web::Bytes,
    model: SharedModel,
) -> Result<HttpResponse, PredictionError> {
    handle_json(&req, &body, &model).map_err(|err| {
        log_failure(&err);
        err
    })
}

fn handle_json(
    req: &HttpRequest,
    body: &[u8],
    model: &SharedModel,
) -> Result<HttpResponse, PredictionError> {
    let content_type = req.content_type();
    if !content_type.eq_ignore_ascii_case("application/json") {
        return Err(PredictionError::UnsupportedMediaType(
            content_type.to_string(),
        ));
    }

    let request = PredictionRequest::from_json(body)?;
    let traffic_volume = predict_request(model, request)?;
    log::debug!("JSON prediction: {}", traffic_volume);
    Ok(HttpResponse::Ok().json(PredictionResponse { traffic_volume }))
}
