pub mod handlers;
pub mod page;

use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::{web, HttpResponse};

use crate::model::FittedPipeline;

/// The fitted model as injected into every handler.
pub type SharedModel = web::Data<FittedPipeline>;

pub fn shared_model(model: FittedPipeline) -> SharedModel {
    web::Data::new(model)
}

/// Registers the page and prediction routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(|err, _req| {
        let message = format!("Malformed form submission: {}", err);
        log::warn!("{}", message);
        let response = HttpResponse::BadRequest()
            .content_type(page::HTML_CONTENT_TYPE)
            .body(page::render(Some(&page::PageOutcome::Error(message))));
        InternalError::from_response(err, response).into()
    }))
    .service(
        web::resource("/")
            .route(web::get().to(handlers::home))
            .route(web::post().to(handlers::predict_form)),
    )
    .service(web::resource("/predict").route(web::post().to(handlers::predict_json)));
}

/// Any origin, method and header may call the API.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
}
