use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use std::error::Error;
use traffic_volume_predictor::global_variables::ServerConfig;
use traffic_volume_predictor::server;
use traffic_volume_predictor::trainer::train;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = ServerConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        e
    })?;

    // The model must exist before the socket is bound.
    let dataset_path = config.dataset_path.clone();
    let model = match tokio::task::spawn_blocking(move || train(dataset_path)).await? {
        Ok(model) => server::shared_model(model),
        Err(e) => {
            log::error!("Cannot start without a trained model: {}", e);
            return Err(e.into());
        }
    };

    let (host, port) = config.bind_address();
    log::info!("Serving traffic volume predictions on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(server::cors())
            .app_data(model.clone())
            .configure(server::configure)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
