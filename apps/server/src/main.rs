#![warn(clippy::all, clippy::pedantic)]

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use ipcheck::{CheckService, ConfigError, EchoCapability, ProbePolicy};
use tracing::{info, warn};

mod config;
mod cors;
mod error;
mod routes;

use config::ServerConfig;
use error::AppError;
use logger::init_tracing;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    init_tracing();

    let config = ServerConfig::from_env();
    let policy = load_policy(&config)?;
    info!("\n{policy}");

    // Detected once; every request reuses this answer
    let capability = EchoCapability::detect(&policy).await;
    let service = web::Data::new(CheckService::from_policy(policy, capability));

    let ip: IpAddr = config.bind.parse()?;
    run_server(SocketAddr::new(ip, config.port), service, config.cors_origins).await
}

fn load_policy(config: &ServerConfig) -> Result<ProbePolicy, AppError> {
    let policy = match &config.policy_path {
        Some(path) => ProbePolicy::from_config(Some(path))?,
        None => match ProbePolicy::from_config(None::<&Path>) {
            Ok(policy) => policy,
            Err(ConfigError::PathUnavailable) => {
                warn!("No config directory available, using the default probe policy");
                ProbePolicy::default()
            }
            Err(error) => return Err(error.into()),
        },
    };

    let Some(concurrency) = config.concurrency else {
        return Ok(policy);
    };
    let policy = policy.with_concurrency(concurrency);
    policy.validate()?;
    Ok(policy)
}

async fn run_server(
    addr: SocketAddr,
    service: web::Data<CheckService>,
    cors_origins: Vec<String>,
) -> Result<(), AppError> {
    info!("Listening on http://{addr}");
    if cors_origins.is_empty() {
        info!("CORS allows any origin");
    } else {
        info!("CORS origins: {}", cors_origins.join(", "));
    }

    HttpServer::new(move || {
        App::new()
            .wrap(cors::cors(&cors_origins))
            .wrap(Logger::default())
            .app_data(service.clone())
            .app_data(routes::json_config())
            .configure(routes::routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
