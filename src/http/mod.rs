//! JSON HTTP API over the service operations, served by actix-web.

pub mod routes;

use actix_web::http::StatusCode;
use actix_web::middleware::{self, DefaultHeaders};
use actix_web::{web, App, HttpResponse, HttpServer, ResponseError};
use serde_json::json;

use crate::config::ServerConfig;
use crate::error::HuffmanError;
use crate::service::HuffmanService;

pub use routes::configure;

impl ResponseError for HuffmanError {
    fn status_code(&self) -> StatusCode {
        match self {
            HuffmanError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            HuffmanError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            HuffmanError::CorruptPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if !self.is_caller_error() {
            tracing::error!("Request failed: {}", self);
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

/// Cross-origin headers added to every response.
pub fn cors_headers(origin: &str) -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", origin.to_string()))
        .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
        .add(("Access-Control-Expose-Headers", "Content-Disposition"))
}

/// Binds and runs the HTTP server until it is shut down.
pub async fn run_server(config: &ServerConfig, service: HuffmanService) -> std::io::Result<()> {
    let data = web::Data::new(service);
    let origin = config.cors_origin.clone();

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(cors_headers(&origin))
            .wrap(middleware::Logger::default())
            .configure(configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    let server = server.bind((config.host.as_str(), config.port))?;
    tracing::info!("HTTP API listening on http://{}:{}/api", config.host, config.port);
    server.run().await
}
