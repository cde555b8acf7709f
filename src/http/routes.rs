use actix_web::http::header::ContentDisposition;
use actix_web::http::Method;
use actix_web::{web, HttpResponse, Resource};
use serde::Deserialize;
use serde_json::json;

use crate::error::HuffmanError;
use crate::service::{DecryptRequest, EncryptRequest, HuffmanService};

type HandlerResult = Result<HttpResponse, HuffmanError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionQuery {
    #[serde(default)]
    session_id: String,
}

/// Registers the `/api` routes. The app must carry `web::Data<HuffmanService>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json = web::JsonConfig::default()
        .limit(16 * 1024 * 1024)
        .error_handler(|err, _req| HuffmanError::InvalidInput(err.to_string()).into());
    let query = web::QueryConfig::default()
        .error_handler(|err, _req| HuffmanError::InvalidInput(err.to_string()).into());

    cfg.service(
        web::scope("/api")
            .app_data(json)
            .app_data(query)
            .service(endpoint("/encrypt").route(web::post().to(encrypt)))
            .service(endpoint("/decrypt").route(web::post().to(decrypt)))
            .service(endpoint("/visualize-tree").route(web::get().to(visualize_tree)))
            .service(endpoint("/export-tree").route(web::get().to(export_tree)))
            .service(endpoint("/health").route(web::get().to(health))),
    );
}

/// A resource that also answers CORS preflight requests.
fn endpoint(path: &str) -> Resource {
    web::resource(path).route(web::method(Method::OPTIONS).to(preflight))
}

async fn encrypt(
    service: web::Data<HuffmanService>,
    body: web::Json<EncryptRequest>,
) -> HandlerResult {
    let service = service.into_inner();
    let text = body.into_inner().text;
    let response = run_blocking(move || service.encrypt(&text)).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn decrypt(
    service: web::Data<HuffmanService>,
    body: web::Json<DecryptRequest>,
) -> HandlerResult {
    let service = service.into_inner();
    let request = body.into_inner();
    let response = run_blocking(move || service.decrypt(&request)).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn visualize_tree(
    service: web::Data<HuffmanService>,
    query: web::Query<SessionQuery>,
) -> HandlerResult {
    let service = service.into_inner();
    let session_id = query.into_inner().session_id;
    let response = run_blocking(move || service.visualize_tree(&session_id)).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn export_tree(
    service: web::Data<HuffmanService>,
    query: web::Query<SessionQuery>,
) -> HandlerResult {
    let service = service.into_inner();
    let session_id = query.into_inner().session_id;
    let document = run_blocking(move || service.export_tree(&session_id)).await?;

    Ok(HttpResponse::Ok()
        .content_type(document.content_type)
        .insert_header(ContentDisposition::attachment(document.filename))
        .body(document.bytes))
}

async fn health(service: web::Data<HuffmanService>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "sessions": service.session_count(),
    }))
}

async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Runs CPU-bound work (tree building, rasterizing) off the async workers.
async fn run_blocking<F, T>(work: F) -> Result<T, HuffmanError>
where
    F: FnOnce() -> Result<T, HuffmanError> + Send + 'static,
    T: Send + 'static,
{
    web::block(work)
        .await
        .map_err(|e| HuffmanError::Io(std::io::Error::other(e.to_string())))?
}
