use actix_web::error::InternalError;
use actix_web::{HttpResponse, web};
use serde_json::json;

mod check;
mod health;
mod info;

/// Largest accepted JSON body
const JSON_LIMIT: usize = 4 * 1024 * 1024;

/// Register every route of the server
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::routes)
        .configure(info::routes)
        .service(web::scope("/api").configure(check::routes));
}

/// JSON extractor settings: malformed bodies become 400 `{"error": ...}`
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().limit(JSON_LIMIT).error_handler(|err, _req| {
        let body = json!({ "error": format!("invalid request body: {err}") });
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}
