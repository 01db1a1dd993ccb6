use actix_web::{HttpResponse, Responder, get, web};
use ipcheck::CheckService;

macros_utils::routes! {
    route health_route,
}

/// Liveness plus whether echo probing is active in this process
#[get("/health")]
pub async fn health_route(service: web::Data<CheckService>) -> impl Responder {
    HttpResponse::Ok().json(service.health())
}
