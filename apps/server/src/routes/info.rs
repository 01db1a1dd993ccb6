use actix_web::{HttpResponse, Responder, get, web};
use ipcheck::CheckService;

macros_utils::routes! {
    route info_route,
}

#[get("/")]
pub async fn info_route(service: web::Data<CheckService>) -> impl Responder {
    HttpResponse::Ok().json(service.info())
}
