use actix_web::{HttpResponse, post, web};
use ipcheck::CheckService;
use ipcheck::service::{CheckBatchRequest, CheckOneRequest};

use crate::error::ApiError;

macros_utils::routes! {
    route check_ip_route,
    route check_multiple_route,
}

#[post("/check-ip")]
pub async fn check_ip_route(
    service: web::Data<CheckService>,
    body: web::Json<CheckOneRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = service.check_one(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Rows come back in request order with passthrough fields attached
#[post("/check-multiple")]
pub async fn check_multiple_route(
    service: web::Data<CheckService>,
    body: web::Json<CheckBatchRequest>,
) -> Result<HttpResponse, ApiError> {
    let rows = service.check_batch(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rows))
}
