use actix_cors::Cors;
use actix_web::http::{Method, header};

const PREFLIGHT_MAX_AGE_SECS: usize = 3600;

/// CORS policy for the browser report view.
///
/// With no configured origins every origin may call the API, as the report
/// view is usually served from another port.
pub fn cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(PREFLIGHT_MAX_AGE_SECS);

    if origins.is_empty() {
        return cors.allow_any_origin();
    }
    origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    use super::*;
    use crate::routes::{self, test_support};

    fn preflight(origin: &str) -> test::TestRequest {
        test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/check-multiple")
            .insert_header((header::ORIGIN, origin))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
    }

    #[actix_web::test]
    async fn any_origin_by_default() {
        let app = test::init_service(
            App::new()
                .wrap(cors(&[]))
                .app_data(test_support::service(vec![80]))
                .configure(routes::routes),
        )
        .await;

        let resp = test::call_service(&app, preflight("http://localhost:5173").to_request()).await;

        assert!(resp.status().is_success());
        let allowed = resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap();
        assert_eq!(allowed, "http://localhost:5173");
    }

    #[actix_web::test]
    async fn configured_origins_only() {
        let origins = vec!["https://report.example".to_string()];
        let app = test::init_service(
            App::new()
                .wrap(cors(&origins))
                .app_data(test_support::service(vec![80]))
                .configure(routes::routes),
        )
        .await;

        let resp = test::call_service(&app, preflight("https://report.example").to_request()).await;
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://report.example"
        );

        let resp = test::call_service(&app, preflight("https://elsewhere.example").to_request()).await;
        assert_ne!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
