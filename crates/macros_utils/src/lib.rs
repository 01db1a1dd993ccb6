//! Small declarative helpers shared by the ipcheck binaries.

#[cfg(feature = "actix")]
#[doc(hidden)]
pub mod __private {
    pub use actix_web;
}

/// Generate a `routes` function registering actix-web services.
///
/// ```ignore
/// macros_utils::routes! {
///     route health_route,
///     route info_route,
/// }
///
/// App::new().configure(routes);
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($(route $handler:path),* $(,)?) => {
        pub fn routes(cfg: &mut $crate::__private::actix_web::web::ServiceConfig) {
            $( cfg.service($handler); )*
        }
    };
}
