//! Cross-origin policy for browser callers.
//!
//! Requests without an `Origin` header pass straight through. Requests from
//! origins outside the allow-list are still served, they just get no
//! `Access-Control-Allow-Origin` header, so the browser withholds the
//! response from the page.

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::warn;

use crate::config::CorsPolicy;

pub fn cors_layer(policy: &CorsPolicy) -> CorsLayer {
    let origin = match policy {
        CorsPolicy::Any => AllowOrigin::any(),
        CorsPolicy::List(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %origin, "cors_invalid_origin_skipped");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
}
