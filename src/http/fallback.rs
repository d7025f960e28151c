//! Route-miss handling.

use axum::http::Uri;
use axum::response::Redirect;

/// Static page unmatched requests are sent to.
pub const NOT_FOUND_PAGE: &str = "/404.html";

/// Redirect any request no route matched to the static 404 page.
pub async fn route_not_found(uri: Uri) -> Redirect {
    tracing::debug!(path = %uri.path(), "No route matched, redirecting");
    Redirect::to(NOT_FOUND_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_redirects_regardless_of_path() {
        for path in ["/", "/imageplants/p1/templates", "/a?b=c"] {
            let uri: Uri = path.parse().unwrap();
            let response = route_not_found(uri).await.into_response();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(response.headers().get(header::LOCATION).unwrap(), NOT_FOUND_PAGE);
        }
    }
}
