use axum::{extract::Request, http::header, middleware::Next, response::Response};

/// Response hardening for JSON endpoints that hand out signed URLs.
pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );

    // Signed URLs must not leak through the Referer header
    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("no-referrer"),
    );

    headers.insert(
        header::SERVER,
        header::HeaderValue::from_static("merlin-uploader"),
    );

    // Responses carry short-lived credentials or change while polling
    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-store"),
        );
    }

    response
}
