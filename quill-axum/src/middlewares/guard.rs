use std::sync::Arc;

use axum::{
    body::Body,
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderMap, Method},
    response::{IntoResponse, Response},
};
use quill_core::errors::QuillError;
use tower::{Layer, Service};

use crate::RelayError;

/// Header carrying the client key inbound and the internal key outbound.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects requests the relay must not forward.
///
/// Checks run in order and the first failure answers:
/// method (405), content type (400), client key (401).
/// The key check only runs when a public key is configured.
#[derive(Clone, Default)]
pub struct RelayGuard {
    public_api_key: Option<Arc<str>>,
}

impl RelayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_public_api_key(mut self, key: &str) -> Self {
        self.public_api_key = Some(Arc::from(key));
        self
    }
}

impl<S> Layer<S> for RelayGuard {
    type Service = RelayGuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RelayGuardService {
            inner,
            public_api_key: self.public_api_key.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RelayGuardService<S> {
    inner: S,
    public_api_key: Option<Arc<str>>,
}

impl<S> Service<Request> for RelayGuardService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if let Err(rejection) =
            check_request(req.method(), req.headers(), self.public_api_key.as_deref())
        {
            tracing::warn!(
                method = %req.method(),
                status = rejection.code(),
                reason = %rejection.message,
                "relay request rejected"
            );
            let response = RelayError::from(rejection).into_response();
            return Box::pin(async move { Ok(response) });
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}

/// The guard's checks as a plain function.
pub fn check_request(
    method: &Method,
    headers: &HeaderMap,
    public_api_key: Option<&str>,
) -> Result<(), QuillError> {
    if method != Method::POST {
        return Err(QuillError::method_not_allowed("Method Not Allowed"));
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type
        .to_ascii_lowercase()
        .contains("multipart/form-data")
    {
        return Err(QuillError::bad_request("Invalid Content Type"));
    }

    if let Some(expected) = public_api_key {
        let provided = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            return Err(QuillError::not_authenticated("Unauthorized"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn multipart_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=X"),
        );
        headers
    }

    #[test]
    fn method_is_checked_first() {
        let err = check_request(&Method::GET, &HeaderMap::new(), Some("k")).unwrap_err();
        assert_eq!(err.code(), 405);
    }

    #[test]
    fn content_type_is_checked_before_the_key() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let err = check_request(&Method::POST, &headers, Some("k")).unwrap_err();
        assert_eq!(err.code(), 400);
    }

    #[test]
    fn key_must_match_when_configured() {
        let mut headers = multipart_headers();
        assert_eq!(check_request(&Method::POST, &headers, Some("k")).unwrap_err().code(), 401);

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("nope"));
        assert_eq!(check_request(&Method::POST, &headers, Some("k")).unwrap_err().code(), 401);

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("k"));
        assert!(check_request(&Method::POST, &headers, Some("k")).is_ok());
    }

    #[test]
    fn key_is_ignored_when_not_configured() {
        assert!(check_request(&Method::POST, &multipart_headers(), None).is_ok());
    }
}
