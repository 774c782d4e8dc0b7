//! Transport seam between the typed client and the network.
//!
//! `HttpTransport` talks to the real backend over reqwest. Tests swap in
//! `RecordingTransport`, which answers from a script and remembers every
//! request it saw.

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

use super::error::ApiError;
use crate::credentials::BearerToken;

/// One backend request, already resolved to a path under the base URL.
#[derive(Debug)]
pub struct ApiRequest<'a> {
    pub method: Method,
    pub path: String,
    pub token: Option<&'a BearerToken>,
    pub body: Option<Value>,
}

/// Sends requests and returns the decoded JSON body.
///
/// An empty success body comes back as `Value::Null`.
pub trait Transport {
    fn send(&self, request: ApiRequest<'_>) -> Result<Value, ApiError>;
}

// ═══════════════════════════════════════════════════════════
// HttpTransport
// ═══════════════════════════════════════════════════════════

/// Blocking HTTP transport for the telehealth backend.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Create a transport for `base_url`. `timeout` of `None` keeps reqwest's defaults.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("careline/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_connect() {
            ApiError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::HttpClient(e.to_string())
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ApiRequest<'_>) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "api_request",
            method = %request.method,
            path = %request.path,
            %request_id,
        );
        let _enter = span.enter();

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header("X-Request-Id", request_id.to_string())
            .header("Accept", "application/json");
        if let Some(token) = request.token {
            builder = builder.bearer_auth(token.expose());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(authorized = request.token.is_some(), "Sending request");
        let response = builder.send().map_err(|e| {
            let err = self.map_send_error(e);
            tracing::warn!(error = %err, timeout = ?self.timeout, "Request failed");
            err
        })?;

        let status = response.status();
        let text = response.text().map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16(), &request.path, &text);
            tracing::warn!(status = status.as_u16(), error = %err, "Backend rejected request");
            return Err(err);
        }

        tracing::debug!(status = status.as_u16(), bytes = text.len(), "Response received");
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode {
            endpoint: request.path.clone(),
            reason: e.to_string(),
        })
    }
}

// ═══════════════════════════════════════════════════════════
// RecordingTransport: scripted test double
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) use recording::RecordingTransport;


#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    use axum::extract::Json;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::Router;

    /// Serve `app` on an ephemeral localhost port from a background runtime.
    fn spawn_backend(app: Router) -> SocketAddr {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        rx.recv().unwrap()
    }

    fn echo_auth(headers: HeaderMap) -> Json<Value> {
        let auth = headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let request_id = headers.contains_key("X-Request-Id");
        Json(serde_json::json!({ "auth": auth, "requestId": request_id }))
    }

    fn test_app() -> Router {
        Router::new()
            .route("/api/echo", get(|headers: HeaderMap| async move { echo_auth(headers) }))
            .route(
                "/api/body",
                post(|Json(body): Json<Value>| async move { Json(body) }),
            )
            .route("/api/empty", post(|| async { StatusCode::NO_CONTENT }))
            .route(
                "/api/conflict",
                post(|| async {
                    (
                        StatusCode::CONFLICT,
                        Json(serde_json::json!({"message": "Slot already booked"})),
                    )
                }),
            )
            .route("/api/expired", get(|| async { StatusCode::UNAUTHORIZED }))
            .route("/api/garbage", get(|| async { "<html>oops</html>" }))
    }

    fn request<'a>(method: Method, path: &str) -> ApiRequest<'a> {
        ApiRequest {
            method,
            path: path.to_string(),
            token: None,
            body: None,
        }
    }

    #[test]
    fn sends_bearer_token_and_request_id() {
        let addr = spawn_backend(test_app());
        let transport = HttpTransport::new(&format!("http://{addr}/"), None).unwrap();
        let token = BearerToken::new("tok-123").unwrap();

        let mut req = request(Method::GET, "/api/echo");
        req.token = Some(&token);
        let value = transport.send(req).unwrap();

        assert_eq!(value["auth"], "Bearer tok-123");
        assert_eq!(value["requestId"], true);
    }

    #[test]
    fn omits_authorization_without_token() {
        let addr = spawn_backend(test_app());
        let transport = HttpTransport::new(&format!("http://{addr}"), None).unwrap();
        let value = transport.send(request(Method::GET, "/api/echo")).unwrap();
        assert_eq!(value["auth"], "");
    }

    #[test]
    fn posts_json_body() {
        let addr = spawn_backend(test_app());
        let transport = HttpTransport::new(&format!("http://{addr}"), None).unwrap();
        let mut req = request(Method::POST, "/api/body");
        req.body = Some(serde_json::json!({"reason": "Headache"}));
        let value = transport.send(req).unwrap();
        assert_eq!(value["reason"], "Headache");
    }

    #[test]
    fn empty_body_is_null() {
        let addr = spawn_backend(test_app());
        let transport = HttpTransport::new(&format!("http://{addr}"), None).unwrap();
        let value = transport.send(request(Method::POST, "/api/empty")).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn error_status_carries_server_message() {
        let addr = spawn_backend(test_app());
        let transport = HttpTransport::new(&format!("http://{addr}"), None).unwrap();
        match transport.send(request(Method::POST, "/api/conflict")) {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "Slot already booked");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let addr = spawn_backend(test_app());
        let transport = HttpTransport::new(&format!("http://{addr}"), None).unwrap();
        assert!(matches!(
            transport.send(request(Method::GET, "/api/expired")),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn unknown_route_is_not_found() {
        let addr = spawn_backend(test_app());
        let transport = HttpTransport::new(&format!("http://{addr}"), None).unwrap();
        assert!(matches!(
            transport.send(request(Method::GET, "/api/missing")),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn non_json_body_is_decode_error() {
        let addr = spawn_backend(test_app());
        let transport = HttpTransport::new(&format!("http://{addr}"), None).unwrap();
        match transport.send(request(Method::GET, "/api/garbage")) {
            Err(ApiError::Decode { endpoint, .. }) => assert_eq!(endpoint, "/api/garbage"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unreachable_server_is_connection_error() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let transport = HttpTransport::new(&format!("http://127.0.0.1:{port}"), None).unwrap();
        assert!(matches!(
            transport.send(request(Method::GET, "/api/echo")),
            Err(ApiError::Connection(_))
        ));
    }

    #[test]
    fn base_url_trims_trailing_slash() {
        let transport = HttpTransport::new("http://localhost:5000/", None).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:5000");
    }
}
