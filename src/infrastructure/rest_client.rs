use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Query-string pairs in PostgREST syntax, e.g. `("is_active", "eq.true")`.
pub type Params = Vec<(&'static str, String)>;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        DomainError::Remote(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    details: Option<String>,
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Thin client for the hosted table API (`{base_url}/rest/v1/{table}`).
///
/// Built once at start-up and shared by the repositories; cloning is cheap.
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, DomainError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| DomainError::Internal("access key is not a valid header value".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| DomainError::Internal("access key is not a valid header value".into()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| DomainError::Internal(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &Params,
    ) -> Result<Vec<T>, DomainError> {
        let resp = self.request(Method::GET, table).query(params).send().await?;
        read_rows(table, resp).await
    }

    /// Inserts `rows` (a single JSON array, one request) and returns the stored rows.
    pub async fn insert<B, T>(
        &self,
        table: &str,
        select: &str,
        rows: &B,
    ) -> Result<Vec<T>, DomainError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .query(&[("select", select)])
            .json(rows)
            .send()
            .await?;
        read_rows(table, resp).await
    }

    /// Applies `patch` to every row matching `filters`; returns the updated rows.
    pub async fn update<B, T>(
        &self,
        table: &str,
        filters: &Params,
        patch: &B,
    ) -> Result<Vec<T>, DomainError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .request(Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(filters)
            .json(patch)
            .send()
            .await?;
        read_rows(table, resp).await
    }

    /// Deletes every row matching `filters`; returns the deleted rows.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &Params,
    ) -> Result<Vec<T>, DomainError> {
        let resp = self
            .request(Method::DELETE, table)
            .header("Prefer", "return=representation")
            .query(filters)
            .send()
            .await?;
        read_rows(table, resp).await
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
    }
}

async fn read_rows<T: DeserializeOwned>(table: &str, resp: Response) -> Result<Vec<T>, DomainError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<Vec<T>>().await?);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody {
            message: Some(message),
            details,
        }) => match details {
            Some(details) if !details.is_empty() => format!("{message} ({details})"),
            _ => message,
        },
        _ if text.is_empty() => status.to_string(),
        _ => text,
    };
    log::warn!("request on '{}' failed with {}: {}", table, status, message);
    Err(DomainError::Remote(message))
}

pub(crate) fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use serde_json::{json, Value};

    use super::*;

    /// One request as seen by the fake backend.
    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub method: String,
        pub path: String,
        pub query: String,
        pub apikey: Option<String>,
        pub authorization: Option<String>,
        pub prefer: Option<String>,
        pub body: Value,
    }

    pub type Log = Arc<Mutex<Vec<Recorded>>>;

    pub fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .expect("bind failed")
            .local_addr()
            .expect("addr failed")
            .port()
    }

    /// Starts a throwaway backend that records every request and answers
    /// with `status` and `reply`. Returns its base URL and the request log.
    pub async fn fake_backend(status: u16, reply: Value) -> (String, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let port = free_port();
        let state = (log.clone(), status, reply);

        let server = HttpServer::new(move || {
            let (log, status, reply) = state.clone();
            App::new().default_service(web::to(move |req: HttpRequest, body: web::Bytes| {
                let log = log.clone();
                let reply = reply.clone();
                async move {
                    let header = |name: &str| {
                        req.headers()
                            .get(name)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string)
                    };
                    log.lock().unwrap().push(Recorded {
                        method: req.method().to_string(),
                        path: req.path().to_string(),
                        query: req.query_string().to_string(),
                        apikey: header("apikey"),
                        authorization: header("authorization"),
                        prefer: header("prefer"),
                        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
                    });
                    let code = actix_web::http::StatusCode::from_u16(status).unwrap();
                    HttpResponse::build(code).json(reply)
                }
            }))
        })
        .workers(1)
        .bind(("127.0.0.1", port))
        .expect("bind fake backend")
        .run();
        tokio::spawn(server);

        (format!("http://127.0.0.1:{port}/"), log)
    }

    pub fn decode(query: &str) -> String {
        query
            .replace("%3A", ":")
            .replace("%2C", ",")
            .replace("%20", " ")
    }

    #[tokio::test]
    async fn select_sends_credentials_and_params() {
        let (url, log) = fake_backend(200, json!([{ "n": 1 }])).await;
        let client = RestClient::new(&url, "anon-key").expect("client");

        let rows: Vec<Value> = client
            .select("items", &vec![("select", "*".to_string()), ("is_active", eq(true))])
            .await
            .expect("select");

        assert_eq!(rows, vec![json!({ "n": 1 })]);
        let seen = log.lock().unwrap()[0].clone();
        assert_eq!(seen.method, "GET");
        assert_eq!(seen.path, "/rest/v1/items");
        assert!(decode(&seen.query).contains("is_active=eq.true"));
        assert_eq!(seen.apikey.as_deref(), Some("anon-key"));
        assert_eq!(seen.authorization.as_deref(), Some("Bearer anon-key"));
    }

    #[tokio::test]
    async fn writes_ask_for_representation() {
        let (url, log) = fake_backend(201, json!([{ "id": 9 }])).await;
        let client = RestClient::new(&url, "k").expect("client");

        let rows: Vec<Value> = client
            .insert("orders", "id", &json!([{ "customer_name": "Lin" }]))
            .await
            .expect("insert");

        assert_eq!(rows.len(), 1);
        let seen = log.lock().unwrap()[0].clone();
        assert_eq!(seen.method, "POST");
        assert_eq!(seen.prefer.as_deref(), Some("return=representation"));
        assert_eq!(seen.body, json!([{ "customer_name": "Lin" }]));
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let reply = json!({
            "code": "23502",
            "message": "null value in column \"name\"",
            "details": null,
            "hint": null
        });
        let (url, _log) = fake_backend(400, reply).await;
        let client = RestClient::new(&url, "k").expect("client");

        let err = client
            .select::<Value>("items", &Vec::new())
            .await
            .unwrap_err();

        match err {
            DomainError::Remote(msg) => assert_eq!(msg, "null value in column \"name\""),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_remote_error() {
        let url = format!("http://127.0.0.1:{}", free_port());
        let client = RestClient::new(&url, "k").expect("client");
        let err = client
            .select::<Value>("items", &Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Remote(_)));
    }

    #[test]
    fn invalid_key_is_rejected_up_front() {
        assert!(RestClient::new("http://localhost", "bad\nkey").is_err());
    }
}
