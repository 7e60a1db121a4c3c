// API client module: a small blocking HTTP client that talks to the
// Pikarama REST API. Every call is one request; there are no retries and no
// timeouts beyond reqwest's defaults.
//
// Requests are plain values (`Request`) so the rest of the crate can be
// driven by any `Transport`; `ApiClient` is the real one.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

pub use reqwest::Method;

/// Base URL used when neither `--api-url` nor `PIKARAMA_API_URL` is set.
pub const DEFAULT_BASE_URL: &str = "https://www.pikarama.com/api/v1";

/// One call against the API, relative to the client's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Request {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Request {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, params: &[(&str, Value)]) -> Self {
        self.query = query_pairs(params);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Build query pairs, dropping parameters that are null or empty strings.
/// Everything else is stringified as-is (strings without quotes).
pub fn query_pairs(params: &[(&str, Value)]) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) if s.is_empty() => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.to_string(), text))
        })
        .collect()
}

/// Turn a raw HTTP answer into the parsed body or an `Error::Api`.
///
/// An empty body yields `Value::Null`. A body that is not JSON is kept as
/// text for error reporting and dropped on success.
pub fn interpret_response(status: StatusCode, text: &str) -> Result<Value> {
    let parsed = if text.is_empty() {
        None
    } else {
        serde_json::from_str::<Value>(text).ok()
    };

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: status.to_string(),
            body: parsed.unwrap_or_else(|| Value::String(text.to_string())),
        });
    }

    Ok(parsed.unwrap_or(Value::Null))
}

/// Anything able to execute a `Request`. The CLI uses `ApiClient`; tests
/// substitute canned responses.
pub trait Transport {
    fn send(&self, request: &Request) -> Result<Value>;

    /// Attach the bearer token used for subsequent requests.
    fn set_token(&mut self, token: &str);
}

/// Simple API client that holds a reqwest blocking client, the base URL of
/// the API and an optional bearer token for authenticated calls.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers sent with every request: JSON accept plus the bearer token
    /// when one is set.
    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(t) = &self.token {
            let val = HeaderValue::from_str(&format!("Bearer {}", t))
                .map_err(|_| Error::cli("The stored API token contains invalid characters."))?;
            headers.insert(AUTHORIZATION, val);
        }
        Ok(headers)
    }
}

impl Transport for ApiClient {
    fn send(&self, request: &Request) -> Result<Value> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, %url, query = ?request.query, "sending request");

        let mut req = self
            .client
            .request(request.method.clone(), &url)
            .headers(self.auth_headers()?)
            .query(&request.query);
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let res = req.send()?;
        let status = res.status();
        let text = res.text()?;
        debug!(status = status.as_u16(), bytes = text.len(), "response received");

        interpret_response(status, &text)
    }

    fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }
}
