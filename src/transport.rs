// HTTP plumbing for the hub: one reqwest client per session carrying the
// secret header and timeouts, a bounded retry loop for transient server
// errors, and the mapping from HTTP failures onto `Error`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, trace};

use crate::{Error, Result};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(1500);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(2000);
pub const DEFAULT_RETRIES: u32 = 3;

// Sent as `SECRET`; header names are case-insensitive.
const SECRET_HEADER: &str = "secret";
const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Extra attempts after the first one, only for GETs answered with
    /// `RETRY_STATUSES`. PATCHes are never re-sent.
    pub retries: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }
}

pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl Transport {
    pub fn new(base_url: String, secret: &str, config: &TransportConfig) -> Result<Self> {
        let mut secret_value = HeaderValue::from_str(secret)
            .map_err(|e| Error::Config(format!("hub secret is not a valid header value: {e}")))?;
        secret_value.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(SECRET_HEADER), secret_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            retries: config.retries,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and return the raw body of a 2xx response.
    pub async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self.execute(Method::GET, path, None).await;
        let resp = classify(&Method::GET, path, resp).await?;
        let body = resp.bytes().await.map_err(|e| send_error(path, e))?;
        Ok(body.to_vec())
    }

    /// PATCH `path` with a JSON body. Returns the 2xx status and body text.
    pub async fn patch(&self, path: &str, body: &Value) -> Result<(StatusCode, String)> {
        let resp = self.execute(Method::PATCH, path, Some(body)).await;
        let resp = classify(&Method::PATCH, path, resp).await?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| send_error(path, e))?;
        Ok((status, text))
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> std::result::Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;
        loop {
            trace!(%method, url = %url, attempt, "sending request");
            let mut req = self.http.request(method.clone(), &url);
            if let Some(body) = body {
                req = req.json(body);
            }
            let resp = req.send().await?;
            let status = resp.status().as_u16();
            let retryable = method == Method::GET && RETRY_STATUSES.contains(&status);
            if retryable && attempt < self.retries {
                attempt += 1;
                debug!(%method, path, status, attempt, "transient hub error, retrying");
                continue;
            }
            return Ok(resp);
        }
    }
}

fn send_error(path: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() || e.is_connect() {
        debug!(path, "connection to hub failed or timed out");
        Error::Timeout {
            path: path.to_string(),
            source: e,
        }
    } else {
        Error::Http {
            path: path.to_string(),
            source: e,
        }
    }
}

async fn classify(
    method: &Method,
    path: &str,
    resp: std::result::Result<Response, reqwest::Error>,
) -> Result<Response> {
    let resp = resp.map_err(|e| send_error(path, e))?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(Error::Authentication {
            path: path.to_string(),
        }),
        StatusCode::NOT_FOUND => Err(Error::Request {
            path: path.to_string(),
            status: status.as_u16(),
        }),
        StatusCode::METHOD_NOT_ALLOWED if *method == Method::PATCH => Err(Error::Request {
            path: path.to_string(),
            status: status.as_u16(),
        }),
        _ => {
            let body = resp.text().await.unwrap_or_default();
            Err(Error::Protocol {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            })
        }
    }
}
