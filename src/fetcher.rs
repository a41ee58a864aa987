use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{PainelError, Result};
use crate::fmt::reais;

/// Shown when an error response carries no usable `message`.
pub const GENERIC_FETCH_ERROR: &str = "Erro ao buscar dados";

/// Inputs that were in effect when an orders request was made.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchContext {
    pub date: NaiveDate,
    pub monthly_goal: f64,
    pub business_days: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchError {
    pub message: String,
    pub status: Option<u16>,
    pub context: Option<FetchContext>,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            context: None,
        }
    }

    pub fn with_context(mut self, context: FetchContext) -> Self {
        self.context = Some(context);
        self
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {status})")?;
        }
        if let Some(ctx) = &self.context {
            write!(
                f,
                " [date {}, goal {}, {} business days]",
                ctx.date.format("%Y-%m-%d"),
                reais(ctx.monthly_goal),
                ctx.business_days
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for FetchError {}

/// Attach request context to a fetch failure; other errors pass through.
pub fn with_context(err: PainelError, context: FetchContext) -> PainelError {
    match err {
        PainelError::Fetch(e) => PainelError::Fetch(e.with_context(context)),
        other => other,
    }
}

/// Something that answers JSON-array requests. One call, one attempt.
pub trait JsonSource {
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Value>>;
    fn post(&self, path: &str, body: &Value) -> Result<Vec<Value>>;
}

/// [`JsonSource`] backed by a blocking HTTP client.
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl JsonSource for HttpSource {
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Value>> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(transport_error)?;
        read_array(resp)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Vec<Value>> {
        let url = self.url(path);
        debug!(%url, %body, "POST");
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(transport_error)?;
        read_array(resp)
    }
}

fn transport_error(e: reqwest::Error) -> PainelError {
    error!("request failed: {e}");
    FetchError::new(e.to_string()).into()
}

fn read_array(resp: Response) -> Result<Vec<Value>> {
    let status = resp.status();
    let body = resp.text().map_err(transport_error)?;
    if !status.is_success() {
        let message = error_message(&body);
        error!(status = status.as_u16(), %message, "backend returned an error");
        return Err(FetchError {
            message,
            status: Some(status.as_u16()),
            context: None,
        }
        .into());
    }
    parse_array(&body)
}

/// The `message` field of an error payload, or the generic message.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FETCH_ERROR.to_string())
}

/// A success body must be a JSON array; its items are returned untouched.
pub fn parse_array(body: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::new(format!("response is not JSON: {e}")))?;
    match value {
        Value::Array(items) => Ok(items),
        other => {
            let kind = match other {
                Value::Object(_) => "an object",
                Value::Null => "null",
                Value::String(_) => "a string",
                _ => "a scalar",
            };
            Err(FetchError::new(format!("expected a JSON array, got {kind}")).into())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use serde_json::Value;

    use super::{FetchError, JsonSource};
    use crate::error::Result;

    /// Answers every request with the same rows and remembers what was asked.
    pub struct StaticSource {
        rows: std::result::Result<Vec<Value>, FetchError>,
        pub calls: Mutex<Vec<String>>,
    }

    impl StaticSource {
        pub fn ok(rows: Vec<Value>) -> Self {
            Self {
                rows: Ok(rows),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(err: FetchError) -> Self {
            Self {
                rows: Err(err),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn answer(&self, call: String) -> Result<Vec<Value>> {
            self.calls.lock().unwrap().push(call);
            self.rows.clone().map_err(Into::into)
        }
    }

    impl JsonSource for StaticSource {
        fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Value>> {
            let q: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
            self.answer(format!("GET {path}?{}", q.join("&")))
        }

        fn post(&self, path: &str, body: &Value) -> Result<Vec<Value>> {
            self.answer(format!("POST {path} {body}"))
        }
    }
}
