//! Request field extraction for the write endpoints.
//!
//! Fields may arrive in the query string, a JSON body, or a url-encoded form
//! body. Issue fields prefer the query string; the issue ID prefers the
//! body. Anything unparseable is treated as absent so that every request
//! reaches the service and gets a JSON outcome.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::async_trait;
use axum::body::{Bytes, to_bytes};
use axum::extract::{FromRequest, Request};
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use issues_lib::{IssueUpdate, NewIssue, ValidationError, parse_bool};
use serde_json::{Map, Value};
use tracing::debug;

/// Largest request body read, in bytes.
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// One source of issue fields (query string or body).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFields {
    pub id: Option<String>,
    pub project_title: Option<String>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<String>,
}

impl RequestFields {
    /// Read each known field from `values`. `_id` wins over `id` unless it
    /// is empty.
    fn from_values(values: &HashMap<String, String>) -> Self {
        let get = |key: &str| values.get(key).cloned();
        Self {
            id: get("_id").filter(|id| !id.is_empty()).or_else(|| get("id")),
            project_title: get("project_title"),
            issue_title: get("issue_title"),
            issue_text: get("issue_text"),
            created_by: get("created_by"),
            assigned_to: get("assigned_to"),
            status_text: get("status_text"),
            open: get("open"),
        }
    }

    /// Parse a raw query string.
    #[must_use]
    pub fn from_query(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|q| !q.is_empty()) else {
            return Self::default();
        };
        match serde_urlencoded::from_str::<Vec<(String, String)>>(raw) {
            Ok(pairs) => Self::from_values(&first_values(pairs)),
            Err(e) => {
                debug!(error = %e, "ignoring unparseable query string");
                Self::default()
            }
        }
    }

    /// Parse a request body according to its content type.
    ///
    /// Only JSON objects and url-encoded forms are understood. Fields are
    /// read one by one, so a bad value only loses that field.
    #[must_use]
    pub fn from_body(headers: &HeaderMap, body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::default();
        }

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        let parsed = match mime.as_str() {
            "application/json" => serde_json::from_slice::<Map<String, Value>>(body)
                .map(json_values)
                .map_err(|e| e.to_string()),
            "application/x-www-form-urlencoded" => {
                serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
                    .map(first_values)
                    .map_err(|e| e.to_string())
            }
            _ => {
                debug!(content_type, "ignoring body with unsupported content type");
                return Self::default();
            }
        };

        match parsed {
            Ok(values) => Self::from_values(&values),
            Err(reason) => {
                debug!(%reason, "ignoring unparseable request body");
                Self::default()
            }
        }
    }
}

/// First value for each repeated key.
fn first_values(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut values = HashMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        values.entry(key).or_insert(value);
    }
    values
}

/// Scalar members of a JSON object as text. Null, arrays and objects are
/// dropped.
fn json_values(object: Map<String, Value>) -> HashMap<String, String> {
    object
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key, text))
        })
        .collect()
}

/// Issue fields from the query string and body of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFields {
    pub query: RequestFields,
    pub body: RequestFields,
}

impl IssueFields {
    #[must_use]
    pub fn parse(raw_query: Option<&str>, headers: &HeaderMap, body: &[u8]) -> Self {
        Self {
            query: RequestFields::from_query(raw_query),
            body: RequestFields::from_body(headers, body),
        }
    }

    /// Issue ID, body first.
    #[must_use]
    pub fn issue_id(&self) -> Option<String> {
        non_empty(self.body.id.as_ref()).or_else(|| non_empty(self.query.id.as_ref()))
    }

    /// A field value, query first. Empty values count as absent.
    fn field(&self, pick: impl Fn(&RequestFields) -> Option<&String>) -> Option<String> {
        non_empty(pick(&self.query)).or_else(|| non_empty(pick(&self.body)))
    }

    /// Creation input. The project always comes from the path.
    #[must_use]
    pub fn to_new_issue(&self, project: &str) -> NewIssue {
        NewIssue {
            project_title: Some(project.to_string()),
            issue_title: self.field(|f| f.issue_title.as_ref()),
            issue_text: self.field(|f| f.issue_text.as_ref()),
            created_by: self.field(|f| f.created_by.as_ref()),
            assigned_to: self.field(|f| f.assigned_to.as_ref()),
            status_text: self.field(|f| f.status_text.as_ref()),
        }
    }

    /// Candidate update values.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if `open` is present but not a boolean.
    pub fn to_update(&self) -> Result<IssueUpdate, ValidationError> {
        let open = match self.field(|f| f.open.as_ref()) {
            Some(raw) => Some(
                parse_bool(&raw)
                    .ok_or_else(|| ValidationError::new("open", "must be true or false"))?,
            ),
            None => None,
        };

        Ok(IssueUpdate {
            project_title: self.field(|f| f.project_title.as_ref()),
            issue_title: self.field(|f| f.issue_title.as_ref()),
            issue_text: self.field(|f| f.issue_text.as_ref()),
            created_by: self.field(|f| f.created_by.as_ref()),
            assigned_to: self.field(|f| f.assigned_to.as_ref()),
            status_text: self.field(|f| f.status_text.as_ref()),
            open,
        })
    }
}

#[async_trait]
impl<S> FromRequest<S> for IssueFields
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = to_bytes(body, BODY_LIMIT).await.unwrap_or_else(|e| {
            debug!(error = %e, "failed to read request body");
            Bytes::new()
        });
        Ok(Self::parse(parts.uri.query(), &parts.headers, &bytes))
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}
