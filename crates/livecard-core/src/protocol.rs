//! JSON-lines request/response protocol over the facade.
//!
//! Each line on the input is a [`Request`]; each produces exactly one
//! [`Response`] line on the output, in order.
//!
//! ```text
//! -> {"id":1,"method":"startActivity","params":{"activityType":"Counter","attributes":{"title":"T"},"content":{"value":1}}}
//! <- {"id":1,"result":{"activityId":"...","activityType":"Counter","startTime":1718000000.1}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::ActivityError;
use crate::facade::{DismissalPolicy, LiveActivities};

/// One inbound call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Echoed back verbatim on the response.
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Error payload of a failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// One outbound reply. Exactly one of `result` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Value, code: &str, message: String) -> Self {
        Self {
            id,
            result: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message,
            }),
        }
    }
}

/// Execute one request against the facade.
pub async fn dispatch(facade: &LiveActivities, request: Request) -> Response {
    debug!(method = %request.method, "dispatching request");
    match call(facade, &request.method, &request.params).await {
        Ok(result) => Response::ok(request.id, result),
        Err(e) => Response::err(request.id, e.code(), e.to_string()),
    }
}

async fn call(facade: &LiveActivities, method: &str, params: &Value) -> Result<Value, ActivityError> {
    let params = Params::new(params)?;
    match method {
        "isSupported" => Ok(Value::Bool(facade.is_supported())),
        "startActivity" => {
            let kind = params.string("activityType")?;
            let attributes = params.record("attributes");
            let content = params.record("content");
            let info = facade.start_activity(kind, &attributes, &content).await?;
            Ok(json!(info))
        }
        "updateActivity" => {
            let id = params.string("activityId")?;
            let content = params.record("content");
            facade.update_activity(id, &content).await?;
            Ok(Value::Null)
        }
        "endActivity" => {
            let id = params.string("activityId")?;
            let policy = params.policy()?;
            facade.end_activity(id, policy).await?;
            Ok(Value::Null)
        }
        "getAllActivities" => Ok(json!(facade.get_all_activities().await)),
        "endAllActivities" => {
            let policy = params.policy()?;
            facade.end_all_activities(policy).await?;
            Ok(Value::Null)
        }
        "getActivity" => {
            let id = params.string("activityId")?;
            Ok(json!(facade.activity(id).await?))
        }
        "listKinds" => {
            let kinds: Vec<Value> = facade
                .kinds()
                .iter()
                .map(|k| {
                    json!({
                        "name": k.name,
                        "attributes": k.attribute_fields,
                        "content": k.content_fields,
                    })
                })
                .collect();
            Ok(Value::Array(kinds))
        }
        other => Err(ActivityError::InvalidArgument(format!(
            "unknown method {other:?}"
        ))),
    }
}

/// Typed access to a request's `params` object.
struct Params<'a> {
    object: Option<&'a Map<String, Value>>,
}

impl<'a> Params<'a> {
    fn new(params: &'a Value) -> Result<Self, ActivityError> {
        match params {
            Value::Null => Ok(Self { object: None }),
            Value::Object(object) => Ok(Self {
                object: Some(object),
            }),
            _ => Err(ActivityError::InvalidArgument(
                "params must be an object".to_string(),
            )),
        }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.object.and_then(|o| o.get(name)).filter(|v| !v.is_null())
    }

    fn string(&self, name: &str) -> Result<&'a str, ActivityError> {
        match self.get(name) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(_) => Err(ActivityError::InvalidArgument(format!(
                "{name} must be a string"
            ))),
            None => Err(ActivityError::InvalidArgument(format!("{name} is required"))),
        }
    }

    /// Attribute/content records; absent means an empty record so schema
    /// errors name the missing field.
    fn record(&self, name: &str) -> Value {
        self.get(name)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    fn policy(&self) -> Result<DismissalPolicy, ActivityError> {
        match self.get("dismissalPolicy") {
            None => Ok(DismissalPolicy::default()),
            Some(Value::String(s)) => s.parse(),
            Some(_) => Err(ActivityError::InvalidArgument(
                "dismissalPolicy must be a string".to_string(),
            )),
        }
    }
}

/// Serve requests line by line until the input closes.
///
/// Blank lines are skipped; lines that are not UTF-8 or not a request get
/// an `invalid_request` error with a `null` id.
pub async fn serve<R, W>(
    facade: &LiveActivities,
    mut reader: R,
    mut writer: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => match serde_json::from_str::<Request>(line.trim()) {
                Ok(request) => dispatch(facade, request).await,
                Err(e) => {
                    warn!(error = %e, "skipping malformed request line");
                    Response::err(Value::Null, "invalid_request", format!("malformed request: {e}"))
                }
            },
            Err(e) => {
                warn!(error = %e, "skipping non-UTF-8 request line");
                Response::err(
                    Value::Null,
                    "invalid_request",
                    format!("request is not valid UTF-8: {e}"),
                )
            }
        };
        let mut out = serde_json::to_vec(&response).map_err(std::io::Error::other)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }
    Ok(())
}
