//! Shared helpers for handlers: error bodies, XML responses and blocking work.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use tracing::error;

use wms_common::{WmsError, WmsResult};
use wms_protocol::XML_CONTENT_TYPE;

/// JSON error body: `{"error": message, "kind": kind, ...context}`.
pub fn json_error(status: StatusCode, message: &str, kind: &str, context: &[(&str, &str)]) -> Response {
    let mut body = Map::new();
    body.insert("error".to_string(), Value::from(message));
    body.insert("kind".to_string(), Value::from(kind));
    for (key, value) in context {
        body.insert((*key).to_string(), Value::from(*value));
    }
    (status, Json(Value::Object(body))).into_response()
}

/// JSON error response for a [`WmsError`].
pub fn error_response(err: &WmsError) -> Response {
    let status = status_of(err);
    if status.is_server_error() {
        error!(error = %err, kind = err.kind(), "Request failed");
    }

    let kind = err.kind();
    match err {
        WmsError::MetadataNotFound => json_error(status, "No metadata available", kind, &[]),
        WmsError::ParameterNotFound(parameter) => {
            json_error(status, "Parameter not found", kind, &[("parameter", parameter.as_str())])
        }
        WmsError::LayerNotFound(layer) => json_error(status, "Layer not found", kind, &[("layer", layer.as_str())]),
        WmsError::NoDatasets(layer) => json_error(status, "No datasets available", kind, &[("layer", layer.as_str())]),
        WmsError::MissingParameter(param) => {
            json_error(status, &format!("Missing {} parameter", param), kind, &[])
        }
        WmsError::InvalidParameter { param, .. } => {
            json_error(status, &err.to_string(), kind, &[("parameter", param.as_str())])
        }
        WmsError::NoDataVariables { file } => {
            json_error(status, "No data variables in dataset", kind, &[("file", file.as_str())])
        }
        WmsError::AxesNotFound { file } => json_error(
            status,
            "Could not determine latitude/longitude coordinates",
            kind,
            &[("file", file.as_str())],
        ),
        WmsError::DatasetRead { file, .. } if !file.is_empty() => {
            json_error(status, &err.to_string(), kind, &[("file", file.as_str())])
        }
        _ => json_error(status, &err.to_string(), kind, &[]),
    }
}

/// Layer endpoints report unknown histories as unknown layers.
pub fn layer_error_response(err: WmsError) -> Response {
    match err {
        WmsError::ParameterNotFound(layer) => error_response(&WmsError::LayerNotFound(layer)),
        other => error_response(&other),
    }
}

pub fn xml_response(status: StatusCode, body: impl Into<String>) -> Response {
    (status, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body.into()).into_response()
}

pub fn status_of(err: &WmsError) -> StatusCode {
    StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Run blocking file work off the async executor.
pub async fn run_blocking<T, F>(f: F) -> WmsResult<T>
where
    F: FnOnce() -> WmsResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WmsError::InternalError(format!("blocking task failed: {}", e)))?
}

/// Parse an optional numeric query value, treating blanks as absent.
pub fn parse_optional<T: std::str::FromStr>(param: &str, raw: Option<&str>) -> WmsResult<Option<T>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| WmsError::InvalidParameter {
            param: param.to_string(),
            message: format!("'{}' is not a valid number", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional() {
        assert_eq!(parse_optional::<usize>("width", None).unwrap(), None);
        assert_eq!(parse_optional::<usize>("width", Some(" ")).unwrap(), None);
        assert_eq!(parse_optional::<usize>("width", Some("512")).unwrap(), Some(512));
        assert!(matches!(
            parse_optional::<usize>("width", Some("wide")),
            Err(WmsError::InvalidParameter { param, .. }) if param == "width"
        ));
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(status_of(&WmsError::MetadataNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(&WmsError::MissingParameter("layer".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&WmsError::RenderError("boom".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
