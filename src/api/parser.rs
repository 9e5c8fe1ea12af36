// src/api/parser.rs
//! Envelope parsing for Lark API responses.
//!
//! Turns an [`ApiResponse`] into either the decoded `data` payload or a
//! [`FetchError`] carrying the HTTP status, provider code and message.

use super::client::ApiResponse;
use super::responses::Envelope;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, FetchError, LarkErrorCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Checks status and envelope code, returning the whole body on success.
pub fn parse_envelope(result: &ApiResponse<String>) -> Result<Value, AppError> {
    let body: Option<Value> = serde_json::from_str(&result.data).ok();
    let envelope: Option<Envelope> = body
        .as_ref()
        .and_then(|b| serde_json::from_value(b.clone()).ok());

    if !result.status.is_success() {
        let (code, message) = match envelope {
            Some(env) => (
                (env.code != 0).then(|| LarkErrorCode::from_code(env.code)),
                env.msg.filter(|m| !m.is_empty()),
            ),
            None => (None, None),
        };
        return Err(FetchError {
            status: result.status.as_u16(),
            code,
            message,
            endpoint: result.endpoint.clone(),
        }
        .into());
    }

    let (Some(body), Some(envelope)) = (body, envelope) else {
        log::error!("Unparseable response from {}", result.endpoint);
        return Err(AppError::MalformedResponse(format!(
            "{} returned a non-JSON body: {}",
            result.endpoint,
            preview(&result.data)
        )));
    };

    if envelope.code != 0 {
        return Err(FetchError {
            status: result.status.as_u16(),
            code: Some(LarkErrorCode::from_code(envelope.code)),
            message: envelope.msg.filter(|m| !m.is_empty()),
            endpoint: result.endpoint.clone(),
        }
        .into());
    }

    Ok(body)
}

/// Parses the envelope and decodes its `data` member.
///
/// An absent or null `data` decodes as `T::default()`.
pub fn parse_data<T>(result: &ApiResponse<String>) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    let body = parse_envelope(result)?;
    match body.get("data") {
        None | Some(Value::Null) => Ok(T::default()),
        Some(data) => serde_json::from_value(data.clone()).map_err(|e| {
            log::error!("Failed to decode data from {}: {}", result.endpoint, e);
            AppError::MalformedResponse(format!(
                "{}: {} in {}",
                result.endpoint,
                e,
                preview(&result.data)
            ))
        }),
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let head: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}
