//! Turns check results into the JSON envelope callers see.
//!
//! Failures are logged in full every time. Callers only get the detail
//! when the gate marked them debug-visible.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::consts::{MSG_ENGINE_FAILED, MSG_PASSWORD_REQUIRED};
use crate::error::CheckError;

/// Exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultEnvelope {
    Result {
        result: String,
    },
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
        #[serde(
            default,
            rename = "exitCode",
            skip_serializing_if = "Option::is_none"
        )]
        exit_code: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command: Option<String>,
    },
}

impl ResultEnvelope {
    pub fn result(text: impl Into<String>) -> Self {
        ResultEnvelope::Result {
            result: text.into(),
        }
    }

    /// An error with no diagnostic fields.
    pub fn error(message: impl Into<String>) -> Self {
        ResultEnvelope::Error {
            error: message.into(),
            details: None,
            exit_code: None,
            command: None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResultEnvelope::Error { .. })
    }
}

/// Map a check result to a status code and envelope.
pub fn format(result: Result<String, CheckError>, debug_visible: bool) -> (StatusCode, ResultEnvelope) {
    let err = match result {
        Ok(output) => {
            return (
                StatusCode::OK,
                ResultEnvelope::result(output.trim_end()),
            );
        }
        Err(err) => err,
    };

    match err {
        CheckError::PasswordRequired => (StatusCode::OK, ResultEnvelope::error(MSG_PASSWORD_REQUIRED)),
        CheckError::DiscoveryExhausted(ref outcome) | CheckError::EngineFailed(ref outcome) => {
            let details = outcome.final_attempt.combined_output.trim().to_string();
            tracing::error!(
                op = "dispatch.failed",
                command = %outcome.command,
                exit_code = outcome.final_attempt.exit_code,
                attempts = outcome.attempts,
                output = %details,
                "engine invocation failed"
            );

            let envelope = if debug_visible {
                ResultEnvelope::Error {
                    error: MSG_ENGINE_FAILED.to_string(),
                    details: Some(details),
                    exit_code: Some(outcome.final_attempt.exit_code),
                    command: Some(outcome.command.clone()),
                }
            } else {
                ResultEnvelope::error(MSG_ENGINE_FAILED)
            };
            (StatusCode::INTERNAL_SERVER_ERROR, envelope)
        }
        CheckError::Internal(ref message) => {
            tracing::error!(op = "dispatch.internal", error = %message, "check failed before engine ran");
            let envelope = if debug_visible {
                ResultEnvelope::Error {
                    error: MSG_ENGINE_FAILED.to_string(),
                    details: Some(message.clone()),
                    exit_code: None,
                    command: None,
                }
            } else {
                ResultEnvelope::error(MSG_ENGINE_FAILED)
            };
            (StatusCode::INTERNAL_SERVER_ERROR, envelope)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{AttemptResult, DispatchOutcome};
    use serde_json::json;

    fn failed(exit_code: i32, output: &str) -> DispatchOutcome {
        DispatchOutcome {
            succeeded: false,
            final_attempt: AttemptResult::new(exit_code, output),
            command: "python3 check_password.py '********'".to_string(),
            attempts: 1,
        }
    }

    fn to_json(envelope: &ResultEnvelope) -> serde_json::Value {
        serde_json::to_value(envelope).unwrap()
    }

    #[test]
    fn success_carries_engine_output() {
        let (status, envelope) = format(Ok("Not found in breaches.\n".to_string()), false);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(to_json(&envelope), json!({"result": "Not found in breaches."}));
    }

    #[test]
    fn missing_password_message() {
        let (status, envelope) = format(Err(CheckError::PasswordRequired), true);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(to_json(&envelope), json!({"error": "Password is required."}));
    }

    #[test]
    fn failure_hides_detail_without_debug() {
        let err = failed(127, "python3: not found").into_result().unwrap_err();
        let (status, envelope) = format(Err(err), false);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(to_json(&envelope), json!({"error": "Error running Python script."}));
    }

    #[test]
    fn failure_shows_detail_with_debug() {
        let err = failed(1, "  Traceback: boom \n").into_result().unwrap_err();
        let (status, envelope) = format(Err(err), true);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            to_json(&envelope),
            json!({
                "error": "Error running Python script.",
                "details": "Traceback: boom",
                "exitCode": 1,
                "command": "python3 check_password.py '********'",
            })
        );
    }

    #[test]
    fn internal_error_is_still_an_envelope() {
        let (status, envelope) = format(Err(CheckError::Internal("pipe".to_string())), false);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(to_json(&envelope), json!({"error": "Error running Python script."}));

        let (_, envelope) = format(Err(CheckError::Internal("pipe".to_string())), true);
        assert_eq!(
            to_json(&envelope),
            json!({"error": "Error running Python script.", "details": "pipe"})
        );
    }

    #[test]
    fn envelope_parses_back() {
        let parsed: ResultEnvelope =
            serde_json::from_str(r#"{"error":"x","exitCode":2}"#).unwrap();
        assert!(parsed.is_error());
        let parsed: ResultEnvelope = serde_json::from_str(r#"{"result":"ok"}"#).unwrap();
        assert_eq!(parsed, ResultEnvelope::result("ok"));
    }
}
