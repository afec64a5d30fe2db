//! Turns API responses into the one-line outcome shown after an action.

use serde::Deserialize;

pub const GENERIC_FAILURE: &str = "Something went wrong, please try again";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    /// The server rejected the input; carries its first validation message.
    Rejected(String),
    Failed(String),
}

impl Feedback {
    pub fn message(&self) -> &str {
        match self {
            Feedback::Success(m) | Feedback::Rejected(m) | Feedback::Failed(m) => m,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Feedback::Success(_))
    }
}

#[derive(Deserialize)]
struct ErrorItem {
    msg: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Vec<ErrorItem>,
}

#[derive(Deserialize)]
struct SuccessBody {
    message: Option<String>,
}

/// Reads a response body. `success` is the HTTP status class.
pub fn from_body(success: bool, body: &str) -> Feedback {
    if success {
        let message = serde_json::from_str::<SuccessBody>(body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| "Done".to_string());
        return Feedback::Success(message);
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => match error.into_iter().next() {
            Some(first) => Feedback::Rejected(first.msg),
            None => Feedback::Failed(GENERIC_FAILURE.to_string()),
        },
        Err(_) => Feedback::Failed(GENERIC_FAILURE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_uses_server_message() {
        let body = r#"{"status":true,"message":"Application submitted successfully","result":{}}"#;
        assert_eq!(
            from_body(true, body),
            Feedback::Success("Application submitted successfully".into())
        );
    }

    #[test]
    fn test_validation_payload_yields_first_message() {
        let body = r#"{"status":false,"code":"VALIDATION_ERROR","error":[{"msg":"Already Applied"},{"msg":"other"}]}"#;
        assert_eq!(from_body(false, body), Feedback::Rejected("Already Applied".into()));
    }

    #[test]
    fn test_other_failures_are_generic() {
        let forbidden = r#"{"status":false,"code":"FORBIDDEN","message":"Unauthorized to access this route"}"#;
        assert_eq!(from_body(false, forbidden), Feedback::Failed(GENERIC_FAILURE.into()));
        assert_eq!(from_body(false, "<html>502</html>"), Feedback::Failed(GENERIC_FAILURE.into()));
        assert_eq!(from_body(false, r#"{"error":[]}"#), Feedback::Failed(GENERIC_FAILURE.into()));
    }
}
