use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use draftboard_core::field::FieldErrors;
use schemars::JsonSchema;
use serde::Serialize;
use validator::ValidationErrors;

use super::Draft;

/// Rejected input tokens or messages, keyed by field name.
pub type InvalidFields = BTreeMap<String, Vec<String>>;

/// Converts field errors of the draft service into response form.
pub fn invalid_fields(errors: FieldErrors) -> InvalidFields {
    errors
        .into_iter()
        .map(|(field, errors)| (field.to_string(), errors))
        .collect()
}

/// Validation error details for field-specific errors.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ValidationErrorDetail {
    /// Field name that failed validation
    pub field: String,
    /// Error code for the validation failure
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional parameters related to the validation error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<HashMap<String, serde_json::Value>>,
}

/// JSON body of every error response.
///
/// `context` and `status` are never serialized: the first is for logs, the
/// second becomes the response status.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse<'a> {
    /// The error name/type identifier
    pub name: Cow<'a, str>,
    /// User-friendly error message safe for client display
    pub message: Cow<'a, str>,
    /// The resource that the error relates to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,
    /// Helpful suggestion for resolving the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Cow<'a, str>>,
    /// Request body validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Vec<ValidationErrorDetail>>,
    /// Rejected draft field input, keyed by field name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<InvalidFields>,
    /// The draft with every accepted field applied, not saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<Box<Draft>>,

    #[serde(skip)]
    pub context: Option<Cow<'a, str>>,
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        "Invalid request data.",
        StatusCode::BAD_REQUEST,
    );
    pub const CONFLICT: Self =
        Self::new("conflict", "Resource state conflict.", StatusCode::CONFLICT);
    pub const FORBIDDEN: Self = Self::new("forbidden", "Access denied.", StatusCode::FORBIDDEN);
    // 5xx Server Errors
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        "Internal server error.",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const INVALID_FORM_DATA: Self = Self::new(
        "invalid_form_data",
        "One or more fields had errors.",
        StatusCode::BAD_REQUEST,
    );
    // Authentication Errors
    pub const MALFORMED_AUTH_TOKEN: Self = Self::new(
        "malformed_auth_token",
        "Malformed auth token.",
        StatusCode::UNAUTHORIZED,
    );
    pub const MISSING_AUTH_TOKEN: Self = Self::new(
        "missing_auth_token",
        "Missing auth token.",
        StatusCode::UNAUTHORIZED,
    );
    pub const MISSING_PATH_PARAM: Self = Self::new(
        "missing_path_param",
        "Missing path parameter.",
        StatusCode::BAD_REQUEST,
    );
    pub const NOT_FOUND: Self =
        Self::new("not_found", "Resource not found.", StatusCode::NOT_FOUND);
    pub const SERVICE_UNAVAILABLE: Self = Self::new(
        "service_unavailable",
        "Service unavailable.",
        StatusCode::SERVICE_UNAVAILABLE,
    );
    pub const UNAUTHORIZED: Self = Self::new(
        "unauthorized",
        "Invalid credentials.",
        StatusCode::UNAUTHORIZED,
    );
    pub const VALIDATION_ERROR: Self = Self::new(
        "validation_error",
        "Validation failed.",
        StatusCode::BAD_REQUEST,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            suggestion: None,
            validation: None,
            fields: None,
            draft: None,
            context: None,
            status,
        }
    }

    /// Sets the resource, joining it to an existing one with `/`.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        let new_resource = resource.into();
        self.resource = Some(match self.resource {
            Some(existing) => Cow::Owned(format!("{existing}/{new_resource}")),
            None => new_resource,
        });
        self
    }

    /// Appends a sentence to the message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        let new_message = message.into();
        let base = self.message.trim_end_matches('.');
        self.message = Cow::Owned(format!("{base}. {new_message}"));
        self
    }

    /// Attaches context, joining it to existing context with `; `.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let new_context = context.into();
        self.context = Some(match self.context {
            Some(existing) => Cow::Owned(format!("{existing}; {new_context}")),
            None => new_context,
        });
        self
    }

    /// Attaches a suggestion, joining it to an existing one with `; `.
    pub fn with_suggestion(mut self, suggestion: impl Into<Cow<'a, str>>) -> Self {
        let new_suggestion = suggestion.into();
        self.suggestion = Some(match self.suggestion {
            Some(existing) => Cow::Owned(format!("{existing}; {new_suggestion}")),
            None => new_suggestion,
        });
        self
    }

    /// Attaches rejected draft fields and the unsaved draft.
    pub fn with_invalid_fields(mut self, fields: InvalidFields, draft: Draft) -> Self {
        self.fields = Some(fields);
        self.draft = Some(Box::new(draft));
        self
    }

    /// Creates an error response from validator ValidationErrors.
    pub fn from_validation_errors(validation_errors: ValidationErrors) -> Self {
        let mut details = Vec::new();

        for (field, field_errors) in validation_errors.field_errors() {
            for error in field_errors {
                let params: HashMap<String, serde_json::Value> = error
                    .params
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.clone()))
                    .collect();

                details.push(ValidationErrorDetail {
                    field: field.to_string(),
                    code: error.code.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Validation failed for field '{field}'")),
                    params: (!params.is_empty()).then_some(params),
                });
            }
        }

        Self {
            validation: Some(details),
            ..Self::VALIDATION_ERROR
        }
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl From<ValidationErrors> for ErrorResponse<'_> {
    fn from(errors: ValidationErrors) -> Self {
        Self::from_validation_errors(errors)
    }
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        tracing::warn!(
            status = %self.status,
            name = %self.name,
            message = %self.message,
            resource = ?self.resource,
            context = ?self.context,
            invalid_fields = self.fields.as_ref().map_or(0, BTreeMap::len),
            "HTTP error response"
        );
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use draftboard_core::field::DraftField;

    use super::*;

    #[test]
    fn error_response_merging_resource() {
        let response = ErrorResponse::NOT_FOUND
            .with_resource("review_request")
            .with_resource("draft");

        assert_eq!(response.resource.as_deref(), Some("review_request/draft"));
    }

    #[test]
    fn error_response_merging_message() {
        let response = ErrorResponse::NOT_FOUND.with_message("Review request does not exist");

        assert_eq!(
            &response.message,
            "Resource not found. Review request does not exist"
        );
    }

    #[test]
    fn error_response_merging_context() {
        let response = ErrorResponse::INTERNAL_SERVER_ERROR
            .with_context("Database connection failed")
            .with_context("Retry attempted 3 times");

        assert_eq!(
            response.context.as_deref(),
            Some("Database connection failed; Retry attempted 3 times")
        );
    }

    #[test]
    fn error_response_skips_internal_fields() {
        let response = ErrorResponse::BAD_REQUEST
            .with_resource("request")
            .with_context("Test context")
            .with_suggestion("Try fixing the data");

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["name"], "bad_request");
        assert_eq!(json["suggestion"], "Try fixing the data");
        assert!(json.get("context").is_none());
        assert!(json.get("status").is_none());
        assert!(json.get("fields").is_none());
        assert!(json.get("draft").is_none());
    }

    #[test]
    fn invalid_fields_use_wire_names() {
        let errors = FieldErrors::from([
            (DraftField::ChangeDescription, vec!["nope".to_owned()]),
            (DraftField::TargetGroups, vec!["ghosts".to_owned()]),
        ]);

        let response = ErrorResponse::INVALID_FORM_DATA
            .with_invalid_fields(invalid_fields(errors), Draft::default());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["name"], "invalid_form_data");
        assert_eq!(json["fields"]["changedescription"][0], "nope");
        assert_eq!(json["fields"]["target_groups"][0], "ghosts");
        assert!(json["draft"].is_object());
    }
}
