//! JSON extractor that runs `validator` rules after deserializing.

use axum::extract::{FromRequest, OptionalFromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use super::Json;
use crate::handler::{Error, ErrorKind};

/// [`Json`] followed by [`Validate::validate`].
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    /// Returns the inner validated value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self(data))
    }
}

impl<T, S> OptionalFromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let Some(Json(data)) =
            <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?
        else {
            return Ok(None);
        };

        data.validate()?;
        Ok(Some(Self(data)))
    }
}

fn format_validation_error(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return format!("Field '{field}': {message}");
    }

    let bound = |name: &str| error.params.get(name).and_then(serde_json::Value::as_u64);
    match (error.code.as_ref(), bound("min"), bound("max")) {
        ("length", Some(min), Some(max)) => {
            format!("Field '{field}' must be between {min} and {max} characters long")
        }
        ("length", None, Some(max)) => {
            format!("Field '{field}' must be at most {max} characters long")
        }
        ("length", Some(min), None) => {
            format!("Field '{field}' must be at least {min} characters long")
        }
        ("required", ..) => format!("Field '{field}' is required"),
        (code, ..) => format!("Field '{field}' failed validation: {code}"),
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors
                    .iter()
                    .map(move |error| format_validation_error(field, error))
            })
            .collect();
        messages.sort();

        tracing::warn!(
            errors = ?errors.field_errors(),
            "request validation failed"
        );

        let message = match messages.as_slice() {
            [] => "Validation failed".to_owned(),
            _ => messages.join(". "),
        };

        ErrorKind::BadRequest
            .with_message(message)
            .with_resource("request")
    }
}

impl<T> aide::OperationInput for ValidateJson<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Json::<T>::inferred_early_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn formats_length_errors() {
        let mut error = ValidationError::new("length");
        error.add_param(Cow::Borrowed("max"), &300);
        assert_eq!(
            format_validation_error("summary", &error),
            "Field 'summary' must be at most 300 characters long"
        );
    }

    #[test]
    fn prefers_custom_message() {
        let error = ValidationError::new("custom").with_message(Cow::Borrowed("is odd"));
        assert_eq!(
            format_validation_error("branch", &error),
            "Field 'branch': is odd"
        );
    }
}
