//! Mapping of draft service errors onto HTTP errors.

use draftboard_core::{Error as CoreError, ErrorKind as CoreErrorKind};

use crate::handler::{Error, ErrorKind};

/// Tracing target for service failures surfaced as server errors.
const TRACING_TARGET: &str = "draftboard_server::handler::error";

impl From<CoreError> for Error<'static> {
    fn from(error: CoreError) -> Self {
        let kind = match error.kind() {
            CoreErrorKind::InvalidInput => ErrorKind::BadRequest,
            CoreErrorKind::NotFound => ErrorKind::NotFound,
            CoreErrorKind::PermissionDenied => ErrorKind::Forbidden,
            CoreErrorKind::Conflict => ErrorKind::Conflict,
            CoreErrorKind::Storage
            | CoreErrorKind::Backend
            | CoreErrorKind::Configuration
            | CoreErrorKind::InternalError => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    kind = error.kind_str(),
                    "draft service failure"
                );
                return ErrorKind::InternalServerError.with_context(error.to_string());
            }
        };

        match error.message() {
            Some(message) => kind.with_message(message.to_owned()),
            None => kind.into_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let error: Error = CoreError::not_found()
            .with_message("Review request does not exist")
            .into();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.message(), Some("Review request does not exist"));

        let error: Error = CoreError::permission_denied().into();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert_eq!(error.message(), None);
    }

    #[test]
    fn server_errors_hide_details() {
        let error: Error = CoreError::storage()
            .with_message("connection reset by peer")
            .into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), None);
        assert!(error.context().is_some());
    }
}
