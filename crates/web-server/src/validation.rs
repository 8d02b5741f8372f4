use crate::response::WebResponse;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::{Schema, ValidationErrors};
use serde_json::Value;

/// A JSON body checked against a [`Schema`].
///
/// Unparseable bodies and schema violations are both rejected with 422 and a
/// `validation-error` envelope listing every offending field. A body that
/// cannot be read at all (e.g. over the size limit) keeps its own status.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[derive(Debug)]
pub enum ValidationRejection {
    Invalid(ValidationErrors),
    Unreadable(JsonRejection),
}

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Schema,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "Rejected request body.");
                let malformed = matches!(
                    rejection,
                    JsonRejection::JsonDataError(_)
                        | JsonRejection::JsonSyntaxError(_)
                        | JsonRejection::MissingJsonContentType(_)
                );
                if malformed {
                    ValidationRejection::Invalid(ValidationErrors::single(
                        vec!["body".to_string()],
                        rejection.body_text(),
                    ))
                } else {
                    ValidationRejection::Unreadable(rejection)
                }
            })?;

        T::from_json(&value)
            .map(ValidatedJson)
            .map_err(|errors| ValidationRejection::Invalid(errors.prefixed("body")))
    }
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        match self {
            ValidationRejection::Invalid(errors) => {
                WebResponse::error_from_validation("validation-error", &errors, None)
                    .unprocessable_entity()
            }
            ValidationRejection::Unreadable(rejection) => {
                let status = rejection.status();
                let message = match status {
                    StatusCode::PAYLOAD_TOO_LARGE => "payload-too-large",
                    _ => "bad-request",
                };
                WebResponse::error(message)
                    .add_error("body", rejection.body_text())
                    .render(status)
            }
        }
    }
}
