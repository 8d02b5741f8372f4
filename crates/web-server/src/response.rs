//! The uniform `{success, message, data}` envelope every route returns.
//!
//! Handlers build a [`WebResponse`] through one of the constructors, which
//! yields a [`WebResponseBuilder`], and finish it with a status method such as
//! [`WebResponseBuilder::created`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::{Project, Record, ValidationErrors};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name -> messages, in the order the problems were found.
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Location prefixes that name where a value came from rather than a field.
const LOCATION_DISCRIMINATORS: [&str; 4] = ["query", "path", "header", "cookie"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebResponse {
    pub success: bool,
    pub message: String,
    /// `None` when there is neither payload nor errors; never an empty map.
    pub data: Option<Map<String, Value>>,
}

/// What a handler may hand to the envelope as its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Merged into `data` as-is.
    Map(Map<String, Value>),
    /// A serialized schema object; objects are merged, anything else is
    /// wrapped as `value`.
    Model(Value),
    /// A persisted entity's column projection.
    Entity(Map<String, Value>),
    /// A bare scalar, wrapped as `{"value": ...}`.
    Value(Value),
}

impl Payload {
    fn into_map(self) -> Map<String, Value> {
        match self {
            Payload::Map(map) | Payload::Entity(map) => map,
            Payload::Model(Value::Object(map)) => map,
            Payload::Model(value) | Payload::Value(value) => {
                let mut map = Map::new();
                map.insert("value".to_string(), value);
                map
            }
        }
    }
}

/// Conversion into a [`Payload`].
pub trait IntoPayload {
    fn into_payload(self) -> Payload;
}

/// Wraps any `Serialize` value so it is expanded through serialization.
#[derive(Debug, Clone)]
pub struct Model<T>(pub T);

/// Wraps any [`Project`] implementor so it is expanded through its projection.
#[derive(Debug, Clone)]
pub struct Entity<T>(pub T);

impl IntoPayload for Payload {
    fn into_payload(self) -> Payload {
        self
    }
}

impl IntoPayload for Map<String, Value> {
    fn into_payload(self) -> Payload {
        Payload::Map(self)
    }
}

impl IntoPayload for Value {
    fn into_payload(self) -> Payload {
        match self {
            Value::Object(map) => Payload::Map(map),
            other => Payload::Value(other),
        }
    }
}

impl<T: Serialize> IntoPayload for Model<T> {
    fn into_payload(self) -> Payload {
        match serde_json::to_value(&self.0) {
            Ok(value) => Payload::Model(value),
            Err(e) => {
                tracing::warn!(error = %e, "Payload could not be serialized.");
                Payload::Value(Value::Null)
            }
        }
    }
}

impl<T: Project> IntoPayload for Entity<T> {
    fn into_payload(self) -> Payload {
        Payload::Entity(self.0.project())
    }
}

impl IntoPayload for Record {
    fn into_payload(self) -> Payload {
        Payload::Entity(self.project())
    }
}

impl IntoPayload for &Record {
    fn into_payload(self) -> Payload {
        Payload::Entity(self.project())
    }
}

macro_rules! scalar_payload {
    ($($ty:ty),*) => {
        $(
            impl IntoPayload for $ty {
                fn into_payload(self) -> Payload {
                    Payload::Value(Value::from(self))
                }
            }
        )*
    };
}

scalar_payload!(String, &str, bool, i32, i64, u32, u64, f64);

impl WebResponse {
    /// Builds an envelope. `data` and `errors` are normalized into the single
    /// `data` mapping; errors go under the `errors` key.
    pub fn create(
        success: bool,
        message: impl Into<String>,
        data: Option<Payload>,
        errors: Option<FieldErrors>,
    ) -> WebResponseBuilder {
        WebResponseBuilder {
            response: Self {
                success,
                message: message.into(),
                data: process_data(data, errors),
            },
        }
    }

    pub fn success(message: impl Into<String>) -> WebResponseBuilder {
        Self::create(true, message, None, None)
    }

    pub fn success_with(message: impl Into<String>, data: impl IntoPayload) -> WebResponseBuilder {
        Self::create(true, message, Some(data.into_payload()), None)
    }

    pub fn error(message: impl Into<String>) -> WebResponseBuilder {
        Self::create(false, message, None, None)
    }

    pub fn error_with(message: impl Into<String>, data: impl IntoPayload) -> WebResponseBuilder {
        Self::create(false, message, Some(data.into_payload()), None)
    }

    pub fn error_with_errors(message: impl Into<String>, errors: FieldErrors) -> WebResponseBuilder {
        Self::create(false, message, None, Some(errors))
    }

    /// An error envelope whose `errors` come from a validation aggregate.
    /// Hand-built `extra` errors are appended after the flattened ones.
    pub fn error_from_validation(
        message: impl Into<String>,
        verror: &ValidationErrors,
        extra: Option<FieldErrors>,
    ) -> WebResponseBuilder {
        let mut errors = flatten_validation_errors(verror);
        for (field, messages) in extra.into_iter().flatten() {
            errors.entry(field).or_default().extend(messages);
        }
        Self::create(false, message, None, Some(errors))
    }

    /// Sets `data[key]`, creating `data` if needed.
    pub fn add_data(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Appends `message` to `data.errors[field]`, creating both levels if
    /// needed. Earlier messages for the field are kept.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        let data = self.data.get_or_insert_with(Map::new);
        let errors = data
            .entry("errors")
            .or_insert_with(|| Value::Object(Map::new()));
        if !errors.is_object() {
            *errors = Value::Object(Map::new());
        }
        if let Value::Object(errors) = errors {
            let messages = errors
                .entry(field.into())
                .or_insert_with(|| Value::Array(Vec::new()));
            if !messages.is_array() {
                let previous = messages.take();
                *messages = Value::Array(vec![previous]);
            }
            if let Value::Array(messages) = messages {
                messages.push(Value::String(message.into()));
            }
        }
        self
    }
}

/// Flattens a validation aggregate into `{field: [message, ...]}`.
///
/// A leading `body` segment is dropped and the rest dot-joined; a leading
/// `query`/`path`/`header`/`cookie` segment is replaced by the name after it;
/// otherwise the first segment is the field. Deeper paths outside `body`
/// are not joined (`["a", "b"]` reports as `a`, not `a.b`).
pub fn flatten_validation_errors(verror: &ValidationErrors) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for error in verror.iter() {
        let field = field_name(&error.loc);
        errors.entry(field).or_default().push(error.msg.clone());
    }
    errors
}

fn field_name(loc: &[String]) -> String {
    match loc {
        [] => "unknown".to_string(),
        [first, rest @ ..] if first == "body" && !rest.is_empty() => rest.join("."),
        [first, second, ..] if LOCATION_DISCRIMINATORS.contains(&first.as_str()) => second.clone(),
        [first, ..] => first.clone(),
    }
}

fn process_data(data: Option<Payload>, errors: Option<FieldErrors>) -> Option<Map<String, Value>> {
    if data.is_none() && errors.is_none() {
        return None;
    }

    let mut result = Map::new();

    if let Some(errors) = errors.filter(|errors| !errors.is_empty()) {
        let errors = errors
            .into_iter()
            .map(|(field, messages)| {
                let messages = messages.into_iter().map(Value::String).collect();
                (field, Value::Array(messages))
            })
            .collect();
        result.insert("errors".to_string(), Value::Object(errors));
    }

    if let Some(data) = data {
        result.extend(data.into_map());
    }

    (!result.is_empty()).then_some(result)
}

/// A built envelope waiting for its status code.
#[derive(Debug, Clone, PartialEq)]
pub struct WebResponseBuilder {
    pub response: WebResponse,
}

impl WebResponseBuilder {
    pub fn add_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.response.add_data(key, value);
        self
    }

    pub fn add_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.response.add_error(field, message);
        self
    }

    /// Serializes the envelope as JSON with `status`.
    pub fn render(self, status: StatusCode) -> Response {
        (status, Json(self.response)).into_response()
    }

    /// Any numeric status; codes outside 100..=999 render as 500.
    pub fn with_status(self, status: u16) -> Response {
        self.render(StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
    }

    pub fn ok(self) -> Response {
        self.render(StatusCode::OK)
    }

    pub fn created(self) -> Response {
        self.render(StatusCode::CREATED)
    }

    pub fn bad_request(self) -> Response {
        self.render(StatusCode::BAD_REQUEST)
    }

    pub fn unauthorized(self) -> Response {
        self.render(StatusCode::UNAUTHORIZED)
    }

    pub fn forbidden(self) -> Response {
        self.render(StatusCode::FORBIDDEN)
    }

    pub fn not_found(self) -> Response {
        self.render(StatusCode::NOT_FOUND)
    }

    pub fn conflict(self) -> Response {
        self.render(StatusCode::CONFLICT)
    }

    pub fn unprocessable_entity(self) -> Response {
        self.render(StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub fn internal_server_error(self) -> Response {
        self.render(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn service_unavailable(self) -> Response {
        self.render(StatusCode::SERVICE_UNAVAILABLE)
    }
}
