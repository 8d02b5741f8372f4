use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A type that can be built from an untrusted JSON value, reporting every
/// field that does not conform.
pub trait Schema: Sized {
    fn from_json(value: &Value) -> Result<Self, ValidationErrors>;
}

/// One failed check. `loc` is the path to the offending value, e.g.
/// `["body", "field1"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
}

/// Every failed check for a single input, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} validation error(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single error at `loc`.
    pub fn single(loc: Vec<String>, msg: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(loc, msg);
        errors
    }

    pub fn push(&mut self, loc: Vec<String>, msg: impl Into<String>) {
        self.errors.push(FieldError {
            loc,
            msg: msg.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Prepends `segment` to every location, e.g. to mark errors as coming
    /// from the request body.
    pub fn prefixed(mut self, segment: &str) -> Self {
        for error in &mut self.errors {
            error.loc.insert(0, segment.to_string());
        }
        self
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prefixed_marks_every_location() {
        let mut errors = ValidationErrors::new();
        errors.push(vec!["field1".into()], "Field required");
        errors.push(Vec::new(), "bad");

        let locs: Vec<_> = errors.prefixed("body").into_iter().map(|e| e.loc).collect();
        assert_eq!(
            locs,
            vec![
                vec!["body".to_string(), "field1".to_string()],
                vec!["body".to_string()],
            ]
        );
    }

    #[test]
    fn display_counts_errors() {
        let errors = ValidationErrors::single(vec!["x".into()], "nope");
        assert_eq!(errors.to_string(), "1 validation error(s)");
    }
}
