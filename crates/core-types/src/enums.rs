use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How `get_random_row` picks the row it returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RandomPolicy {
    /// Uniformly random over all existing rows.
    #[default]
    Uniform,
    /// The most recently inserted row (highest id).
    Latest,
}

impl fmt::Display for RandomPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandomPolicy::Uniform => f.write_str("uniform"),
            RandomPolicy::Latest => f.write_str("latest"),
        }
    }
}

impl FromStr for RandomPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" | "random" => Ok(RandomPolicy::Uniform),
            "latest" => Ok(RandomPolicy::Latest),
            other => Err(CoreError::InvalidInput(
                "random_policy".to_string(),
                format!("expected `uniform` or `latest`, got `{other}`"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_policies_case_insensitively() {
        assert_eq!("Uniform".parse::<RandomPolicy>().unwrap(), RandomPolicy::Uniform);
        assert_eq!(" latest ".parse::<RandomPolicy>().unwrap(), RandomPolicy::Latest);
        assert_eq!("random".parse::<RandomPolicy>().unwrap(), RandomPolicy::Uniform);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = "oldest".parse::<RandomPolicy>().unwrap_err();
        assert!(err.to_string().contains("random_policy"));
    }
}
