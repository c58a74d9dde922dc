use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a handler reacts when a single row or change record fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemErrorPolicy {
    /// Log the failure, skip the item and keep processing.
    ContinueOnItemError,
    /// Stop at the first failing item and return its error.
    AbortOnItemError,
}

impl ItemErrorPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContinueOnItemError => "continue-on-item-error",
            Self::AbortOnItemError => "abort-on-item-error",
        }
    }

    pub fn aborts(self) -> bool {
        matches!(self, Self::AbortOnItemError)
    }
}

impl fmt::Display for ItemErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemErrorPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "continue-on-item-error" | "continue" => Ok(Self::ContinueOnItemError),
            "abort-on-item-error" | "abort" => Ok(Self::AbortOnItemError),
            other => Err(format!(
                "unknown item error policy '{other}' (expected continue-on-item-error or abort-on-item-error)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_forms() {
        assert_eq!(
            "continue-on-item-error".parse::<ItemErrorPolicy>(),
            Ok(ItemErrorPolicy::ContinueOnItemError)
        );
        assert_eq!(
            " Abort ".parse::<ItemErrorPolicy>(),
            Ok(ItemErrorPolicy::AbortOnItemError)
        );
    }

    #[test]
    fn rejects_unknown_policy() {
        let error = "retry".parse::<ItemErrorPolicy>().expect_err("unknown policy");
        assert!(error.contains("unknown item error policy 'retry'"));
    }

    #[test]
    fn serializes_as_kebab_case() {
        let json = serde_json::to_string(&ItemErrorPolicy::AbortOnItemError).unwrap();
        assert_eq!(json, "\"abort-on-item-error\"");
    }
}
