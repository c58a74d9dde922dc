use std::path::PathBuf;

use inventory_core::{ItemErrorPolicy, DEFAULT_ALERT_TOPIC};
use thiserror::Error;

pub const INVENTORY_TABLE_ENV: &str = "INVENTORY_TABLE";
pub const SCRATCH_PATH_ENV: &str = "INVENTORY_SCRATCH_PATH";
pub const LOADER_POLICY_ENV: &str = "LOADER_ITEM_ERROR_POLICY";
pub const ALERT_TOPIC_ENV: &str = "ALERT_TOPIC_NAME";
pub const NOTIFIER_POLICY_ENV: &str = "NOTIFIER_ITEM_ERROR_POLICY";

pub const DEFAULT_INVENTORY_TABLE: &str = "Inventory";
pub const DEFAULT_SCRATCH_PATH: &str = "/tmp/inventory.csv";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {variable}: {message}")]
pub struct ConfigError {
    pub variable: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub table_name: String,
    pub scratch_path: PathBuf,
    pub item_error_policy: ItemErrorPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_INVENTORY_TABLE.to_string(),
            scratch_path: PathBuf::from(DEFAULT_SCRATCH_PATH),
            item_error_policy: ItemErrorPolicy::ContinueOnItemError,
        }
    }
}

impl LoaderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            table_name: non_empty(&lookup, INVENTORY_TABLE_ENV).unwrap_or(defaults.table_name),
            scratch_path: non_empty(&lookup, SCRATCH_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_path),
            item_error_policy: policy(&lookup, LOADER_POLICY_ENV)?
                .unwrap_or(defaults.item_error_policy),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    pub alert_topic_name: String,
    pub item_error_policy: ItemErrorPolicy,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            alert_topic_name: DEFAULT_ALERT_TOPIC.to_string(),
            item_error_policy: ItemErrorPolicy::AbortOnItemError,
        }
    }
}

impl NotifierConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            alert_topic_name: non_empty(&lookup, ALERT_TOPIC_ENV)
                .unwrap_or(defaults.alert_topic_name),
            item_error_policy: policy(&lookup, NOTIFIER_POLICY_ENV)?
                .unwrap_or(defaults.item_error_policy),
        })
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn policy(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<ItemErrorPolicy>, ConfigError> {
    non_empty(lookup, name)
        .map(|value| {
            value.parse::<ItemErrorPolicy>().map_err(|message| ConfigError {
                variable: name,
                message,
            })
        })
        .transpose()
}
