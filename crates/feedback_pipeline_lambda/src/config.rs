//! Environment configuration, read once per cold start.

use std::str::FromStr;

use thiserror::Error;

pub const TOPIC_ARN_ENV: &str = "FEEDBACK_TOPIC_ARN";
pub const TABLE_NAME_ENV: &str = "FEEDBACK_TABLE_NAME";
pub const BATCH_FAILURE_POLICY_ENV: &str = "FEEDBACK_BATCH_FAILURE_POLICY";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
    #[error("{name} has unsupported value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// How a failed record affects the rest of a consumer batch.
///
/// Either way a batch with any failed record fails the invocation, so the
/// channel redelivers the whole batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchFailurePolicy {
    /// Stop at the first failed record.
    #[default]
    FailFast,
    /// Process every record, then fail if any record failed.
    ProcessAll,
}

impl BatchFailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FailFast => "fail_fast",
            Self::ProcessAll => "process_all",
        }
    }
}

impl FromStr for BatchFailurePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fail_fast" => Ok(Self::FailFast),
            "process_all" => Ok(Self::ProcessAll),
            other => Err(format!("unknown batch failure policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerConfig {
    pub topic_arn: String,
}

impl ProducerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            topic_arn: required(&lookup, TOPIC_ARN_ENV)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    pub table_name: String,
    pub failure_policy: BatchFailurePolicy,
}

impl ConsumerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let table_name = required(&lookup, TABLE_NAME_ENV)?;
        let failure_policy = match optional(&lookup, BATCH_FAILURE_POLICY_ENV) {
            Some(value) => value.parse::<BatchFailurePolicy>().map_err(|_| ConfigError::Invalid {
                name: BATCH_FAILURE_POLICY_ENV,
                value,
            })?,
            None => BatchFailurePolicy::default(),
        };

        Ok(Self {
            table_name,
            failure_policy,
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    optional(lookup, name).ok_or(ConfigError::Missing(name))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
