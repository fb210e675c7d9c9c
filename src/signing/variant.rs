//! Signing variants: timestamp precision and signed path form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the timestamp is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPrecision {
    Milliseconds,
    /// Milliseconds with `000` appended. Not a real microsecond clock read.
    Microseconds,
}

/// Which form of the endpoint goes into the canonical string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathForm {
    WithQuery,
    WithoutQuery,
}

/// One candidate signing convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigningVariant {
    pub precision: TimestampPrecision,
    pub path_form: PathForm,
}

impl SigningVariant {
    pub const MS_WITH_QUERY: Self = Self::new(TimestampPrecision::Milliseconds, PathForm::WithQuery);
    pub const US_WITH_QUERY: Self = Self::new(TimestampPrecision::Microseconds, PathForm::WithQuery);
    pub const MS_NO_QUERY: Self = Self::new(TimestampPrecision::Milliseconds, PathForm::WithoutQuery);
    pub const US_NO_QUERY: Self = Self::new(TimestampPrecision::Microseconds, PathForm::WithoutQuery);

    /// Every variant, in the order they are attempted.
    pub const ALL: [Self; 4] = [
        Self::MS_WITH_QUERY,
        Self::US_WITH_QUERY,
        Self::MS_NO_QUERY,
        Self::US_NO_QUERY,
    ];

    pub const fn new(precision: TimestampPrecision, path_form: PathForm) -> Self {
        Self {
            precision,
            path_form,
        }
    }

    /// Short label used in logs, metrics and config.
    pub fn name(&self) -> &'static str {
        match (self.precision, self.path_form) {
            (TimestampPrecision::Milliseconds, PathForm::WithQuery) => "ms+withQuery",
            (TimestampPrecision::Microseconds, PathForm::WithQuery) => "us+withQuery",
            (TimestampPrecision::Milliseconds, PathForm::WithoutQuery) => "ms+noQuery",
            (TimestampPrecision::Microseconds, PathForm::WithoutQuery) => "us+noQuery",
        }
    }

    /// The endpoint string this variant signs.
    pub fn endpoint<'a>(&self, path: &'a str) -> &'a str {
        match self.path_form {
            PathForm::WithQuery => path,
            PathForm::WithoutQuery => strip_query(path),
        }
    }

    /// The timestamp string this variant signs.
    pub fn timestamp(&self, millis: u64) -> String {
        match self.precision {
            TimestampPrecision::Milliseconds => millis.to_string(),
            TimestampPrecision::Microseconds => format!("{}000", millis),
        }
    }
}

impl fmt::Display for SigningVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SigningVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown signing variant '{}'", s))
    }
}

/// Everything before the first `?`.
pub fn strip_query(path: &str) -> &str {
    path.split_once('?').map_or(path, |(head, _)| head)
}
