use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};

/// Task number as assigned by the project (unique within one project).
#[derive(
    Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaskNumber(pub i32);

impl TaskNumber {
    /// Number reserved for the invisible root of a task tree.
    pub const ROOT: Self = Self(0);

    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for TaskNumber {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for TaskNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskNumber {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_numbers() {
        let parsed: TaskNumber = " 42 ".parse().unwrap_or_else(|err| panic!("must parse: {err}"));
        assert_eq!(parsed, TaskNumber(42));
        assert!("forty-two".parse::<TaskNumber>().is_err());
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&TaskNumber(7))
            .unwrap_or_else(|err| panic!("must serialize: {err}"));
        assert_eq!(json, "7");
        let back: TaskNumber =
            serde_json::from_str("9").unwrap_or_else(|err| panic!("must deserialize: {err}"));
        assert_eq!(back, TaskNumber(9));
    }
}
