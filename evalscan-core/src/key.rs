//! Iteration identity: `(model, challenge, temperature, iteration)`.
//!
//! Temperature is not stored on the record itself. It is recovered from the
//! `temp_<number>` directory component embedded in `code_path`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::record::ExperimentRecord;

static TEMPERATURE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"temp_(\d+(?:\.\d*)?|\.\d+)").unwrap());

/// Errors raised while keying a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("record is missing required field '{field}'")]
    MissingField { field: &'static str },
}

/// Sampling temperature parsed from a `temp_<number>` token.
///
/// Always finite and non-negative, with zero stored as `+0.0`, which makes
/// bitwise equality and `total_cmp` ordering agree with numeric comparison.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Temperature(f64);

impl Temperature {
    /// `None` for NaN, infinities and negative values. `-0.0` becomes `0.0`.
    pub fn new(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        Some(Self(if value == 0.0 { 0.0 } else { value }))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Temperature {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Temperature {}

impl Hash for Temperature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Temperature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Temperature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Temperature {
    /// Whole numbers keep one decimal place so paths read `temp_1.0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Canonical identity of one evaluated run.
///
/// Field order defines the sort order: model, challenge, temperature, iteration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IterationKey {
    pub model: String,
    pub challenge: String,
    pub temperature: Temperature,
    pub iteration: u32,
}

impl IterationKey {
    /// `None` if `temperature` is not a valid [`Temperature`].
    pub fn new(
        model: impl Into<String>,
        challenge: impl Into<String>,
        temperature: f64,
        iteration: u32,
    ) -> Option<Self> {
        Some(Self {
            model: model.into(),
            challenge: challenge.into(),
            temperature: Temperature::new(temperature)?,
            iteration,
        })
    }
}

impl fmt::Display for IterationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/temp_{}/iteration_{}",
            self.model, self.challenge, self.temperature, self.iteration
        )
    }
}

/// Find the first `temp_<number>` token in a path.
///
/// The number is digits with at most one dot, such as `0.6`, `1`, `.5` or `2.`.
/// A token too large to be finite yields `None`.
pub fn parse_temperature(code_path: &str) -> Option<Temperature> {
    let caps = TEMPERATURE_TOKEN.captures(code_path)?;
    caps[1].parse::<f64>().ok().and_then(Temperature::new)
}

/// Build the identity key for a record.
///
/// Returns `Ok(None)` when `code_path` carries no temperature token; callers
/// skip such records. Missing `model`, `challenge` or `iteration` is an error,
/// checked before the temperature.
pub fn extract_key(record: &ExperimentRecord) -> Result<Option<IterationKey>, KeyError> {
    let model = record
        .model
        .as_ref()
        .ok_or(KeyError::MissingField { field: "model" })?;
    let challenge = record
        .challenge
        .as_ref()
        .ok_or(KeyError::MissingField { field: "challenge" })?;
    let iteration = record
        .iteration
        .ok_or(KeyError::MissingField { field: "iteration" })?;

    Ok(parse_temperature(&record.code_path).map(|temperature| IterationKey {
        model: model.clone(),
        challenge: challenge.clone(),
        temperature,
        iteration,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code_path: &str) -> ExperimentRecord {
        ExperimentRecord {
            model: Some("gemini".into()),
            challenge: Some("todo_list".into()),
            iteration: Some(7),
            code_path: code_path.into(),
            ..Default::default()
        }
    }

    #[test]
    fn temperature_parsed_from_path_component() {
        let t = parse_temperature("dry_run_output/code/todo_list/5-role-zero_shot/temp_0.2/iteration_7/gemini.py");
        assert_eq!(t.map(Temperature::value), Some(0.2));
    }

    #[test]
    fn integer_temperature_token() {
        assert_eq!(parse_temperature("x/temp_1/y").map(Temperature::value), Some(1.0));
    }

    #[test]
    fn leading_or_trailing_dot_token() {
        assert_eq!(parse_temperature("x/temp_.5/y").map(Temperature::value), Some(0.5));
        assert_eq!(parse_temperature("x/temp_2./y").map(Temperature::value), Some(2.0));
        assert_eq!(parse_temperature("x/temp_./y"), None);
    }

    #[test]
    fn overflowing_token_is_rejected() {
        let path = format!("x/temp_{}/y", "9".repeat(400));
        assert_eq!(parse_temperature(&path), None);
    }

    #[test]
    fn temperature_rejects_non_finite_and_negative() {
        assert!(Temperature::new(f64::NAN).is_none());
        assert!(Temperature::new(f64::INFINITY).is_none());
        assert!(Temperature::new(-0.2).is_none());
        assert!(IterationKey::new("m", "c", f64::NAN, 1).is_none());
    }

    #[test]
    fn negative_zero_equals_zero() {
        assert_eq!(Temperature::new(-0.0), Temperature::new(0.0));
        assert_eq!(
            IterationKey::new("m", "c", -0.0, 1),
            IterationKey::new("m", "c", 0.0, 1)
        );
        assert_eq!(parse_temperature("temp_0.0").map(Temperature::value), Some(0.0));
    }

    #[test]
    fn first_token_wins() {
        assert_eq!(
            parse_temperature("temp_0.4/temp_0.8").map(Temperature::value),
            Some(0.4)
        );
    }

    #[test]
    fn no_token_means_no_temperature() {
        assert_eq!(parse_temperature(""), None);
        assert_eq!(parse_temperature("code/calculator/iteration_1/claude.py"), None);
        assert_eq!(parse_temperature("code/temp_/x.py"), None);
        assert_eq!(parse_temperature("code/temp_hot/x.py"), None);
    }

    #[test]
    fn extract_key_builds_full_identity() {
        let key = extract_key(&record("a/temp_0.6/b")).unwrap().unwrap();
        assert_eq!(key, IterationKey::new("gemini", "todo_list", 0.6, 7).unwrap());
    }

    #[test]
    fn extract_key_without_token_is_absent() {
        assert_eq!(extract_key(&record("a/b/c.py")), Ok(None));
    }

    #[test]
    fn missing_identity_field_is_an_error_even_without_token() {
        let mut r = record("a/b/c.py");
        r.challenge = None;
        assert_eq!(
            extract_key(&r),
            Err(KeyError::MissingField { field: "challenge" })
        );
    }

    #[test]
    fn keys_order_like_tuples() {
        let mut keys = vec![
            IterationKey::new("claude", "todo_list", 0.2, 1).unwrap(),
            IterationKey::new("chatgpt", "calculator", 1.0, 2).unwrap(),
            IterationKey::new("chatgpt", "calculator", 0.6, 10).unwrap(),
            IterationKey::new("chatgpt", "calculator", 0.6, 2).unwrap(),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "chatgpt/calculator/temp_0.6/iteration_2",
                "chatgpt/calculator/temp_0.6/iteration_10",
                "chatgpt/calculator/temp_1.0/iteration_2",
                "claude/todo_list/temp_0.2/iteration_1",
            ]
        );
    }
}
