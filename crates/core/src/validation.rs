//! Field validation for movie payloads.
//!
//! Pure logic, no storage access. Every violated field is reported, not just
//! the first one, so clients can fix a payload in a single round trip.

use serde::Serialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::movie::{
    MoviePatch, NewMovie, MAX_RATING, MAX_YEARS_AHEAD, MIN_DURATION, MIN_RATING, MIN_YEAR,
};

/// Accepted fields, in the order violations are reported.
pub const FIELDS: [&str; 7] = [
    "title",
    "description",
    "year",
    "genre",
    "duration",
    "rating",
    "director",
];

/// Fields that must be present when creating a record.
const REQUIRED_FIELDS: [&str; 4] = ["title", "year", "genre", "duration"];

/// Whether a payload describes a whole record or a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Full,
    Partial,
}

/// Which constraint a field broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationRule {
    Required,
    NotNull,
    Type,
    NonEmpty,
    Range,
    UnknownField,
}

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub rule: ViolationRule,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, rule: ViolationRule, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule,
            message: message.into(),
        }
    }
}

/// One or more rejected fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Validation failed: {}", summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn single(violation: FieldViolation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    /// Returns `true` if any violation concerns `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Latest release year accepted while `current_year` is the calendar year.
pub const fn max_year(current_year: i32) -> i32 {
    current_year + MAX_YEARS_AHEAD
}

/// Validate a payload for record creation.
pub fn validate_new_movie(input: &Value, current_year: i32) -> Result<NewMovie, ValidationError> {
    let checked = check_fields(input, ValidationMode::Full, current_year)?;
    let draft = checked.draft;

    // Full mode guarantees the required fields are present.
    match (draft.title, draft.year, draft.genre, draft.duration) {
        (Some(title), Some(year), Some(genre), Some(duration)) => Ok(NewMovie {
            title,
            description: draft.description,
            year,
            genre,
            duration,
            rating: draft.rating,
            director: draft.director,
        }),
        _ => Err(ValidationError::single(FieldViolation::new(
            "body",
            ViolationRule::Required,
            "is missing required fields",
        ))),
    }
}

/// Validate a payload for a partial update.
pub fn validate_movie_patch(
    input: &Value,
    current_year: i32,
) -> Result<MoviePatch, ValidationError> {
    let checked = check_fields(input, ValidationMode::Partial, current_year)?;
    let draft = checked.draft;

    Ok(MoviePatch {
        title: draft.title,
        description: nullable(draft.description, checked.cleared_description),
        year: draft.year,
        genre: draft.genre,
        duration: draft.duration,
        rating: nullable(draft.rating, checked.cleared_rating),
        director: nullable(draft.director, checked.cleared_director),
    })
}

fn nullable<T>(value: Option<T>, cleared: bool) -> Option<Option<T>> {
    if cleared {
        Some(None)
    } else {
        value.map(Some)
    }
}

/// Values that survived type checking, ready for constraint rules.
#[derive(Debug, Default, Validate)]
struct MovieDraft {
    #[validate(length(min = 1))]
    title: Option<String>,
    description: Option<String>,
    #[validate(range(min = 1888))]
    year: Option<i32>,
    #[validate(length(min = 1))]
    genre: Option<String>,
    #[validate(range(min = 1))]
    duration: Option<i32>,
    #[validate(range(min = 0.0, max = 10.0))]
    rating: Option<f64>,
    director: Option<String>,
}

#[derive(Debug, Default)]
struct CheckedFields {
    draft: MovieDraft,
    cleared_description: bool,
    cleared_rating: bool,
    cleared_director: bool,
}

fn check_fields(
    input: &Value,
    mode: ValidationMode,
    current_year: i32,
) -> Result<CheckedFields, ValidationError> {
    let Some(fields) = input.as_object() else {
        return Err(ValidationError::single(FieldViolation::new(
            "body",
            ViolationRule::Type,
            "must be a JSON object",
        )));
    };

    let mut violations = Vec::new();
    let mut checked = CheckedFields::default();

    for (name, value) in fields {
        match name.as_str() {
            "title" => {
                checked.draft.title = required(name, parse_string(name, value), &mut violations)
                    .map(|s| s.trim().to_string());
            }
            "genre" => {
                checked.draft.genre = required(name, parse_string(name, value), &mut violations)
                    .map(|s| s.trim().to_string());
            }
            "year" => {
                checked.draft.year = required(name, parse_integer(name, value), &mut violations);
            }
            "duration" => {
                checked.draft.duration =
                    required(name, parse_integer(name, value), &mut violations);
            }
            "description" => match parse_string(name, value) {
                Ok(Some(s)) => checked.draft.description = Some(s),
                Ok(None) => checked.cleared_description = true,
                Err(v) => violations.push(v),
            },
            "director" => match parse_string(name, value) {
                Ok(Some(s)) => checked.draft.director = Some(s),
                Ok(None) => checked.cleared_director = true,
                Err(v) => violations.push(v),
            },
            "rating" => match parse_number(name, value) {
                Ok(Some(n)) => checked.draft.rating = Some(n),
                Ok(None) => checked.cleared_rating = true,
                Err(v) => violations.push(v),
            },
            _ => violations.push(FieldViolation::new(
                name.as_str(),
                ViolationRule::UnknownField,
                "is not an accepted field",
            )),
        }
    }

    if mode == ValidationMode::Full {
        violations.extend(missing_required(fields));
    }

    if let Err(errors) = checked.draft.validate() {
        for (field, errs) in errors.field_errors() {
            let field = field.to_string();
            for err in errs {
                violations.push(constraint_violation(&field, &err.code, current_year));
            }
        }
    }

    if let Some(year) = checked.draft.year {
        if year > max_year(current_year) {
            violations.push(constraint_violation("year", "range", current_year));
        }
    }

    if violations.is_empty() {
        Ok(checked)
    } else {
        sort_violations(&mut violations);
        Err(ValidationError { violations })
    }
}

/// Unwraps a required field, recording null and type failures.
fn required<T>(
    field: &str,
    parsed: Result<Option<T>, FieldViolation>,
    violations: &mut Vec<FieldViolation>,
) -> Option<T> {
    match parsed {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            violations.push(FieldViolation::new(
                field,
                ViolationRule::NotNull,
                "must not be null",
            ));
            None
        }
        Err(v) => {
            violations.push(v);
            None
        }
    }
}

fn missing_required(fields: &Map<String, Value>) -> impl Iterator<Item = FieldViolation> + '_ {
    REQUIRED_FIELDS
        .iter()
        .filter(|name| !fields.contains_key(**name))
        .map(|name| FieldViolation::new(*name, ViolationRule::Required, "is required"))
}

fn parse_string(field: &str, value: &Value) -> Result<Option<String>, FieldViolation> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(FieldViolation::new(
            field,
            ViolationRule::Type,
            "must be a string",
        )),
    }
}

fn parse_integer(field: &str, value: &Value) -> Result<Option<i32>, FieldViolation> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_i64() {
            // Out-of-range integers are clamped so the range rule reports them.
            Some(i) => Ok(Some(
                i32::try_from(i).unwrap_or(if i < 0 { i32::MIN } else { i32::MAX }),
            )),
            None => Err(FieldViolation::new(
                field,
                ViolationRule::Type,
                "must be an integer",
            )),
        },
        _ => Err(FieldViolation::new(
            field,
            ViolationRule::Type,
            "must be an integer",
        )),
    }
}

fn parse_number(field: &str, value: &Value) -> Result<Option<f64>, FieldViolation> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| {
            FieldViolation::new(field, ViolationRule::Type, "must be a number")
        }),
        _ => Err(FieldViolation::new(
            field,
            ViolationRule::Type,
            "must be a number",
        )),
    }
}

fn constraint_violation(field: &str, code: &str, current_year: i32) -> FieldViolation {
    let (rule, message) = match (field, code) {
        (_, "length") => (ViolationRule::NonEmpty, "must not be empty".to_string()),
        ("year", _) => (
            ViolationRule::Range,
            format!("must be between {MIN_YEAR} and {}", max_year(current_year)),
        ),
        ("duration", _) => (
            ViolationRule::Range,
            format!("must be at least {MIN_DURATION}"),
        ),
        ("rating", _) => (
            ViolationRule::Range,
            format!("must be between {MIN_RATING} and {MAX_RATING}"),
        ),
        _ => (ViolationRule::Range, "is out of range".to_string()),
    };
    FieldViolation::new(field, rule, message)
}

fn sort_violations(violations: &mut [FieldViolation]) {
    violations.sort_by(|a, b| {
        let rank = |field: &str| {
            FIELDS
                .iter()
                .position(|f| *f == field)
                .unwrap_or(FIELDS.len())
        };
        rank(&a.field)
            .cmp(&rank(&b.field))
            .then_with(|| a.field.cmp(&b.field))
    });
}
