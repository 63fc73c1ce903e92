use std::sync::OnceLock;

use database::{consts::consts::NAME_MAX_LENGTH, model::person::NewPerson};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("This field is required.")]
    Required,

    #[error("Field cannot be longer than {max} characters.")]
    TooLong { max: usize },

    #[error("Only ASCII letters and spaces are allowed, no digits or punctuation.")]
    InvalidCharacters,
}

/// A predicate over the raw field value and the error reported when it does not hold
pub struct Rule {
    pub check: fn(&str) -> bool,
    pub error: ValidationError,
    /// Later rules are skipped when this one fails
    pub stop: bool,
}

fn name_pattern() -> &'static Regex {
    static NAME_PATTERN: OnceLock<Regex> = OnceLock::new();

    NAME_PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z ]*$").expect("name pattern is valid"))
}

fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn fits_length(value: &str) -> bool {
    value.chars().count() <= NAME_MAX_LENGTH
}

fn has_name_characters(value: &str) -> bool {
    name_pattern().is_match(value)
}

/// Rules shared by both name fields, evaluated in order
pub const NAME_RULES: [Rule; 3] = [
    Rule {
        check: is_present,
        error: ValidationError::Required,
        stop: true,
    },
    Rule {
        check: fits_length,
        error: ValidationError::TooLong {
            max: NAME_MAX_LENGTH,
        },
        stop: false,
    },
    Rule {
        check: has_name_characters,
        error: ValidationError::InvalidCharacters,
        stop: false,
    },
];

#[derive(Debug, PartialEq)]
pub enum FieldValidation {
    Valid(String),
    Invalid(Vec<ValidationError>),
}

/// Runs `rules` against `value`, the first error is the one to show first
pub fn validate_field(value: &str, rules: &[Rule]) -> FieldValidation {
    let mut errors = Vec::new();

    for rule in rules {
        if (rule.check)(value) {
            continue;
        }

        errors.push(rule.error.clone());

        if rule.stop {
            break;
        }
    }

    if errors.is_empty() {
        FieldValidation::Valid(value.trim().to_string())
    } else {
        FieldValidation::Invalid(errors)
    }
}

/// Body of `POST /add`, field names follow the table columns
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PersonForm {
    #[serde(default)]
    pub jmeno: String,
    #[serde(default)]
    pub prijmeni: String,
    #[serde(default)]
    pub csrf_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
    pub jmeno: Vec<ValidationError>,
    pub prijmeni: Vec<ValidationError>,
    /// Errors not tied to a field, e.g. a failed CSRF check
    pub form: Vec<String>,
}

impl PersonForm {
    pub fn new(jmeno: impl Into<String>, prijmeni: impl Into<String>) -> Self {
        PersonForm {
            jmeno: jmeno.into(),
            prijmeni: prijmeni.into(),
            csrf_token: None,
        }
    }

    /// Validates both names, a stored name never has surrounding whitespace
    pub fn validate(&self) -> Result<NewPerson, FormErrors> {
        match (
            validate_field(&self.jmeno, &NAME_RULES),
            validate_field(&self.prijmeni, &NAME_RULES),
        ) {
            (FieldValidation::Valid(first_name), FieldValidation::Valid(last_name)) => {
                Ok(NewPerson::new(first_name, last_name))
            }
            (jmeno, prijmeni) => {
                let errors_of = |validation: FieldValidation| match validation {
                    FieldValidation::Valid(_) => Vec::new(),
                    FieldValidation::Invalid(errors) => errors,
                };

                Err(FormErrors {
                    jmeno: errors_of(jmeno),
                    prijmeni: errors_of(prijmeni),
                    form: Vec::new(),
                })
            }
        }
    }
}
