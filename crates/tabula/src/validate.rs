//! Field rules checked before a record is written.

use crate::ModelSchema;

use regex::Regex;
use std::{any::TypeId, collections::HashMap, fmt, sync::Arc};
use tabula_core::{stmt::Value, Error, Result};

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Checks one value. The error is a message for the caller.
pub type CheckFn = Arc<dyn Fn(&Value) -> std::result::Result<(), String> + Send + Sync>;

/// A constraint on one field.
///
/// Every rule except `Required` accepts a null value.
#[derive(Clone)]
pub enum Rule {
    /// Not null, and not an empty string
    Required,

    /// Numbers at least this large; text at least this many characters
    Min(i64),

    /// Numbers at most this large; text at most this many characters
    Max(i64),

    MinLength(usize),

    MaxLength(usize),

    Email,

    Custom(String, CheckFn),
}

impl Rule {
    pub fn custom(
        name: impl Into<String>,
        check: impl Fn(&Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Rule {
        Rule::Custom(name.into(), Arc::new(check))
    }

    pub fn name(&self) -> &str {
        match self {
            Rule::Required => "required",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::MinLength(_) => "min_length",
            Rule::MaxLength(_) => "max_length",
            Rule::Email => "email",
            Rule::Custom(name, _) => name,
        }
    }

    fn check(&self, value: &Value, email: &Regex) -> std::result::Result<(), String> {
        if let Rule::Required = self {
            return match value {
                Value::Null => Err("is required".into()),
                Value::String(s) if s.is_empty() => Err("is required".into()),
                _ => Ok(()),
            };
        }

        if value.is_null() {
            return Ok(());
        }

        match (self, value) {
            (Rule::Min(min), Value::I64(v)) if v < min => Err(format!("must be at least {min}")),
            (Rule::Min(min), Value::F64(v)) if *v < *min as f64 => {
                Err(format!("must be at least {min}"))
            }
            (Rule::Min(min), Value::String(s)) if (char_len(s) as i64) < *min => {
                Err(format!("must be at least {min} characters"))
            }
            (Rule::Max(max), Value::I64(v)) if v > max => Err(format!("must be at most {max}")),
            (Rule::Max(max), Value::F64(v)) if *v > *max as f64 => {
                Err(format!("must be at most {max}"))
            }
            (Rule::Max(max), Value::String(s)) if (char_len(s) as i64) > *max => {
                Err(format!("must be at most {max} characters"))
            }
            (Rule::MinLength(min), Value::String(s)) if char_len(s) < *min => {
                Err(format!("must be at least {min} characters"))
            }
            (Rule::MaxLength(max), Value::String(s)) if char_len(s) > *max => {
                Err(format!("must be at most {max} characters"))
            }
            (Rule::Email, Value::String(s)) if !email.is_match(s) => {
                Err("must be a valid email address".into())
            }
            (Rule::Email, value) if value.as_str().is_none() => {
                Err("must be a valid email address".into())
            }
            (Rule::Custom(_, check), value) => check(value),
            _ => Ok(()),
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Min(n) | Rule::Max(n) => write!(f, "{}({n})", self.name()),
            Rule::MinLength(n) | Rule::MaxLength(n) => write!(f, "{}({n})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Rules registered per model, checked in registration order.
#[derive(Clone)]
pub(crate) struct Validator {
    email: Regex,
    rules: HashMap<TypeId, Vec<(String, Rule)>>,
}

impl Validator {
    pub(crate) fn new() -> Result<Validator> {
        let email = Regex::new(EMAIL_PATTERN).map_err(anyhow::Error::from)?;
        Ok(Validator {
            email,
            rules: HashMap::new(),
        })
    }

    pub(crate) fn add(&mut self, model: TypeId, field: String, rule: Rule) {
        self.rules.entry(model).or_default().push((field, rule));
    }

    /// Checks `record`, reporting the first failing rule.
    pub(crate) fn validate<M: 'static>(&self, schema: &ModelSchema<M>, record: &M) -> Result<()> {
        let Some(rules) = self.rules.get(&TypeId::of::<M>()) else {
            return Ok(());
        };

        for (field, rule) in rules {
            let value = schema.get(record, field).unwrap_or_default();
            rule.check(&value, &self.email)
                .map_err(|message| Error::validation(field.as_str(), rule.name(), message))?;
        }

        Ok(())
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("models", &self.rules.len())
            .finish()
    }
}
