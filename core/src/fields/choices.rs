//! Choice-set checks for text and integer fields.

use std::collections::HashSet;

use super::{Field, FieldKind};
use crate::error::{ConfigError, FieldError};
use crate::models::Value;

impl Field {
    /// Reject choice sets that can never work: duplicates, wrong element
    /// types, or choices on a kind that has none.
    pub(super) fn check_choices(&self) -> Result<(), ConfigError> {
        let Some(choices) = &self.choices else {
            return Ok(());
        };

        match &self.kind {
            FieldKind::Text { .. } => {
                let mut seen = HashSet::new();
                for choice in choices {
                    let Value::Text(text) = choice else {
                        return Err(self.wrong_choice_type(choice));
                    };
                    if !seen.insert(text.as_str()) {
                        return Err(self.duplicate_choice(choice));
                    }
                }
                Ok(())
            }
            FieldKind::Integer => {
                let mut seen = HashSet::new();
                for choice in choices {
                    let Value::Int(number) = choice else {
                        return Err(self.wrong_choice_type(choice));
                    };
                    if !seen.insert(*number) {
                        return Err(self.duplicate_choice(choice));
                    }
                }
                Ok(())
            }
            other => Err(ConfigError::InvalidField {
                field: self.verbose_name.clone(),
                message: format!("{} fields do not support choices", other.name()),
            }),
        }
    }

    pub(super) fn ensure_text_choice(
        &self,
        value: &str,
        case_sensitive: bool,
        index: usize,
    ) -> Result<(), FieldError> {
        let Some(choices) = &self.choices else {
            return Ok(());
        };
        self.check_choices()?;

        let found = choices.iter().filter_map(Value::as_str).any(|choice| {
            if case_sensitive {
                choice == value
            } else {
                choice.to_lowercase() == value.to_lowercase()
            }
        });

        if found {
            Ok(())
        } else {
            Err(self.not_a_choice(value, choices, index))
        }
    }

    pub(super) fn ensure_integer_choice(&self, value: i64, index: usize) -> Result<(), FieldError> {
        let Some(choices) = &self.choices else {
            return Ok(());
        };
        self.check_choices()?;

        if choices.iter().any(|choice| choice.as_i64() == Some(value)) {
            Ok(())
        } else {
            Err(self.not_a_choice(value, choices, index))
        }
    }

    fn not_a_choice(
        &self,
        value: impl std::fmt::Display,
        choices: &[Value],
        index: usize,
    ) -> FieldError {
        let allowed: Vec<String> = choices.iter().map(Value::to_string).collect();
        self.error(
            index,
            format!(
                "{} is not a valid choice, it must be one of: {}.",
                value,
                allowed.join(", ")
            ),
        )
        .into()
    }

    fn duplicate_choice(&self, choice: &Value) -> ConfigError {
        ConfigError::DuplicateChoice {
            field: self.verbose_name.clone(),
            choice: choice.to_string(),
        }
    }

    fn wrong_choice_type(&self, choice: &Value) -> ConfigError {
        ConfigError::InvalidField {
            field: self.verbose_name.clone(),
            message: format!(
                "choice {} is a {}, expected {}",
                choice,
                choice.type_name(),
                self.kind.name()
            ),
        }
    }
}
