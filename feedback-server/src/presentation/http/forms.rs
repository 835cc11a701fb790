use std::collections::BTreeMap;

use validator::ValidationErrors;

use crate::domain::error::DomainError;

/// Messages shown next to form fields, plus an optional form-wide message.
#[derive(Debug, Default, Clone)]
pub(crate) struct FormErrors {
    fields: BTreeMap<String, String>,
    form: Option<String>,
}

impl FormErrors {
    pub(crate) fn form_level(message: impl Into<String>) -> Self {
        Self {
            fields: BTreeMap::new(),
            form: Some(message.into()),
        }
    }

    pub(crate) fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub(crate) fn form(&self) -> Option<&str> {
        self.form.as_deref()
    }

    fn insert(&mut self, field: &str, message: String) {
        self.fields.entry(field.to_string()).or_insert(message);
    }

    /// Field-level errors for recoverable domain failures; `None` for anything
    /// that must be handled as a request error instead.
    pub(crate) fn from_domain(err: &DomainError) -> Option<Self> {
        let mut errors = Self::default();
        match err {
            DomainError::Validation { field, message } => {
                errors.insert(field, format!("{} {message}.", field_label(field)));
            }
            DomainError::AlreadyExists("username") => {
                errors.insert("username", "Username is already taken.".to_string());
            }
            DomainError::AlreadyExists("email") => {
                errors.insert("email", "Email address is already registered.".to_string());
            }
            DomainError::AlreadyExists(field) => {
                errors.form = Some(format!("{} already exists.", field_label(field)));
            }
            _ => return None,
        }
        Some(errors)
    }
}

impl From<&ValidationErrors> for FormErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut out = Self::default();
        for (field, field_errors) in errors.field_errors() {
            let field: &str = field.as_ref();
            let message = field_errors
                .iter()
                .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("{} is invalid.", field_label(field)));
            out.insert(field, message);
        }
        out
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "username" => "Username",
        "password" => "Password",
        "email" => "Email address",
        "first_name" => "First name",
        "last_name" => "Last name",
        "title" => "Title",
        "content" => "Content",
        other => other,
    }
}
