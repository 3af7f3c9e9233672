use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ActionId, ActionRecord};

/// Messages reported for one field. The backend sends lists; a bare string
/// is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldErrors {
    One(String),
    Many(Vec<String>),
}

impl FieldErrors {
    pub fn messages(&self) -> Vec<&str> {
        match self {
            FieldErrors::One(message) => vec![message.as_str()],
            FieldErrors::Many(messages) => messages.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for FieldErrors {
    fn from(value: &str) -> Self {
        FieldErrors::One(value.to_string())
    }
}

/// Reply of the single-item create/update endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveActionResponse {
    pub form_saved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ActionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, FieldErrors>>,
}

impl SaveActionResponse {
    pub fn saved(data: ActionRecord) -> Self {
        Self {
            form_saved: true,
            data: Some(data),
            errors: None,
        }
    }

    pub fn rejected(errors: BTreeMap<String, FieldErrors>) -> Self {
        Self {
            form_saved: false,
            data: None,
            errors: Some(errors),
        }
    }

    /// Every `(field, message)` pair, in field order.
    pub fn error_lines(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .flatten()
            .flat_map(|(field, errors)| {
                errors
                    .messages()
                    .into_iter()
                    .map(move |message| (field.as_str(), message))
            })
            .collect()
    }
}

/// Body of the bulk reorder endpoint: persisted ids in their final order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOrderRequest {
    pub order: Vec<ActionId>,
}
