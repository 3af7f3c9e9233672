use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ActionId);
id_newtype!(ProjectId);

/// Names of the editable action fields, in form order.
pub const EDITABLE_FIELDS: [&str; 10] = [
    "name",
    "username",
    "host",
    "command",
    "hook_success",
    "hook_failure",
    "hook_finished",
    "output_UX",
    "output_CX",
    "output_CH",
];

/// The subset of an action the save path transmits. Identity and ordinal are
/// never part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub hook_success: String,
    #[serde(default)]
    pub hook_failure: String,
    #[serde(default)]
    pub hook_finished: String,
    #[serde(default, rename = "output_UX")]
    pub output_ux: String,
    #[serde(default, rename = "output_CX")]
    pub output_cx: String,
    #[serde(default, rename = "output_CH")]
    pub output_ch: String,
}

impl ActionFields {
    pub fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            "name" => &self.name,
            "username" => &self.username,
            "host" => &self.host,
            "command" => &self.command,
            "hook_success" => &self.hook_success,
            "hook_failure" => &self.hook_failure,
            "hook_finished" => &self.hook_finished,
            "output_UX" => &self.output_ux,
            "output_CX" => &self.output_cx,
            "output_CH" => &self.output_ch,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Sets a field by its wire name. Returns `false` for unknown names.
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "username" => &mut self.username,
            "host" => &mut self.host,
            "command" => &mut self.command,
            "hook_success" => &mut self.hook_success,
            "hook_failure" => &mut self.hook_failure,
            "hook_finished" => &mut self.hook_finished,
            "output_UX" => &mut self.output_ux,
            "output_CX" => &mut self.output_cx,
            "output_CH" => &mut self.output_ch,
            _ => return false,
        };
        *slot = value.into();
        true
    }

    pub fn as_field_map(&self) -> Vec<(&'static str, &str)> {
        EDITABLE_FIELDS
            .iter()
            .map(|field| (*field, self.get(field).unwrap_or_default()))
            .collect()
    }

    pub fn outputs(&self) -> [(&'static str, &str); 3] {
        [
            ("UX", self.output_ux.as_str()),
            ("CX", self.output_cx.as_str()),
            ("CH", self.output_ch.as_str()),
        ]
    }
}

/// An action as the server hands it out: seed entries and save responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ActionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectId>,
    #[serde(flatten)]
    pub fields: ActionFields,
    #[serde(default)]
    pub authorized_keys_entry: String,
}
