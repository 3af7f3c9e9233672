use std::fmt;

use shared::domain::{ActionFields, ActionId, ActionRecord};

/// Client-local identity of an item. Assigned on insertion and never reused
/// within one collection, so unsaved items can be addressed too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(pub u64);

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    View,
    Edit,
    /// No server identity exists yet.
    New,
}

impl EditState {
    pub fn initial(id: Option<ActionId>) -> Self {
        match id {
            Some(_) => EditState::View,
            None => EditState::New,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionPayload {
    pub fields: ActionFields,
    /// Server-derived, read-only.
    pub authorized_keys_entry: String,
}

impl From<ActionRecord> for ActionPayload {
    fn from(record: ActionRecord) -> Self {
        Self {
            fields: record.fields,
            authorized_keys_entry: record.authorized_keys_entry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub(crate) key: ItemKey,
    pub(crate) id: Option<ActionId>,
    pub(crate) ordinal: i64,
    pub(crate) payload: ActionPayload,
}

impl Item {
    pub fn key(&self) -> ItemKey {
        self.key
    }

    pub fn id(&self) -> Option<ActionId> {
        self.id
    }

    pub fn ordinal(&self) -> i64 {
        self.ordinal
    }

    pub fn payload(&self) -> &ActionPayload {
        &self.payload
    }

    pub fn fields(&self) -> &ActionFields {
        &self.payload.fields
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
