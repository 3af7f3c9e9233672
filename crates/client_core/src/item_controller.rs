//! Per-item editing state machine.
//!
//! An [`ItemController`] holds the local editing state of one action: which
//! mode it is in, the form values last submitted, and the errors the server
//! reported for them. It never touches sibling items; anything that affects
//! membership or order is handed back to the collection controller.

use shared::{
    domain::{ActionFields, ActionId, ActionRecord},
    protocol::SaveActionResponse,
};
use tracing::{debug, info};

use crate::{
    error::EditorError,
    item::{EditState, Item, ItemKey},
    render::{FieldMap, Templates},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    Create,
    Update(ActionId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub key: ItemKey,
    pub target: SaveTarget,
    pub fields: ActionFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderRequest {
    pub key: ItemKey,
    pub target: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Edits dropped, back to the stored payload.
    Reverted,
    /// The item was never persisted; it and its controller must go.
    Discard,
}

#[derive(Debug)]
pub struct ItemController {
    key: ItemKey,
    state: EditState,
    draft: Option<ActionFields>,
    errors: Vec<(String, String)>,
    saving: bool,
    markup: String,
}

impl ItemController {
    pub fn new(item: &Item) -> Self {
        Self {
            key: item.key(),
            state: EditState::initial(item.id()),
            draft: None,
            errors: Vec::new(),
            saving: false,
            markup: String::new(),
        }
    }

    pub fn key(&self) -> ItemKey {
        self.key
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn draft(&self) -> Option<&ActionFields> {
        self.draft.as_ref()
    }

    /// `(field, message)` pairs from the last rejected save.
    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Values the edit form currently shows.
    pub fn form_values(&self, item: &Item) -> ActionFields {
        self.draft
            .clone()
            .unwrap_or_else(|| item.fields().clone())
    }

    pub fn edit(&mut self) -> Result<(), EditorError> {
        match self.state {
            EditState::View => {
                self.state = EditState::Edit;
                Ok(())
            }
            state @ (EditState::Edit | EditState::New) => Err(EditorError::InvalidTransition {
                event: "edit",
                state,
            }),
        }
    }

    pub fn cancel(&mut self) -> Result<CancelOutcome, EditorError> {
        match self.state {
            EditState::Edit => {
                self.state = EditState::View;
                self.draft = None;
                self.errors.clear();
                Ok(CancelOutcome::Reverted)
            }
            EditState::New => Ok(CancelOutcome::Discard),
            EditState::View => Err(EditorError::InvalidTransition {
                event: "cancel",
                state: EditState::View,
            }),
        }
    }

    /// Submits the form. The state does not change until the reply arrives.
    pub fn save(&mut self, item: &Item, fields: ActionFields) -> Result<SaveRequest, EditorError> {
        let target = match (self.state, item.id()) {
            (EditState::New, _) => SaveTarget::Create,
            (EditState::Edit, Some(id)) => SaveTarget::Update(id),
            (state, _) => {
                return Err(EditorError::InvalidTransition {
                    event: "save",
                    state,
                })
            }
        };
        self.draft = Some(fields.clone());
        self.saving = true;
        Ok(SaveRequest {
            key: self.key,
            target,
            fields,
        })
    }

    /// Applies the server's reply to a save. Returns the record to store when
    /// the save went through.
    pub fn finish_save(&mut self, response: SaveActionResponse) -> Option<ActionRecord> {
        self.saving = false;
        if !response.form_saved {
            let errors: Vec<(String, String)> = response
                .error_lines()
                .into_iter()
                .map(|(field, message)| (field.to_string(), message.to_string()))
                .collect();
            if self.state == EditState::View {
                debug!(key = %self.key, "dropping validation errors for an item no longer being edited");
                return None;
            }
            info!(key = %self.key, errors = errors.len(), "action save rejected");
            self.errors = errors;
            return None;
        }

        let Some(data) = response.data else {
            self.fail_save("server accepted the save but returned no action");
            return None;
        };
        if self.state == EditState::New && data.id.is_none() {
            self.fail_save("server created the action without an id");
            return None;
        }

        info!(key = %self.key, id = ?data.id, "action saved");
        self.state = EditState::View;
        self.draft = None;
        self.errors.clear();
        Some(data)
    }

    /// The save never got a reply. The state and draft are kept.
    pub fn fail_save(&mut self, reason: &str) {
        self.saving = false;
        self.errors = vec![("request".to_string(), reason.to_string())];
    }

    /// Returns the id to destroy on the server, if the item was ever saved.
    pub fn delete(&self, item: &Item) -> Option<ActionId> {
        item.id()
    }

    pub fn drop_at(&self, target: usize) -> ReorderRequest {
        ReorderRequest {
            key: self.key,
            target,
        }
    }

    pub fn render(&mut self, item: &Item, templates: &dyn Templates) -> &str {
        let mut map = FieldMap::new();
        let fields = match self.state {
            EditState::View => item.fields(),
            EditState::Edit | EditState::New => self.draft.as_ref().unwrap_or(item.fields()),
        };
        for (name, value) in fields.as_field_map() {
            map.insert(name, value);
        }
        map.insert(
            "authorized_keys_entry",
            item.payload().authorized_keys_entry.as_str(),
        );
        let id = match (self.state, item.id()) {
            (EditState::New, _) | (_, None) => "new".to_string(),
            (_, Some(id)) => id.to_string(),
        };
        map.insert("id", id);
        let label = if self.state == EditState::New {
            "Add"
        } else {
            "Save"
        };
        map.insert("submit_label", label);

        self.markup = match self.state {
            EditState::View => templates.view(&map),
            EditState::Edit | EditState::New => {
                map.insert("messages", self.render_errors(templates));
                templates.edit(&map)
            }
        };
        &self.markup
    }

    fn render_errors(&self, templates: &dyn Templates) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        let msg = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut map = FieldMap::new();
        map.insert("msg", msg);
        templates.error(&map)
    }
}

/// Applies `field=value` form input on top of `fields`.
pub fn apply_form_input<'a>(
    fields: &mut ActionFields,
    input: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<(), EditorError> {
    for (name, value) in input {
        if !fields.set_field(name, value) {
            return Err(EditorError::UnknownField(name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use shared::protocol::FieldErrors;

    use super::*;
    use crate::{collection::OrderedCollection, render::PlainTemplates};

    fn persisted() -> (OrderedCollection, ItemKey) {
        let collection = OrderedCollection::seed(vec![ActionRecord {
            id: Some(ActionId(4)),
            index: Some(0),
            fields: ActionFields {
                name: "deploy".into(),
                host: "web1".into(),
                ..ActionFields::default()
            },
            ..ActionRecord::default()
        }]);
        let key = collection.key_at(0).expect("key");
        (collection, key)
    }

    fn unsaved() -> (OrderedCollection, ItemKey) {
        let mut collection = OrderedCollection::new();
        let key = collection.add(ActionRecord::default());
        (collection, key)
    }

    #[test]
    fn initial_state_follows_identity() {
        let (collection, key) = persisted();
        let controller = ItemController::new(collection.get(key).expect("item"));
        assert_eq!(controller.state(), EditState::View);

        let (collection, key) = unsaved();
        let controller = ItemController::new(collection.get(key).expect("item"));
        assert_eq!(controller.state(), EditState::New);
    }

    #[test]
    fn edit_then_cancel_returns_to_view_and_drops_draft() {
        let (collection, key) = persisted();
        let item = collection.get(key).expect("item");
        let mut controller = ItemController::new(item);

        controller.edit().expect("edit");
        let mut fields = controller.form_values(item);
        fields.host = "web2".into();
        controller.save(item, fields).expect("save");
        controller.fail_save("connection refused");

        assert_eq!(controller.cancel(), Ok(CancelOutcome::Reverted));
        assert_eq!(controller.state(), EditState::View);
        assert!(controller.draft().is_none());
        assert!(controller.errors().is_empty());
        assert_eq!(controller.form_values(item).host, "web1");
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let (collection, key) = persisted();
        let item = collection.get(key).expect("item");
        let mut controller = ItemController::new(item);

        assert_eq!(
            controller.cancel(),
            Err(EditorError::InvalidTransition {
                event: "cancel",
                state: EditState::View
            })
        );
        assert!(controller.save(item, ActionFields::default()).is_err());

        controller.edit().expect("edit");
        assert_eq!(
            controller.edit(),
            Err(EditorError::InvalidTransition {
                event: "edit",
                state: EditState::Edit
            })
        );
    }

    #[test]
    fn cancel_of_new_item_asks_for_discard() {
        let (collection, key) = unsaved();
        let mut controller = ItemController::new(collection.get(key).expect("item"));
        assert_eq!(controller.cancel(), Ok(CancelOutcome::Discard));
    }

    #[test]
    fn save_targets_follow_state() {
        let (collection, key) = unsaved();
        let item = collection.get(key).expect("item");
        let mut controller = ItemController::new(item);
        let request = controller.save(item, ActionFields::default()).expect("save");
        assert_eq!(request.target, SaveTarget::Create);
        assert!(controller.is_saving());

        let (collection, key) = persisted();
        let item = collection.get(key).expect("item");
        let mut controller = ItemController::new(item);
        controller.edit().expect("edit");
        let request = controller.save(item, ActionFields::default()).expect("save");
        assert_eq!(request.target, SaveTarget::Update(ActionId(4)));
    }

    #[test]
    fn rejected_save_keeps_state_and_draft() {
        let (collection, key) = persisted();
        let item = collection.get(key).expect("item");
        let mut controller = ItemController::new(item);
        controller.edit().expect("edit");
        let mut fields = controller.form_values(item);
        fields.host.clear();
        controller.save(item, fields).expect("save");

        let record = controller.finish_save(SaveActionResponse::rejected(BTreeMap::from([(
            "host".to_string(),
            FieldErrors::from("required"),
        )])));

        assert!(record.is_none());
        assert_eq!(controller.state(), EditState::Edit);
        assert_eq!(controller.draft().map(|d| d.host.as_str()), Some(""));
        assert!(!controller.is_saving());
        let markup = controller.render(item, &PlainTemplates).to_string();
        assert!(markup.contains("host: required"), "{markup}");
    }

    #[test]
    fn create_reply_without_id_is_a_failure() {
        let (collection, key) = unsaved();
        let item = collection.get(key).expect("item");
        let mut controller = ItemController::new(item);
        controller.save(item, ActionFields::default()).expect("save");

        let record = controller.finish_save(SaveActionResponse::saved(ActionRecord::default()));

        assert!(record.is_none());
        assert_eq!(controller.state(), EditState::New);
        assert_eq!(controller.errors()[0].0, "request");
    }

    #[test]
    fn new_item_renders_add_button_and_new_id() {
        let (collection, key) = unsaved();
        let item = collection.get(key).expect("item");
        let mut controller = ItemController::new(item);

        let markup = controller.render(item, &PlainTemplates);
        assert!(markup.starts_with("[#new] editing"));
        assert!(markup.contains("[Add]"));
    }

    #[test]
    fn form_input_rejects_unknown_fields() {
        let mut fields = ActionFields::default();
        apply_form_input(&mut fields, [("host", "web3"), ("output_CX", "/x")]).expect("input");
        assert_eq!(fields.host, "web3");
        assert_eq!(fields.output_cx, "/x");

        assert_eq!(
            apply_form_input(&mut fields, [("index", "2")]),
            Err(EditorError::UnknownField("index".into()))
        );
    }
}
