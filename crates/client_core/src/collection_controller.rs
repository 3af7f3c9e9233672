//! Visual ordering of item controllers and the reorder protocol.
//!
//! The controller list is indexed independently from the collection: it is
//! kept in step by draining [`CollectionEvent`]s after every mutation, so a
//! controller is created, moved, or detached in the same step as its item.
//! Requests that must reach the server are queued as [`SyncCommand`]s and
//! their results come back through [`CollectionController::apply`].

use shared::{
    domain::{ActionFields, ActionId, ActionRecord},
    protocol::SaveActionResponse,
};
use tracing::{debug, info, warn};

use crate::{
    collection::{CollectionEvent, OrderedCollection},
    error::EditorError,
    item::{EditState, ItemKey},
    item_controller::{CancelOutcome, ItemController, SaveRequest, SaveTarget},
    render::{PlainTemplates, RenderedList, Templates},
};

/// Everything a user can do to the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    AddNew { at: Option<usize> },
    Edit(ItemKey),
    Cancel(ItemKey),
    Save { key: ItemKey, fields: ActionFields },
    Delete(ItemKey),
    Drop { key: ItemKey, target: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    Save(SaveRequest),
    Destroy { id: ActionId },
    Reorder { order: Vec<ActionId> },
}

impl SyncCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SyncCommand::Save(SaveRequest {
                target: SaveTarget::Create,
                ..
            }) => "create",
            SyncCommand::Save(_) => "update",
            SyncCommand::Destroy { .. } => "destroy",
            SyncCommand::Reorder { .. } => "reorder",
        }
    }
}

/// A finished request. Transport failures carry the error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Saved {
        key: ItemKey,
        result: Result<SaveActionResponse, String>,
    },
    Destroyed {
        id: ActionId,
        result: Result<(), String>,
    },
    Reordered {
        order: Vec<ActionId>,
        result: Result<(), String>,
    },
}

pub struct CollectionController<T: Templates = PlainTemplates> {
    collection: OrderedCollection,
    views: Vec<ItemController>,
    templates: T,
    outbox: Vec<SyncCommand>,
    rendered: RenderedList,
    /// Unsaved items discarded while their create was in flight.
    abandoned_creates: Vec<ItemKey>,
}

impl<T: Templates> CollectionController<T> {
    /// Returns `None` when no seed was supplied: the list is inactive and
    /// nothing is set up.
    pub fn bootstrap(seed: Option<Vec<ActionRecord>>, templates: T) -> Option<Self> {
        let Some(seed) = seed else {
            debug!("no action seed supplied; action list inactive");
            return None;
        };

        let collection = OrderedCollection::seed(seed);
        let views = collection.iter().map(ItemController::new).collect();
        let mut controller = Self {
            collection,
            views,
            templates,
            outbox: Vec::new(),
            rendered: RenderedList::default(),
            abandoned_creates: Vec::new(),
        };
        controller.render();
        info!(actions = controller.views.len(), "action list started");
        Some(controller)
    }

    pub fn collection(&self) -> &OrderedCollection {
        &self.collection
    }

    pub fn views(&self) -> &[ItemController] {
        &self.views
    }

    pub fn view(&self, key: ItemKey) -> Option<&ItemController> {
        self.views.iter().find(|view| view.key() == key)
    }

    /// Key of the controller at a visual position.
    pub fn key_at(&self, position: usize) -> Option<ItemKey> {
        self.views.get(position).map(ItemController::key)
    }

    pub fn rendered(&self) -> &RenderedList {
        &self.rendered
    }

    pub fn take_commands(&mut self) -> Vec<SyncCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// Returns the key of the created item for [`UiEvent::AddNew`].
    pub fn dispatch(&mut self, event: UiEvent) -> Result<Option<ItemKey>, EditorError> {
        match event {
            UiEvent::AddNew { at } => return self.add_new(at).map(Some),
            UiEvent::Edit(key) => self.edit(key)?,
            UiEvent::Cancel(key) => self.cancel(key)?,
            UiEvent::Save { key, fields } => self.save(key, fields)?,
            UiEvent::Delete(key) => self.delete(key)?,
            UiEvent::Drop { key, target } => self.handle_drop(key, target)?,
        }
        Ok(None)
    }

    /// Adds a blank unsaved item at the end, or at `at` when given.
    pub fn add_new(&mut self, at: Option<usize>) -> Result<ItemKey, EditorError> {
        if let Some(position) = at {
            if position > self.collection.len() {
                return Err(EditorError::PositionOutOfRange {
                    position,
                    len: self.collection.len() + 1,
                });
            }
        }

        // placing an unsaved item changes no persisted order, so nothing is
        // pushed to the server here
        let key = self.collection.add(ActionRecord::default());
        if let Some(position) = at {
            self.collection.move_to(key, position)?;
        }
        self.sync_views();
        self.render();
        Ok(key)
    }

    pub fn edit(&mut self, key: ItemKey) -> Result<(), EditorError> {
        self.view_mut(key)?.edit()?;
        self.render();
        Ok(())
    }

    pub fn cancel(&mut self, key: ItemKey) -> Result<(), EditorError> {
        match self.view_mut(key)?.cancel()? {
            CancelOutcome::Reverted => {}
            CancelOutcome::Discard => {
                debug!(%key, "discarding unsaved action");
                self.note_abandoned_create(key);
                self.collection.remove(key);
                self.sync_views();
            }
        }
        self.render();
        Ok(())
    }

    pub fn save(&mut self, key: ItemKey, fields: ActionFields) -> Result<(), EditorError> {
        let position = self.view_position(key)?;
        let item = self
            .collection
            .get(key)
            .ok_or(EditorError::UnknownItem(key))?;
        let request = self.views[position].save(item, fields)?;
        info!(%key, target = ?request.target, "saving action");
        self.outbox.push(SyncCommand::Save(request));
        self.render();
        Ok(())
    }

    /// Removes the item and its controller at once; persisted items also get
    /// a destroy request whose reply nobody waits for.
    pub fn delete(&mut self, key: ItemKey) -> Result<(), EditorError> {
        let position = self.view_position(key)?;
        let item = self
            .collection
            .get(key)
            .ok_or(EditorError::UnknownItem(key))?;
        if let Some(id) = self.views[position].delete(item) {
            info!(%key, %id, "deleting action");
            self.outbox.push(SyncCommand::Destroy { id });
        } else {
            self.note_abandoned_create(key);
        }
        self.collection.remove(key);
        self.sync_views();
        self.render();
        Ok(())
    }

    pub fn handle_drop(&mut self, key: ItemKey, target: usize) -> Result<(), EditorError> {
        let request = self.views[self.view_position(key)?].drop_at(target);
        self.reorder(request.key, request.target)
    }

    /// Moves an item to `target` and pushes the resulting order of persisted
    /// ids to the server without waiting for the reply.
    pub fn reorder(&mut self, key: ItemKey, target: usize) -> Result<(), EditorError> {
        self.collection.move_to(key, target)?;
        self.sync_views();
        let order = self.collection.persisted_order();
        info!(%key, target, "reordering actions");
        self.outbox.push(SyncCommand::Reorder { order });
        self.render();
        Ok(())
    }

    pub fn apply(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Saved { key, result } => self.apply_save(key, result),
            SyncOutcome::Destroyed { id, result: Err(err) } => {
                warn!(%id, error = %err, "destroy request failed; server may still hold the action");
            }
            SyncOutcome::Destroyed { id, result: Ok(()) } => debug!(%id, "action destroyed"),
            SyncOutcome::Reordered { order, result: Err(err) } => {
                warn!(
                    actions = order.len(),
                    error = %err,
                    "reorder request failed; server order may differ from the list"
                );
            }
            SyncOutcome::Reordered { order, result: Ok(()) } => {
                debug!(actions = order.len(), "action order stored");
            }
        }
    }

    /// Clears and rebuilds the whole rendered list from controller order.
    pub fn render(&mut self) -> &RenderedList {
        self.rendered.clear();
        for view in &mut self.views {
            if let Some(item) = self.collection.get(view.key()) {
                let markup = view.render(item, &self.templates).to_string();
                self.rendered.push(view.key(), markup);
            }
        }
        &self.rendered
    }

    fn apply_save(&mut self, key: ItemKey, result: Result<SaveActionResponse, String>) {
        let Ok(position) = self.view_position(key) else {
            self.apply_detached_save(key, result);
            return;
        };
        let was_new = self.views[position].state() == EditState::New;

        match result {
            Ok(response) => {
                if let Some(record) = self.views[position].finish_save(response) {
                    if let Err(err) = self.collection.replace_payload(key, record) {
                        warn!(%key, error = %err, "saved action vanished from the list");
                    }
                    self.sync_views();
                    if was_new && self.collection.position_of(key) != Some(self.collection.len() - 1) {
                        // the server appended it; tell it where it really sits
                        let order = self.collection.persisted_order();
                        self.outbox.push(SyncCommand::Reorder { order });
                    }
                }
            }
            Err(err) => {
                warn!(%key, error = %err, "save request failed");
                self.views[position].fail_save(&err);
            }
        }
        self.render();
    }

    fn note_abandoned_create(&mut self, key: ItemKey) {
        if let Some(view) = self.view(key) {
            if view.state() == EditState::New && view.is_saving() {
                self.abandoned_creates.push(key);
            }
        }
    }

    /// A create that lands after its item was discarded is rolled back on
    /// the server.
    fn apply_detached_save(&mut self, key: ItemKey, result: Result<SaveActionResponse, String>) {
        let Some(index) = self.abandoned_creates.iter().position(|k| *k == key) else {
            debug!(%key, "ignoring save reply for a detached action");
            return;
        };
        self.abandoned_creates.swap_remove(index);
        let created = result
            .ok()
            .filter(|response| response.form_saved)
            .and_then(|response| response.data)
            .and_then(|data| data.id);
        match created {
            Some(id) => {
                info!(%key, %id, "destroying action created after it was discarded");
                self.outbox.push(SyncCommand::Destroy { id });
            }
            None => debug!(%key, "discarded action was never created"),
        }
    }

    fn sync_views(&mut self) {
        for event in self.collection.drain_events() {
            match event {
                CollectionEvent::Added { key, index } => {
                    if let Some(item) = self.collection.get(key) {
                        let index = index.min(self.views.len());
                        self.views.insert(index, ItemController::new(item));
                    }
                }
                CollectionEvent::Removed { key, index } => {
                    if self.views.get(index).map(ItemController::key) == Some(key) {
                        self.views.remove(index);
                    } else {
                        self.views.retain(|view| view.key() != key);
                    }
                }
                CollectionEvent::Moved { key, from, to } => {
                    let from = match self.views.get(from) {
                        Some(view) if view.key() == key => from,
                        _ => match self.views.iter().position(|view| view.key() == key) {
                            Some(position) => position,
                            None => continue,
                        },
                    };
                    let view = self.views.remove(from);
                    self.views.insert(to.min(self.views.len()), view);
                }
                // payload changes are picked up by the full render that
                // follows every mutation
                CollectionEvent::Changed { .. } => {}
            }
        }
    }

    fn view_position(&self, key: ItemKey) -> Result<usize, EditorError> {
        self.views
            .iter()
            .position(|view| view.key() == key)
            .ok_or(EditorError::UnknownItem(key))
    }

    fn view_mut(&mut self, key: ItemKey) -> Result<&mut ItemController, EditorError> {
        self.views
            .iter_mut()
            .find(|view| view.key() == key)
            .ok_or(EditorError::UnknownItem(key))
    }
}

#[cfg(test)]
#[path = "tests/collection_controller_tests.rs"]
mod tests;
