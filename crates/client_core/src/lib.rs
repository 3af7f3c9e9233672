pub mod api;
pub mod collection;
pub mod collection_controller;
pub mod editor;
pub mod error;
pub mod item;
pub mod item_controller;
pub mod render;

pub use api::{ActionsApi, HttpActionsApi};
pub use collection::{CollectionEvent, OrderedCollection};
pub use collection_controller::{CollectionController, SyncCommand, SyncOutcome, UiEvent};
pub use editor::ActionEditor;
pub use error::EditorError;
pub use item::{ActionPayload, EditState, Item, ItemKey};
pub use item_controller::{
    apply_form_input, CancelOutcome, ItemController, ReorderRequest, SaveRequest, SaveTarget,
};
pub use render::{FieldMap, PlainTemplates, RenderedList, Templates};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
