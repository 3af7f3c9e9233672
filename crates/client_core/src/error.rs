use thiserror::Error;

use crate::item::{EditState, ItemKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("no action with key {0}")]
    UnknownItem(ItemKey),
    #[error("cannot {event} an action in {state:?} state")]
    InvalidTransition {
        event: &'static str,
        state: EditState,
    },
    #[error("position {position} is outside the list of {len} actions")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("unknown action field '{0}'")]
    UnknownField(String),
}
