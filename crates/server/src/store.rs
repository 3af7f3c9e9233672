use std::sync::Arc;

use shared::domain::{ActionFields, ActionId, ProjectId};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAction {
    pub id: ActionId,
    pub project: ProjectId,
    pub index: i64,
    pub fields: ActionFields,
}

/// In-memory action table shared by all handlers.
#[derive(Clone, Default)]
pub struct ActionStore {
    inner: Arc<RwLock<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    last_id: i64,
    actions: Vec<StoredAction>,
}

impl ActionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions of one project by stored index, then id.
    pub async fn list(&self, project: ProjectId) -> Vec<StoredAction> {
        let state = self.inner.read().await;
        let mut actions: Vec<StoredAction> = state
            .actions
            .iter()
            .filter(|action| action.project == project)
            .cloned()
            .collect();
        actions.sort_by_key(|action| (action.index, action.id));
        actions
    }

    pub async fn get(&self, project: ProjectId, id: ActionId) -> Option<StoredAction> {
        let state = self.inner.read().await;
        state
            .actions
            .iter()
            .find(|action| action.project == project && action.id == id)
            .cloned()
    }

    /// New actions go after the last one of the project.
    pub async fn insert(&self, project: ProjectId, fields: ActionFields) -> StoredAction {
        let mut state = self.inner.write().await;
        let index = state
            .actions
            .iter()
            .filter(|action| action.project == project)
            .map(|action| action.index + 1)
            .max()
            .unwrap_or(0);
        state.last_id += 1;
        let action = StoredAction {
            id: ActionId(state.last_id),
            project,
            index,
            fields,
        };
        state.actions.push(action.clone());
        action
    }

    pub async fn update(
        &self,
        project: ProjectId,
        id: ActionId,
        fields: ActionFields,
    ) -> Option<StoredAction> {
        let mut state = self.inner.write().await;
        let action = state
            .actions
            .iter_mut()
            .find(|action| action.project == project && action.id == id)?;
        action.fields = fields;
        Some(action.clone())
    }

    pub async fn remove(&self, project: ProjectId, id: ActionId) -> bool {
        let mut state = self.inner.write().await;
        let before = state.actions.len();
        state
            .actions
            .retain(|action| !(action.project == project && action.id == id));
        state.actions.len() != before
    }

    /// Stores `order` as indices `0..`. Nothing changes when an id is not in
    /// the project; that id is returned.
    pub async fn set_order(&self, project: ProjectId, order: &[ActionId]) -> Result<(), ActionId> {
        let mut state = self.inner.write().await;
        if let Some(missing) = order.iter().find(|id| {
            !state
                .actions
                .iter()
                .any(|action| action.project == project && action.id == **id)
        }) {
            return Err(*missing);
        }
        for (index, id) in order.iter().enumerate() {
            if let Some(action) = state
                .actions
                .iter_mut()
                .find(|action| action.project == project && action.id == *id)
            {
                action.index = index as i64;
            }
        }
        Ok(())
    }
}
