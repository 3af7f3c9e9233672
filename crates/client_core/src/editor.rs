//! Event loop glue: applies user events synchronously and runs the resulting
//! requests in the background.
//!
//! Requests are spawned as tokio tasks and never awaited by
//! [`ActionEditor::dispatch`]. Their results queue up on a channel until the
//! owner applies them with [`ActionEditor::pump`], [`ActionEditor::next_outcome`]
//! or [`ActionEditor::settle`]. There is no queueing, debouncing or
//! cancellation; overlapping requests race at the server and the reply
//! applied last wins.

use std::sync::Arc;

use shared::domain::ActionRecord;
use tokio::sync::mpsc;
use tracing::debug;

use crate::{
    api::ActionsApi,
    collection_controller::{CollectionController, SyncCommand, SyncOutcome, UiEvent},
    error::EditorError,
    item::ItemKey,
    item_controller::SaveTarget,
    render::{PlainTemplates, Templates},
};

pub struct ActionEditor<T: Templates = PlainTemplates> {
    controller: CollectionController<T>,
    api: Arc<dyn ActionsApi>,
    outcomes_tx: mpsc::UnboundedSender<SyncOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<SyncOutcome>,
    in_flight: usize,
}

impl<T: Templates> ActionEditor<T> {
    pub fn new(controller: CollectionController<T>, api: Arc<dyn ActionsApi>) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            api,
            outcomes_tx,
            outcomes_rx,
            in_flight: 0,
        }
    }

    /// `None` when there is no seed: the list is inactive.
    pub fn start(
        seed: Option<Vec<ActionRecord>>,
        templates: T,
        api: Arc<dyn ActionsApi>,
    ) -> Option<Self> {
        CollectionController::bootstrap(seed, templates).map(|controller| Self::new(controller, api))
    }

    pub fn controller(&self) -> &CollectionController<T> {
        &self.controller
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, event: UiEvent) -> Result<Option<ItemKey>, EditorError> {
        let created = self.controller.dispatch(event)?;
        self.flush();
        Ok(created)
    }

    /// Applies every reply that has already arrived. Returns how many.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.apply(outcome);
            applied += 1;
        }
        applied
    }

    /// Waits for the next reply and applies it. Returns `false` when nothing
    /// is in flight.
    pub async fn next_outcome(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.outcomes_rx.recv().await {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    /// Waits until every request, including ones triggered by replies, has
    /// been answered.
    pub async fn settle(&mut self) {
        while self.next_outcome().await {}
    }

    fn apply(&mut self, outcome: SyncOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.controller.apply(outcome);
        self.flush();
    }

    fn flush(&mut self) {
        for command in self.controller.take_commands() {
            debug!(command = command.name(), "sending action request");
            let api = Arc::clone(&self.api);
            let outcomes_tx = self.outcomes_tx.clone();
            self.in_flight += 1;
            tokio::spawn(async move {
                let fallback = command.clone();
                let request = tokio::spawn(async move { execute(api.as_ref(), command).await });
                // panicked requests are answered as failures
                let outcome = match request.await {
                    Ok(outcome) => outcome,
                    Err(err) => failed(fallback, format!("request task failed: {err}")),
                };
                let _ = outcomes_tx.send(outcome);
            });
        }
    }
}

fn failed(command: SyncCommand, reason: String) -> SyncOutcome {
    match command {
        SyncCommand::Save(request) => SyncOutcome::Saved {
            key: request.key,
            result: Err(reason),
        },
        SyncCommand::Destroy { id } => SyncOutcome::Destroyed {
            id,
            result: Err(reason),
        },
        SyncCommand::Reorder { order } => SyncOutcome::Reordered {
            order,
            result: Err(reason),
        },
    }
}

async fn execute(api: &dyn ActionsApi, command: SyncCommand) -> SyncOutcome {
    match command {
        SyncCommand::Save(request) => {
            let result = match request.target {
                SaveTarget::Create => api.create(&request.fields).await,
                SaveTarget::Update(id) => api.update(id, &request.fields).await,
            };
            SyncOutcome::Saved {
                key: request.key,
                result: result.map_err(|err| format!("{err:#}")),
            }
        }
        SyncCommand::Destroy { id } => SyncOutcome::Destroyed {
            id,
            result: api.destroy(id).await.map_err(|err| format!("{err:#}")),
        },
        SyncCommand::Reorder { order } => {
            let result = api.reorder(&order).await.map_err(|err| format!("{err:#}"));
            SyncOutcome::Reordered { order, result }
        }
    }
}
