use std::collections::BTreeMap;

use shared::{
    domain::{ActionFields, ActionId, ActionRecord, ProjectId},
    error::ApiError,
    protocol::{FieldErrors, SaveActionResponse},
};
use tracing::info;

use crate::store::{ActionStore, StoredAction};

#[derive(Clone, Default)]
pub struct ApiContext {
    pub store: ActionStore,
}

const REQUIRED_FIELDS: [&str; 4] = ["name", "username", "host", "command"];
const MAX_LENGTHS: [(&str, usize); 3] = [("name", 64), ("username", 64), ("host", 255)];

pub async fn list_actions(ctx: &ApiContext, project: ProjectId) -> Vec<ActionRecord> {
    ctx.store
        .list(project)
        .await
        .into_iter()
        .map(as_record)
        .collect()
}

pub async fn create_action(
    ctx: &ApiContext,
    project: ProjectId,
    fields: ActionFields,
) -> SaveActionResponse {
    let errors = validate(&fields);
    if !errors.is_empty() {
        return SaveActionResponse::rejected(errors);
    }
    let action = ctx.store.insert(project, fields).await;
    info!(project = %project, action = %action.id, "action created");
    SaveActionResponse::saved(as_record(action))
}

/// Missing actions are an error; invalid input is a rejected save.
pub async fn update_action(
    ctx: &ApiContext,
    project: ProjectId,
    id: ActionId,
    fields: ActionFields,
) -> Result<SaveActionResponse, ApiError> {
    if ctx.store.get(project, id).await.is_none() {
        return Err(ApiError::action_not_found(project, id));
    }
    let errors = validate(&fields);
    if !errors.is_empty() {
        return Ok(SaveActionResponse::rejected(errors));
    }
    let action = ctx
        .store
        .update(project, id, fields)
        .await
        .ok_or_else(|| ApiError::action_not_found(project, id))?;
    info!(project = %project, action = %id, "action updated");
    Ok(SaveActionResponse::saved(as_record(action)))
}

pub async fn delete_action(ctx: &ApiContext, project: ProjectId, id: ActionId) -> Result<(), ApiError> {
    if !ctx.store.remove(project, id).await {
        return Err(ApiError::action_not_found(project, id));
    }
    info!(project = %project, action = %id, "action deleted");
    Ok(())
}

pub async fn set_action_order(
    ctx: &ApiContext,
    project: ProjectId,
    order: &[ActionId],
) -> Result<(), ApiError> {
    ctx.store
        .set_order(project, order)
        .await
        .map_err(|missing| ApiError::action_not_found(project, missing))?;
    info!(project = %project, actions = order.len(), "action order stored");
    Ok(())
}

pub fn validate(fields: &ActionFields) -> BTreeMap<String, FieldErrors> {
    let mut errors = BTreeMap::new();
    for field in REQUIRED_FIELDS {
        if fields.get(field).unwrap_or_default().trim().is_empty() {
            errors.insert(
                field.to_string(),
                FieldErrors::Many(vec!["This field is required.".to_string()]),
            );
        }
    }
    for (field, max) in MAX_LENGTHS {
        let len = fields.get(field).unwrap_or_default().chars().count();
        if len > max {
            errors.insert(
                field.to_string(),
                FieldErrors::Many(vec![format!(
                    "Ensure this value has at most {max} characters (it has {len})."
                )]),
            );
        }
    }
    errors
}

/// Restriction line to install in the target host's `authorized_keys`.
/// Actions without expected outputs are pinned to their command.
pub fn authorized_keys_entry(fields: &ActionFields) -> String {
    let mut entry = format!("# {}", fields.name);
    let locations: Vec<&str> = fields
        .outputs()
        .into_iter()
        .map(|(_, location)| location)
        .filter(|location| !location.is_empty())
        .collect();
    if locations.is_empty() {
        entry.push_str(&format!("\ncommand=\"{}\",", fields.command.replace('"', "\\\"")));
    } else {
        entry.push_str(&format!(" and for fetching output {}\n", locations.join(",")));
    }
    entry.push_str("no-agent-forwarding,no-port-forwarding,no-pty,no-X11-forwarding");
    entry
}

fn as_record(action: StoredAction) -> ActionRecord {
    ActionRecord {
        id: Some(action.id),
        index: Some(action.index),
        project: Some(action.project),
        authorized_keys_entry: authorized_keys_entry(&action.fields),
        fields: action.fields,
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
