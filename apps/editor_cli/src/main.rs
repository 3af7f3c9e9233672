use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{apply_form_input, ActionEditor, HttpActionsApi, ItemKey, PlainTemplates, UiEvent};
use shared::domain::{ActionFields, ProjectId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    project: Option<i64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    Show,
    Add {
        #[arg(long)]
        at: Option<usize>,
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    Edit {
        position: usize,
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    Delete {
        position: usize,
    },
    Move {
        position: usize,
        target: usize,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{raw}'"))?;
    Ok((field.trim().to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let settings = load_settings();
    let server_url = cli.server_url.unwrap_or(settings.server_url);
    let project = cli
        .project
        .or(settings.project_id)
        .ok_or_else(|| anyhow!("no project: pass --project or set EDITOR__PROJECT_ID"))?;

    let api = HttpActionsApi::new(&server_url, ProjectId(project))?;
    let seed = api
        .fetch_seed()
        .await
        .with_context(|| format!("failed to load actions of project {project}"))?;
    let mut editor = ActionEditor::start(Some(seed), PlainTemplates, Arc::new(api))
        .ok_or_else(|| anyhow!("action list is inactive"))?;

    run(&mut editor, cli.command)?;
    editor.settle().await;

    print!("{}", editor.controller().rendered().markup());
    Ok(())
}

fn run(editor: &mut ActionEditor, command: Command) -> Result<()> {
    match command {
        Command::Show => {}
        Command::Add { at, set } => {
            let key = editor
                .dispatch(UiEvent::AddNew { at })?
                .ok_or_else(|| anyhow!("no item was created"))?;
            let mut fields = ActionFields::default();
            apply_assignments(&mut fields, &set)?;
            info!(item = %key, "saving new action");
            editor.dispatch(UiEvent::Save { key, fields })?;
        }
        Command::Edit { position, set } => {
            let key = key_at(editor, position)?;
            editor.dispatch(UiEvent::Edit(key))?;
            let controller = editor.controller();
            let item = controller
                .collection()
                .get(key)
                .ok_or_else(|| anyhow!("item {key} vanished"))?;
            let mut fields = controller
                .view(key)
                .ok_or_else(|| anyhow!("item {key} has no view"))?
                .form_values(item);
            apply_assignments(&mut fields, &set)?;
            info!(item = %key, "saving action");
            editor.dispatch(UiEvent::Save { key, fields })?;
        }
        Command::Delete { position } => {
            let key = key_at(editor, position)?;
            editor.dispatch(UiEvent::Delete(key))?;
        }
        Command::Move { position, target } => {
            let key = key_at(editor, position)?;
            editor.dispatch(UiEvent::Drop { key, target })?;
        }
    }
    Ok(())
}

fn key_at(editor: &ActionEditor, position: usize) -> Result<ItemKey> {
    editor
        .controller()
        .key_at(position)
        .ok_or_else(|| anyhow!("no action at position {position}"))
}

fn apply_assignments(fields: &mut ActionFields, set: &[(String, String)]) -> Result<()> {
    apply_form_input(
        fields,
        set.iter().map(|(field, value)| (field.as_str(), value.as_str())),
    )?;
    Ok(())
}
