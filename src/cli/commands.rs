//! Command dispatch: one handler per subcommand

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{DocRequest, TargetService};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::Value;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::tree_traits::ValueTreeConvert;

/// Resolved inputs shared by the target commands.
struct TargetContext {
    service: TargetService,
    settings: Settings,
    file: PathBuf,
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        None => cmd_doc(cli, &DocRequest::default()),
        Some(Commands::Doc {
            all,
            base_path,
            raw,
        }) => cmd_doc(
            cli,
            &DocRequest {
                all: *all,
                base_path: base_path.clone(),
                raw: *raw,
            },
        ),
        Some(Commands::List { all }) => cmd_list(cli, *all),
        Some(Commands::Show { path }) => cmd_show(cli, path.as_deref()),
        Some(Commands::Get { path }) => cmd_get(cli, path),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) if dir.is_dir() => Ok(dir.clone()),
        Some(dir) => Err(CliError::InvalidArgs(format!(
            "project directory not found: {}",
            dir.display()
        ))),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine current directory", e).into()),
    }
}

fn target_context(cli: &Cli) -> CliResult<TargetContext> {
    let project_dir = project_dir(cli)?;
    let settings = Settings::load(Some(&project_dir))?;
    let file = match &cli.file {
        Some(file) => file.clone(),
        None => settings.targets_path(&project_dir),
    };
    debug!("targets file: {}", file.display());

    let container = ServiceContainer::new(settings.clone());
    Ok(TargetContext {
        service: container.target_service(),
        settings,
        file,
    })
}

#[instrument(skip(cli))]
fn cmd_doc(cli: &Cli, request: &DocRequest) -> CliResult<()> {
    let ctx = target_context(cli)?;
    let text = ctx.service.doc(&ctx.file, request)?;
    output::info(&text);
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_list(cli: &Cli, all: bool) -> CliResult<()> {
    let ctx = target_context(cli)?;
    let entries = ctx.service.entries(&ctx.file, all)?;
    if entries.is_empty() {
        output::warning(&format!("no documented targets in {}", ctx.file.display()));
    }
    for entry in entries {
        output::info(&entry.display_path());
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_show(cli: &Cli, path: Option<&str>) -> CliResult<()> {
    let ctx = target_context(cli)?;
    let path = path.unwrap_or(ctx.settings.all_attribute.as_str());
    let value = ctx.service.lookup(&ctx.file, path)?;
    output::info(&value.to_tree_string(path));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_get(cli: &Cli, path: &str) -> CliResult<()> {
    let ctx = target_context(cli)?;
    match ctx.service.get(&ctx.file, path)? {
        Value::Str(text) => output::info(&text),
        other => output::info(&other),
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let project_dir = project_dir(cli)?;
            let settings = Settings::load(Some(&project_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::location("global", &path, path.exists()),
                None => output::warning("no global config directory on this platform"),
            }
            let local = local_config_path(&project_dir(cli)?);
            output::location("local", &local, local.exists());
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

