//! Trivox CLI entry point

use std::process::ExitCode;

use clap::Parser;

use trivox::cli::{
    app::{load_merged_config, run_record, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    RecordOptions,
};
use trivox::domain::config::AppConfig;
use trivox::domain::recording::Duration;
use trivox::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Handle subcommands
    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    // Build CLI config from args
    let cli_config = AppConfig {
        endpoint: cli.endpoint.clone(),
        task_id: cli.task_id.clone(),
        max_duration: cli.max_duration.clone(),
        debounce_ms: None, // debounce comes from the config file only
    };

    // Merge config
    let config = load_merged_config(cli_config).await;

    // Parse the per-segment limit
    let limit = match config.max_duration.as_ref() {
        Some(s) => match s.parse::<Duration>() {
            Ok(d) => d,
            Err(e) => {
                presenter.error(&format!("Invalid max-duration: {}", e));
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        },
        None => Duration::segment_limit(),
    };
    let debounce = config.debounce_or_default();

    let Some(endpoint) = config.endpoint else {
        presenter.error(
            "No upload endpoint configured. Pass --endpoint, set TRIVOX_ENDPOINT, or run `trivox config set endpoint <URL>`",
        );
        return ExitCode::from(EXIT_USAGE_ERROR);
    };
    let Some(task_id) = config.task_id else {
        presenter.error(
            "No task id configured. Pass --task-id, set TRIVOX_TASK_ID, or run `trivox config set task_id <ID>`",
        );
        return ExitCode::from(EXIT_USAGE_ERROR);
    };

    let options = RecordOptions {
        endpoint,
        task_id,
        limit,
        debounce,
    };

    run_record(options).await
}
