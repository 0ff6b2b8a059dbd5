//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::Show => handle_show(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    if !is_valid_config_key(key) {
        return Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        });
    }

    let mut config = store.load().await?;

    match key {
        "endpoint" => config.endpoint = Some(value.to_string()),
        "task_id" => config.task_id = Some(value.to_string()),
        "max_duration" => {
            value
                .parse::<Duration>()
                .map_err(|e| ConfigError::ValidationError {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
            config.max_duration = Some(value.to_string());
        }
        "debounce_ms" => {
            let ms = value.parse::<u64>().map_err(|_| ConfigError::ValidationError {
                key: key.to_string(),
                message: "Value must be a number of milliseconds".to_string(),
            })?;
            config.debounce_ms = Some(ms);
        }
        _ => unreachable!(), // Already validated
    }

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    if !is_valid_config_key(key) {
        return Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        });
    }

    let config = store.load().await?;
    let value = match key {
        "endpoint" => config.endpoint,
        "task_id" => config.task_id,
        "max_duration" => config.max_duration,
        "debounce_ms" => config.debounce_ms.map(|v| v.to_string()),
        _ => unreachable!(),
    };

    match value {
        Some(v) => presenter.output(&v),
        None => presenter.output("(not set)"),
    }
    Ok(())
}

async fn handle_show<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    let display = |value: Option<String>| value.unwrap_or_else(|| "(not set)".to_string());
    presenter.output(&format!("endpoint = {}", display(config.endpoint)));
    presenter.output(&format!("task_id = {}", display(config.task_id)));
    presenter.output(&format!("max_duration = {}", display(config.max_duration)));
    presenter.output(&format!(
        "debounce_ms = {}",
        display(config.debounce_ms.map(|v| v.to_string()))
    ));
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().display().to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::XdgConfigStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn set_and_get_round_trip() {
        let dir = tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let presenter = Presenter::new();

        handle_config_command(
            ConfigAction::Set {
                key: "endpoint".to_string(),
                value: "https://store.example/upload".to_string(),
            },
            &store,
            &presenter,
        )
        .await
        .unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(
            loaded.endpoint.as_deref(),
            Some("https://store.example/upload")
        );
    }

    #[tokio::test]
    async fn set_rejects_unknown_key() {
        let dir = tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let presenter = Presenter::new();

        let err = handle_config_command(
            ConfigAction::Set {
                key: "api_key".to_string(),
                value: "x".to_string(),
            },
            &store,
            &presenter,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn set_validates_duration_value() {
        let dir = tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let presenter = Presenter::new();

        let err = handle_config_command(
            ConfigAction::Set {
                key: "max_duration".to_string(),
                value: "whenever".to_string(),
            },
            &store,
            &presenter,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn set_validates_debounce_value() {
        let dir = tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let presenter = Presenter::new();

        let err = handle_config_command(
            ConfigAction::Set {
                key: "debounce_ms".to_string(),
                value: "soon".to_string(),
            },
            &store,
            &presenter,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }
}
