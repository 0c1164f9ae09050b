use std::{sync::Arc, time::Duration};

use anyhow::{Error, Result};
use notify_service::{
    api::{AppState, run_api_server},
    clients::{
        adapter::{AdapterRegistry, build_http_client},
        config_store::{ConfigStore, FileConfigStore, InMemoryConfigStore},
        health::HealthChecker,
        telegram::TelegramAdapter,
        whatsapp::WhatsAppAdapter,
    },
    config::Config,
    service::NotificationService,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_store: Arc<dyn ConfigStore> = match &config.settings_file {
        Some(path) => {
            let store = Arc::new(FileConfigStore::open(path, config.channel_settings()).await?);
            store.spawn_watcher(Duration::from_secs(config.settings_reload_seconds.max(1)));
            store as Arc<dyn ConfigStore>
        }
        None => Arc::new(InMemoryConfigStore::new(config.channel_settings())),
    };

    let http_client = build_http_client(config.adapter_timeout_seconds)?;
    let adapters = AdapterRegistry::new()
        .register(Arc::new(WhatsAppAdapter::new(http_client.clone())))
        .register(Arc::new(TelegramAdapter::new(http_client)));

    let service = Arc::new(NotificationService::new(&config, Arc::clone(&config_store), adapters));
    for (channel, status) in service.config_status() {
        info!(%channel, enabled = status.enabled, configured = status.configured, "Channel status");
    }

    let dispatcher = service.start();

    let state = Arc::new(AppState::new(
        Arc::clone(&service),
        HealthChecker::new(config_store, Arc::clone(service.dispatcher())),
    ));

    tokio::select! {
        result = run_api_server(state, config.server_port) => result?,
        _ = tokio::signal::ctrl_c() => {
            let stats = service.queue_stats();
            if stats.pending > 0 || stats.scheduled_retries > 0 {
                warn!(pending = stats.pending, scheduled_retries = stats.scheduled_retries, "Shutting down with undelivered notifications");
            }
            info!("Shutdown signal received");
        }
    }

    dispatcher.abort();

    Ok(())
}
