use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use tracing::debug;

use crate::{
    clients::config_store::ConfigStore,
    dispatcher::Dispatcher,
    models::{
        health::{ComponentHealth, HealthCheckResponse, HealthStatus},
        message::Channel,
    },
};

pub struct HealthChecker {
    config_store: Arc<dyn ConfigStore>,
    dispatcher: Arc<Dispatcher>,
}

impl HealthChecker {
    pub fn new(config_store: Arc<dyn ConfigStore>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            config_store,
            dispatcher,
        }
    }

    pub fn check_all(&self) -> HealthCheckResponse {
        let mut checks = HashMap::new();

        for channel in Channel::ALL {
            checks.insert(channel.to_string(), self.check_channel(channel));
        }

        checks.insert("dispatcher".to_string(), self.check_dispatcher());

        let overall_status = self.determine_overall_status(&checks);

        HealthCheckResponse {
            status: overall_status,
            timestamp: Utc::now(),
            checks,
        }
    }

    fn check_channel(&self, channel: Channel) -> ComponentHealth {
        let config = self.config_store.channel_config(channel);

        let health = if !config.enabled {
            ComponentHealth::degraded("Channel disabled".to_string())
        } else if !config.is_configured() {
            ComponentHealth::unhealthy("Credential missing or invalid".to_string())
        } else {
            ComponentHealth::healthy()
        };

        let pending = self
            .dispatcher
            .stats()
            .channels
            .get(&channel)
            .copied()
            .unwrap_or(0);

        debug!(%channel, status = ?health.status, pending, "Channel health checked");

        health.with_pending(pending)
    }

    fn check_dispatcher(&self) -> ComponentHealth {
        let stats = self.dispatcher.stats();
        ComponentHealth::healthy().with_pending(stats.pending + stats.scheduled_retries)
    }

    fn determine_overall_status(&self, checks: &HashMap<String, ComponentHealth>) -> HealthStatus {
        let has_unhealthy = checks
            .values()
            .any(|health| health.status == HealthStatus::Unhealthy);

        let has_degraded = checks
            .values()
            .any(|health| health.status == HealthStatus::Degraded);

        if has_unhealthy {
            HealthStatus::Unhealthy
        } else if has_degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}
