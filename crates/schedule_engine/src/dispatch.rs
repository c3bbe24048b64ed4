use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_info};
use schedule_core::NotifiableSet;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::config::NotificationConfig;
use crate::mail::{compose_mail, HttpMailTransport, MailSettings, MailTransport};
use crate::slack::{compose_slack_message, ChatTransport, SlackSettings, SlackWebTransport};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("missing required setting {0}")]
    MissingSetting(&'static str),
    #[error("no notifiable sources to compose")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("notification send failed: {0}")]
    Transport(String),
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Failure of one dispatch unit. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("message compose error: {0}")]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error("delivery task aborted: {0}")]
    Aborted(String),
}

/// How notifiable sets become messages. One result per dispatch unit.
#[async_trait::async_trait]
pub trait NotificationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn dispatch(&self, sets: Vec<NotifiableSet>) -> Vec<Result<(), DispatchError>>;
}

/// One chat message per source, all sent concurrently.
pub struct PerSourceStrategy {
    settings: Arc<SlackSettings>,
    transport: Arc<dyn ChatTransport>,
}

impl PerSourceStrategy {
    pub fn new(settings: SlackSettings, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            settings: Arc::new(settings),
            transport,
        }
    }
}

#[async_trait::async_trait]
impl NotificationStrategy for PerSourceStrategy {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn dispatch(&self, sets: Vec<NotifiableSet>) -> Vec<Result<(), DispatchError>> {
        let mut deliveries = JoinSet::new();
        for set in sets {
            let settings = self.settings.clone();
            let transport = self.transport.clone();
            deliveries.spawn(async move { post_one(&settings, transport.as_ref(), &set).await });
        }

        let mut results = Vec::with_capacity(deliveries.len());
        while let Some(joined) = deliveries.join_next().await {
            results.push(joined.unwrap_or_else(|err| {
                engine_error!("slack delivery task aborted: {}", err);
                Err(DispatchError::Aborted(err.to_string()))
            }));
        }
        results
    }
}

async fn post_one(
    settings: &SlackSettings,
    transport: &dyn ChatTransport,
    set: &NotifiableSet,
) -> Result<(), DispatchError> {
    let source_id = &set.source.id;
    let message = compose_slack_message(settings, set).map_err(|err| {
        engine_error!("source={} message compose error: {}", source_id, err);
        DispatchError::from(err)
    })?;

    match transport.send(&message).await {
        Ok(body) => {
            engine_debug!(
                "source={} slack response: {}",
                source_id,
                String::from_utf8_lossy(&body)
            );
            engine_info!(
                "source={} notified slots={} channel={}",
                source_id,
                set.new_slots.len(),
                message.channel
            );
            Ok(())
        }
        Err(err) => {
            engine_error!("source={} slack notification error: {}", source_id, err);
            Err(err.into())
        }
    }
}

/// A single mail for every notifiable source of the run.
pub struct BatchedStrategy {
    settings: MailSettings,
    transport: Arc<dyn MailTransport>,
}

impl BatchedStrategy {
    pub fn new(settings: MailSettings, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            settings,
            transport,
        }
    }
}

#[async_trait::async_trait]
impl NotificationStrategy for BatchedStrategy {
    fn name(&self) -> &'static str {
        "mail"
    }

    async fn dispatch(&self, sets: Vec<NotifiableSet>) -> Vec<Result<(), DispatchError>> {
        if sets.is_empty() {
            return Vec::new();
        }

        let message = match compose_mail(&self.settings, &sets) {
            Ok(message) => message,
            Err(err) => {
                engine_error!("mail compose error for {} sources: {}", sets.len(), err);
                return vec![Err(err.into())];
            }
        };
        engine_debug!("mail message: {:?}", message);

        let result = self.transport.send(&message).await;
        match &result {
            Ok(()) => engine_info!(
                "mail sent sources={} to={}",
                sets.len(),
                message.to.join(",")
            ),
            Err(err) => engine_error!("couldn't send email: {}", err),
        }
        vec![result.map_err(DispatchError::from)]
    }
}

/// Build the configured strategy with the default HTTP transports.
pub fn strategy_for(
    config: &NotificationConfig,
    client: reqwest::Client,
) -> Box<dyn NotificationStrategy> {
    match config {
        NotificationConfig::Slack(settings) => {
            let transport = SlackWebTransport::new(client, settings.api_url.clone());
            Box::new(PerSourceStrategy::new(settings.clone(), Arc::new(transport)))
        }
        NotificationConfig::Mail { settings, api_url } => {
            let transport = HttpMailTransport::new(client, api_url.clone());
            Box::new(BatchedStrategy::new(settings.clone(), Arc::new(transport)))
        }
    }
}
