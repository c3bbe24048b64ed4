use schedule_core::NotifiableSet;
use serde::Serialize;

use crate::dispatch::{ComposeError, DeliveryError};

pub const MAIL_SUBJECT: &str = "[DMM Eikaiwa] upcoming schedule";
const BLOCK_SEPARATOR: &str = "-------------------------";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub sender: String,
    /// Required at compose time; a run may start without it.
    pub send_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub sender: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Default sender address derived from the hosting application's id.
pub fn default_sender(app_id: &str) -> String {
    format!("anything@{app_id}.appspotmail.com")
}

/// One message for the whole batch, one block per source in the order given.
pub fn compose_mail(
    settings: &MailSettings,
    sets: &[NotifiableSet],
) -> Result<MailMessage, ComposeError> {
    let to = settings
        .send_to
        .as_deref()
        .filter(|to| !to.is_empty())
        .ok_or(ComposeError::MissingSetting("mail_send_to"))?;
    if sets.is_empty() {
        return Err(ComposeError::Empty);
    }

    let body = sets
        .iter()
        .map(|set| {
            format!(
                "\nTeacher: {}\n{}\n\nAccess to {}\n{BLOCK_SEPARATOR}\n",
                set.source.display_name,
                set.formatted_slots().join("\n"),
                set.source.page_url
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(MailMessage {
        sender: format!("DMM Eikaiwa schedule checker <{}>", settings.sender),
        to: vec![to.to_string()],
        subject: MAIL_SUBJECT.to_string(),
        body,
    })
}

#[async_trait::async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), DeliveryError>;
}

/// Hands the message as JSON to an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct HttpMailTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMailTransport {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait::async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(message)
            .send()
            .await
            .map_err(|err| DeliveryError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected(format!("http status {status}")));
        }
        Ok(())
    }
}
