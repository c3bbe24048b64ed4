use schedule_core::NotifiableSet;

use crate::dispatch::{ComposeError, DeliveryError};

pub const DEFAULT_SLACK_CHANNEL: &str = "#general";
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api/chat.postMessage";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackSettings {
    /// Required at compose time; a run may start without it.
    pub token: Option<String>,
    pub channel: String,
    pub api_url: String,
}

impl Default for SlackSettings {
    fn default() -> Self {
        Self {
            token: None,
            channel: DEFAULT_SLACK_CHANNEL.to_string(),
            api_url: DEFAULT_SLACK_API_URL.to_string(),
        }
    }
}

/// One `chat.postMessage` call, posted as the teacher rather than as the bot user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackMessage {
    pub token: String,
    pub channel: String,
    pub as_user: bool,
    pub username: String,
    pub icon_url: Option<String>,
    pub text: String,
}

impl SlackMessage {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("token", self.token.clone()),
            ("channel", self.channel.clone()),
            ("as_user", self.as_user.to_string()),
            ("username", self.username.clone()),
        ];
        if let Some(icon_url) = &self.icon_url {
            fields.push(("icon_url", icon_url.clone()));
        }
        fields.push(("text", self.text.clone()));
        fields
    }
}

pub fn compose_slack_message(
    settings: &SlackSettings,
    set: &NotifiableSet,
) -> Result<SlackMessage, ComposeError> {
    let token = settings
        .token
        .as_deref()
        .filter(|token| !token.is_empty())
        .ok_or(ComposeError::MissingSetting("slack_token"))?;

    Ok(SlackMessage {
        token: token.to_string(),
        channel: settings.channel.clone(),
        as_user: false,
        username: format!("{} from DMM Eikaiwa", set.source.display_name),
        icon_url: set.source.icon_url.clone(),
        text: format!(
            "\nHi, you can take a lesson below!\n{}\n\nAccess to <{}>\n",
            set.formatted_slots().join("\n"),
            set.source.page_url
        ),
    })
}

/// Chat-style delivery. Returns the raw response body on success.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, message: &SlackMessage) -> Result<Vec<u8>, DeliveryError>;
}

/// Posts to the Slack Web API as a form.
#[derive(Debug, Clone)]
pub struct SlackWebTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl SlackWebTransport {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait::async_trait]
impl ChatTransport for SlackWebTransport {
    async fn send(&self, message: &SlackMessage) -> Result<Vec<u8>, DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&message.form_fields())
            .send()
            .await
            .map_err(|err| DeliveryError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| DeliveryError::Transport(format!("response read failure: {err}")))?;
        if !status.is_success() {
            return Err(DeliveryError::Rejected(format!("http status {status}")));
        }

        // Slack answers 200 even for refused messages and says so in the body.
        if let Ok(reply) = serde_json::from_slice::<serde_json::Value>(&body) {
            if reply.get("ok") == Some(&serde_json::Value::Bool(false)) {
                let reason = reply
                    .get("error")
                    .and_then(|e| e.as_str())
                    .unwrap_or("unknown error");
                return Err(DeliveryError::Rejected(reason.to_string()));
            }
        }
        Ok(body.to_vec())
    }
}
