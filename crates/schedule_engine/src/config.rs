use engine_logging::engine_info;
use schedule_core::SourceId;
use thiserror::Error;

use crate::mail::{default_sender, MailSettings};
use crate::reader::DEFAULT_PAGE_BASE_URL;
use crate::slack::{SlackSettings, DEFAULT_SLACK_API_URL, DEFAULT_SLACK_CHANNEL};

pub const KEY_TEACHERS: &str = "teachers";
pub const KEY_NOTIFICATION_TYPE: &str = "notification_type";
pub const KEY_SLACK_TOKEN: &str = "slack_token";
pub const KEY_SLACK_CHANNEL: &str = "slack_channel";
pub const KEY_SLACK_API_URL: &str = "slack_api_url";
pub const KEY_MAIL_SENDER: &str = "mail_sender";
pub const KEY_MAIL_SEND_TO: &str = "mail_send_to";
pub const KEY_MAIL_API_URL: &str = "mail_api_url";
pub const KEY_APP_ID: &str = "app_id";
pub const KEY_PAGE_BASE_URL: &str = "page_base_url";

pub const DEFAULT_APP_ID: &str = "lesson-watch";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid ENV settings. teachers is empty")]
    MissingTeachers,
    #[error("invalid ENV settings. notification_type is empty")]
    MissingNotificationType,
    #[error("invalid ENV settings. notification_type: {0:?} is neither slack nor mail")]
    UnknownNotificationType(String),
    #[error("invalid ENV settings. mail_api_url is required for mail notifications")]
    MissingMailEndpoint,
}

/// Which strategy delivers the run's notifications, with its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationConfig {
    Slack(SlackSettings),
    Mail {
        settings: MailSettings,
        api_url: String,
    },
}

/// Everything one run needs, read once before any source is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub source_ids: Vec<SourceId>,
    pub notification: NotificationConfig,
    pub page_base_url: String,
}

impl RunConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let source_ids = parse_source_ids(&get(KEY_TEACHERS).unwrap_or_default());
        if source_ids.is_empty() {
            return Err(ConfigError::MissingTeachers);
        }

        let notification = match get(KEY_NOTIFICATION_TYPE).as_deref() {
            None => return Err(ConfigError::MissingNotificationType),
            Some("slack") => NotificationConfig::Slack(SlackSettings {
                token: get(KEY_SLACK_TOKEN),
                channel: get(KEY_SLACK_CHANNEL).unwrap_or_else(|| {
                    engine_info!(
                        "{} not set. Default value '{}' is used.",
                        KEY_SLACK_CHANNEL,
                        DEFAULT_SLACK_CHANNEL
                    );
                    DEFAULT_SLACK_CHANNEL.to_string()
                }),
                api_url: get(KEY_SLACK_API_URL)
                    .unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string()),
            }),
            Some("mail") => {
                let api_url = get(KEY_MAIL_API_URL).ok_or(ConfigError::MissingMailEndpoint)?;
                let sender = get(KEY_MAIL_SENDER).unwrap_or_else(|| {
                    let app_id = get(KEY_APP_ID).unwrap_or_else(|| DEFAULT_APP_ID.to_string());
                    let sender = default_sender(&app_id);
                    engine_info!(
                        "{} not set. Default value '{}' is used.",
                        KEY_MAIL_SENDER,
                        sender
                    );
                    sender
                });
                NotificationConfig::Mail {
                    settings: MailSettings {
                        sender,
                        send_to: get(KEY_MAIL_SEND_TO),
                    },
                    api_url,
                }
            }
            Some(other) => return Err(ConfigError::UnknownNotificationType(other.to_string())),
        };

        Ok(Self {
            source_ids,
            notification,
            page_base_url: get(KEY_PAGE_BASE_URL)
                .unwrap_or_else(|| DEFAULT_PAGE_BASE_URL.to_string()),
        })
    }
}

fn parse_source_ids(raw: &str) -> Vec<SourceId> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
