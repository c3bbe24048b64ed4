//! Schedule engine: fetch, diff, persist and notify pipeline.
mod config;
mod decode;
mod dispatch;
mod error;
mod extract;
mod fetch;
mod filename;
mod mail;
mod orchestrator;
mod persist;
mod reader;
mod slack;
mod store;
mod worker;

pub use config::{ConfigError, NotificationConfig, RunConfig, DEFAULT_APP_ID};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use dispatch::{
    strategy_for, BatchedStrategy, ComposeError, DeliveryError, DispatchError,
    NotificationStrategy, PerSourceStrategy,
};
pub use extract::{
    DmmScheduleExtractor, ExtractError, ExtractedSchedule, ScheduleExtractor, DEFAULT_MAX_DAYS,
};
pub use error::{FailureKind, FetchError};
pub use fetch::{FetchSettings, FetchedPage, Fetcher, ReqwestFetcher};
pub use filename::snapshot_filename;
pub use mail::{
    compose_mail, default_sender, HttpMailTransport, MailMessage, MailSettings, MailTransport,
    MAIL_SUBJECT,
};
pub use orchestrator::{Orchestrator, RunSummary};
pub use persist::{ensure_dir, replace_file, PersistError};
pub use reader::{DmmPageReader, SourceReader, DEFAULT_PAGE_BASE_URL};
pub use slack::{
    compose_slack_message, ChatTransport, SlackMessage, SlackSettings, SlackWebTransport,
    DEFAULT_SLACK_API_URL, DEFAULT_SLACK_CHANNEL,
};
pub use store::{FileSnapshotStore, SnapshotStore, StoreError};
pub use worker::{tokyo_now, Clock, Outcome, SourceWorker, WorkerError};
