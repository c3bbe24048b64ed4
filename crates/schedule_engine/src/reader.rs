use std::sync::Arc;

use engine_logging::engine_debug;
use schedule_core::{Source, SourceReading};
use url::Url;

use crate::decode::decode_page;
use crate::extract::ScheduleExtractor;
use crate::fetch::Fetcher;
use crate::{FailureKind, FetchError};

pub const DEFAULT_PAGE_BASE_URL: &str = "http://eikaiwa.dmm.com/teacher/index/";

/// Turns a source id into the page metadata and currently open slots.
#[async_trait::async_trait]
pub trait SourceReader: Send + Sync {
    async fn read(&self, source_id: &str) -> Result<SourceReading, FetchError>;
}

/// Reads teacher pages living at `{base_url}{id}/`.
pub struct DmmPageReader {
    base_url: Url,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn ScheduleExtractor>,
}

impl DmmPageReader {
    pub fn new(
        base_url: &str,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn ScheduleExtractor>,
    ) -> Result<Self, FetchError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        Ok(Self {
            base_url,
            fetcher,
            extractor,
        })
    }

    pub fn page_url(&self, source_id: &str) -> Result<String, FetchError> {
        let not_a_segment = source_id.is_empty()
            || source_id == "."
            || source_id == ".."
            || source_id.contains(&['/', '?', '#', '\\'][..]);
        if not_a_segment {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("source id {source_id:?} is not a single path segment"),
            ));
        }
        self.base_url
            .join(&format!("{source_id}/"))
            .map(|url| url.to_string())
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

#[async_trait::async_trait]
impl SourceReader for DmmPageReader {
    async fn read(&self, source_id: &str) -> Result<SourceReading, FetchError> {
        let page_url = self.page_url(source_id)?;
        let page = self.fetcher.fetch(&page_url).await?;
        if page.final_url != page.url {
            engine_debug!("source={} {} redirected to {}", source_id, page.url, page.final_url);
        }

        let decoded = decode_page(&page.body, page.content_type.as_deref())
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
        let schedule = self
            .extractor
            .extract(&decoded.html)
            .map_err(|err| FetchError::new(FailureKind::Parse, err.to_string()))?;

        engine_debug!(
            "source={} scraped name={} slots={} encoding={}",
            source_id,
            schedule.display_name,
            schedule.slots.len(),
            decoded.encoding
        );

        Ok(SourceReading {
            source: Source {
                id: source_id.to_string(),
                display_name: schedule.display_name,
                page_url,
                icon_url: schedule.icon_url,
            },
            slots: schedule.slots,
        })
    }
}
