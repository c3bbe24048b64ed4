use chrono::NaiveDateTime;
use engine_logging::engine_debug;
use regex::Regex;
use schedule_core::Slot;
use scraper::{Html, Selector};

/// Only the nearest days of the calendar are watched.
pub const DEFAULT_MAX_DAYS: usize = 2;

/// `YYYY-MM-DD HH:MM:00`, minutes on the hour or half hour.
const SLOT_PATTERN: &str =
    "[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01]) ([01][0-9]|2[0-3]):[03]0:00";
const SLOT_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSchedule {
    pub display_name: String,
    pub icon_url: Option<String>,
    pub slots: Vec<Slot>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid selector {0}")]
    Selector(String),
    #[error("invalid slot pattern: {0}")]
    Pattern(String),
    #[error("no teacher name heading on page")]
    MissingName,
}

pub trait ScheduleExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<ExtractedSchedule, ExtractError>;
}

/// Reads a DMM Eikaiwa teacher page:
/// - name from the last `<h1>`
/// - icon from the first `.profile-pic`
/// - open slots from `.bt-open` ids inside the first `max_days` `.oneday` blocks.
#[derive(Debug, Clone)]
pub struct DmmScheduleExtractor {
    max_days: usize,
}

impl DmmScheduleExtractor {
    pub fn new(max_days: usize) -> Self {
        Self { max_days }
    }
}

impl Default for DmmScheduleExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DAYS)
    }
}

impl ScheduleExtractor for DmmScheduleExtractor {
    fn extract(&self, html: &str) -> Result<ExtractedSchedule, ExtractError> {
        let doc = Html::parse_document(html);
        let heading_sel = selector("h1")?;
        let icon_sel = selector(".profile-pic")?;
        let day_sel = selector(".oneday")?;
        let date_sel = selector(".date")?;
        let open_sel = selector(".bt-open")?;
        let pattern =
            Regex::new(SLOT_PATTERN).map_err(|err| ExtractError::Pattern(err.to_string()))?;

        let display_name = doc
            .select(&heading_sel)
            .last()
            .map(|h| h.text().collect::<String>().trim().to_string())
            .ok_or(ExtractError::MissingName)?;

        let icon_url = doc
            .select(&icon_sel)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| src.to_string());

        let mut slots = Vec::new();
        for (index, day) in doc.select(&day_sel).take(self.max_days).enumerate() {
            let label = day
                .select(&date_sel)
                .next()
                .map(|d| d.text().collect::<String>())
                .unwrap_or_default();
            engine_debug!("day index={} label={}", index, label.trim());

            for open in day.select(&open_sel) {
                let Some(id) = open.value().attr("id") else {
                    continue;
                };
                match parse_slot(&pattern, id) {
                    Some(slot) => slots.push(slot),
                    None => engine_debug!("skipping open slot with unrecognised id={}", id),
                }
            }
        }

        Ok(ExtractedSchedule {
            display_name,
            icon_url,
            slots,
        })
    }
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|err| ExtractError::Selector(format!("{css}: {err:?}")))
}

fn parse_slot(pattern: &Regex, id: &str) -> Option<Slot> {
    let found = pattern.find(id)?;
    let local = NaiveDateTime::parse_from_str(found.as_str(), SLOT_LAYOUT).ok()?;
    Slot::from_tokyo_local(local)
}
