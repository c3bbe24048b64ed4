/// Stable identifier of a monitored schedule page. Doubles as storage key and URL path segment.
pub type SourceId = String;

/// Identity and display metadata of one monitored schedule page.
///
/// `display_name` and `icon_url` come from the page itself, so a `Source` only
/// exists after a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub id: SourceId,
    pub display_name: String,
    pub page_url: String,
    pub icon_url: Option<String>,
}
