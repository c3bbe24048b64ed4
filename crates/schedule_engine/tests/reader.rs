use std::sync::Arc;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use schedule_core::Slot;
use schedule_engine::{
    DmmPageReader, DmmScheduleExtractor, ExtractError, FailureKind, FetchSettings,
    ReqwestFetcher, ScheduleExtractor, SourceReader,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEACHER_PAGE: &str = include_str!("fixtures/teacher_page.html");

fn tokyo(day: u32, hour: u32, minute: u32) -> Slot {
    let local = NaiveDate::from_ymd_opt(2016, 6, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap();
    Slot::from_tokyo_local(local).unwrap()
}

fn reader_for(base_url: &str) -> DmmPageReader {
    DmmPageReader::new(
        base_url,
        Arc::new(ReqwestFetcher::new(FetchSettings::default()).unwrap()),
        Arc::new(DmmScheduleExtractor::default()),
    )
    .unwrap()
}

#[test]
fn extractor_reads_name_icon_and_first_two_days() {
    let schedule = DmmScheduleExtractor::default()
        .extract(TEACHER_PAGE)
        .unwrap();

    assert_eq!(schedule.display_name, "Jelo（ジェロ）");
    assert_eq!(
        schedule.icon_url.as_deref(),
        Some("http://image.eikaiwa.dmm.com/teacher/11002/1_201604151625.jpg")
    );
    assert_eq!(
        schedule.slots,
        vec![
            tokyo(10, 20, 0),
            tokyo(10, 20, 30),
            tokyo(10, 21, 0),
            tokyo(11, 0, 0),
            tokyo(11, 1, 30),
        ]
    );
}

#[test]
fn extractor_day_limit_is_configurable() {
    let one_day = DmmScheduleExtractor::new(1).extract(TEACHER_PAGE).unwrap();
    assert_eq!(one_day.slots.len(), 3);

    let all_days = DmmScheduleExtractor::new(7).extract(TEACHER_PAGE).unwrap();
    assert_eq!(all_days.slots.len(), 6);
    assert_eq!(all_days.slots.last(), Some(&tokyo(12, 9, 0)));
}

#[test]
fn extractor_keeps_repeated_slots() {
    let html = r#"<html><body><h1>T</h1><div class="oneday">
        <a class="bt-open" id="2016-06-10 20:00:00"></a>
        <a class="bt-open" id="x 2016-06-10 20:00:00"></a>
    </div></body></html>"#;
    let schedule = DmmScheduleExtractor::default().extract(html).unwrap();
    assert_eq!(schedule.slots, vec![tokyo(10, 20, 0), tokyo(10, 20, 0)]);
    assert_eq!(schedule.icon_url, None);
}

#[test]
fn extractor_rejects_page_without_heading() {
    let err = DmmScheduleExtractor::default()
        .extract("<html><body><p>maintenance</p></body></html>")
        .unwrap_err();
    assert_eq!(err, ExtractError::MissingName);
}

#[test]
fn page_url_appends_id_segment() {
    let reader = reader_for("http://eikaiwa.dmm.com/teacher/index");
    assert_eq!(
        reader.page_url("11002").unwrap(),
        "http://eikaiwa.dmm.com/teacher/index/11002/"
    );
    assert_eq!(reader.page_url("a/b").unwrap_err().kind, FailureKind::InvalidUrl);
    assert_eq!(reader.page_url("").unwrap_err().kind, FailureKind::InvalidUrl);
    assert_eq!(reader.page_url("..").unwrap_err().kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn reader_fetches_and_extracts_teacher_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teacher/index/11002/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(TEACHER_PAGE.as_bytes(), "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let base = format!("{}/teacher/index/", server.uri());
    let reading = reader_for(&base).read("11002").await.unwrap();

    assert_eq!(reading.source.id, "11002");
    assert_eq!(reading.source.display_name, "Jelo（ジェロ）");
    assert_eq!(reading.source.page_url, format!("{base}11002/"));
    assert_eq!(reading.slots.len(), 5);
    assert_eq!(reading.slots[0], tokyo(10, 20, 0));
}

#[tokio::test]
async fn reader_reports_maintenance_page_as_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teacher/index/11002/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>closed</body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let base = format!("{}/teacher/index/", server.uri());
    let err = reader_for(&base).read("11002").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Parse);
}

#[tokio::test]
async fn reader_propagates_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let base = format!("{}/teacher/index/", server.uri());
    let err = reader_for(&base).read("11002").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn reader_follows_moved_page_but_keeps_canonical_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teacher/index/11002/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/moved/11002/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/moved/11002/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(TEACHER_PAGE, "text/html"))
        .mount(&server)
        .await;

    let base = format!("{}/teacher/index/", server.uri());
    let reading = reader_for(&base).read("11002").await.unwrap();

    assert_eq!(reading.source.page_url, format!("{base}11002/"));
    assert_eq!(reading.slots.len(), 5);
}
