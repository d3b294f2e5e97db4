//! End-to-end tests against an in-process mock of the tvheadend web API.
//!
//! The mock serves a deterministic programme table (1000 events, one per
//! minute across three channels) and records every form it receives, so the
//! tests can drive `TvhClient` + `EpgBrowser` exactly as the console does.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use tvh_proto::autorec::DONT_CARE;
use tvh_proto::browser::EpgBrowser;
use tvh_proto::catalog::Catalogs;
use tvh_proto::client::{ClientError, TvhClient};
use tvh_proto::config::{EpgConfig, ServerConfig};
use tvh_proto::idnode::{row_uuid, GridResource};
use tvh_proto::model::RecordOp;
use tvh_proto::query::Outcome;

const TOTAL: usize = 1000;
const BASE_TS: i64 = 1_700_000_000;

#[derive(Default)]
struct Mock {
    epg_requests: usize,
    posts: Vec<HashMap<String, String>>,
    deny_dvr: bool,
    fail_confignames: bool,
    tags: Vec<Value>,
}

type Shared = Arc<Mutex<Mock>>;

fn mock_event(i: usize) -> Value {
    let channel = (i % 3) + 1;
    let title = if i % 10 == 0 {
        format!("News at {}", i)
    } else {
        format!("Show {}", i)
    };
    let duration = [1800, 3600, 5400][i % 3];
    let start = BASE_TS + i as i64 * 60;
    json!({
        "id": i,
        "channel": format!("Channel {}", channel),
        "channelid": channel,
        "title": title,
        "start": start,
        "end": start + duration,
        "duration": duration,
        "contenttype": 0x20,
    })
}

async fn epg(State(mock): State<Shared>, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    mock.lock().unwrap().epg_requests += 1;
    let matching: Vec<Value> = (0..TOTAL)
        .map(mock_event)
        .filter(|ev| {
            let title = ev["title"].as_str().unwrap_or_default();
            let channel = ev["channelid"].to_string();
            let duration = ev["duration"].as_u64().unwrap_or(0);
            q.get("title").map_or(true, |t| title.contains(t.as_str()))
                && q.get("channel").map_or(true, |c| *c == channel)
                // channel 1 carries the "Sports" tag
                && q.get("tag").map_or(true, |t| t == "Sports" && channel == "1")
                && q
                    .get("minduration")
                    .and_then(|v| v.parse::<u64>().ok())
                    .map_or(true, |min| duration >= min)
                && q
                    .get("maxduration")
                    .and_then(|v| v.parse::<u64>().ok())
                    .map_or(true, |max| duration <= max)
        })
        .collect();
    let start: usize = q.get("start").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit: usize = q.get("limit").and_then(|v| v.parse().ok()).unwrap_or(50);
    let entries: Vec<Value> = matching.iter().skip(start).take(limit).cloned().collect();
    Json(json!({ "totalCount": matching.len(), "entries": entries }))
}

async fn epgrelated(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let id: i64 = q.get("id").and_then(|v| v.parse().ok()).unwrap_or(0);
    let entries = match q.get("type").map(String::as_str) {
        Some("alternative") => json!([
            { "id": id + 1000, "channel": "Channel 3", "start": BASE_TS + 86400 }
        ]),
        Some("related") => json!([
            { "uri": "ep/1", "title": "Show", "subtitle": "Pilot", "episode": "E01" },
            { "uri": "ep/2", "title": "Show", "episode": "E02" }
        ]),
        _ => json!([]),
    };
    Json(json!({ "entries": entries }))
}

async fn dvr(State(mock): State<Shared>, Form(form): Form<HashMap<String, String>>) -> Response {
    let mut m = mock.lock().unwrap();
    let op = form.get("op").cloned().unwrap_or_default();
    m.posts.push(form);
    if m.deny_dvr && op != "createAutoRec" {
        return StatusCode::FORBIDDEN.into_response();
    }
    Json(json!({ "success": 1 })).into_response()
}

async fn ecglist() -> Json<Value> {
    Json(json!({ "entries": [
        { "name": "Sports", "code": 0x40 },
        { "name": "News / Current affairs", "code": 0x20 },
        { "name": "Football", "code": 0x43 }
    ]}))
}

async fn chlist() -> Json<Value> {
    Json(json!({ "entries": [
        { "key": 1, "val": "Channel 1" },
        { "key": 2, "val": "Channel 2" },
        { "key": 3, "val": "Channel 3" }
    ]}))
}

async fn channeltags() -> Json<Value> {
    Json(json!({ "entries": [ { "identifier": 1, "name": "Sports" } ] }))
}

async fn confignames(State(mock): State<Shared>) -> Response {
    if mock.lock().unwrap().fail_confignames {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({ "entries": [ { "identifier": "", "name": "(default)" } ] })).into_response()
}

async fn tag_grid(State(mock): State<Shared>, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    assert_eq!(q.get("sort").map(String::as_str), Some("name"));
    let tags = mock.lock().unwrap().tags.clone();
    Json(json!({ "entries": tags, "total": tags.len() }))
}

async fn idnode_delete(State(mock): State<Shared>, Form(form): Form<HashMap<String, String>>) -> StatusCode {
    let mut m = mock.lock().unwrap();
    let uuids: Vec<String> = form
        .get("uuid")
        .and_then(|v| serde_json::from_str(v).ok())
        .unwrap_or_default();
    m.tags.retain(|t| !uuids.iter().any(|u| t["uuid"] == json!(u)));
    m.posts.push(form);
    StatusCode::OK
}

async fn start_mock() -> (TvhClient, Shared) {
    let mock: Shared = Arc::new(Mutex::new(Mock {
        tags: vec![
            json!({ "uuid": "t1", "enabled": true, "name": "HD" }),
            json!({ "uuid": "t2", "enabled": false, "name": "Sports" }),
        ],
        ..Mock::default()
    }));
    let app = Router::new()
        .route("/epg", get(epg))
        .route("/epgrelated", get(epgrelated))
        .route("/dvr", post(dvr))
        .route("/ecglist", get(ecglist))
        .route("/chlist", get(chlist))
        .route("/channeltags", get(channeltags))
        .route("/confignames", get(confignames))
        .route("/api/channeltag/grid", get(tag_grid))
        .route("/api/idnode/delete", post(idnode_delete))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = TvhClient::new(&ServerConfig {
        base_url: format!("http://{}", addr),
        ..ServerConfig::default()
    })
    .unwrap();
    (client, mock)
}

async fn run(client: &TvhClient, browser: &mut EpgBrowser, req: tvh_proto::query::FetchRequest) -> Outcome {
    let result = client.fetch_epg(&req).await.map_err(|e| e.to_string());
    browser.complete(&req, result)
}

#[tokio::test]
async fn test_title_filter_returns_matching_rows_from_offset_zero() {
    let (client, _mock) = start_mock().await;
    let mut browser = EpgBrowser::new(&EpgConfig::default());

    let req = browser.start();
    run(&client, &mut browser, req).await;
    assert_eq!(browser.query().total_count(), TOTAL);

    for req in browser.ensure_window(280, 40) {
        run(&client, &mut browser, req).await;
    }
    assert_eq!(browser.query().offset(), 280);
    assert!(browser.query().is_cached(319));

    let req = browser.set_title(Some("News")).unwrap();
    assert_eq!(browser.query().offset(), 0);
    assert_eq!(run(&client, &mut browser, req).await, Outcome::Applied { rows: 100 });

    assert_eq!(browser.query().total_count(), 100);
    let window = browser.query().window(0, 100);
    assert_eq!(window.len(), 100);
    assert!(window
        .iter()
        .all(|row| row.map_or(false, |ev| ev.title.contains("News"))));
}

#[tokio::test]
async fn test_scrolling_fetches_each_range_once() {
    let (client, mock) = start_mock().await;
    let mut browser = EpgBrowser::new(&EpgConfig::default());
    let req = browser.start();
    run(&client, &mut browser, req).await;

    let reqs = browser.ensure_window(350, 50);
    assert_eq!(reqs.len(), 1);
    for req in reqs {
        run(&client, &mut browser, req).await;
    }
    // same range again, and a range inside the look-ahead
    assert!(browser.ensure_window(350, 50).is_empty());
    assert!(browser.ensure_window(420, 30).is_empty());
    assert_eq!(mock.lock().unwrap().epg_requests, 2);
    assert_eq!(browser.query().row(449).map(|e| e.id), Some(449));
}

#[tokio::test]
async fn test_late_response_for_old_filter_is_discarded() {
    let (client, _mock) = start_mock().await;
    let mut browser = EpgBrowser::new(&EpgConfig::default());

    let old = browser.set_title(Some("News")).unwrap();
    let new = browser.set_channel(Some("2")).unwrap();

    let old_result = client.fetch_epg(&old).await.map_err(|e| e.to_string());
    let new_result = client.fetch_epg(&new).await.map_err(|e| e.to_string());

    assert!(matches!(browser.complete(&new, new_result), Outcome::Applied { .. }));
    assert_eq!(browser.complete(&old, old_result), Outcome::Stale);

    let first = browser.query().row(0).unwrap();
    assert_eq!(first.channelid, "2");
    assert!(first.title.contains("News"));
}

#[tokio::test]
async fn test_catalogs_load_and_tolerate_a_failing_endpoint() {
    let (client, mock) = start_mock().await;
    mock.lock().unwrap().fail_confignames = true;

    let catalogs = Catalogs::load(&client).await;
    assert_eq!(catalogs.channel_name("2"), "Channel 2");
    assert!(catalogs.has_tag("Sports"));
    assert_eq!(catalogs.content_group_name(0x43), "Football");
    assert_eq!(catalogs.content_group_name(0x47), "Sports");
    assert_eq!(catalogs.content_groups[0].code, 0x20);
    assert!(catalogs.config_names.is_empty());
}

#[tokio::test]
async fn test_auto_record_for_tag_submits_predicates_verbatim() {
    let (client, mock) = start_mock().await;
    let catalogs = Catalogs::load(&client).await;
    let mut browser = EpgBrowser::new(&EpgConfig::default());

    let req = browser.set_tag(Some("Sports")).unwrap();
    run(&client, &mut browser, req).await;

    let preview = browser.auto_record_preview(&catalogs);
    assert_eq!(preview.summary.tag, "Sports");
    assert_eq!(preview.summary.title, DONT_CARE);
    assert_eq!(preview.summary.channel, DONT_CARE);
    assert_eq!(preview.summary.genre, DONT_CARE);
    assert_eq!(preview.summary.min_duration, DONT_CARE);
    assert_eq!(preview.summary.max_duration, DONT_CARE);
    assert_eq!(preview.estimate, 334);

    let params = preview.decide(true).unwrap();
    client.create_autorec(&params).await.unwrap();

    let posts = mock.lock().unwrap().posts.clone();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].get("op").map(String::as_str), Some("createAutoRec"));
    assert_eq!(posts[0].get("tag").map(String::as_str), Some("Sports"));
    assert_eq!(posts[0].len(), 2);
}

#[tokio::test]
async fn test_record_failure_carries_status_text() {
    let (client, mock) = start_mock().await;
    client.record(RecordOp::Event, 12, "").await.unwrap();

    mock.lock().unwrap().deny_dvr = true;
    let err = client.record(RecordOp::Series, 12, "").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 403, .. }));
    assert_eq!(err.status_text(), "Forbidden");

    let posts = mock.lock().unwrap().posts.clone();
    assert_eq!(posts[0].get("op").map(String::as_str), Some("recordEvent"));
    assert_eq!(posts[0].get("eventId").map(String::as_str), Some("12"));
    assert_eq!(posts[1].get("op").map(String::as_str), Some("recordSeries"));
}

#[tokio::test]
async fn test_related_collections() {
    let (client, _mock) = start_mock().await;
    let alts = client.alternatives(7).await.unwrap();
    assert_eq!(alts.len(), 1);
    assert_eq!(alts[0].id, 1007);
    let related = client.related(7).await.unwrap();
    assert_eq!(related.len(), 2);
    assert_eq!(related[0].subtitle.as_deref(), Some("Pilot"));
}

#[tokio::test]
async fn test_channel_tag_grid_and_delete() {
    let (client, _mock) = start_mock().await;
    let page = client.grid(GridResource::ChannelTag, 0, 100).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(row_uuid(&page.entries[0]), Some("t1"));

    client.delete_node("t1").await.unwrap();
    let page = client.grid(GridResource::ChannelTag, 0, 100).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(row_uuid(&page.entries[0]), Some("t2"));
}
