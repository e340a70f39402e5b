//! Poll loop integration tests.
//!
//! Each test serves PVT files from a local axum server on an ephemeral port
//! and points the real feed client at it.

use axum::{http::StatusCode, routing::get, Json, Router};
use gnss_core::{DetectorRules, DetectorState};
use gnss_feed::{FeedClient, SampleSelection};
use gnss_monitor::loops::gnss_poll_loop::run_gnss_poll_loop;
use gnss_monitor::MonitorState;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const PERIOD: Duration = Duration::from_millis(20);

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind feed server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn start_loop(
    base_url: &str,
    paths: &[&str],
) -> (Arc<MonitorState>, broadcast::Sender<()>, JoinHandle<()>) {
    start_loop_every(base_url, paths, PERIOD)
}

fn start_loop_every(
    base_url: &str,
    paths: &[&str],
    period: Duration,
) -> (Arc<MonitorState>, broadcast::Sender<()>, JoinHandle<()>) {
    let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
    let client = FeedClient::with_base_url(
        base_url,
        &paths,
        Duration::from_secs(2),
        SampleSelection::Latest,
    )
    .unwrap();
    let state = Arc::new(MonitorState::new(
        DetectorRules::default().with_poll_period(Duration::from_secs(1)),
    ));
    let (tx, rx) = broadcast::channel(1);
    let handle = tokio::spawn(run_gnss_poll_loop(state.clone(), client, period, false, rx));
    (state, tx, handle)
}

async fn wait_for(state: &MonitorState, accepted: u64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while state.stats().accepted < accepted {
            tokio::time::sleep(PERIOD).await;
        }
    })
    .await
    .expect("loop did not ingest enough samples in time");
}

async fn stop(tx: broadcast::Sender<()>, handle: JoinHandle<()>) {
    tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loop did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_failing_endpoints_are_skipped() {
    let app = Router::new()
        .route(
            "/data/pvtSolution0.json",
            get(|| async {
                Json(json!({"data": [
                    {"lat": 1.0, "lon": 1.0},
                    {"latitude": 10.0, "longitude": 20.0, "height": 350.0, "sats": 9}
                ]}))
            }),
        )
        .route(
            "/data/pvtSolution1.json",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        )
        .route("/data/pvtSolution2.json", get(|| async { "not json" }));
    let base_url = serve(app).await;

    let (state, tx, handle) = start_loop(
        &base_url,
        &["/data/pvtSolution0.json", "/data/pvtSolution1.json", "/data/pvtSolution2.json"],
    );
    wait_for(&state, 3).await;
    stop(tx, handle).await;

    let stats = state.stats();
    assert!(stats.transport_failures >= 4);
    assert_eq!(stats.rejected, 0);
    assert_eq!(stats.anomalous, 0);

    let history = state.history();
    assert!(history.len() >= 3);
    assert!(history.iter().all(|e| e.latitude == 10.0 && e.altitude_km == Some(0.35)));

    let latest = state.latest().unwrap();
    assert_eq!(latest.sample.satellite_count, Some(9));
    assert_eq!(latest.velocity_mps, Some(0.0));

    let failing = format!("{}/data/pvtSolution1.json", base_url);
    assert!(stats.endpoints[&failing].failures >= 1);
    assert_eq!(stats.endpoints[&failing].successes, 0);
}

#[tokio::test]
async fn test_jumps_between_feeds_are_flagged() {
    let app = Router::new()
        .route("/a.json", get(|| async { Json(json!({"lat": 0.0, "lon": 0.0})) }))
        .route("/b.json", get(|| async { Json(json!({"data": {"lat": 0.0, "lon": 0.01}})) }));
    let base_url = serve(app).await;

    let (state, tx, handle) = start_loop(&base_url, &["/a.json", "/b.json"]);
    wait_for(&state, 2).await;
    stop(tx, handle).await;

    let stats = state.stats();
    assert!(stats.anomalous >= 1);

    let latest = state.latest().unwrap();
    assert!(latest.velocity_mps.unwrap() > 1000.0);
    assert!(latest.anomaly_flags[0].starts_with("Teleport detected"));
    assert!(latest.anomaly_flags[1].starts_with("Impossible velocity"));
}

#[tokio::test]
async fn test_rejected_samples_leave_state_untouched() {
    let app = Router::new().route(
        "/bad.json",
        get(|| async { Json(json!({"data": [{"lat": "north", "lon": 2.0}]})) }),
    );
    let base_url = serve(app).await;

    let (state, tx, handle) = start_loop(&base_url, &["/bad.json"]);
    tokio::time::timeout(Duration::from_secs(5), async {
        while state.stats().rejected < 2 {
            tokio::time::sleep(PERIOD).await;
        }
    })
    .await
    .expect("loop did not reject samples in time");
    stop(tx, handle).await;

    let stats = state.stats();
    assert_eq!(stats.accepted, 0);
    assert_eq!(stats.detector_state, DetectorState::AwaitingFirstSample);
    assert!(state.latest().is_none());
    assert!(state.history().is_empty());
}

#[tokio::test]
async fn test_loop_stops_on_shutdown_with_no_feed() {
    let (state, tx, handle) = start_loop("http://127.0.0.1:9", &["/pvt.json"]);
    tokio::time::sleep(PERIOD * 3).await;
    stop(tx, handle).await;

    assert_eq!(state.stats().accepted, 0);
    assert!(state.latest().is_none());
}

#[tokio::test]
async fn test_in_flight_fetch_is_discarded_on_shutdown() {
    let app = Router::new().route(
        "/slow.json",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(400)).await;
            Json(json!({"lat": 10.0, "lon": 20.0}))
        }),
    );
    let base_url = serve(app).await;

    let (state, tx, handle) = start_loop(&base_url, &["/slow.json"]);
    tokio::time::sleep(Duration::from_millis(100)).await;
    stop(tx, handle).await;

    let stats = state.stats();
    assert_eq!(stats.accepted, 0);
    assert_eq!(stats.rejected, 0);
    assert!(stats.endpoints.is_empty());
    assert!(state.latest().is_none());
    assert!(state.history().is_empty());
}

#[tokio::test]
async fn test_zero_period_is_clamped() {
    let app = Router::new().route(
        "/pvt.json",
        get(|| async { Json(json!({"lat": 1.0, "lon": 2.0})) }),
    );
    let base_url = serve(app).await;

    let (state, tx, handle) = start_loop_every(&base_url, &["/pvt.json"], Duration::ZERO);
    wait_for(&state, 2).await;
    stop(tx, handle).await;

    assert_eq!(state.latest().unwrap().sample.longitude, 2.0);
}
