#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use serde_json::{json, Map, Value};
use tokio::time::Instant;
use tracker_core::FeatureCollection;
use tracker_engine::{LayerSink, ParameterSet, Route, RpcClient, RpcError, Tracker};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tracker_logging::initialize_for_tests);
}

pub fn record(id: u64, status: &str, enqueued: &str) -> Value {
    json!({
        "data": { "Id": id, "Enqueued": enqueued },
        "status": status
    })
}

#[derive(Debug, Clone)]
pub struct Call {
    pub route: Route,
    pub key: Option<String>,
    pub body: Option<Value>,
    pub api_key_only: bool,
    pub at: Instant,
}

/// Scripted server: one sticky reply per (route, key), optional delays.
#[derive(Default)]
pub struct FakeServer {
    replies: Mutex<HashMap<(Route, Option<String>), Result<Value, RpcError>>>,
    delays: Mutex<HashMap<(Route, Option<String>), Duration>>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, route: Route, key: Option<&str>, result: Result<Value, RpcError>) {
        self.replies
            .lock()
            .unwrap()
            .insert((route, key.map(str::to_string)), result);
    }

    pub fn jobs(&self, records: Vec<Value>) {
        self.reply(Route::Jobs, None, Ok(Value::Array(records)));
    }

    pub fn status(&self, key: &str, result: Result<Value, RpcError>) {
        self.reply(Route::Status, Some(key), result);
    }

    pub fn delay(&self, route: Route, key: Option<&str>, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert((route, key.map(str::to_string)), delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, route: Route) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.route == route)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RpcClient for FakeServer {
    async fn send(
        &self,
        route: Route,
        body: Option<Value>,
        api_key_only: bool,
    ) -> Result<Value, RpcError> {
        let key = body
            .as_ref()
            .and_then(|body| body.get("key"))
            .and_then(Value::as_str)
            .map(str::to_string);
        self.calls.lock().unwrap().push(Call {
            route,
            key: key.clone(),
            body: body.clone(),
            api_key_only,
            at: Instant::now(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let lookup = (route, key);
        let delay = self.delays.lock().unwrap().get(&lookup).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let reply = self.replies.lock().unwrap().get(&lookup).cloned();
        let fallback = self
            .replies
            .lock()
            .unwrap()
            .get(&(lookup.0, None))
            .cloned();
        reply
            .or(fallback)
            .unwrap_or_else(|| Err(RpcError::Network(format!("no reply scripted for {}", lookup.0))))
    }
}

/// Host view stand-in: remembers every layer update.
#[derive(Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<(Option<String>, Option<FeatureCollection>)>>,
}

impl RecordingSink {
    pub fn updates(&self) -> Vec<(Option<String>, Option<FeatureCollection>)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(Option<String>, Option<FeatureCollection>)> {
        self.updates.lock().unwrap().last().cloned()
    }
}

impl LayerSink for RecordingSink {
    fn set_layer(&self, name: Option<String>, collection: Option<FeatureCollection>) {
        self.updates.lock().unwrap().push((name, collection));
    }
}

pub fn params(api_key: Option<&str>, valid: bool) -> ParameterSet {
    let config: Map<String, Value> = json!({ "frequency": 800 })
        .as_object()
        .cloned()
        .unwrap_or_default();
    ParameterSet::new(api_key.map(str::to_string), config, valid)
}

pub struct Harness {
    pub server: Arc<FakeServer>,
    pub sink: Arc<RecordingSink>,
    pub tracker: Tracker,
}

pub fn harness() -> Harness {
    harness_with(params(Some("key-1"), true))
}

pub fn harness_with(params: ParameterSet) -> Harness {
    init_logging();
    let server = FakeServer::new();
    let sink = Arc::new(RecordingSink::default());
    let tracker = Tracker::new(server.clone(), Arc::new(params), sink.clone());
    Harness {
        server,
        sink,
        tracker,
    }
}

pub fn statuses(tracker: &Tracker) -> Vec<(String, tracker_core::JobStatus)> {
    tracker
        .view()
        .jobs
        .into_iter()
        .map(|row| (row.id.to_string(), row.status))
        .collect()
}
