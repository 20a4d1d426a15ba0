// ABOUTME: Integration tests verifying modules work together.
// ABOUTME: Instances talk over real HTTP; persistence and peers are mocked with wiremock.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use recsync::prelude::*;

/// A trainer that remembers what it was given.
#[derive(Default)]
struct RecordingTrainer {
    sets: Mutex<Vec<TrainingSet>>,
}

#[async_trait]
impl Trainer for RecordingTrainer {
    async fn train(&self, set: TrainingSet) {
        self.sets.lock().await.push(set);
    }
}

struct MemorySource {
    items: Vec<OrderItem>,
    orders: Vec<Order>,
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn order_items(&self) -> Result<Vec<OrderItem>, FetchError> {
        Ok(self.items.clone())
    }

    async fn orders(&self) -> Result<Vec<Order>, FetchError> {
        Ok(self.orders.clone())
    }
}

async fn persistence(orders: serde_json::Value, items: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orderitems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items))
        .mount(&server)
        .await;
    server
}

async fn peer_answering(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/train/timestamp"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

/// Start an instance and return its base URL.
async fn launch(driver: Arc<SyncDriver>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, driver));
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_first_instance_drops_orphans_and_keeps_latest_order() {
    let state = Arc::new(CutoffState::new());
    let peers = Arc::new(StaticPeers::default());
    let client = Arc::new(HttpPeerClient::new(Duration::from_secs(1)).unwrap());
    let coordinator = ConsensusCoordinator::new(state.clone(), peers, client);
    let trainer = Arc::new(RecordingTrainer::default());
    let source = MemorySource {
        orders: vec![
            Order::new(1, "2020-01-01T10:00:00"),
            Order::new(2, "2020-01-02T10:00:00"),
        ],
        items: vec![
            OrderItem::for_order(1),
            OrderItem::for_order(2),
            OrderItem::for_order(3),
        ],
    };
    let driver = SyncDriver::new(Arc::new(source), coordinator, trainer.clone());

    let count = driver.run().await.unwrap();

    assert_eq!(count, 4);
    assert_eq!(
        state.get(),
        Some(recsync::time::parse("2020-01-02T10:00:00").unwrap())
    );
    let sets = trainer.sets.lock().await;
    assert_eq!(sets[0].orders.len(), 2);
    let item_orders: Vec<_> = sets[0].items.iter().map(|i| i.order_id).collect();
    assert_eq!(item_orders, vec![1, 2]);
}

#[tokio::test]
async fn test_late_instance_adopts_cutoff_of_running_instance() {
    let early_db = persistence(
        serde_json::json!([
            {"id": 1, "time": "2020-01-01T10:00:00"},
            {"id": 2, "time": "2020-01-02T10:00:00"}
        ]),
        serde_json::json!([{"orderId": 1}, {"orderId": 2}]),
    )
    .await;

    // The first instance trains on what exists when it starts.
    let first_trainer = Arc::new(RecordingTrainer::default());
    let first_state = Arc::new(CutoffState::new());
    let first = Arc::new(
        SyncConfig::new(early_db.uri())
            .build_driver(first_state.clone(), first_trainer.clone())
            .unwrap(),
    );
    assert_eq!(first.run().await.unwrap(), 4);
    let first_url = launch(first).await;

    // A new order lands before the second instance starts.
    let late_db = persistence(
        serde_json::json!([
            {"id": 1, "time": "2020-01-01T10:00:00"},
            {"id": 2, "time": "2020-01-02T10:00:00"},
            {"id": 3, "time": "2020-01-03T10:00:00"}
        ]),
        serde_json::json!([{"orderId": 1}, {"orderId": 2}, {"orderId": 3}]),
    )
    .await;

    let mut config = SyncConfig::new(late_db.uri());
    config.peers = vec![first_url];
    let second_trainer = Arc::new(RecordingTrainer::default());
    let second_state = Arc::new(CutoffState::new());
    let second = config
        .build_driver(second_state.clone(), second_trainer.clone())
        .unwrap();

    assert_eq!(second.run().await.unwrap(), 4);
    assert_eq!(second_state.get(), first_state.get());

    let first_sets = first_trainer.sets.lock().await;
    let second_sets = second_trainer.sets.lock().await;
    assert_eq!(first_sets[0], second_sets[0]);
}

#[tokio::test]
async fn test_disagreeing_and_unavailable_peers_over_http() {
    let high = peer_answering(200, "100").await;
    let low = peer_answering(200, "80").await;
    let broken = peer_answering(503, "").await;

    let state = Arc::new(CutoffState::new());
    let peers = Arc::new(StaticPeers::new([high.uri(), low.uri(), broken.uri()]));
    let client = Arc::new(HttpPeerClient::new(Duration::from_secs(1)).unwrap());
    let coordinator = ConsensusCoordinator::new(state.clone(), peers, client);

    let outcome = coordinator.reconcile(&[]).await.unwrap();

    assert_eq!(outcome.cutoff, Some(80));
    assert_eq!(outcome.source, CutoffSource::Peers);
    assert_eq!(outcome.disagreements.len(), 1);
    assert_eq!(outcome.unavailable, vec![Peer::new(broken.uri())]);
    assert_eq!(state.get(), Some(80));
}

#[tokio::test]
async fn test_persistence_outage_fails_cycle_over_http() {
    let db = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&db)
        .await;

    let state = Arc::new(CutoffState::with_value(42));
    let driver = Arc::new(
        SyncConfig::new(db.uri())
            .build_driver(state.clone(), Arc::new(RecordingTrainer::default()))
            .unwrap(),
    );
    let url = launch(driver).await;

    let response = reqwest::get(format!("{}/train", url)).await.unwrap();
    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(response.text().await.unwrap(), "-1");
    assert_eq!(state.get(), Some(42));
}
