// ABOUTME: RecordSource trait - bulk reads of orders and order items.
// ABOUTME: HttpRecordSource reads both collections from the persistence service.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::FetchError;
use crate::records::{Order, OrderItem};

/// Collection name of order items on the persistence service.
pub const ORDER_ITEMS: &str = "orderitems";

/// Collection name of orders on the persistence service.
pub const ORDERS: &str = "orders";

/// Reads the unfiltered record collections.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Every order item, unpaginated.
    async fn order_items(&self) -> Result<Vec<OrderItem>, FetchError>;

    /// Every order, unpaginated.
    async fn orders(&self) -> Result<Vec<Order>, FetchError>;
}

/// Reads collections as JSON arrays from `GET {base}/{collection}`.
///
/// `start=-1&max=-1` asks the persistence service for everything.
pub struct HttpRecordSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRecordSource {
    /// Create a source whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("recsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create with a custom reqwest client.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn fetch_all<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, FetchError> {
        let url = format!("{}/{}?start=-1&max=-1", self.base_url, collection);
        trace!(%url, "Fetching collection");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                collection: collection.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let records: Vec<T> = serde_json::from_slice(&body)?;
        trace!(collection, count = records.len(), "Fetched collection");
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn order_items(&self) -> Result<Vec<OrderItem>, FetchError> {
        self.fetch_all(ORDER_ITEMS).await
    }

    async fn orders(&self) -> Result<Vec<Order>, FetchError> {
        self.fetch_all(ORDERS).await
    }
}
