use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cim::{EntityCache, EntityFetcher, EntityName, FetchResponse, ResourceAggregator};

/// In-memory entity server that counts requests per name.
#[derive(Clone, Default)]
pub(crate) struct MemoryServer {
    documents: Arc<HashMap<String, String>>,
    requests: Arc<Mutex<HashMap<String, usize>>>,
    latency: Option<Duration>,
}

impl MemoryServer {
    pub(crate) fn new(documents: &[(&str, serde_json::Value)]) -> Self {
        let documents = documents
            .iter()
            .map(|(name, doc)| (name.to_string(), doc.to_string()))
            .collect();
        Self {
            documents: Arc::new(documents),
            ..Default::default()
        }
    }

    /// Serve raw bodies, including malformed ones.
    pub(crate) fn raw(documents: &[(&str, &str)]) -> Self {
        let documents = documents
            .iter()
            .map(|(name, body)| (name.to_string(), body.to_string()))
            .collect();
        Self {
            documents: Arc::new(documents),
            ..Default::default()
        }
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub(crate) fn requests_for(&self, name: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn total_requests(&self) -> usize {
        self.requests.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl EntityFetcher for MemoryServer {
    async fn fetch(&self, name: &EntityName) -> cim::Result<FetchResponse> {
        *self
            .requests
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default() += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        Ok(match self.documents.get(name.as_str()) {
            Some(body) => FetchResponse::ok(body.as_bytes()),
            None => FetchResponse::status(404),
        })
    }
}

pub(crate) fn name(s: &str) -> EntityName {
    EntityName::new(s).unwrap()
}

pub(crate) fn aggregator(server: &MemoryServer) -> ResourceAggregator {
    ResourceAggregator::new(EntityCache::new(server.clone()))
}
