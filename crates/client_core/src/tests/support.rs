//! Fetchers and fixtures shared by the unit tests.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use shared::error::FetchError;
use tokio::sync::{oneshot, Mutex};
use url::Url;

use crate::transport::ResourceFetcher;

type Reply = Result<Vec<u8>, FetchError>;

/// Holds every request open until the test resolves it, in whatever order it likes.
#[derive(Default)]
pub struct GatedFetcher {
    gates: Mutex<Gates>,
    requested: Mutex<Vec<String>>,
}

// replies that arrived before the request, and requests still waiting for a reply
#[derive(Default)]
struct Gates {
    early: HashMap<String, oneshot::Receiver<Reply>>,
    waiting: HashMap<String, oneshot::Sender<Reply>>,
}

impl GatedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn requested(&self) -> Vec<String> {
        self.requested.lock().await.clone()
    }

    pub async fn resolve(&self, url: &str, body: serde_json::Value) {
        self.reply(url, Ok(body.to_string().into_bytes())).await;
    }

    pub async fn fail(&self, url: &str, err: FetchError) {
        self.reply(url, Err(err)).await;
    }

    async fn reply(&self, url: &str, reply: Reply) {
        let gate = self.gate_for(url).await;
        let _ = gate.send(reply);
    }

    async fn gate_for(&self, url: &str) -> oneshot::Sender<Reply> {
        let mut gates = self.gates.lock().await;
        if let Some(gate) = gates.waiting.remove(url) {
            return gate;
        }
        let (tx, rx) = oneshot::channel();
        gates.early.insert(url.to_string(), rx);
        tx
    }
}

#[async_trait]
impl ResourceFetcher for GatedFetcher {
    async fn fetch(&self, resource: &Url) -> Result<Vec<u8>, FetchError> {
        let key = resource.as_str().to_string();
        self.requested.lock().await.push(key.clone());

        let rx = {
            let mut gates = self.gates.lock().await;
            match gates.early.remove(&key) {
                Some(rx) => rx,
                None => {
                    let (tx, rx) = oneshot::channel();
                    gates.waiting.insert(key.clone(), tx);
                    rx
                }
            }
        };

        rx.await
            .unwrap_or_else(|_| Err(FetchError::Transport(format!("gate for {key} dropped"))))
    }
}

pub fn url(raw: &str) -> Url {
    Url::parse(raw).expect("test url")
}
