//! Scripted collaborators shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use flasharray_client::api::{
    EventSink, FlashArrayClient, HttpRequest, HttpTransport, RawResponse, RetryConfig, TokenManager,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

enum Scripted {
    Response(RawResponse),
    Failure(String),
}

/// Transport that replays queued responses and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push_raw(status, &[], &body.to_string())
    }

    pub fn push_raw(&self, status: u16, headers: &[(&str, &str)], body: &str) -> &Self {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Response(RawResponse::new(status, map, body)));
        self
    }

    /// Connection-level failure with no HTTP status
    pub fn push_failure(&self, message: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> anyhow::Result<RawResponse> {
        self.requests.lock().unwrap().push(request);
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Failure(message)) => Err(anyhow::anyhow!(message)),
            None => anyhow::bail!("no scripted response left"),
        }
    }
}

/// Token manager that counts forced refreshes
#[derive(Default)]
pub struct CountingTokenManager {
    refreshes: AtomicUsize,
    fail_refresh: bool,
}

impl CountingTokenManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_refresh() -> Arc<Self> {
        Arc::new(Self {
            refreshes: AtomicUsize::new(0),
            fail_refresh: true,
        })
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenManager for CountingTokenManager {
    async fn get_header(&self, refresh: bool) -> anyhow::Result<String> {
        if refresh {
            let generation = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_refresh {
                anyhow::bail!("identity provider unavailable");
            }
            return Ok(format!("Bearer token-{}", generation));
        }
        Ok(format!("Bearer token-{}", self.refreshes()))
    }
}

/// Event sink that keeps every structured event it receives
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Value>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Recorded events whose `event` field equals `name`
    pub fn named(&self, name: &str) -> Vec<Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event["event"] == name)
            .cloned()
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: &Value) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn client(transport: &Arc<ScriptedTransport>) -> FlashArrayClient {
    client_with(transport, RetryConfig::default())
}

pub fn client_with(transport: &Arc<ScriptedTransport>, retry: RetryConfig) -> FlashArrayClient {
    FlashArrayClient::builder()
        .target("https://array.example.com")
        .access_token("t0k")
        .transport(transport.clone())
        .retry_config(retry)
        .build()
        .unwrap()
}

pub fn client_with_tokens(
    transport: &Arc<ScriptedTransport>,
    tokens: Arc<CountingTokenManager>,
) -> FlashArrayClient {
    FlashArrayClient::builder()
        .target("https://array.example.com")
        .token_manager(tokens)
        .transport(transport.clone())
        .build()
        .unwrap()
}
