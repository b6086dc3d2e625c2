//! Page-level tracking helpers
//!
//! Wraps an [`EventQueue`] with the rules a storefront page applies before
//! logging: scroll depth is only reported when it exceeds the deepest point
//! seen so far, and each product card reports at most one hover.

use crate::{EventQueue, EventSink, HttpSink, Result, TrackerConfig, TrackerContext};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

pub struct Tracker {
    queue: EventQueue,
    max_depth: u32,
    hovered: HashSet<String>,
}

impl Tracker {
    pub fn new(queue: EventQueue) -> Self {
        Self {
            queue,
            max_depth: 0,
            hovered: HashSet::new(),
        }
    }

    /// Tracker posting to `config.endpoint` over HTTP
    pub fn http(config: TrackerConfig, context: TrackerContext) -> Result<Self> {
        let sink: Arc<dyn EventSink> = Arc::new(HttpSink::new(&config)?);
        Ok(Self::new(EventQueue::new(sink, config, context)))
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Log a pageview for `url` and reset per-page state
    pub fn pageview(&mut self, url: impl Into<String>) -> bool {
        self.queue.set_url(url);
        self.max_depth = 0;
        self.hovered.clear();
        self.queue.log("pageview", None)
    }

    /// Log scroll depth in percent if it is deeper than before on this page
    pub fn scroll(&mut self, depth: u32) -> bool {
        let depth = depth.min(100);
        if depth <= self.max_depth {
            return false;
        }
        self.max_depth = depth;
        self.queue.log("scroll", Some(json!({ "depth": depth })))
    }

    pub fn click(&self, product_id: &str) -> bool {
        self.queue
            .log("click", Some(json!({ "productId": product_id })))
    }

    /// Log the first hover over a product card on this page
    pub fn hover(&mut self, product_id: &str) -> bool {
        if !self.hovered.insert(product_id.to_string()) {
            return false;
        }
        self.queue
            .log("hover", Some(json!({ "productId": product_id })))
    }

    pub fn search(&self, query: &str) -> bool {
        self.queue.log("search", Some(json!({ "query": query })))
    }

    pub async fn flush(&self) -> Result<()> {
        self.queue.flush().await
    }

    /// Page unload: send what is queued and stop
    pub async fn unload(self) -> Result<()> {
        self.queue.shutdown().await
    }
}
