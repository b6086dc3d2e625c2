//! Idle-flush event queue
//!
//! Callers enqueue events without blocking; a single worker task owns the
//! buffer. Every new event pushes the send deadline out by `flush_idle`, so a
//! burst of activity goes out as one batch once the page goes quiet. Reaching
//! `max_batch` sends immediately. Failed sends are dropped, never retried.

use crate::{EventSink, Result, TrackerConfig, TrackerContext, TrackerError};
use reso_core::{ClientEventKind, TrackedEvent};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

enum Command {
    Event(TrackedEvent),
    Flush(oneshot::Sender<()>),
}

/// Batching queue in front of an [`EventSink`]
pub struct EventQueue {
    tx: Option<mpsc::Sender<Command>>,
    worker_handle: Option<JoinHandle<()>>,
    context: TrackerContext,
}

impl EventQueue {
    /// Spawn the worker; must be called inside a tokio runtime
    pub fn new(sink: Arc<dyn EventSink>, config: TrackerConfig, context: TrackerContext) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_buffer_size.max(1));

        let worker_handle = tokio::spawn(async move {
            Self::worker_loop(rx, sink, config).await;
        });

        Self {
            tx: Some(tx),
            worker_handle: Some(worker_handle),
            context,
        }
    }

    pub fn context(&self) -> &TrackerContext {
        &self.context
    }

    /// Point subsequent events at a new page
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.context.url = Some(url.into());
    }

    /// Stamp an event with the current time and context and enqueue it
    ///
    /// Returns false if the event was dropped.
    pub fn log(&self, kind: impl Into<ClientEventKind>, payload: Option<Value>) -> bool {
        let event = TrackedEvent {
            kind: kind.into(),
            ts: Some(chrono::Utc::now().timestamp_millis()),
            timestamp: None,
            user_id: Some(self.context.user_id.clone()),
            url: self.context.url.clone(),
            ua: self.context.user_agent.clone(),
            payload,
        };
        self.enqueue(event)
    }

    /// Enqueue an already-built event
    pub fn enqueue(&self, event: TrackedEvent) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };

        match tx.try_send(Command::Event(event)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Tracker buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Tracker worker gone, dropping event");
                false
            }
        }
    }

    /// Send everything queued so far and wait for the attempt to finish
    pub async fn flush(&self) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(TrackerError::ChannelClosed)?;
        let (ack_tx, ack_rx) = oneshot::channel();

        tx.send(Command::Flush(ack_tx))
            .await
            .map_err(|_| TrackerError::ChannelClosed)?;
        ack_rx.await.map_err(|_| TrackerError::ChannelClosed)
    }

    /// Flush what remains and stop the worker
    pub async fn shutdown(mut self) -> Result<()> {
        // closing the channel tells the worker to drain and exit
        self.tx.take();

        if let Some(handle) = self.worker_handle.take() {
            handle.await.map_err(|_| TrackerError::WorkerPanicked)?;
        }

        tracing::debug!("Tracker shutdown complete");
        Ok(())
    }

    async fn worker_loop(
        mut rx: mpsc::Receiver<Command>,
        sink: Arc<dyn EventSink>,
        config: TrackerConfig,
    ) {
        let idle = config.flush_idle();
        let max_batch = config.max_batch.max(1);
        let mut buffer: Vec<TrackedEvent> = Vec::new();
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                command = rx.recv() => match command {
                    Some(Command::Event(event)) => {
                        buffer.push(event);
                        if buffer.len() >= max_batch {
                            Self::flush_buffer(sink.as_ref(), &mut buffer).await;
                            deadline = None;
                        } else {
                            deadline = Some(Instant::now() + idle);
                        }
                    }
                    Some(Command::Flush(ack)) => {
                        Self::flush_buffer(sink.as_ref(), &mut buffer).await;
                        deadline = None;
                        let _ = ack.send(());
                    }
                    None => {
                        Self::flush_buffer(sink.as_ref(), &mut buffer).await;
                        break;
                    }
                },
                _ = idle_timer(deadline) => {
                    Self::flush_buffer(sink.as_ref(), &mut buffer).await;
                    deadline = None;
                }
            }
        }

        tracing::debug!("Tracker worker loop exited");
    }

    async fn flush_buffer(sink: &dyn EventSink, buffer: &mut Vec<TrackedEvent>) {
        if buffer.is_empty() {
            return;
        }

        let events = std::mem::take(buffer);
        match sink.send_batch(&events).await {
            Ok(()) => tracing::debug!(count = events.len(), "Flushed client events"),
            Err(e) => tracing::debug!(
                error = %e,
                count = events.len(),
                "Dropping client events after failed send"
            ),
        }
    }
}

impl Drop for EventQueue {
    fn drop(&mut self) {
        if self.worker_handle.is_some() {
            tracing::debug!(
                "EventQueue dropped without calling shutdown(); queued events are sent in the background"
            );
        }
    }
}

async fn idle_timer(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
