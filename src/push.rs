//! Live push connection.
//!
//! One [`PushChannel`] per process, created with [`PushChannel::init`] and
//! torn down with [`PushChannel::shutdown`]. It reads the backend's
//! Server-Sent Events stream and fans each event out, by event name, on a
//! broadcast channel carrying the raw JSON data. After the stream ends or
//! fails it reconnects after a fixed delay until shut down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ApiSettings;
use crate::api::client::{api_url, normalize_base_url};
use crate::errors::ApiError;

/// Path of the event stream under `/api`.
pub const EVENTS_PATH: &str = "/events";

/// Buffered events per subscription before slow receivers start lagging.
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSettings {
    pub reconnect_delay: Duration,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(crate::config::DEFAULT_RECONNECT_DELAY_SECS),
        }
    }
}

type Subscribers = Arc<Mutex<HashMap<String, broadcast::Sender<String>>>>;

pub struct PushChannel {
    url: String,
    subscribers: Subscribers,
    connected: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    reader: Option<JoinHandle<()>>,
}

impl PushChannel {
    /// Open the connection and start the reader task.
    ///
    /// Must be called from inside a tokio runtime. The first connection
    /// attempt happens in the background; `init` only fails on bad settings.
    pub fn init(api: &ApiSettings, settings: &PushSettings) -> Result<Self, ApiError> {
        let base = normalize_base_url(&api.base_url)?;
        let url = api_url(&base, EVENTS_PATH);
        // No request timeout: the stream is long-lived.
        let http = reqwest::Client::builder()
            .build()
            .map_err(ApiError::Client)?;

        let subscribers: Subscribers = Arc::new(Mutex::new(HashMap::new()));
        let connected = Arc::new(AtomicBool::new(false));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let reader = tokio::spawn(read_loop(
            Reader {
                http,
                url: url.clone(),
                token: api.token.clone().filter(|t| !t.is_empty()),
                subscribers: subscribers.clone(),
                connected: connected.clone(),
                reconnect_delay: settings.reconnect_delay,
            },
            shutdown_rx,
        ));
        info!(url = %url, "Push channel initialised");

        Ok(Self {
            url,
            subscribers,
            connected,
            shutdown_tx,
            reader: Some(reader),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Receive every future event named `event`. Subscribing twice to the
    /// same name shares one sender.
    pub fn subscribe(&self, event: &str) -> broadcast::Receiver<String> {
        let mut subscribers = lock(&self.subscribers);
        subscribers
            .entry(event.to_string())
            .or_insert_with(|| broadcast::channel(EVENT_BUFFER).0)
            .subscribe()
    }

    /// Stop delivering `event`. Existing receivers see the channel close.
    /// Returns whether anything was subscribed.
    pub fn unsubscribe(&self, event: &str) -> bool {
        lock(&self.subscribers).remove(event).is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Stop the reader and drop every subscription.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(reader) = self.reader.take()
            && let Err(e) = reader.await
        {
            warn!(error = %e, "Push reader task ended abnormally");
        }
        lock(&self.subscribers).clear();
        info!(url = %self.url, "Push channel shut down");
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            let _ = self.shutdown_tx.send(true);
            reader.abort();
        }
    }
}

fn lock(subscribers: &Subscribers) -> std::sync::MutexGuard<'_, HashMap<String, broadcast::Sender<String>>> {
    subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Send one event to its subscribers. Returns how many receivers got it.
fn dispatch(subscribers: &Subscribers, event: &str, data: String) -> usize {
    // SSE frames without an `event:` field are "message" events.
    let name = if event.is_empty() { "message" } else { event };
    let subscribers = lock(subscribers);
    match subscribers.get(name) {
        Some(tx) => tx.send(data).unwrap_or(0), // no live receivers
        None => {
            debug!(event = %name, "Push event has no subscribers");
            0
        }
    }
}

struct Reader {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
    subscribers: Subscribers,
    connected: Arc<AtomicBool>,
    reconnect_delay: Duration,
}

async fn read_loop(reader: Reader, mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let result = tokio::select! {
            result = stream_once(&reader) => result,
            _ = shutdown.changed() => break,
        };
        reader.connected.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => info!(url = %reader.url, "Push stream closed by server"),
            Err(e) => warn!(url = %reader.url, error = %e, "Push stream failed"),
        }
        debug!(delay_ms = reader.reconnect_delay.as_millis() as u64, "Reconnecting push stream");

        tokio::select! {
            _ = tokio::time::sleep(reader.reconnect_delay) => {}
            _ = shutdown.changed() => break,
        }
    }
    reader.connected.store(false, Ordering::SeqCst);
    debug!(url = %reader.url, "Push reader stopped");
}

async fn stream_once(reader: &Reader) -> Result<(), ApiError> {
    let mut req = reader
        .http
        .get(&reader.url)
        .header(ACCEPT, "text/event-stream");
    if let Some(token) = &reader.token {
        req = req.bearer_auth(token);
    }

    let resp = req.send().await.map_err(|source| ApiError::Transport {
        method: "GET".to_string(),
        url: reader.url.clone(),
        source,
    })?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Rejected {
            method: "GET".to_string(),
            url: reader.url.clone(),
            status: status.as_u16(),
            body,
        });
    }

    reader.connected.store(true, Ordering::SeqCst);
    info!(url = %reader.url, "Push channel connected");

    let mut events = resp.bytes_stream().eventsource();
    while let Some(event) = events.next().await {
        let event = event.map_err(|e| ApiError::Stream {
            url: reader.url.clone(),
            message: e.to_string(),
        })?;
        let delivered = dispatch(&reader.subscribers, &event.event, event.data);
        debug!(event = %event.event, delivered, "Push event received");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscribers() -> Subscribers {
        Arc::new(Mutex::new(HashMap::new()))
    }

    #[test]
    fn test_dispatch_routes_by_event_name() {
        let subs = subscribers();
        let (tx, mut moved_rx) = broadcast::channel(4);
        lock(&subs).insert("task-moved".to_string(), tx);

        assert_eq!(dispatch(&subs, "task-moved", "{\"a\":1}".to_string()), 1);
        assert_eq!(dispatch(&subs, "task-created", "{}".to_string()), 0);
        assert_eq!(moved_rx.try_recv().unwrap(), "{\"a\":1}");
        assert!(moved_rx.try_recv().is_err());
    }

    #[test]
    fn test_dispatch_unnamed_event_is_message() {
        let subs = subscribers();
        let (tx, mut rx) = broadcast::channel(4);
        lock(&subs).insert("message".to_string(), tx);
        assert_eq!(dispatch(&subs, "", "hello".to_string()), 1);
        assert_eq!(rx.try_recv().unwrap(), "hello");
    }

    #[test]
    fn test_dispatch_without_receivers_is_dropped() {
        let subs = subscribers();
        let (tx, rx) = broadcast::channel::<String>(4);
        drop(rx);
        lock(&subs).insert("task-moved".to_string(), tx);
        assert_eq!(dispatch(&subs, "task-moved", "x".to_string()), 0);
    }

    #[tokio::test]
    async fn test_subscribe_and_unsubscribe() {
        // Nothing listens on port 9; the reader just keeps retrying.
        let channel = PushChannel::init(
            &ApiSettings {
                base_url: "http://127.0.0.1:9".to_string(),
                token: None,
                timeout: None,
            },
            &PushSettings {
                reconnect_delay: Duration::from_millis(50),
            },
        )
        .unwrap();
        assert_eq!(channel.url(), "http://127.0.0.1:9/api/events");

        let mut rx = channel.subscribe("task-moved");
        let _second = channel.subscribe("task-moved");
        assert_eq!(lock(&channel.subscribers).len(), 1);

        assert!(channel.unsubscribe("task-moved"));
        assert!(!channel.unsubscribe("task-moved"));
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));

        assert!(!channel.is_connected());
        channel.shutdown().await;
    }

    #[test]
    fn test_init_rejects_bad_url() {
        let result = PushChannel::init(
            &ApiSettings {
                base_url: "not a url".to_string(),
                token: None,
                timeout: None,
            },
            &PushSettings::default(),
        );
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }
}
