//! Async client for the flight action server.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::{oneshot, Mutex};

use super::error::{FlightError, FlightResult};
use super::protocol::{actions, ActionRequest, ActionResponse};
use crate::config::Settings;

/// Default timeout for requests (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Anything that can submit an opaque action to the flight server.
///
/// The translator talks to this seam only; tests substitute a recording
/// stub for the real client.
#[async_trait]
pub trait ActionTransport: Send + Sync {
    /// Submit an action and return the raw response body.
    async fn do_action(&self, action: &str, body: Vec<u8>) -> FlightResult<Vec<u8>>;
}

/// Async client for the flight action server.
///
/// The client connects over TCP and communicates via NDJSON
/// (newline-delimited JSON) envelopes. Each request has a unique ID for
/// correlation with responses, enabling concurrent requests. A
/// healthcheck action runs during connect, so a handed-out client has
/// already seen the server answer.
///
/// # Example
///
/// ```ignore
/// use quiver::flight::{ActionClient, protocol::actions};
///
/// let client = ActionClient::connect("localhost", 5005).await?;
/// let reply = client.request(actions::CREATE_TRAINING_DATASET, &payload).await?;
/// ```
#[derive(Debug)]
pub struct ActionClient {
    /// Writer for sending requests over the socket.
    writer: Arc<Mutex<BufWriter<OwnedWriteHalf>>>,

    /// Map of pending request IDs to response channels.
    pending: Arc<Mutex<HashMap<String, oneshot::Sender<ActionResponse>>>>,

    /// Handle to the background reader task.
    reader_task: tokio::task::JoinHandle<()>,

    /// Request timeout duration.
    timeout: Duration,
}

impl ActionClient {
    /// Connect to the flight server and run a healthcheck.
    pub async fn connect(host: &str, port: u16) -> FlightResult<Self> {
        Self::connect_with_timeout(host, port, Duration::from_secs(DEFAULT_TIMEOUT_SECS)).await
    }

    /// Connect using settings configuration.
    ///
    /// The address comes from [`TransportSettings::endpoint`], the request
    /// timeout from `timeout_secs`.
    ///
    /// [`TransportSettings::endpoint`]: crate::config::TransportSettings::endpoint
    pub async fn connect_with_settings(settings: &Settings) -> FlightResult<Self> {
        Self::connect_to(
            settings.transport.endpoint(),
            Duration::from_secs(settings.transport.timeout_secs),
        )
        .await
    }

    /// Connect with a custom request timeout.
    pub async fn connect_with_timeout(
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> FlightResult<Self> {
        Self::connect_to((host, port), timeout).await
    }

    async fn connect_to(addr: impl ToSocketAddrs, timeout: Duration) -> FlightResult<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(FlightError::Connect)?;
        let (read_half, write_half) = stream.into_split();

        let writer = Arc::new(Mutex::new(BufWriter::new(write_half)));
        let pending: Arc<Mutex<HashMap<String, oneshot::Sender<ActionResponse>>>> =
            Arc::new(Mutex::new(HashMap::new()));

        // Spawn background reader task
        let reader_task = Self::spawn_reader_task(read_half, pending.clone());

        let client = Self {
            writer,
            pending,
            reader_task,
            timeout,
        };
        client.healthcheck().await?;
        Ok(client)
    }

    /// Spawn the background task that reads responses from the server.
    fn spawn_reader_task(
        read_half: OwnedReadHalf,
        pending: Arc<Mutex<HashMap<String, oneshot::Sender<ActionResponse>>>>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        // EOF - server closed the connection
                        break;
                    }
                    Ok(_) => match serde_json::from_str::<ActionResponse>(&line) {
                        Ok(resp) => {
                            let mut pending = pending.lock().await;
                            if let Some(tx) = pending.remove(&resp.id) {
                                let _ = tx.send(resp);
                            }
                        }
                        Err(e) => {
                            eprintln!("flight: failed to parse response: {}", e);
                        }
                    },
                    Err(e) => {
                        eprintln!("flight: read error: {}", e);
                        break;
                    }
                }
            }

            // Connection gone - notify all pending requests
            let mut pending = pending.lock().await;
            for (id, tx) in pending.drain() {
                let error_response = ActionResponse {
                    id,
                    success: false,
                    body: None,
                    error: Some(super::protocol::ErrorInfo {
                        code: "CONNECTION_CLOSED".to_string(),
                        message: "Flight server closed the connection".to_string(),
                    }),
                };
                let _ = tx.send(error_response);
            }
        })
    }

    /// Submit an action and wait for its response body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails, the socket write fails,
    /// the request times out, or the server answers with an error.
    pub async fn request(&self, action: &str, body: &[u8]) -> FlightResult<Vec<u8>> {
        let id = uuid::Uuid::new_v4().to_string();

        let request = ActionRequest {
            id: id.clone(),
            action: action.to_string(),
            body: BASE64.encode(body),
        };

        // Register response channel
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            pending.insert(id.clone(), tx);
        }

        // Send request
        {
            let mut writer = self.writer.lock().await;
            let line = serde_json::to_string(&request).map_err(FlightError::Encode)? + "\n";
            writer
                .write_all(line.as_bytes())
                .await
                .map_err(FlightError::Write)?;
            writer.flush().await.map_err(FlightError::Write)?;
        }

        // Wait for response with timeout
        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(_)) => {
                return Err(FlightError::ChannelClosed);
            }
            Err(_) => {
                // Timeout - clean up pending request to prevent memory leak
                let mut pending = self.pending.lock().await;
                pending.remove(&id);
                return Err(FlightError::Timeout(self.timeout.as_secs()));
            }
        };

        if response.success {
            let encoded = response.body.unwrap_or_default();
            BASE64.decode(encoded).map_err(FlightError::Body)
        } else {
            let error = response.error.unwrap_or_else(|| super::protocol::ErrorInfo {
                code: "UNKNOWN".to_string(),
                message: "Unknown error".to_string(),
            });
            Err(Self::classify_error(&error.code, &error.message))
        }
    }

    /// Check that the server answers at all.
    pub async fn healthcheck(&self) -> FlightResult<()> {
        self.request(actions::HEALTHCHECK, &[]).await.map(|_| ())
    }

    /// Classify a server error into a more specific error type.
    fn classify_error(code: &str, message: &str) -> FlightError {
        match code {
            "CONNECTION_CLOSED" => FlightError::ConnectionClosed,
            _ => FlightError::remote(code, message),
        }
    }

    /// Check if the connection is still being read.
    pub fn is_alive(&self) -> bool {
        !self.reader_task.is_finished()
    }

    /// Get the current request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set the request timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

impl Drop for ActionClient {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

#[async_trait]
impl ActionTransport for ActionClient {
    async fn do_action(&self, action: &str, body: Vec<u8>) -> FlightResult<Vec<u8>> {
        self.request(action, &body).await
    }
}
