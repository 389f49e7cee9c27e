//! # HTTP Request Queue
//!
//! Synchronous callers hand requests to a background thread that owns a tokio runtime
//! and a shared `reqwest` client. Each request returns a [`Ticket`] the caller blocks on
//! until the response is there.

use std::sync::mpsc as std_mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const TOTAL_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("request queue is closed")]
    Closed,
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    /// Budget for the whole exchange, connecting included.
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { url: url.into(), timeout: TOTAL_TIMEOUT }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

type Reply = Result<HttpResponse, QueueError>;

/// Handle to one queued request.
pub struct Ticket(std_mpsc::Receiver<Reply>);

impl Ticket {
    /// A ticket that is already answered.
    pub fn ready(reply: Reply) -> Self {
        let (tx, rx) = std_mpsc::channel();
        // the receiver is alive, this cannot fail
        let _ = tx.send(reply);
        Self(rx)
    }

    /// Blocks until the response arrives or the queue shuts down.
    pub fn wait(self) -> Reply {
        self.0.recv().unwrap_or(Err(QueueError::Closed))
    }
}

pub trait RequestQueue: Send + Sync {
    fn enqueue(&self, request: HttpRequest) -> Result<Ticket, QueueError>;
}

struct Job {
    request: HttpRequest,
    reply: std_mpsc::Sender<Reply>,
}

pub struct HttpQueue {
    jobs: Option<mpsc::UnboundedSender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl HttpQueue {
    /// Starts the background thread.
    pub fn start() -> Result<Self, QueueError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(TOTAL_TIMEOUT)
            .build()
            .map_err(|e| QueueError::Transport(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| QueueError::Transport(e.to_string()))?;

        let (jobs, mut rx) = mpsc::unbounded_channel::<Job>();

        let worker = thread::Builder::new()
            .name("http-queue".into())
            .spawn(move || {
                runtime.block_on(async move {
                    while let Some(job) = rx.recv().await {
                        let client = client.clone();
                        tokio::spawn(async move {
                            let reply = fetch(&client, &job.request).await;
                            if let Err(e) = &reply {
                                debug!(url = %job.request.url, error = %e, "request failed");
                            }
                            // the caller may have given up on the ticket
                            let _ = job.reply.send(reply);
                        });
                    }
                });
            })
            .map_err(|e| QueueError::Transport(e.to_string()))?;

        Ok(Self { jobs: Some(jobs), worker: Some(worker) })
    }
}

impl RequestQueue for HttpQueue {
    fn enqueue(&self, request: HttpRequest) -> Result<Ticket, QueueError> {
        let jobs = self.jobs.as_ref().ok_or(QueueError::Closed)?;
        let (reply, rx) = std_mpsc::channel();
        jobs.send(Job { request, reply }).map_err(|_| QueueError::Closed)?;
        Ok(Ticket(rx))
    }
}

impl Drop for HttpQueue {
    fn drop(&mut self) {
        drop(self.jobs.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("http queue thread panicked");
            }
        }
    }
}

async fn fetch(client: &reqwest::Client, request: &HttpRequest) -> Reply {
    let response = client
        .get(&request.url)
        .timeout(request.timeout)
        .send()
        .await
        .map_err(|e| QueueError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| QueueError::Transport(e.to_string()))?;

    Ok(HttpResponse { status, body })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
