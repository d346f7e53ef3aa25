//! # Print Notifier
//!
//! Best-effort, fire-and-forget relay to an external print agent.
//!
//! ## Relay Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Print Relay Flow                                  │
//! │                                                                         │
//! │  post_sale() ── commit ──► PrintHandle::dispatch(job)                  │
//! │                                 │                                       │
//! │                                 │ try_send (never blocks the request)  │
//! │                                 ▼                                       │
//! │                    ┌──────────────────────────┐                         │
//! │                    │   bounded mpsc channel    │  full? → warn! + drop  │
//! │                    └────────────┬─────────────┘                         │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │                    ┌──────────────────────────┐                         │
//! │                    │  PrintRelay (spawned)     │                        │
//! │                    │  drains jobs one by one   │                        │
//! │                    └────────────┬─────────────┘                         │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │                    PrintEndpoint::deliver(job)   fail? → warn! + drop   │
//! │                                                                         │
//! │  NOTHING on this path ever surfaces to the caller or rolls back        │
//! │  the already-committed transaction. Failures are log lines.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default capacity of the relay queue.
///
/// A register prints one receipt per posting; a backlog this deep means the
/// print agent has been unreachable for a while and dropping is fine.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Payload handed to the print agent after a posting commits.
#[derive(Debug, Clone, Serialize)]
pub struct PrintJob {
    /// Opaque transaction identifier.
    pub transaction_id: String,

    /// The human-scannable transaction code on the receipt.
    pub code: String,

    /// Store code, so a multi-store agent can route to the right printer.
    pub store_code: String,

    /// The rendered receipt text to print.
    pub receipt_text: String,
}

/// Delivery target for print jobs: the external print-agent contract.
///
/// Delivery failures are reported back as a message for the relay to log;
/// the relay never retries and never propagates them.
pub trait PrintEndpoint: Send + Sync + 'static {
    fn deliver(&self, job: &PrintJob) -> Result<(), String>;
}

/// Default endpoint: logs the job payload instead of printing.
///
/// Useful in development and as the stand-in when no agent is configured.
#[derive(Debug, Default)]
pub struct LogEndpoint;

impl PrintEndpoint for LogEndpoint {
    fn deliver(&self, job: &PrintJob) -> Result<(), String> {
        let payload = serde_json::to_string(job).map_err(|e| e.to_string())?;
        info!(code = %job.code, payload = %payload, "Print job (log endpoint)");
        Ok(())
    }
}

// =============================================================================
// Handle & Relay
// =============================================================================

/// Sending side held by the engine. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PrintHandle {
    tx: mpsc::Sender<PrintJob>,
}

impl PrintHandle {
    /// Queues a print job without waiting.
    ///
    /// A full queue or a stopped relay drops the job with a `warn!`;
    /// the committed transaction is unaffected either way.
    pub fn dispatch(&self, job: PrintJob) {
        match self.tx.try_send(job) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(code = %job.code, "Print queue full, dropping job");
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                warn!(code = %job.code, "Print relay stopped, dropping job");
            }
        }
    }
}

/// Receiving side: drains the queue and delivers to the endpoint.
///
/// Spawn it once at startup; it stops when every [`PrintHandle`] clone
/// has been dropped.
pub struct PrintRelay {
    rx: mpsc::Receiver<PrintJob>,
    endpoint: Box<dyn PrintEndpoint>,
}

impl PrintRelay {
    /// Creates a handle/relay pair with the given queue capacity.
    pub fn new(endpoint: impl PrintEndpoint, capacity: usize) -> (PrintHandle, PrintRelay) {
        let (tx, rx) = mpsc::channel(capacity);

        let relay = PrintRelay {
            rx,
            endpoint: Box::new(endpoint),
        };

        (PrintHandle { tx }, relay)
    }

    /// Creates the pair and spawns the relay onto the current runtime,
    /// returning only the handle.
    pub fn spawn(endpoint: impl PrintEndpoint) -> PrintHandle {
        let (handle, relay) = PrintRelay::new(endpoint, DEFAULT_QUEUE_CAPACITY);
        tokio::spawn(relay.run());
        handle
    }

    /// Runs the relay loop until all handles are dropped.
    pub async fn run(mut self) {
        info!("Print relay starting");

        while let Some(job) = self.rx.recv().await {
            debug!(code = %job.code, "Delivering print job");

            if let Err(reason) = self.endpoint.deliver(&job) {
                warn!(code = %job.code, reason = %reason, "Print delivery failed, dropping job");
            }
        }

        info!("Print relay stopped");
    }
}

// =============================================================================
// Test Support
// =============================================================================

/// Endpoint that records delivered jobs for assertions.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CaptureEndpoint {
    pub jobs: std::sync::Arc<std::sync::Mutex<Vec<PrintJob>>>,
    pub fail: bool,
}

#[cfg(test)]
impl PrintEndpoint for CaptureEndpoint {
    fn deliver(&self, job: &PrintJob) -> Result<(), String> {
        if self.fail {
            return Err("agent unreachable".to_string());
        }
        self.jobs.lock().unwrap().push(job.clone());
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
