//! Sweep request client: reads the two inputs from a view, submits them to
//! the sweep service and renders whatever comes back.

use std::ops::{Deref, DerefMut};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{ErrorResponse, SweepRequest, SweepResponse};
use crate::view::SweepView;

pub const MSG_MISSING_INPUT: &str = "Please enter both an IP address and subnet prefix.";
pub const MSG_NO_HOSTS: &str = "No responding hosts found.";
pub const MSG_SWEEP_FAILED: &str = "Ping sweep failed.";
pub const MSG_UNREACHABLE: &str = "Unable to reach the ping service.";
pub const STATUS_SCANNING: &str = "Scanning... deploying probes.";
pub const STATUS_IDLE: &str = "Awaiting command...";

/// Path of the sweep endpoint, relative to the service base URL.
pub const PING_PATH: &str = "/api/ping";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Raw HTTP reply; the body is decoded by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Carries one sweep request to the service.
#[async_trait]
pub trait SweepTransport: Send + Sync {
    async fn post_sweep(&self, req: &SweepRequest) -> Result<TransportReply, TransportError>;
}

/// JSON-over-HTTP transport targeting `{base_url}/api/ping`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), PING_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SweepTransport for HttpTransport {
    async fn post_sweep(&self, req: &SweepRequest) -> Result<TransportReply, TransportError> {
        // `.json()` sets `Content-Type: application/json`.
        let resp = self.client.post(&self.endpoint).json(req).send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        Ok(TransportReply { status, body })
    }
}

/// Terminal state of one `trigger`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// An input was blank; nothing was sent.
    Rejected,
    Completed(SweepResponse),
    ServerError { status: u16, message: String },
    /// The request never completed or the reply was not JSON.
    Unreachable,
}

impl SweepOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SweepOutcome::Completed(_))
    }
}

/// Owns the view and transport for the lifetime of the UI.
pub struct SweepController<V, T> {
    view: V,
    transport: T,
}

impl<V: SweepView, T: SweepTransport> SweepController<V, T> {
    pub fn new(view: V, transport: T) -> Self {
        Self { view, transport }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Run one submit cycle, the equivalent of pressing the sweep button.
    ///
    /// Blank inputs are rejected without touching the network. Otherwise the
    /// trigger stays disabled until the reply is rendered, and is re-enabled
    /// even if this future is dropped early.
    pub async fn trigger(&mut self) -> SweepOutcome {
        let ip = self.view.ip_input().trim().to_string();
        let subnet = self.view.subnet_input().trim().to_string();

        if ip.is_empty() || subnet.is_empty() {
            self.view.render_message(MSG_MISSING_INPUT);
            return SweepOutcome::Rejected;
        }

        let mut view = TriggerGuard::engage(&mut self.view);
        view.set_status(STATUS_SCANNING);
        view.clear_results();

        let request = SweepRequest { ip, subnet };
        tracing::debug!(ip = %request.ip, subnet = %request.subnet, "submitting sweep");
        let reply = self.transport.post_sweep(&request).await;
        settle(&mut *view, reply)
    }
}

/// Render a transport result and pick the outcome.
fn settle<V: SweepView>(
    view: &mut V,
    reply: Result<TransportReply, TransportError>,
) -> SweepOutcome {
    let reply = match reply {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "sweep request failed");
            return unreachable(view);
        }
    };

    if !reply.is_success() {
        let value: serde_json::Value = match serde_json::from_slice(&reply.body) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(status = reply.status, error = %e, "undecodable error reply");
                return unreachable(view);
            }
        };
        // Valid JSON of any other shape carries no message.
        let payload: ErrorResponse = serde_json::from_value(value).unwrap_or_default();
        let message = payload
            .error
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| MSG_SWEEP_FAILED.to_string());
        view.render_message(&message);
        view.set_status(STATUS_IDLE);
        return SweepOutcome::ServerError {
            status: reply.status,
            message,
        };
    }

    let payload: SweepResponse = match serde_json::from_slice(&reply.body) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "undecodable sweep reply");
            return unreachable(view);
        }
    };

    if payload.results.is_empty() {
        view.render_message(MSG_NO_HOSTS);
    } else {
        view.render_hosts(&payload.results);
    }
    view.set_status(&completion_status(&payload));
    SweepOutcome::Completed(payload)
}

fn unreachable<V: SweepView>(view: &mut V) -> SweepOutcome {
    view.render_message(MSG_UNREACHABLE);
    view.set_status(STATUS_IDLE);
    SweepOutcome::Unreachable
}

/// Status line shown after a successful sweep.
pub fn completion_status(resp: &SweepResponse) -> String {
    format!(
        "Sweep complete for {} ({} up)",
        resp.network,
        resp.alive_count.unwrap_or(0)
    )
}

/// Disables the trigger on creation and re-enables it on drop.
struct TriggerGuard<'a, V: SweepView> {
    view: &'a mut V,
}

impl<'a, V: SweepView> TriggerGuard<'a, V> {
    fn engage(view: &'a mut V) -> Self {
        view.set_trigger_enabled(false);
        Self { view }
    }
}

impl<V: SweepView> Deref for TriggerGuard<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.view
    }
}

impl<V: SweepView> DerefMut for TriggerGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        self.view
    }
}

impl<V: SweepView> Drop for TriggerGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_trigger_enabled(true);
    }
}
