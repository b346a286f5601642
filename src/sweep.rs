use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use ::time::{format_description::well_known, OffsetDateTime};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::SweepError;
use crate::netdetect;
use crate::probe::{PingProber, Prober};
use crate::types::{HostResult, SweepRequest, SweepResponse};

/// Tunables for a sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Largest host count a single request may expand to.
    pub max_hosts: u128,
    /// Max probes in flight per sweep.
    pub concurrency: usize,
    /// Per-probe reply deadline.
    pub timeout: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_hosts: 1024,
            concurrency: 64,
            timeout: Duration::from_secs(1),
        }
    }
}

/// Validates requests and runs sweeps against a `Prober`.
#[derive(Clone)]
pub struct SweepEngine {
    config: SweepConfig,
    prober: Arc<dyn Prober>,
}

impl SweepEngine {
    pub fn new(config: SweepConfig, prober: Arc<dyn Prober>) -> Self {
        Self { config, prober }
    }

    /// Engine probing with the system `ping` using `config.timeout`.
    pub fn with_ping(config: SweepConfig) -> Self {
        let prober = Arc::new(PingProber::new(config.timeout));
        Self::new(config, prober)
    }

    /// Validate `req`, probe every host of its network and report the ones
    /// that answered.
    pub async fn run(
        &self,
        req: &SweepRequest,
        cancel: &CancellationToken,
    ) -> Result<SweepResponse, SweepError> {
        let ip = req.ip.trim();
        let subnet = req.subnet.trim();
        if ip.is_empty() || subnet.is_empty() {
            return Err(SweepError::MissingInput);
        }

        let net = netdetect::parse_network(ip, subnet)?;
        let count = netdetect::host_count(&net);
        if count > self.config.max_hosts {
            return Err(SweepError::TooLarge { hosts: count });
        }
        let hosts = netdetect::expand_hosts(&net);

        tracing::info!(network = %net, hosts = hosts.len(), "sweep started");
        let start = Instant::now();
        let results = probe_hosts(
            &hosts,
            self.prober.clone(),
            self.config.concurrency,
            cancel,
        )
        .await?;

        let alive: Vec<HostResult> = results.into_iter().filter(|r| r.alive).collect();
        tracing::info!(
            network = %net,
            alive = alive.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "sweep finished"
        );

        Ok(SweepResponse {
            network: net.to_string(),
            alive_count: Some(alive.len() as u64),
            results: alive,
            scanned: Some(hosts.len() as u64),
            completed_at: Some(now_rfc3339()),
        })
    }
}

/// Probe `hosts` with at most `concurrency` probes in flight.
///
/// Results come back in the same order as `hosts`. Cancelling the token stops
/// dispatch and fails the whole sweep with `SweepError::Cancelled`.
pub async fn probe_hosts(
    hosts: &[IpAddr],
    prober: Arc<dyn Prober>,
    concurrency: usize,
    cancel: &CancellationToken,
) -> Result<Vec<HostResult>, SweepError> {
    let limit = concurrency.clamp(1, hosts.len().max(1));
    let sem = Arc::new(Semaphore::new(limit));
    let mut set = JoinSet::new();

    for (idx, &host) in hosts.iter().enumerate() {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            p = sem.clone().acquire_owned() => match p {
                Ok(p) => p,
                Err(_) => break,
            },
        };
        let prober = prober.clone();
        let cancel = cancel.clone();

        set.spawn(async move {
            let _permit = permit; // held until the probe finishes
            let alive = tokio::select! {
                _ = cancel.cancelled() => false,
                alive = prober.probe(host) => alive,
            };
            (idx, alive)
        });
    }

    let mut alive_by_idx = vec![false; hosts.len()];
    while let Some(res) = set.join_next().await {
        match res {
            Ok((idx, alive)) => alive_by_idx[idx] = alive,
            Err(e) => tracing::warn!(error = %e, "probe task failed"),
        }
    }

    if cancel.is_cancelled() {
        return Err(SweepError::Cancelled);
    }

    Ok(hosts
        .iter()
        .zip(alive_by_idx)
        .map(|(host, alive)| HostResult {
            host: host.to_string(),
            alive,
        })
        .collect())
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
