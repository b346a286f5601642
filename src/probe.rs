use std::net::IpAddr;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time;

/// Decides whether a single host is alive.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, host: IpAddr) -> bool;
}

/// Probes with one ICMP echo through the system `ping` binary.
///
/// Exit status 0 means alive. A missing binary, a spawn failure, or a reply
/// slower than `timeout` all count as down.
#[derive(Debug, Clone)]
pub struct PingProber {
    timeout: Duration,
}

impl PingProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn command(&self, host: IpAddr) -> Command {
        let host = host.to_string();

        #[cfg(target_os = "windows")]
        let mut cmd = {
            let mut c = Command::new("ping");
            c.args(["-n", "1", "-w", &self.timeout.as_millis().to_string(), &host]);
            c
        };

        #[cfg(not(target_os = "windows"))]
        let mut cmd = {
            // `-W` takes whole seconds; round up so sub-second timeouts still wait.
            let secs = self.timeout.as_millis().div_ceil(1000).max(1);
            let mut c = Command::new("ping");
            c.args(["-c", "1", "-W", &secs.to_string(), &host]);
            c
        };

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for PingProber {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl Prober for PingProber {
    async fn probe(&self, host: IpAddr) -> bool {
        // Grace period on top of ping's own deadline for process startup.
        let deadline = self.timeout + Duration::from_millis(500);
        match time::timeout(deadline, self.command(host).status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                tracing::warn!(%host, error = %e, "failed to run ping");
                false
            }
            Err(_) => {
                tracing::debug!(%host, "ping exceeded deadline");
                false
            }
        }
    }
}
