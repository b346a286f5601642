//! Presentation surfaces driven by the sweep client.

use crate::types::HostResult;

/// Everything the sweep client reads from or writes to its UI.
///
/// The results area holds either a list of host rows or a single message;
/// rendering one replaces the other.
pub trait SweepView {
    fn ip_input(&self) -> String;
    fn subnet_input(&self) -> String;
    fn set_status(&mut self, text: &str);
    fn clear_results(&mut self);
    fn render_hosts(&mut self, hosts: &[HostResult]);
    fn render_message(&mut self, text: &str);
    fn set_trigger_enabled(&mut self, enabled: bool);
}

/// Headless view keeping every rendered piece of state in memory.
#[derive(Debug, Clone)]
pub struct MemoryView {
    pub ip: String,
    pub subnet: String,
    pub status: String,
    pub rows: Vec<HostResult>,
    pub message: Option<String>,
    pub trigger_enabled: bool,
    /// Every status text set, oldest first.
    pub status_history: Vec<String>,
    /// Every enable/disable transition of the trigger, oldest first.
    pub trigger_history: Vec<bool>,
}

impl MemoryView {
    pub fn new(ip: impl Into<String>, subnet: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            subnet: subnet.into(),
            status: String::new(),
            rows: Vec::new(),
            message: None,
            trigger_enabled: true,
            status_history: Vec::new(),
            trigger_history: Vec::new(),
        }
    }

    /// Host rows as `(host, badge)` pairs.
    pub fn badges(&self) -> Vec<(&str, &'static str)> {
        self.rows.iter().map(|r| (r.host.as_str(), r.badge())).collect()
    }
}

impl SweepView for MemoryView {
    fn ip_input(&self) -> String {
        self.ip.clone()
    }

    fn subnet_input(&self) -> String {
        self.subnet.clone()
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
        self.status_history.push(self.status.clone());
    }

    fn clear_results(&mut self) {
        self.rows.clear();
        self.message = None;
    }

    fn render_hosts(&mut self, hosts: &[HostResult]) {
        self.message = None;
        self.rows = hosts.to_vec();
    }

    fn render_message(&mut self, text: &str) {
        self.rows.clear();
        self.message = Some(text.to_string());
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        self.trigger_enabled = enabled;
        self.trigger_history.push(enabled);
    }
}

/// Prints status changes and results to stdout.
#[derive(Debug, Clone)]
pub struct TerminalView {
    ip: String,
    subnet: String,
}

impl TerminalView {
    pub fn new(ip: impl Into<String>, subnet: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            subnet: subnet.into(),
        }
    }
}

impl SweepView for TerminalView {
    fn ip_input(&self) -> String {
        self.ip.clone()
    }

    fn subnet_input(&self) -> String {
        self.subnet.clone()
    }

    fn set_status(&mut self, text: &str) {
        println!("[status] {text}");
    }

    fn clear_results(&mut self) {}

    fn render_hosts(&mut self, hosts: &[HostResult]) {
        print!("{}", format_host_table(hosts));
    }

    fn render_message(&mut self, text: &str) {
        println!("{text}");
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        tracing::debug!(enabled, "sweep trigger toggled");
    }
}

/// Column-aligned `host  status` table, one line per host.
pub fn format_host_table(hosts: &[HostResult]) -> String {
    let host_w = hosts
        .iter()
        .map(|h| h.host.len())
        .fold("host".len(), usize::max);
    let badge_w = "OFFLINE".len();

    let mut out = String::new();
    out.push_str(&format!("{:<host_w$}  {:<badge_w$}\n", "host", "status"));
    out.push_str(&format!("{:-<host_w$}  {:-<badge_w$}\n", "", ""));
    for h in hosts {
        out.push_str(&format!("{:<host_w$}  {:<badge_w$}\n", h.host, h.badge()));
    }
    out
}
