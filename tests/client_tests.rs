use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use ping_sweep_rs::client::{
    HttpTransport, SweepController, SweepOutcome, MSG_UNREACHABLE, STATUS_IDLE,
};
use ping_sweep_rs::probe::Prober;
use ping_sweep_rs::server::{router, AppState};
use ping_sweep_rs::sweep::{SweepConfig, SweepEngine};
use ping_sweep_rs::view::MemoryView;
use tokio_util::sync::CancellationToken;

struct ListProber(HashSet<IpAddr>);

#[async_trait]
impl Prober for ListProber {
    async fn probe(&self, host: IpAddr) -> bool {
        self.0.contains(&host)
    }
}

/// Start a sweep service on a loopback port and return its base URL.
async fn start_service(alive: &[&str]) -> String {
    let prober = ListProber(alive.iter().map(|s| s.parse().unwrap()).collect());
    let engine = SweepEngine::new(SweepConfig::default(), Arc::new(prober));
    let app = router(AppState::new(engine, CancellationToken::new()), "ui-does-not-exist");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn end_to_end_sweep_reports_completion() {
    let base = start_service(&["192.168.1.1", "192.168.1.2"]).await;
    let view = MemoryView::new("192.168.1.1", "24");
    let mut controller = SweepController::new(view, HttpTransport::new(&base));

    let outcome = controller.trigger().await;

    assert!(outcome.is_completed());
    let view = controller.into_view();
    assert_eq!(view.status, "Sweep complete for 192.168.1.0/24 (2 up)");
    assert_eq!(
        view.badges(),
        vec![("192.168.1.1", "ONLINE"), ("192.168.1.2", "ONLINE")]
    );
    assert!(view.trigger_enabled);
}

#[tokio::test]
async fn end_to_end_server_rejection_is_rendered() {
    let base = start_service(&[]).await;
    let view = MemoryView::new("192.168.1.1", "abc");
    let mut controller = SweepController::new(view, HttpTransport::new(&base));

    let outcome = controller.trigger().await;

    assert_eq!(
        outcome,
        SweepOutcome::ServerError {
            status: 400,
            message: "Subnet must be a number like 24.".into()
        }
    );
    assert_eq!(controller.view().status, STATUS_IDLE);
    assert_eq!(
        controller.view().message.as_deref(),
        Some("Subnet must be a number like 24.")
    );
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let view = MemoryView::new("10.0.0.1", "30");
    let mut controller =
        SweepController::new(view, HttpTransport::new(&format!("http://{addr}")));

    assert_eq!(controller.trigger().await, SweepOutcome::Unreachable);
    assert_eq!(controller.view().message.as_deref(), Some(MSG_UNREACHABLE));
    assert_eq!(controller.view().status, STATUS_IDLE);
    assert!(controller.view().trigger_enabled);
}
