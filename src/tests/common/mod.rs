pub use axum::Router;
pub use serde_json::Value;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reqwest::Client;

use crate::config::credentials::Credentials;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;
use crate::server::server::{build_router, AppState};
use crate::token::{Role, RtcSubject, RtmRole, SignerError, TokenSigner};

pub const APP_ID: &str = "test-app-id";
pub const APP_CERTIFICATE: &str = "test-certificate";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn test_credentials() -> Arc<Credentials> {
    Arc::new(Credentials::new(Some(APP_ID.into()), Some(APP_CERTIFICATE.into())).unwrap())
}

/// Router with the given signer, served on an ephemeral port.
pub async fn spawn_app(
    signer: Arc<dyn TokenSigner>,
    settings: &SettingsConfig,
) -> (JoinHandle<()>, SocketAddr) {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, test_credentials(), signer, settings);
    spawn_axum(build_router(state, settings)).await
}

/// Signer returning predictable tokens, or failing on demand.
#[derive(Default)]
pub struct FakeSigner {
    pub fail_rtc: bool,
    pub fail_rtm: bool,
    pub calls: AtomicUsize,
}

impl FakeSigner {
    pub fn failing_rtc() -> Self {
        Self {
            fail_rtc: true,
            ..Self::default()
        }
    }

    pub fn failing_rtm() -> Self {
        Self {
            fail_rtm: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenSigner for FakeSigner {
    fn sign_communication_token(
        &self,
        credentials: &Credentials,
        channel_name: &str,
        subject: &RtcSubject,
        role: Role,
        expires_at: u32,
    ) -> Result<String, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_rtc {
            return Err(SignerError::new("rtc signer unavailable"));
        }
        Ok(format!(
            "rtc:{}:{}:{:?}:{}:{}",
            credentials.app_id(),
            channel_name,
            subject,
            role,
            expires_at
        ))
    }

    fn sign_messaging_token(
        &self,
        credentials: &Credentials,
        subject: &str,
        _role: RtmRole,
        expires_at: u32,
    ) -> Result<String, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_rtm {
            return Err(SignerError::new("rtm signer unavailable"));
        }
        Ok(format!("rtm:{}:{}:{}", credentials.app_id(), subject, expires_at))
    }
}
