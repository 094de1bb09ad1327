//! Dev-server probe loop
//!
//! In dev mode the client-side bundle is not compiled at all; the browser
//! fetches the program from a jsaddle server kept alive by ghcid. The
//! bundler hook must not emit the bridge module before that server
//! exists, so it polls the endpoint until it answers.
//!
//! The retry policy is deliberately asymmetric: transport-level failures
//! mean "not up yet" and are retried on a fixed interval, while a non-200
//! answer means the server is up but broken and fails the build at once.

use crate::error::LoaderError;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Default delay between probes of the jsaddle endpoint.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_millis(2000);

/// Retry policy for the dev-server probe.
///
/// `max_attempts = None` probes forever; the loop has no timeout and no
/// backoff growth, and is abandoned only by dropping the future (the
/// host owns the future, which stands in for a cancellation token).
/// Bounding `max_attempts` exists so tests can exercise the retry path
/// without running unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Delay between consecutive probes.
    pub interval: Duration,

    /// Probe budget; `None` means unbounded.
    pub max_attempts: Option<u32>,
}

impl ProbeConfig {
    /// Unbounded probing at the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// Bound the number of probes.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_INTERVAL)
    }
}

/// Poll `{jsaddle_root}/jsaddle.js` until the dev server answers 200.
///
/// - transport error: not up yet, sleep and retry
/// - non-200 status: fatal, no retry
/// - 200: ready
pub async fn wait_for_dev_server(
    client: &reqwest::Client,
    jsaddle_root: &str,
    config: ProbeConfig,
) -> Result<(), LoaderError> {
    let url = format!("{}/jsaddle.js", jsaddle_root.trim_end_matches('/'));
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match client.get(&url).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                debug!(url = %url, attempts, "[thunk-cabal] jsaddle dev server is up");
                return Ok(());
            }
            Ok(response) => {
                return Err(LoaderError::DevServerStatus {
                    status: response.status().as_u16(),
                });
            }
            Err(err) => {
                debug!(url = %url, attempts, error = %err, "[thunk-cabal] jsaddle dev server not reachable yet");
                if let Some(max) = config.max_attempts {
                    if attempts >= max {
                        return Err(LoaderError::ProbeAttemptsExhausted { attempts });
                    }
                }
                sleep(config.interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;
    use std::net::SocketAddr;
    use std::time::Instant;
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn probe_config() -> ProbeConfig {
        ProbeConfig::new(Duration::from_millis(20))
    }

    #[tokio::test]
    async fn test_200_succeeds() {
        let app = Router::new().route("/jsaddle.js", get(|| async { "jsaddle" }));
        let addr = serve(app).await;

        let client = reqwest::Client::new();
        wait_for_dev_server(&client, &format!("http://{addr}"), probe_config())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_200_is_fatal_without_retry() {
        // No route registered: every request gets a 404.
        let addr = serve(Router::new()).await;

        let client = reqwest::Client::new();
        let started = Instant::now();
        let err = wait_for_dev_server(
            &client,
            &format!("http://{addr}"),
            ProbeConfig::new(Duration::from_millis(500)),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, LoaderError::DevServerStatus { status: 404 }));
        // A retry would have slept through the interval at least once.
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_transport_error_retries_until_budget() {
        // Bind then drop to get a loopback port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = reqwest::Client::new();
        let started = Instant::now();
        let err = wait_for_dev_server(
            &client,
            &format!("http://{addr}"),
            probe_config().with_max_attempts(3),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            LoaderError::ProbeAttemptsExhausted { attempts: 3 }
        ));
        // Two sleeps between three attempts.
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_recovers_once_server_appears() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        tokio::spawn(async move {
            sleep(Duration::from_millis(100)).await;
            let listener = TcpListener::bind(addr).await.unwrap();
            let app = Router::new().route("/jsaddle.js", get(|| async { "jsaddle" }));
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::new();
        wait_for_dev_server(&client, &format!("http://{addr}"), probe_config())
            .await
            .unwrap();
    }
}
