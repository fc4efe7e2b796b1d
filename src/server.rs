//! Running the HTTP server until shutdown.

use anyhow::anyhow;
use axum::Router;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Serve `app` until `signal` completes, then give in-flight requests
/// `drain_timeout` to finish.
///
/// Returns early with an error if the server stops on its own before the
/// signal arrives.
pub async fn run<S>(
    listener: TcpListener,
    app: Router,
    signal: S,
    drain_timeout: Duration,
) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send,
{
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    supervise(server, shutdown_tx, signal, drain_timeout).await
}

async fn supervise<S>(
    mut server: JoinHandle<io::Result<()>>,
    shutdown_tx: oneshot::Sender<()>,
    signal: S,
    drain_timeout: Duration,
) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send,
{
    tokio::select! {
        () = signal => {}
        result = &mut server => {
            tracing::error!("http server stopped before a shutdown signal");
            return match result {
                Ok(Ok(())) => Err(anyhow!("http server exited unexpectedly")),
                Ok(Err(e)) => Err(anyhow::Error::new(e).context("http server failed")),
                Err(e) => Err(anyhow::Error::new(e).context("http server task failed")),
            };
        }
    }

    tracing::info!(
        timeout_secs = drain_timeout.as_secs_f64(),
        "commencing graceful shutdown"
    );
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(drain_timeout, server).await {
        Ok(Ok(Ok(()))) => {
            tracing::info!("graceful shutdown was successful");
            Ok(())
        }
        Ok(Ok(Err(e))) => {
            tracing::error!(error = %e, "failed to shutdown http server");
            Err(anyhow::Error::new(e).context("failed to shutdown http server"))
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "http server task failed");
            Err(anyhow::Error::new(e).context("http server task failed"))
        }
        Err(_) => {
            tracing::error!("shutdown timed out");
            Err(anyhow!("graceful shutdown timed out"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    #[tokio::test]
    async fn test_server_failure_returns_without_signal() {
        let server = tokio::spawn(async { Err(io::Error::other("listener closed")) });
        let (shutdown_tx, _shutdown_rx) = oneshot::channel();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            supervise(
                server,
                shutdown_tx,
                std::future::pending::<()>(),
                Duration::from_secs(1),
            ),
        )
        .await
        .expect("supervise waited for a signal that never came");

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("listener closed"));
    }

    #[tokio::test]
    async fn test_server_exiting_cleanly_early_is_an_error() {
        let server = tokio::spawn(async { Ok(()) });
        let (shutdown_tx, _shutdown_rx) = oneshot::channel();

        let result = supervise(
            server,
            shutdown_tx,
            std::future::pending::<()>(),
            Duration::from_secs(1),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_drain_timeout() {
        let server = tokio::spawn(std::future::pending::<io::Result<()>>());
        let (shutdown_tx, _shutdown_rx) = oneshot::channel();

        let result = supervise(server, shutdown_tx, async {}, Duration::from_millis(50)).await;
        assert!(result.unwrap_err().to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_run_serves_until_signal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/ping", get(|| async { "pong" }));
        let (signal_tx, signal_rx) = oneshot::channel::<()>();

        let running = tokio::spawn(run(
            listener,
            app,
            async move {
                let _ = signal_rx.await;
            },
            Duration::from_secs(5),
        ));

        let body = reqwest::get(format!("http://{}/ping", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "pong");

        signal_tx.send(()).unwrap();
        running.await.unwrap().unwrap();
    }
}
