//! HTTP server wiring and lifecycle.

use crate::executor::handlers::{handle_create_task, handle_delete_task, handle_get_task};
use crate::executor::manager::TaskManager;
use crate::executor::protocol::{ENDPOINT_TASK_BY_ID, ENDPOINT_TASKS};

use anyhow::Result;
use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

/// Builds the task API. Unsupported methods on known paths answer 405.
pub fn router(manager: Arc<TaskManager>) -> Router {
    Router::new()
        .route(ENDPOINT_TASKS, post(handle_create_task))
        .route(
            ENDPOINT_TASK_BY_ID,
            get(handle_get_task).delete(handle_delete_task),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(manager))
}

/// Serves the task API until `shutdown` resolves.
///
/// After the signal, no new connections are accepted and in-flight requests get
/// `grace` to finish before the server gives up on them. Background tasks are
/// not awaited.
pub async fn serve<F>(
    listener: TcpListener,
    manager: Arc<TaskManager>,
    grace: Duration,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(manager);
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();

    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown.await;
        tracing::info!("Shutting down server...");
        let _ = signalled_tx.send(());
    })
    .into_future();

    let grace_expired = async move {
        if signalled_rx.await.is_ok() {
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => {
            result?;
            tracing::info!("Server exited gracefully");
        }
        _ = grace_expired => {
            tracing::warn!("Forced shutdown: requests still in flight after {:?}", grace);
        }
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        _ = wait_for_sigterm() => tracing::info!("Received SIGTERM signal"),
    }
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::error!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
