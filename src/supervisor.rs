// supervisor.rs - in-process restart loop
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Notify};
use tracing::{error, info, warn};

use crate::auth::{CaptchaVerifier, HCaptchaVerifier, LoginThrottle};
use crate::config::AppConfig;
use crate::database::{seed, DatabaseManager, PgStore, Store};
use crate::routes;
use crate::state::AppState;

/// A single delayed restart, shared by everything that can detect a fault.
#[derive(Clone)]
pub struct RestartHandle {
    inner: Arc<RestartInner>,
}

struct RestartInner {
    pending: AtomicBool,
    due: Notify,
    delay: Duration,
}

impl RestartHandle {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: Arc::new(RestartInner {
                pending: AtomicBool::new(false),
                due: Notify::new(),
                delay,
            }),
        }
    }

    /// Arms a restart after the configured delay. Calls made while one is
    /// already armed are ignored; returns whether this call armed it.
    pub fn schedule(&self, reason: &str) -> bool {
        if self.inner.pending.swap(true, Ordering::SeqCst) {
            warn!("Restart already scheduled; ignoring: {}", reason);
            return false;
        }

        error!("{}; restarting in {} ms", reason, self.inner.delay.as_millis());
        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;
            inner.due.notify_one();
        });
        true
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.load(Ordering::SeqCst)
    }

    /// Resolves once an armed restart's delay has elapsed.
    pub async fn due(&self) {
        self.inner.due.notified().await;
    }

    fn clear(&self) {
        self.inner.pending.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Restart,
    Shutdown,
}

/// Runs the API until ctrl-c, rebuilding everything after each fault.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let config = Arc::new(config);
    let restart = RestartHandle::new(Duration::from_millis(config.server.restart_delay_ms));
    let throttle = LoginThrottle::in_memory(
        config.security.login_max_attempts,
        chrono::Duration::seconds(config.security.login_lockout_secs as i64),
    );
    let captcha: Arc<dyn CaptchaVerifier> =
        Arc::new(HCaptchaVerifier::new(&config.captcha).context("failed to build captcha client")?);

    loop {
        let exit = match serve_once(&config, &restart, &throttle, &captcha).await {
            Ok(exit) => exit,
            Err(e) => {
                restart.schedule(&format!("Startup failed: {:#}", e));
                tokio::select! {
                    _ = restart.due() => Exit::Restart,
                    _ = shutdown_signal() => Exit::Shutdown,
                }
            }
        };

        if exit == Exit::Shutdown {
            info!("Shutdown complete");
            return Ok(());
        }

        restart.clear();
        info!("Restarting service");
    }
}

async fn serve_once(
    config: &Arc<AppConfig>,
    restart: &RestartHandle,
    throttle: &LoginThrottle,
    captcha: &Arc<dyn CaptchaVerifier>,
) -> anyhow::Result<Exit> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("database connection failed")?;
    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    if let Err(e) = prepare(config, store.as_ref()).await {
        store.close().await;
        return Err(e);
    }

    let listener = match TcpListener::bind(("0.0.0.0", config.server.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            store.close().await;
            return Err(e).with_context(|| format!("failed to bind port {}", config.server.port));
        }
    };
    info!("Novator API listening on http://0.0.0.0:{}", config.server.port);

    let state = AppState::new(
        config.clone(),
        store.clone(),
        throttle.clone(),
        captcha.clone(),
        restart.clone(),
    );
    let app = routes::app(state);

    let watchdog = tokio::spawn(watch_database(
        store.clone(),
        restart.clone(),
        Duration::from_secs(config.database.ping_interval_secs.max(1)),
    ));

    let (exit_tx, exit_rx) = oneshot::channel();
    let restart_signal = restart.clone();
    let shutdown = async move {
        let exit = tokio::select! {
            _ = restart_signal.due() => Exit::Restart,
            _ = shutdown_signal() => Exit::Shutdown,
        };
        info!("Stopping listener ({:?})", exit);
        let _ = exit_tx.send(exit);
    };

    let served = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await;

    watchdog.abort();
    store.close().await;

    served.context("server error")?;
    Ok(exit_rx.await.unwrap_or(Exit::Shutdown))
}

/// Reconciles seed records and makes sure uploads can be written.
async fn prepare(config: &AppConfig, store: &dyn Store) -> anyhow::Result<()> {
    let report = seed::reconcile(store).await.context("seeding failed")?;
    info!(
        "Seed check done (shift created: {}, home created: {})",
        report.shift_created, report.home_created
    );

    tokio::fs::create_dir_all(&config.media.upload_dir)
        .await
        .with_context(|| format!("cannot create upload dir {}", config.media.upload_dir.display()))?;
    Ok(())
}

/// Periodic connectivity check; the first failure arms a restart.
async fn watch_database(store: Arc<dyn Store>, restart: RestartHandle, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if let Err(e) = store.ping().await {
            restart.schedule(&format!("Database ping failed: {}", e));
            return;
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
