//! Application state, router assembly and server bootstrap.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use tasklane_auth::{AuthService, AuthState, TokenService};
use tasklane_db_postgres::{PgTodoStore, PgUserStore, create_pool, migrations};

use crate::audit::AuditLogger;
use crate::cache::RemoteCache;
use crate::config::AppConfig;
use crate::http;
use crate::todos::TodoService;

/// Shared state behind every handler.
///
/// All services are constructed once at startup and injected here; there
/// are no module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub auth_state: AuthState,
    pub todos: Arc<TodoService>,
    pub audit: Arc<AuditLogger>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth_state.clone()
    }
}

/// Builds the router with every route and middleware layer.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/auth/sign-up", post(http::auth::sign_up))
        .route("/auth/sign-in", post(http::auth::sign_in))
        .route("/auth/user", get(http::auth::current_user))
        .route(
            "/todos",
            get(http::todos::list_todos).post(http::todos::create_todo),
        )
        .route(
            "/todos/{id}",
            get(http::todos::get_todo)
                .put(http::todos::update_todo)
                .delete(http::todos::delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wires every component together and serves until shutdown.
///
/// # Errors
///
/// Returns an error if the database, the audit log file or the listener
/// cannot be set up. An unreachable Redis is not an error: the cache
/// degrades to local buffering.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let pool = create_pool(&config.database).await?;
    if config.database.run_migrations {
        migrations::run(&pool).await?;
    }

    let cache = RemoteCache::connect(&config.redis).await;
    let audit = Arc::new(AuditLogger::new(
        &config.audit.log_path,
        cache.clone(),
        config.audit.recent_capacity,
    )?);

    let tokens = Arc::new(TokenService::new(&config.auth)?);
    let auth = Arc::new(AuthService::new(
        Arc::new(PgUserStore::new(pool.clone())),
        tokens.clone(),
    ));
    let todos = Arc::new(TodoService::new(
        Arc::new(PgTodoStore::new(pool)),
        cache.clone(),
        audit.clone(),
        Duration::from_secs(config.cache.ttl_secs),
    ));

    spawn_drain_task(cache, config.redis.drain_interval_secs);

    let state = AppState {
        auth,
        auth_state: AuthState::new(tokens),
        todos,
        audit,
    };

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Tasklane listening");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Periodically retries flushing buffered cache writes.
fn spawn_drain_task(cache: RemoteCache, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        // The first tick fires immediately; skip it.
        interval.tick().await;
        loop {
            interval.tick().await;
            cache.drain_fallback().await;
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
