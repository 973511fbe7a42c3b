//! Aashray server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use aashray_api::middleware::AppState;
use aashray_common::{Config, LocalStorage};
use aashray_core::{AccountService, CaseService, SessionService, TeamService};
use aashray_db::repositories::{
    CaseRepository, GroupRepository, SessionRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aashray=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting aashray server...");

    let config = Config::load()?;

    let db = aashray_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    aashray_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let case_repo = CaseRepository::new(Arc::clone(&db));
    let session_repo = SessionRepository::new(Arc::clone(&db));

    // Initialize services
    let storage = Arc::new(LocalStorage::from_settings(&config.storage));
    let account_service = AccountService::new(user_repo.clone());
    let session_service = SessionService::new(
        session_repo,
        user_repo.clone(),
        group_repo.clone(),
        config.session.ttl_hours,
    );
    let case_service = CaseService::new(case_repo.clone(), storage.clone());
    let team_service = TeamService::new(user_repo, group_repo, case_repo);

    let created = team_service.ensure_default_groups().await?;
    if !created.is_empty() {
        info!(groups = ?created, "Created default groups");
    }

    if let Some(admin) = &config.admin {
        if let Some(user) = account_service.ensure_superuser(admin).await? {
            info!(username = %user.username, "Created superuser");
        }
    }

    session_service.purge_expired().await?;

    let state = AppState {
        account_service,
        session_service,
        case_service,
        team_service,
        session: config.session.clone(),
        max_upload_bytes: config.storage.max_upload_bytes,
    };

    // Build router
    let mut app = aashray_api::app(state);
    let media_route = config.storage.base_url.trim_end_matches('/');
    if media_route.starts_with('/') && media_route.len() > 1 {
        app = app.nest_service(media_route, ServeDir::new(storage.base_path()));
    } else {
        warn!(base_url = %config.storage.base_url, "Media is not served locally");
    }
    let app = app
        .layer(RequestBodyLimitLayer::new(config.storage.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
