use crate::config::ServerConfig;
use crate::error::Result;
use axum::Router;
use futures::FutureExt;
use noticeboard_app::state::AppState;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let pool = state.pool().clone();
    let mut app = main_router(state);

    if args.cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await;

    debug!("Server stopped, closing database pool");
    pool.close().await;
    served?;
    Ok(())
}

pub fn main_router(state: AppState) -> Router<()> {
    noticeboard_app::rest_api::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let database_url = config.database_url()?;
    let pool =
        noticeboard_dal::new_pool_with_size(&database_url, config.database.max_connections).await?;
    noticeboard_dal::migrate(&pool).await?;
    info!("Database ready");
    Ok(AppState::new(pool))
}
