use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use hr_workflow_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    {
        let state = app_state.clone();
        let interval = Duration::from_secs(config.sweep_interval_secs);
        tokio::spawn(async move {
            loop {
                match state.sweep_service.run_once().await {
                    Ok(swept) => {
                        tracing::debug!("Interview sweep finished, {} row(s) updated", swept);
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "Interview sweep failed");
                    }
                }
                tokio::time::sleep(interval).await;
            }
        });
    }

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let integration_api = Router::new()
        .route(
            "/api/integration/candidates",
            get(routes::candidate_routes::list_candidates)
                .post(routes::candidate_routes::create_candidate),
        )
        .route(
            "/api/integration/candidates/:id",
            get(routes::candidate_routes::get_candidate)
                .delete(routes::candidate_routes::delete_candidate),
        )
        .route(
            "/api/integration/candidates/:id/status",
            post(routes::candidate_routes::update_candidate_status),
        )
        .route(
            "/api/integration/candidates/:id/dispatch",
            post(routes::candidate_routes::dispatch_communication),
        )
        .route(
            "/api/integration/candidates/:id/history",
            get(routes::candidate_routes::get_candidate_history),
        )
        .route(
            "/api/integration/candidates/:id/emails",
            get(routes::candidate_routes::get_candidate_emails),
        )
        .route(
            "/api/integration/candidates/:id/interviews",
            get(routes::candidate_routes::get_candidate_interviews),
        )
        .route(
            "/api/integration/interviews/:id",
            patch(routes::interview_routes::update_interview),
        )
        .route(
            "/api/integration/dictionaries/candidate-statuses",
            get(routes::candidate_routes::list_candidate_statuses),
        )
        .layer(axum::middleware::from_fn_with_state(
            hr_workflow_backend::middleware::rate_limit::new_rps_state(config.integration_rps),
            hr_workflow_backend::middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(integration_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
