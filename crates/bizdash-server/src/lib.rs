pub mod embed;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use state::AppState;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/config", get(routes::config::get_config))
        .route("/api/week", get(routes::week::get_week))
        // Level 10
        .route(
            "/api/level10",
            get(routes::level10::get_meeting).put(routes::level10::put_meeting),
        )
        .route("/api/level10/summary", get(routes::level10::get_summary))
        .route("/api/level10/ratings", get(routes::level10::get_ratings))
        // VTO
        .route(
            "/api/vto",
            get(routes::vto::get_goals).put(routes::vto::put_goals),
        )
        // Issues
        .route(
            "/api/issues",
            get(routes::issues::list_issues).post(routes::issues::create_issue),
        )
        .route("/api/issues/summary", get(routes::issues::get_summary))
        .route(
            "/api/issues/{id}",
            put(routes::issues::update_issue).delete(routes::issues::delete_issue),
        )
        .route("/api/issues/{id}/solve", post(routes::issues::solve_issue))
        // Rocks
        .route(
            "/api/rocks",
            get(routes::rocks::list_rocks).post(routes::rocks::create_rock),
        )
        .route("/api/rocks/summary", get(routes::rocks::get_summary))
        .route(
            "/api/rocks/{id}",
            put(routes::rocks::update_rock).delete(routes::rocks::delete_rock),
        )
        // Sales enablement
        .route("/api/enablement", get(routes::enablement::list_sections))
        .route(
            "/api/enablement/{section}",
            put(routes::enablement::put_section),
        )
        // Associations
        .route(
            "/api/associations",
            get(routes::associations::list_associations)
                .post(routes::associations::create_association),
        )
        .route(
            "/api/associations/summary",
            get(routes::associations::get_summary),
        )
        .route(
            "/api/associations/{id}",
            put(routes::associations::update_association)
                .delete(routes::associations::delete_association),
        )
        // Association events
        .route(
            "/api/events",
            get(routes::events::list_events).post(routes::events::create_event),
        )
        .route("/api/events/calendar", get(routes::events::get_calendar))
        .route("/api/events/upcoming", get(routes::events::get_upcoming))
        .route(
            "/api/events/{id}",
            put(routes::events::update_event).delete(routes::events::delete_event),
        )
        // Sales targets
        .route(
            "/api/targets",
            get(routes::targets::list_targets).post(routes::targets::create_target),
        )
        .route("/api/targets/summary", get(routes::targets::get_summary))
        .route(
            "/api/targets/{id}",
            put(routes::targets::update_target).delete(routes::targets::delete_target),
        )
        .fallback(embed::static_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the dashboard server.
pub async fn serve(app_state: AppState, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener, open_browser).await
}

/// Start the dashboard server on a pre-bound listener.
///
/// The caller can read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let backend = app_state.repo.store().name();
    let app = build_router(app_state);

    tracing::info!(backend, "dashboard listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
