use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    routing::{get, post},
};
use nook_backend::{
    AppState,
    config::Config,
    email::EmailService,
    middleware::{auth_middleware, log_errors, version_gate},
    routes,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'nook_backend';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    let email = EmailService::new(config.clone());

    let state = AppState {
        pool,
        config: config.clone(),
        email,
    };

    // Auth endpoints stay outside the version gate: the HTML surfaces are
    // opened from email clients that never send the app-version header.
    let auth_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/verify-email", get(routes::auth::verify_email))
        .route(
            "/auth/resend-verification",
            post(routes::auth::resend_verification),
        )
        .route("/auth/forgot-password", post(routes::auth::forgot_password))
        .route(
            "/auth/reset-password",
            get(routes::auth::reset_password_form).post(routes::auth::reset_password),
        );

    let profile_routes = Router::new()
        .route(
            "/auth/profile",
            get(routes::auth::get_profile).put(routes::auth::update_profile),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Mobile-only surfaces sit behind the minimum-app-version gate.
    let gated_routes = Router::new()
        .route("/categories", post(routes::categories::categories))
        .route("/buffet-items", post(routes::buffet_items::buffet_items))
        .route("/cart", post(routes::cart::cart))
        .route("/orders/submit", post(routes::orders::submit_order))
        .route("/orders/history", post(routes::orders::order_history))
        .route("/orders/details", post(routes::orders::order_details))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            version_gate,
        ));

    let public_routes = Router::new()
        .route("/store-info", get(routes::store_info::get_all_store_info))
        .route(
            "/store-info/{key}",
            get(routes::store_info::get_store_info_by_key),
        )
        .route("/health", get(routes::system::health))
        .route("/version-check", post(routes::system::version_check));

    let router = Router::new().nest(
        "/api",
        Router::new()
            .merge(auth_routes)
            .merge(profile_routes)
            .merge(gated_routes)
            .merge(public_routes),
    );

    let router = router.layer(axum::middleware::from_fn(log_errors));

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    let app = router.with_state(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service(),
    )
    .await
    .expect("Failed to start server");
}
