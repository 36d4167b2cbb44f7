use tracing::info;

use atelier_core::config::Config as _;
use atelier_core::tracing::init_tracing;

use atelier_auth::config::AuthConfig;
use atelier_auth::infra::email::build_sender;
use atelier_auth::router::build_router;
use atelier_auth::state::AppState;
use atelier_auth::sweep;

#[tokio::main]
async fn main() {
    init_tracing();

    let settings = AuthConfig::from_env()
        .into_settings()
        .expect("invalid configuration");
    let email_sender = build_sender(&settings.email_driver).expect("invalid EMAIL_DRIVER");

    let sweep_interval = settings.sweep_interval;
    let port = settings.auth_port;
    let state = AppState::new(settings, email_sender);
    let sweeper = sweep::spawn(state.clone(), sweep_interval);

    let router = build_router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("server error");

    sweeper.shutdown().await;
}
