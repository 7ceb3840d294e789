use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::Router;
use screener_dashboard::{
    api,
    app_state::AppState,
    client::HttpScreenerClient,
    config::AppConfig,
    controller::SubmissionController,
    models::default_watchlists,
    session::DashboardSession,
};
use tokio::sync::oneshot;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 2. Cargar configuración
    let cfg = AppConfig::from_env().context("Error al cargar la configuración")?;
    info!(api_url = %cfg.api_url, poll_ms = cfg.poll_interval.as_millis() as u64, "configuración cargada");

    // 3. Cliente del backend, sesión y controlador de envíos
    let backend = Arc::new(HttpScreenerClient::new(cfg.api_url.clone()));
    let watchlists = default_watchlists();
    let session = Arc::new(Mutex::new(DashboardSession::new(watchlists.clone())));
    let controller = Arc::new(SubmissionController::new(
        backend,
        Arc::clone(&session),
        watchlists,
        cfg.poll_interval,
        cfg.demo_dir.clone(),
    ));

    // Canal para la señal de apagado.
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let app_state = AppState {
        config: cfg.clone(),
        session,
        controller,
        shutdown_sender: Arc::new(Mutex::new(Some(shutdown_tx))),
    };

    // 4. Router de la API y ficheros estáticos
    let app = Router::new()
        .merge(api::create_router(app_state.clone()))
        .fallback_service(ServeDir::new(&cfg.static_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // 5. Iniciar el servidor
    let listener = tokio::net::TcpListener::bind(&cfg.server_addr)
        .await
        .with_context(|| format!("No se pudo escuchar en {}", cfg.server_addr))?;
    let server_url = format!("http://{}", cfg.server_addr);
    info!("🚀 Servidor escuchando en {}", &server_url);

    if cfg.open_browser && webbrowser::open(&server_url).is_err() {
        info!("No se pudo abrir el navegador. Por favor, accede a {} manualmente.", server_url);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            info!("Señal de apagado recibida, iniciando cierre del servidor.");
        })
        .await
        .context("Error en el servidor")?;

    info!("✅ Servidor cerrado correctamente.");
    Ok(())
}
