use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use school_transport::clients::{IgnRoutingClient, RoutingProvider};
use school_transport::config::{database::DatabaseConfig, EnvironmentConfig, StorageBackend};
use school_transport::create_router;
use school_transport::database::DatabaseConnection;
use school_transport::repositories::{MemoryStore, PgStore, Store};
use school_transport::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let level = config
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🚌 School Transport - Planification des trajets");
    info!("================================================");
    if config.is_development() {
        info!("🛠️ Entorno de desarrollo ({})", config.environment);
    }

    let store: Arc<dyn Store> = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_environment(&config)?;
            let db_connection = match DatabaseConnection::connect(&db_config).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };
            Arc::new(PgStore::new(db_connection.pool().clone()))
        }
        StorageBackend::Memory => {
            info!("🧪 Almacén en memoria: los datos no se conservan");
            Arc::new(MemoryStore::new())
        }
    };

    let routing: Arc<dyn RoutingProvider> = Arc::new(IgnRoutingClient::new(&config.routing)?);

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_router(AppState::new(store, routing, config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("📅 Trajets:");
    info!("   POST /api/trajets/:id/occurrences/generate");
    info!("   GET  /api/trajets/:id/occurrences");
    info!("   POST /api/trajets/:id/route/calculate");
    info!("   POST /api/trajets/:id/times/calculate");
    info!("   PUT  /api/trajets/:id/arrets/order");
    info!("📍 Arrets / Occurrences:");
    info!("   PATCH /api/arrets/:id/schedule");
    info!("   PUT  /api/occurrences/:id");
    info!("   POST /api/occurrences/:id/cancel");
    info!("🔗 Associations / Circuits:");
    info!("   POST /api/usager-circuits");
    info!("   PUT  /api/usager-circuits/:id");
    info!("   DELETE /api/usager-circuits/:id");
    info!("   DELETE /api/circuits/:id");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
