//! Huddle Backend Service
//!
//! Main entry point for the Huddle pickup-sports backend. This service
//! provides:
//! - The game/group lifecycle engine and geospatial discovery queries
//! - A WebSocket chat gateway scoped to group membership
//! - The reaper background task for group expiry and auto-merging

use huddle_backend::config::AppConfig;
use huddle_backend::error::{AppError, AppResult};
use huddle_backend::services::{
    ChatService, DiscoveryService, FriendService, GameService, GroupService, Notifier,
    RatingService, Reaper,
};
use huddle_backend::websocket::ChatGateway;
use huddle_backend::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("huddle_backend={}", config.log_level).into()),
        )
        .init();

    info!("Huddle backend service starting");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    if let Some(ws_port) = config.ws_port {
        info!("WebSocket port: {}", ws_port);
    }

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    info!("Initializing core services...");

    let state = Arc::new(AppState::new());
    info!("✓ Application state initialized with repositories");

    let notifier = Arc::new(Notifier::new(state.notification_repo.clone()));

    // Consumed by the API layer once the transport is wired in
    let _game_service = Arc::new(GameService::new(
        state.game_repo.clone(),
        state.group_repo.clone(),
        state.user_repo.clone(),
        notifier.clone(),
        state.game_locks.clone(),
    ));
    let group_service = Arc::new(GroupService::new(
        state.group_repo.clone(),
        state.game_repo.clone(),
        notifier.clone(),
        state.game_locks.clone(),
        config.booking_ttl(),
    ));
    let _discovery_service = Arc::new(DiscoveryService::new(
        state.game_repo.clone(),
        state.turf_repo.clone(),
    ));
    let _friend_service = Arc::new(FriendService::new(
        state.friend_repo.clone(),
        state.user_repo.clone(),
        notifier.clone(),
    ));
    let _rating_service = Arc::new(RatingService::new(
        state.rating_repo.clone(),
        state.user_repo.clone(),
        state.game_repo.clone(),
        notifier.clone(),
    ));
    let chat_service = Arc::new(ChatService::new(
        state.message_repo.clone(),
        state.group_repo.clone(),
        state.friend_repo.clone(),
        state.user_repo.clone(),
    ));
    info!("✓ Lifecycle, discovery and social services initialized");

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    let reaper_handle = if config.reaper.enabled {
        let reaper = Reaper::new(group_service.clone()).with_interval(config.reaper.interval());
        let handle = tokio::spawn(async move {
            reaper.start().await;
        });
        info!(
            "✓ Reaper background task started ({}s interval)",
            config.reaper.interval_secs
        );
        Some(handle)
    } else {
        warn!("Reaper disabled by configuration");
        None
    };

    // =========================================================================
    // START WEBSOCKET CHAT GATEWAY
    // =========================================================================
    let ws_handle = if let Some(ws_port) = config.ws_port {
        let ws_addr: SocketAddr = format!("0.0.0.0:{}", ws_port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid WebSocket address: {}", e)))?;

        info!("Starting WebSocket chat gateway on {}...", ws_addr);

        let gateway = ChatGateway::new(state.group_repo.clone(), chat_service.clone());
        let listener = TcpListener::bind(ws_addr)
            .await
            .map_err(|e| AppError::Message(format!("Failed to bind WebSocket server: {}", e)))?;

        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        info!("New WebSocket connection from {}", addr);
                        let gateway = gateway.clone();
                        tokio::spawn(async move {
                            if let Err(e) = gateway.handle_connection(stream).await {
                                error!("WebSocket connection error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("WebSocket accept error: {}", e);
                    }
                }
            }
        });

        info!("✓ WebSocket chat gateway started on {}", ws_addr);
        Some(handle)
    } else {
        warn!("WS_PORT not configured - chat gateway not started");
        None
    };

    info!("Huddle backend service ready; press Ctrl+C to shutdown");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = async {
            if let Some(handle) = reaper_handle {
                handle.await.ok();
            } else {
                futures::future::pending::<()>().await;
            }
        } => {
            error!("Reaper task exited unexpectedly");
        }
        _ = async {
            if let Some(handle) = ws_handle {
                handle.await.ok();
            } else {
                futures::future::pending::<()>().await;
            }
        } => {
            error!("WebSocket gateway exited unexpectedly");
        }
    }

    info!("Huddle backend service shutdown complete");
    Ok(())
}
