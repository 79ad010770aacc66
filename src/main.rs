mod entity;
mod error;
mod events;
mod handlers;
mod prelude;
mod state;
mod sv;

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};
use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  prelude::*,
  state::{AppState, Config},
};

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "tourmart=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_url = env::var("DATABASE_URL")
    .unwrap_or_else(|_| "sqlite:tourmart.db?mode=rwc".into());

  info!("Starting Tourmart v{}", env!("CARGO_PKG_VERSION"));

  let app_state =
    Arc::new(AppState::new(&db_url, Config::from_env()).await);

  // Stand-in for the external notification dispatcher
  let mut events = app_state.events.subscribe();
  tokio::spawn(async move {
    while let Ok(event) = events.recv().await {
      info!("event: {:?}", event);
    }
  });

  let governor_conf = Arc::new(
    GovernorConfigBuilder::default()
      .per_second(2)
      .burst_size(100)
      .finish()
      .expect("Failed to build rate limiter config"),
  );

  let governor_limiter = governor_conf.limiter().clone();

  tokio::spawn(async move {
    loop {
      tokio::time::sleep(Duration::from_secs(60)).await;
      governor_limiter.retain_recent();
    }
  });

  let app = Router::new()
    .route("/api/resellers", post(handlers::register_reseller))
    .route("/api/resellers/{id}/balance", get(handlers::balance))
    .route("/api/resellers/{id}/bank", post(handlers::set_bank_details))
    .route(
      "/api/resellers/{id}/commissions",
      get(handlers::commission_history),
    )
    .route(
      "/api/resellers/{id}/withdrawals",
      get(handlers::withdrawal_history),
    )
    .route("/api/resellers/reconcile", post(handlers::reconcile_roots))
    .route("/api/tour-dates", post(handlers::create_tour_date))
    .route("/api/bookings", post(handlers::create_booking))
    .route("/api/accounts/{id}/bookings", get(handlers::booking_history))
    .route("/api/bookings/{id}/confirm", post(handlers::confirm_booking))
    .route("/api/bookings/{id}/cancel", post(handlers::cancel_booking))
    .route("/api/withdrawals", post(handlers::request_withdrawal))
    .route("/api/withdrawals/{id}/approve", post(handlers::approve_withdrawal))
    .route("/api/withdrawals/{id}/reject", post(handlers::reject_withdrawal))
    .route(
      "/api/withdrawals/{id}/complete",
      post(handlers::complete_withdrawal),
    )
    .route("/health", get(handlers::health))
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(
          CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        ),
    )
    .with_state(app_state);

  let port: u16 =
    env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3000);
  let addr = SocketAddr::from(([0, 0, 0, 0], port));

  info!("HTTP server listening on {}", addr);

  let listener =
    tokio::net::TcpListener::bind(addr).await.expect("Failed to bind");
  axum::serve(listener, app).await.expect("Server error");
}
