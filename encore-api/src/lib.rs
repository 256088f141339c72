use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod chat;
pub mod client_errors;
pub mod credentials;
pub mod error;
pub mod events;
pub mod feedbacks;
pub mod middleware;
pub mod notifier;
pub mod offers;
pub mod participations;
pub mod search;
pub mod state;
pub mod tours;
pub mod users;

pub use error::AppError;
pub use state::{AppState, AuthConfig};

const RATE_LIMIT_WINDOW_SECONDS: i64 = 60;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let protected = Router::new()
        .merge(auth::routes())
        .merge(users::routes())
        .merge(offers::routes())
        .merge(chat::routes())
        .merge(events::routes())
        .merge(participations::routes())
        .merge(feedbacks::routes())
        .merge(tours::routes())
        .route_layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    // Browsing the marketplace needs no account
    let public = Router::new()
        .merge(auth::public_routes())
        .merge(users::public_routes())
        .merge(events::public_routes())
        .merge(participations::public_routes())
        .merge(feedbacks::public_routes())
        .merge(tours::public_routes())
        .merge(search::public_routes())
        .merge(client_errors::routes());

    let api = public.merge(protected);

    Router::new()
        .nest("/api", api)
        .route("/ws", get(notifier::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}

async fn rate_limit_middleware(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, AppError> {
    let Some(redis) = state.redis.as_ref() else {
        return Ok(next.run(req).await);
    };

    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("ratelimit:{}", ip);

    match redis
        .check_rate_limit(&key, state.requests_per_minute, RATE_LIMIT_WINDOW_SECONDS)
        .await
    {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => {
            tracing::warn!("Rate limit exceeded for {}", ip);
            Err(AppError::RateLimited)
        }
        Err(e) => {
            // Fail open
            tracing::warn!("Rate limiter unavailable: {}", e);
            Ok(next.run(req).await)
        }
    }
}
