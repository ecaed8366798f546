use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{summary, transactions, user};
use engine::{Engine, Mailer};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub mailer: Arc<dyn Mailer>,
}

/// Resolve the Basic credentials to a user and attach it to the request.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|err| {
            tracing::error!("authentication failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let Some(user) = user else {
        tracing::warn!("rejected credentials for {}", auth_header.username());
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/period", get(transactions::list_by_period))
        .route("/transactions/type/{code}", get(transactions::list_by_type))
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route("/summary", get(summary::get_summary))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/users", post(user::register))
        .route("/users/password-reset", post(user::request_reset))
        .route("/users/password-reset/confirm", post(user::confirm_reset))
        .merge(protected)
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Arc<Engine>,
    mailer: Arc<dyn Mailer>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState { engine, mailer };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Arc<Engine>,
    mailer: Arc<dyn Mailer>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, mailer, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
