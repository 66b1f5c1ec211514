use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};

use std::sync::Arc;

use crate::{goals, groups, reconciliation, wallet};
use ledger::{Engine, Reconciler};

static KOLO_USER_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-kolo-user");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub reconciler: Arc<Reconciler>,
}

/// Caller identity as asserted by the gateway in front of this service.
#[derive(Clone, Debug)]
pub struct UserIdent(pub String);

/// `TypedHeader` for the custom identity header
///
/// Requests must contain an "x-kolo-user" entry in the header; authentication
/// itself happens upstream, this service only trusts the asserted id.
#[derive(Debug)]
struct KoloUserHeader(String);

impl Header for KoloUserHeader {
    fn name() -> &'static axum::http::HeaderName {
        &KOLO_USER_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(KoloUserHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-kolo-user header"),
        }
    }
}

async fn auth(
    user_header: Option<TypedHeader<KoloUserHeader>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(KoloUserHeader(user_id))) = user_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(UserIdent(user_id));
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/wallet", get(wallet::get))
        .route("/wallet/deposits", post(wallet::deposit))
        .route("/wallet/transactions", get(wallet::list_transactions))
        .route("/wallet/withdrawals", post(wallet::request_withdrawal))
        .route(
            "/wallet/withdrawals/{tx_id}/approve",
            post(wallet::approve_withdrawal),
        )
        .route(
            "/wallet/withdrawals/{tx_id}/reject",
            post(wallet::reject_withdrawal),
        )
        .route("/goals", post(goals::create).get(goals::list))
        .route("/goals/{id}", get(goals::get))
        .route("/goals/{id}/contributions", post(goals::contribute))
        .route("/goals/{id}/release", post(goals::release))
        .route("/groups", post(groups::create))
        .route("/groups/{id}", get(groups::get))
        .route("/groups/{id}/members", post(groups::join))
        .route("/groups/{id}/contributions", post(groups::contribute))
        .route("/groups/{id}/release", post(groups::release))
        .route("/reconciliation/run", post(reconciliation::run))
        .route("/reconciliation/status", get(reconciliation::status))
        .route_layer(middleware::from_fn(auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Arc<Engine>,
    reconciler: Arc<Reconciler>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState { engine, reconciler };

    axum::serve(listener, router(state)).await
}
