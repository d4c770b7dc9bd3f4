//! The HTTP `402 Payment Required` middleware contract (spec §4.6, §6.5).
//!
//! Grounded on the teacher's `handlers.rs::routes()` and its `IntoResponse` impl for the
//! facilitator error type: a plain Axum `Router`/middleware pair, independent of the
//! jsonrpsee server, since this is a status-code negotiation rather than a JSON-RPC call.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

use splendor_tx_x402::{InMemoryMempool, X402Transaction};
use splendor_x402_engine::{ChainState, PaymentEngine};
use splendor_x402_types::{PaymentPayload, PaymentRequirements};

use crate::error::X402HttpError;

const PAYMENT_HEADER: &str = "X-Payment";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequiredBody {
    x402_version: u8,
    accepts: Vec<PaymentRequirements>,
}

/// Shared state behind the `X-Payment` gate: the terms a protected resource is published
/// under, and the verify/settle collaborators the retry path calls.
pub struct X402Gate<S: ChainState> {
    pub requirements: PaymentRequirements,
    pub engine: Arc<PaymentEngine<S>>,
    pub mempool: Arc<InMemoryMempool<S>>,
}

impl<S: ChainState> X402Gate<S> {
    pub fn new(
        requirements: PaymentRequirements,
        engine: Arc<PaymentEngine<S>>,
        mempool: Arc<InMemoryMempool<S>>,
    ) -> Arc<Self> {
        Arc::new(X402Gate {
            requirements,
            engine,
            mempool,
        })
    }

    fn payment_required_response(&self) -> Response {
        (
            StatusCode::PAYMENT_REQUIRED,
            Json(PaymentRequiredBody {
                x402_version: 1,
                accepts: vec![self.requirements.clone()],
            }),
        )
            .into_response()
    }

    fn decode_payload(header: &HeaderValue) -> Result<PaymentPayload, X402HttpError> {
        let raw = header
            .to_str()
            .map_err(|e| X402HttpError::MalformedHeader(e.to_string()))?;
        let bytes = BASE64
            .decode(raw)
            .map_err(|e| X402HttpError::MalformedHeader(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| X402HttpError::MalformedPayload(e.to_string()))
    }
}

/// Wraps a protected route: absent `X-Payment`, responds `402` with the requirements the
/// client must satisfy. With `X-Payment` present, runs `x402_verify` then `x402_settle`
/// (via the mempool, same as the `x402_settle` RPC method) before letting the request
/// through to the wrapped handler.
pub async fn x402_gate_middleware<S: ChainState + 'static>(
    State(gate): State<Arc<X402Gate<S>>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(header) = request.headers().get(PAYMENT_HEADER) else {
        return gate.payment_required_response();
    };

    let payload = match X402Gate::<S>::decode_payload(header) {
        Ok(payload) => payload,
        Err(e) => return e.into_response(),
    };

    let verdict = gate.engine.verify(&gate.requirements, &payload).await;
    if !verdict.is_valid {
        let reason = verdict
            .invalid_reason
            .unwrap_or(splendor_x402_types::ErrorReason::InvalidSignature);
        return X402HttpError::VerificationFailed(reason).into_response();
    }

    let tx = X402Transaction::from_payment_payload(&payload);
    if let Err(e) = gate.mempool.submit_async(tx).await {
        tracing::warn!(error = %e, "x402 settlement failed on the HTTP retry path");
        let reason = match e {
            splendor_tx_x402::MempoolError::DuplicatePending { .. } => {
                splendor_x402_types::ErrorReason::NonceReused
            }
            splendor_tx_x402::MempoolError::FailedVerification { reason } => reason,
            splendor_tx_x402::MempoolError::Tx(_) => splendor_x402_types::ErrorReason::InvalidSignature,
        };
        return X402HttpError::VerificationFailed(reason).into_response();
    }

    next.run(request).await
}

/// Builds a `Router` that gates `inner` behind the `X-Payment` contract. `inner` implements
/// the protected resource itself; this only adds the 402 negotiation in front of it.
pub fn gated_router<S: ChainState + 'static>(inner: Router, gate: Arc<X402Gate<S>>) -> Router {
    inner.layer(middleware::from_fn_with_state(gate, x402_gate_middleware::<S>))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::routing::get;
    use tower::ServiceExt;

    use alloy_primitives::{Address, U256};
    use splendor_core::network::Network;
    use splendor_x402_engine::chain_state::in_memory::InMemoryChainState;
    use splendor_x402_types::requirements::ExactScheme;

    fn requirements(pay_to: Address, amount: U256) -> PaymentRequirements {
        PaymentRequirements {
            scheme: ExactScheme,
            network: Network::Splendor,
            max_amount_required: amount,
            resource: url::Url::parse("https://api.example.com/report").unwrap(),
            description: "report".into(),
            mime_type: "application/json".into(),
            pay_to,
            max_timeout_seconds: 300,
            asset: Address::ZERO,
        }
    }

    #[tokio::test]
    async fn request_without_payment_header_gets_402_with_accepts() {
        let to = Address::repeat_byte(0x22);
        let reqs = requirements(to, U256::from(1_000u64));
        let chain_state = Arc::new(InMemoryChainState::new());
        let engine = Arc::new(PaymentEngine::new(Network::Splendor, chain_state));
        let mempool = Arc::new(InMemoryMempool::new(engine.clone()));
        let gate = X402Gate::new(reqs, engine, mempool);

        let app = gated_router(Router::new().route("/report", get(|| async { "secret" })), gate);

        let response = app
            .oneshot(HttpRequest::builder().uri("/report").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[tokio::test]
    async fn malformed_payment_header_gets_400() {
        let to = Address::repeat_byte(0x22);
        let reqs = requirements(to, U256::from(1_000u64));
        let chain_state = Arc::new(InMemoryChainState::new());
        let engine = Arc::new(PaymentEngine::new(Network::Splendor, chain_state));
        let mempool = Arc::new(InMemoryMempool::new(engine.clone()));
        let gate = X402Gate::new(reqs, engine, mempool);

        let app = gated_router(Router::new().route("/report", get(|| async { "secret" })), gate);

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/report")
                    .header(PAYMENT_HEADER, "not-base64-json!!")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
