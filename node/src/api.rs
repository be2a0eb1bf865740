//! # Registry HTTP API
//!
//! Builds the axum router that exposes the node's HTTP interface. All
//! endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                          | Description                           |
//! |--------|-------------------------------|---------------------------------------|
//! | GET    | `/health`                     | Liveness probe                        |
//! | GET    | `/status`                     | Node + registry status summary        |
//! | GET    | `/namespaces/:ns`             | Configuration for a namespace         |
//! | GET    | `/namespaces/:ns/objects/:id` | Manifest for an object                |
//! | GET    | `/events`                     | Event log (optional `?since=` cursor) |
//! | POST   | `/submit`                     | Signed instruction envelope           |
//! | POST   | `/faucet`                     | Dev-only payer funding                |
//!
//! The `:ns` path segment accepts either a base58-encoded 32-byte
//! namespace or a human-readable label (which is hashed the same way
//! `Namespace::from_label` does). Signed envelopes arrive as hex payload
//! bytes plus hex (public key, signature) pairs; the node reconstructs the
//! envelope, verifies it, and hands the decoded instruction plus verified
//! signer set to the registry.

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ember_protocol::address::Address;
use ember_protocol::crypto::keys::{EmberPublicKey, EmberSignature};
use ember_protocol::envelope::SignedEnvelope;

use ember_registry::metadata::MemoryMetadata;
use ember_registry::{
    EventRecord, InstructionReceipt, Namespace, Registry, RegistryError, RegistryInstruction,
};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone — everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// Network label (e.g. "devnet").
    pub network: String,
    /// Whether the dev faucet endpoint is enabled.
    pub faucet_enabled: bool,
    /// The registry, behind a single writer lock. Instruction execution
    /// holds the write lock for its (short) duration — that lock is the
    /// node-level realization of the single-writer-per-record rule.
    pub registry: Arc<RwLock<Registry<MemoryMetadata>>>,
    /// Prometheus metric handles.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/namespaces/:ns", get(namespace_handler))
        .route("/namespaces/:ns/objects/:id", get(object_handler))
        .route("/events", get(events_handler))
        .route("/submit", post(submit_handler))
        .route("/faucet", post(faucet_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Node software version.
    pub version: String,
    /// Network label.
    pub network: String,
    /// Number of configurations, superseded ones included.
    pub namespaces: usize,
    /// Number of manifests across all namespaces.
    pub objects: usize,
    /// Number of events in the log.
    pub events: usize,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Response payload for `GET /namespaces/:ns`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    /// The configuration's derived address (base58).
    pub address: String,
    /// Governance authority (base58).
    pub authority: String,
    /// The namespace identifier (base58).
    pub namespace: String,
    /// Objects minted under this namespace.
    pub object_count: u64,
    /// Whether minting is paused.
    pub paused: bool,
}

/// Response payload for `GET /namespaces/:ns/objects/:id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestResponse {
    /// The manifest's derived address (base58).
    pub address: String,
    /// The owning configuration (base58).
    pub config: String,
    /// The object identifier.
    pub object_id: u64,
    /// The object's mint (base58).
    pub mint: String,
    /// The recorded creator (base58).
    pub creator: String,
    /// Hex-encoded manifest content hash.
    pub manifest_hash: String,
    /// Content URI.
    pub metadata_uri: String,
    /// Whether the object is active.
    pub is_active: bool,
    /// Whether the first mint has completed.
    pub minted: bool,
}

/// One hex-encoded signature entry in a submitted envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct WireSignature {
    /// Hex-encoded Ed25519 public key (32 bytes).
    pub public_key: String,
    /// Hex-encoded Ed25519 signature (64 bytes).
    pub signature: String,
}

/// Request body for `POST /submit`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Hex-encoded bincode payload (a `RegistryInstruction`).
    pub payload: String,
    /// Signatures over the payload bytes. The first is the payer.
    pub signatures: Vec<WireSignature>,
}

/// Request body for `POST /faucet`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FaucetRequest {
    /// Base58 address to credit.
    pub address: String,
    /// Amount of motes to credit.
    pub amount: u64,
}

/// Generic error body returned by endpoints on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Maps a registry rejection to an HTTP status. Authorization failures are
/// 403, missing records 404, malformed arguments 422, underfunded payers
/// 402; everything else (state-shape conflicts, external-protocol
/// rejections) is a 409.
fn registry_error_status(error: &RegistryError) -> StatusCode {
    match error {
        RegistryError::UnauthorizedDeployer
        | RegistryError::InvalidAuthority
        | RegistryError::CreatorMustSign { .. }
        | RegistryError::NotObjectHolder
        | RegistryError::InvalidOwnerHolding => StatusCode::FORBIDDEN,
        RegistryError::ConfigNotFound { .. } | RegistryError::ManifestNotInitialized => {
            StatusCode::NOT_FOUND
        }
        RegistryError::UriTooLong { .. }
        | RegistryError::NameTooLong { .. }
        | RegistryError::SymbolTooLong { .. }
        | RegistryError::InvalidCreatorShares { .. }
        | RegistryError::TooManyCreators { .. }
        | RegistryError::InvalidSellerFee { .. }
        | RegistryError::MissingManifestCreator => StatusCode::UNPROCESSABLE_ENTITY,
        RegistryError::Deposit(_) => StatusCode::PAYMENT_REQUIRED,
        _ => StatusCode::CONFLICT,
    }
}

/// Parses a `:ns` path segment: a base58 32-byte namespace, or anything
/// else as a label.
fn parse_namespace(segment: &str) -> Namespace {
    match Address::from_base58(segment) {
        Ok(addr) => Namespace::from_bytes(addr.to_bytes()),
        Err(_) => Namespace::from_label(segment),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` — returns 200 if the node is alive.
///
/// This is the liveness probe for orchestrators (k8s, systemd, etc.).
/// It intentionally does not check registry state — that belongs in
/// `/status`.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// `GET /status` — node and registry summary.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.read();
    let response = StatusResponse {
        version: state.version.clone(),
        network: state.network.clone(),
        namespaces: registry.state().config_count(),
        objects: registry.state().manifest_count(),
        events: registry.events().len(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    Json(response).into_response()
}

/// `GET /namespaces/:ns` — the configuration governing a namespace.
async fn namespace_handler(
    State(state): State<AppState>,
    Path(ns): Path<String>,
) -> impl IntoResponse {
    let namespace = parse_namespace(&ns);
    let registry = state.registry.read();
    match registry.state().config_by_namespace(&namespace) {
        Some(config) => Json(ConfigResponse {
            address: config.address.to_base58(),
            authority: config.authority.to_base58(),
            namespace: config.namespace.to_base58(),
            object_count: config.object_count,
            paused: config.paused,
        })
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "namespace not initialized"),
    }
}

/// `GET /namespaces/:ns/objects/:id` — one object's manifest.
async fn object_handler(
    State(state): State<AppState>,
    Path((ns, id)): Path<(String, u64)>,
) -> impl IntoResponse {
    let namespace = parse_namespace(&ns);
    let registry = state.registry.read();
    match registry.state().manifest_by_object_id(&namespace, id) {
        Some(manifest) => Json(ManifestResponse {
            address: manifest.address.to_base58(),
            config: manifest.config.to_base58(),
            object_id: manifest.object_id,
            mint: manifest.mint.to_base58(),
            creator: manifest.creator.to_base58(),
            manifest_hash: hex::encode(manifest.manifest_hash),
            metadata_uri: manifest.metadata_uri.clone(),
            is_active: manifest.is_active,
            minted: manifest.minted,
        })
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "object manifest not found"),
    }
}

/// Query parameters for `GET /events`.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Return events with `sequence >= since`. Defaults to 0.
    #[serde(default)]
    pub since: u64,
}

/// `GET /events` — the audit trail, oldest first.
async fn events_handler(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> impl IntoResponse {
    let registry = state.registry.read();
    let events: Vec<EventRecord> = registry.events().since(query.since).cloned().collect();
    Json(events).into_response()
}

/// `POST /submit` — verify and execute a signed instruction envelope.
async fn submit_handler(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> impl IntoResponse {
    state.metrics.instructions_submitted_total.inc();
    let reject = |status: StatusCode, message: String| {
        state.metrics.instructions_rejected_total.inc();
        error_response(status, message)
    };

    // Reconstruct the envelope from its wire parts.
    let payload = match hex::decode(&request.payload) {
        Ok(bytes) => bytes,
        Err(e) => return reject(StatusCode::BAD_REQUEST, format!("bad payload hex: {e}")),
    };
    let mut envelope = SignedEnvelope::from_payload_bytes(payload);
    for (index, wire) in request.signatures.iter().enumerate() {
        let key_bytes = match hex::decode(&wire.public_key) {
            Ok(bytes) => bytes,
            Err(e) => {
                return reject(
                    StatusCode::BAD_REQUEST,
                    format!("bad public key hex at {index}: {e}"),
                )
            }
        };
        let public_key = match EmberPublicKey::try_from_slice(&key_bytes) {
            Ok(key) => key,
            Err(e) => {
                return reject(
                    StatusCode::BAD_REQUEST,
                    format!("bad public key at {index}: {e}"),
                )
            }
        };
        let signature = match hex::decode(&wire.signature) {
            Ok(bytes) => EmberSignature::from_bytes(bytes),
            Err(e) => {
                return reject(
                    StatusCode::BAD_REQUEST,
                    format!("bad signature hex at {index}: {e}"),
                )
            }
        };
        envelope.attach_signature(public_key, signature);
    }

    // Verify signatures and decode the instruction.
    let signers = match envelope.verify() {
        Ok(signers) => signers,
        Err(e) => return reject(StatusCode::BAD_REQUEST, format!("envelope rejected: {e}")),
    };
    let instruction: RegistryInstruction = match envelope.payload() {
        Ok(instruction) => instruction,
        Err(e) => return reject(StatusCode::BAD_REQUEST, format!("payload rejected: {e}")),
    };

    // Execute under the write lock, timing the critical section.
    let timer = state.metrics.instruction_latency_seconds.start_timer();
    let result = {
        let mut registry = state.registry.write();
        let result = registry.execute(instruction, &signers);
        state
            .metrics
            .namespaces
            .set(registry.state().config_count() as i64);
        result
    };
    timer.observe_duration();

    match result {
        Ok(receipt) => {
            match &receipt {
                InstructionReceipt::Minted(outcome) if outcome.first_mint => {
                    state.metrics.objects_minted_total.inc();
                }
                InstructionReceipt::ManifestUpdated => {
                    state.metrics.manifest_updates_total.inc();
                }
                _ => {}
            }
            (StatusCode::OK, Json(receipt)).into_response()
        }
        Err(e) => {
            let status = registry_error_status(&e);
            state.metrics.instructions_rejected_total.inc();
            error_response(status, e.to_string())
        }
    }
}

/// `POST /faucet` — dev-only payer funding.
async fn faucet_handler(
    State(state): State<AppState>,
    Json(request): Json<FaucetRequest>,
) -> impl IntoResponse {
    if !state.faucet_enabled {
        return error_response(StatusCode::FORBIDDEN, "faucet is disabled on this node");
    }
    let address = match Address::from_base58(&request.address) {
        Ok(address) => address,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("bad address: {e}")),
    };

    let mut registry = state.registry.write();
    match registry.credit_payer(address, request.amount) {
        Ok(()) => (StatusCode::OK, "ok").into_response(),
        Err(e) => error_response(StatusCode::CONFLICT, e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
