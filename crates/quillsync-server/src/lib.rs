//! # Quillsync HTTP Server
//!
//! Thin HTTP surface over the item updater: one endpoint,
//! `PUT /v1/items/{uuid}`, whose JSON body is the incoming item hash.
//! Authentication happens upstream; the gateway forwards the established
//! identities as `x-user-uuid` and `x-session-uuid` headers.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use quillsync_domain::ItemHash;
use quillsync_storage::ItemRepository;
use quillsync_syncing::{ItemSyncError, UpdateExistingItem, UpdateExistingItemInput};

/// Configuration for the item sync server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_address: SocketAddr,
    /// Maximum request body size.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().unwrap(),
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Request handler for the item sync endpoint.
pub struct ItemSyncHandler {
    config: ServerConfig,
    item_repository: Arc<dyn ItemRepository>,
    updater: Arc<UpdateExistingItem>,
}

impl ItemSyncHandler {
    pub fn new(
        config: ServerConfig,
        item_repository: Arc<dyn ItemRepository>,
        updater: Arc<UpdateExistingItem>,
    ) -> Self {
        Self {
            config,
            item_repository,
            updater,
        }
    }

    /// Handle one HTTP request.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: http_body::Body,
        B::Error: std::error::Error,
    {
        if req.method() != Method::PUT {
            return error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
        }
        let Some(item_uuid) = req
            .uri()
            .path()
            .strip_prefix("/v1/items/")
            .and_then(|raw| Uuid::parse_str(raw).ok())
        else {
            return error_response(StatusCode::NOT_FOUND, "Not found");
        };

        let Some(user_uuid) = header_value(&req, "x-user-uuid") else {
            return error_response(StatusCode::UNAUTHORIZED, "Missing x-user-uuid header");
        };
        let Some(session_uuid) = header_value(&req, "x-session-uuid") else {
            return error_response(StatusCode::UNAUTHORIZED, "Missing x-session-uuid header");
        };
        let Ok(performing_user_uuid) = Uuid::parse_str(&user_uuid) else {
            return error_response(StatusCode::UNAUTHORIZED, "Malformed x-user-uuid header");
        };

        let body = match req.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                warn!("Failed to read request body: {}", err);
                return error_response(StatusCode::BAD_REQUEST, "Failed to read request body");
            }
        };
        if body.len() > self.config.max_body_size {
            return error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
        let item_hash: ItemHash = match serde_json::from_slice(&body) {
            Ok(hash) => hash,
            Err(err) => {
                debug!("Rejecting malformed item hash: {}", err);
                return error_response(StatusCode::BAD_REQUEST, "Request body must be an item hash");
            }
        };

        let existing_item = match self
            .item_repository
            .find_one_by_uuid(item_uuid, performing_user_uuid)
            .await
        {
            Ok(Some(item)) => item,
            Ok(None) => return error_response(StatusCode::NOT_FOUND, "Item not found"),
            Err(err) => {
                error!("Could not load item {}: {}", item_uuid, err);
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Storage failure");
            }
        };

        let input = UpdateExistingItemInput {
            existing_item,
            item_hash,
            session_uuid,
            performing_user_uuid: user_uuid,
        };
        match self.updater.execute(input).await {
            Ok(item) => json_response(StatusCode::OK, &item),
            Err(err @ (ItemSyncError::Storage(_) | ItemSyncError::Publish(_))) => {
                error!("Item update failed for {}: {}", item_uuid, err);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Item update failed")
            }
            Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
        }
    }
}

fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn json_response<T: serde::Serialize>(status: StatusCode, payload: &T) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(payload).unwrap_or_else(|_| b"{}".to_vec());
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "error": message }))
}

/// HTTP server wrapping [`ItemSyncHandler`] in an http1 accept loop.
pub struct ItemSyncServer {
    config: ServerConfig,
    handler: Arc<ItemSyncHandler>,
}

impl ItemSyncServer {
    pub fn new(
        config: ServerConfig,
        item_repository: Arc<dyn ItemRepository>,
        updater: Arc<UpdateExistingItem>,
    ) -> Self {
        let handler = Arc::new(ItemSyncHandler::new(
            config.clone(),
            item_repository,
            updater,
        ));
        Self { config, handler }
    }

    /// Run the accept loop.
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.config.bind_address).await?;
        info!("Item sync server listening on {}", self.config.bind_address);

        loop {
            let (stream, _) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let handler = Arc::clone(&self.handler);
            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let handler = Arc::clone(&handler);
                    async move { Ok::<_, Infallible>(handler.handle(req).await) }
                });
                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}
