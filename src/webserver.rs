use crate::configs::AppConfig;
use crate::error::InspectError;
use crate::introspection::{describe, ConnectionReport, NegotiatedParameters};
use anyhow::{anyhow, bail, Context, Result};
use axum::http::StatusCode;
use axum::middleware::AddExtension;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Extension, Json, Router};
use axum_server::accept::Accept;
use axum_server::tls_rustls::{RustlsAcceptor, RustlsConfig};
use axum_server::Handle;
use futures::future::BoxFuture;
use rustls::ServerConfig;
use serde::Serialize;
use std::io::{self, BufReader};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::server::TlsStream;
use tower::Layer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

pub const BANNER: &str = "This is an example server.\n";

/// Per-connection TLS state attached to every request on that connection.
/// Holds `None` if the handshake did not expose a negotiated cipher suite.
#[derive(Debug, Clone, Copy)]
pub struct TlsSession(pub Option<NegotiatedParameters>);

#[derive(Serialize)]
struct ConnectionResponse {
    group_id: Option<u16>,
    group_name: Option<&'static str>,
    group_error: Option<String>,
    cipher_suite_id: u16,
    cipher_suite_name: String,
}

impl From<&ConnectionReport> for ConnectionResponse {
    fn from(report: &ConnectionReport) -> Self {
        let (group_id, group_name, group_error) = match &report.group {
            Ok(group) => (Some(group.id), Some(group.name), None),
            Err(e @ InspectError::UnknownGroup(id)) => (Some(*id), None, Some(e.to_string())),
            Err(e) => (None, None, Some(e.to_string())),
        };
        Self {
            group_id,
            group_name,
            group_error,
            cipher_suite_id: report.cipher_suite.id,
            cipher_suite_name: report.cipher_suite.name.clone(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Wraps [`RustlsAcceptor`] and captures the negotiated parameters of each
/// connection once its handshake completes.
#[derive(Clone)]
pub struct SessionAcceptor {
    inner: RustlsAcceptor,
}

impl SessionAcceptor {
    pub fn new(config: RustlsConfig) -> Self {
        Self {
            inner: RustlsAcceptor::new(config),
        }
    }
}

impl<I, S> Accept<I, S> for SessionAcceptor
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    S: Send + 'static,
{
    type Stream = TlsStream<I>;
    type Service = AddExtension<S, TlsSession>;
    type Future = BoxFuture<'static, io::Result<(Self::Stream, Self::Service)>>;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let acceptor = self.inner.clone();

        Box::pin(async move {
            let (stream, service) = acceptor.accept(stream, service).await?;
            let session = NegotiatedParameters::from_connection(stream.get_ref().1);
            debug!(?session, "TLS handshake complete");

            let service = Extension(TlsSession(session)).layer(service);
            Ok((stream, service))
        })
    }
}

/// Build the rustls server configuration from the PEM artifacts on disk.
///
/// ALPN is restricted to `http/1.1`.
pub fn load_server_config(cert_path: &Path, key_path: &Path) -> Result<ServerConfig> {
    let cert_pem = std::fs::read(cert_path)
        .with_context(|| format!("Failed to read certificate: {}", cert_path.display()))?;
    let key_pem = std::fs::read(key_path)
        .with_context(|| format!("Failed to read private key: {}", key_path.display()))?;

    let certs = rustls_pemfile::certs(&mut BufReader::new(cert_pem.as_slice()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to parse certificate PEM")?;
    if certs.is_empty() {
        bail!("No certificates found in {}", cert_path.display());
    }

    let key = rustls_pemfile::private_key(&mut BufReader::new(key_pem.as_slice()))
        .context("Failed to parse private key PEM")?
        .ok_or_else(|| anyhow!("No private key found in {}", key_path.display()))?;

    let mut config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("Failed to create server config")?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(config)
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(connection_text))
        .route("/connection.json", get(connection_json))
        .layer(TraceLayer::new_for_http())
}

/// Serve the router over TLS on `addr` until `handle` is shut down.
pub async fn serve(addr: SocketAddr, tls_config: Arc<ServerConfig>, handle: Handle) -> Result<()> {
    let acceptor = SessionAcceptor::new(RustlsConfig::from_config(tls_config));

    axum_server::bind(addr)
        .acceptor(acceptor)
        .handle(handle)
        .serve(router().into_make_service())
        .await
        .context("HTTPS server failed")
}

/// Load the issued identity and run the HTTPS server on a fresh Tokio runtime.
pub fn start_webserver(config: &AppConfig) -> Result<()> {
    let tls_config = load_server_config(&config.identity.cert_path, &config.identity.key_path)?;
    let addr = config.server.bind_address;

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(async {
        info!(%addr, "Starting server");
        serve(addr, Arc::new(tls_config), Handle::new()).await
    })
}

fn session_parameters(session: Option<Extension<TlsSession>>) -> Option<NegotiatedParameters> {
    session.and_then(|Extension(TlsSession(params))| params)
}

async fn connection_text(session: Option<Extension<TlsSession>>) -> String {
    let mut body = String::from(BANNER);

    match describe(session_parameters(session).as_ref()) {
        Ok(report) => {
            if let Err(e) = &report.group {
                warn!(error = %e, "Failed to resolve key exchange group");
            }
            body.push_str(&report.to_string());
        }
        Err(e) => {
            warn!(error = %e, "Connection introspection failed");
            body.push_str(&format!("TLS Connection: {e}\n"));
        }
    }

    body
}

async fn connection_json(session: Option<Extension<TlsSession>>) -> Response {
    match describe(session_parameters(session).as_ref()) {
        Ok(report) => Json(ConnectionResponse::from(&report)).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}
