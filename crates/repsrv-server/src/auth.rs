use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use repsrv_types::Iri;

use crate::error::{ServerError, ServerResult};

/// Bearer token handed out by the permissive token endpoint.
pub const ISSUED_TOKEN: &str = "report-server-permissive-token";

/// Authorization code handed out by the permissive authorization endpoint.
pub const ISSUED_CODE: &str = "report-server-permissive-code";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| Self::Bearer(token.trim().to_string()))
            .unwrap_or(Self::Anonymous)
    }
}

/// Decides who is making a client-to-server request.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Authenticate and authorize a request; returns the acting actor.
    async fn verify(&self, credentials: &Credentials) -> ServerResult<Iri>;

    async fn verify_for_outbox(&self, credentials: &Credentials, outbox: &Iri) -> ServerResult<Iri>;
}

/// Accepts the one token it issues and authorizes its bearer for everything.
///
/// Performs no real authentication. It exists so conformance tooling can walk
/// through the OAuth handshake against this server.
#[derive(Clone, Debug)]
pub struct PermissiveVerifier {
    actor: Iri,
    outbox: Iri,
}

impl PermissiveVerifier {
    pub fn new(actor: Iri, outbox: Iri) -> Self {
        Self { actor, outbox }
    }
}

#[async_trait]
impl Verifier for PermissiveVerifier {
    async fn verify(&self, credentials: &Credentials) -> ServerResult<Iri> {
        match credentials {
            Credentials::Bearer(token) if token == ISSUED_TOKEN => Ok(self.actor.clone()),
            Credentials::Bearer(token) => {
                Err(ServerError::Unauthorized(format!("bad bearer {token:?}")))
            }
            Credentials::Anonymous => Err(ServerError::Unauthorized("missing bearer".into())),
        }
    }

    async fn verify_for_outbox(&self, credentials: &Credentials, outbox: &Iri) -> ServerResult<Iri> {
        if outbox != &self.outbox {
            return Err(ServerError::Unauthorized(format!("bad outbox url {outbox}")));
        }
        self.verify(credentials).await
    }
}
