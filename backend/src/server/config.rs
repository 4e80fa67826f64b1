//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use user_auth_api::domain::TokenCodec;
use user_auth_api::inbound::http::state::HttpState;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) http_state: HttpState,
    pub(crate) codec: Arc<TokenCodec>,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Construct a server configuration from the wired services.
    ///
    /// `codec` must be the same instance the login service mints with so the
    /// guard accepts the tokens it hands out.
    #[must_use]
    pub fn new(http_state: HttpState, codec: Arc<TokenCodec>, bind_addr: SocketAddr) -> Self {
        Self {
            http_state,
            codec,
            bind_addr,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
