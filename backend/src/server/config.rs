//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) upstream_base: Url,
    pub(crate) upstream_timeout: Duration,
}

impl ServerConfig {
    /// Construct a server configuration for the given bind address and
    /// upstream records API base URL.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, upstream_base: Url) -> Self {
        Self {
            bind_addr,
            upstream_base,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    /// Override the upstream request timeout.
    #[must_use]
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the upstream records API base URL.
    #[must_use]
    pub fn upstream_base(&self) -> &Url {
        &self.upstream_base
    }
}
