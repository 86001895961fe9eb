//! Connection configuration types.

/// How the server certificate is treated during the TLS handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertificatePolicy {
    /// Verification failures are logged and the handshake proceeds.
    ///
    /// Many small providers serve certificates that do not chain to a public
    /// root. This keeps them reachable at the cost of man-in-the-middle
    /// protection.
    #[default]
    AcceptInvalid,
    /// Certificates must verify against the bundled web PKI roots.
    Verify,
}

/// IMAP connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server hostname, also used for SNI.
    pub host: String,
    /// Server port (implicit TLS).
    pub port: u16,
    /// Prefix for command tags.
    pub tag_prefix: String,
    /// Certificate handling.
    pub certificate_policy: CertificatePolicy,
}

impl Config {
    /// Default port for IMAP over implicit TLS.
    pub const DEFAULT_PORT: u16 = 993;

    /// Creates a configuration for `host` on port 993.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        ConfigBuilder::new(host).build()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(host)
    }
}

/// Builder for connection configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    host: String,
    port: u16,
    tag_prefix: String,
    certificate_policy: CertificatePolicy,
}

impl ConfigBuilder {
    /// Creates a new builder with the given hostname.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Config::DEFAULT_PORT,
            tag_prefix: "A".to_string(),
            certificate_policy: CertificatePolicy::default(),
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the command tag prefix.
    #[must_use]
    pub fn tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    /// Sets the certificate policy.
    #[must_use]
    pub const fn certificate_policy(mut self, policy: CertificatePolicy) -> Self {
        self.certificate_policy = policy;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        Config {
            host: self.host,
            port: self.port,
            tag_prefix: self.tag_prefix,
            certificate_policy: self.certificate_policy,
        }
    }
}
