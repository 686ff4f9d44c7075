//! IMAP connection configuration

use std::env;

/// Default server when none is given.
pub const DEFAULT_HOST: &str = "imap.gmail.com";

/// How the TCP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// TLS from the first byte (IMAPS).
    #[default]
    Tls,
    /// Plain connection upgraded with `STARTTLS`.
    StartTls,
}

impl Security {
    /// The well-known port for this mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Tls => 993,
            Self::StartTls => 143,
        }
    }
}

/// IMAP connection configuration
#[derive(Debug, Clone)]
pub struct ImapConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub security: Security,
    /// Skip certificate verification (self-signed bridges, test servers).
    pub accept_invalid_certs: bool,
}

impl ImapConfig {
    /// Configuration for implicit TLS on the default port.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: Security::Tls.default_port(),
            username: username.into(),
            password: password.into(),
            security: Security::Tls,
            accept_invalid_certs: false,
        }
    }

    /// Switch to `STARTTLS`, moving to its default port unless a
    /// non-default port was already chosen.
    #[must_use]
    pub const fn with_starttls(mut self) -> Self {
        if self.port == Security::Tls.default_port() {
            self.port = Security::StartTls.default_port();
        }
        self.security = Security::StartTls;
        self
    }
}

/// Password from `IMAP_PASSWORD`, read from the environment or a `.env`
/// file in the working directory.
#[must_use]
pub fn env_password() -> Option<String> {
    dotenvy::dotenv().ok();
    env::var("IMAP_PASSWORD").ok().filter(|p| !p.is_empty())
}
