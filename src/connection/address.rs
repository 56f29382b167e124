//! `host:port` address parsing.
//!
//! Addresses are validated before any socket is created so malformed input
//! fails fast with an [`AddressError`].

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Reasons an address string was rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// No `:port` suffix was found.
    #[error("missing ':port' suffix")]
    MissingPort,
    /// The host part is empty.
    #[error("empty host")]
    EmptyHost,
    /// The port is not a number in `1..=65535`.
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    /// A bracketed IPv6 literal was not closed.
    #[error("unterminated '[' in IPv6 literal")]
    UnterminatedBracket,
    /// An IPv6 literal appeared without brackets.
    #[error("IPv6 literals must be bracketed, as in '[::1]:50051'")]
    UnbracketedIpv6,
}

/// A validated `host:port` pair.
///
/// IPv6 literals must be bracketed (`[::1]:50051`); the brackets are
/// stripped from [`host`](Self::host).
///
/// # Examples
///
/// ```
/// use segwire::connection::HostPort;
///
/// let addr: HostPort = "127.0.0.1:50051".parse().expect("valid address");
/// assert_eq!(addr.host(), "127.0.0.1");
/// assert_eq!(addr.port(), 50051);
///
/// let v6: HostPort = "[::1]:9000".parse().expect("valid address");
/// assert_eq!(v6.host(), "::1");
/// assert_eq!(v6.to_string(), "[::1]:9000");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostPort {
    host: String,
    port: u16,
}

impl HostPort {
    /// Host name or IP literal, without brackets.
    #[must_use]
    pub fn host(&self) -> &str { &self.host }

    /// TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 { self.port }
}

impl FromStr for HostPort {
    type Err = AddressError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (host, port) = if let Some(rest) = input.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or(AddressError::UnterminatedBracket)?;
            let port = tail.strip_prefix(':').ok_or(AddressError::MissingPort)?;
            (host, port)
        } else {
            let (host, port) = input.rsplit_once(':').ok_or(AddressError::MissingPort)?;
            if host.contains(':') {
                return Err(AddressError::UnbracketedIpv6);
            }
            (host, port)
        };
        if host.trim().is_empty() {
            return Err(AddressError::EmptyHost);
        }
        let port = match port.parse::<u16>() {
            Ok(0) | Err(_) => return Err(AddressError::InvalidPort(port.to_owned())),
            Ok(port) => port,
        };
        Ok(Self {
            host: host.to_owned(),
            port,
        })
    }
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
