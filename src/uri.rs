use core::fmt;
use core::str::FromStr;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use crate::path::Path;

/// The port used when a URI does not name one
pub const DEFAULT_PORT: u16 = 5683;

/// A parsed `coap://host[:port]/path` URI.
///
/// ```
/// use newt::uri::Uri;
///
/// let uri: Uri = "coap://localhost/name".parse().unwrap();
/// assert_eq!(uri.host, "localhost");
/// assert_eq!(uri.port, 5683);
/// assert_eq!(uri.path.to_string(), "/name");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Uri {
  /// The hostname or address, not yet resolved
  pub host: String,
  /// The port, [`DEFAULT_PORT`] unless the URI names one
  pub port: u16,
  /// The resource path
  pub path: Path,
}

/// A string that could not be read as a `coap://` URI
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
  /// No `://`, or an empty host
  Malformed,
  /// The scheme was something other than `coap`
  SchemeUnsupported,
  /// The text after `host:` was not a decimal u16
  PortInvalid,
}

impl Uri {
  /// Resolve the host & port to a socket address.
  ///
  /// Yields the first address when the hostname resolves to several.
  pub fn socket_addr(&self) -> io::Result<SocketAddr> {
    (self.host.as_str(), self.port).to_socket_addrs()
                                   .and_then(|mut addrs| {
                                     addrs.next().ok_or_else(|| {
                                                   io::Error::new(io::ErrorKind::NotFound,
                                                                  "host resolved to no addresses")
                                                 })
                                   })
  }
}

impl FromStr for Uri {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (scheme, rest) = s.split_once("://").ok_or(Error::Malformed)?;
    if scheme != "coap" {
      return Err(Error::SchemeUnsupported);
    }

    let (authority, path) = match rest.find('/') {
      | Some(slash) => (&rest[..slash], &rest[slash..]),
      | None => (rest, ""),
    };

    let (host, port) = match authority.rsplit_once(':') {
      | Some((host, port)) => (host, port.parse::<u16>().map_err(|_| Error::PortInvalid)?),
      | None => (authority, DEFAULT_PORT),
    };

    if host.is_empty() {
      return Err(Error::Malformed);
    }

    // Path parsing is infallible
    let path = path.parse().map_err(|_| Error::Malformed)?;

    Ok(Uri { host: host.to_string(),
             port,
             path })
  }
}

impl fmt::Display for Uri {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "coap://{}:{}{}", self.host, self.port, self.path)
  }
}
