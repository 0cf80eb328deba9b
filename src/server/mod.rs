/// applying requests to the registry
pub mod dispatch;

/// the resource registry
pub mod registry;

pub use dispatch::dispatch;
pub use registry::{Kind, Registry};

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::logging;
use crate::msg::{self, Id};
use crate::net::{Addrd, Socket};
use crate::resp::{code, Resp};

/// Errors encountered standing up or running a server
#[derive(Debug)]
pub enum Error<E> {
  /// A resource could not be registered
  Registry(registry::Error),
  /// The underlying socket failed
  SockError(E),
}

impl<E> From<registry::Error> for Error<E> {
  fn from(e: registry::Error) -> Self {
    Self::Registry(e)
  }
}

/// A server: a non-blocking socket plus the registry of resources it
/// serves.
///
/// [`Server::poll`] pulls one datagram off the socket, dispatches it
/// and sends the response; [`Server::run`] does that forever. The
/// registry is shared behind a lock so resources may be registered (or
/// inspected by tests) while the server runs on another thread.
#[derive(Debug)]
pub struct Server<S: Socket> {
  sock: S,
  registry: Arc<RwLock<Registry>>,
}

impl Server<UdpSocket> {
  /// Create a server bound to a UDP address
  pub fn try_new<A: ToSocketAddrs>(addr: A) -> std::io::Result<Self> {
    <UdpSocket as Socket>::bind(addr).map(Self::new)
  }
}

impl<S: Socket> Server<S> {
  /// Create a server from an already-bound socket
  pub fn new(sock: S) -> Self {
    Self { sock,
           registry: Arc::new(RwLock::new(Registry::new())) }
  }

  /// A handle to the registry this server serves
  pub fn registry(&self) -> Arc<RwLock<Registry>> {
    Arc::clone(&self.registry)
  }

  /// Register a static value resource
  pub fn register_value(&self,
                        path: crate::path::Path,
                        value: impl Into<String>)
                        -> Result<(), Error<S::Error>> {
    self.registry
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert_value(path, value)
        .map_err(Error::from)
  }

  /// Register a collection resource
  pub fn register_collection(&self, path: crate::path::Path) -> Result<(), Error<S::Error>> {
    self.registry
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert_collection(path)
        .map_err(Error::from)
  }

  /// The local address the socket is bound to
  pub fn local_addr(&self) -> Result<SocketAddr, S::Error> {
    self.sock.local_addr()
  }

  /// Answer one request, if one is waiting.
  ///
  /// Yields `nb::Error::WouldBlock` when the socket is idle.
  pub fn poll(&self) -> nb::Result<(), Error<S::Error>> {
    let dgram = self.sock
                    .poll()
                    .map_err(Error::SockError)
                    .map_err(nb::Error::Other)?
                    .ok_or(nb::Error::WouldBlock)?;

    match msg::req_from_bytes(dgram.data()) {
      | Ok((id, req)) => {
        log::trace!("<- {} {}", dgram.addr(), logging::req_summary(&req));
        let resp = dispatch(&self.registry, &req);
        self.answer(id, &resp, dgram.addr())
      },
      // A sender we can still address gets told their request was
      // nonsense; otherwise there is nobody to answer.
      | Err(parse_err) => match msg::peek_id(dgram.data()) {
        | Some(id) => {
          log::debug!("bad request from {}: {:?}", dgram.addr(), parse_err);
          self.answer(id, &Resp::new(code::BAD_REQUEST), dgram.addr())
        },
        | None => {
          log::debug!("dropping undecipherable datagram from {}: {:?}",
                      dgram.addr(),
                      parse_err);
          Ok(())
        },
      },
    }
  }

  fn answer(&self, id: Id, resp: &Resp, addr: SocketAddr) -> nb::Result<(), Error<S::Error>> {
    match msg::resp_to_bytes(id, resp) {
      | Ok(bytes) => {
        log::trace!("-> {} {}", addr, logging::resp_summary(resp));
        nb::block!(self.sock.send(Addrd(bytes.as_slice(), addr))).map_err(Error::SockError)
                                                                 .map_err(nb::Error::Other)
      },
      | Err(encode_err) => {
        log::warn!("response to {} could not be encoded: {:?}", addr, encode_err);
        Ok(())
      },
    }
  }

  /// Serve forever, sleeping briefly when the socket is idle.
  ///
  /// Yields only on socket failure.
  pub fn run(&self) -> Result<(), Error<S::Error>> {
    loop {
      match self.poll() {
        | Ok(()) => continue,
        | Err(nb::Error::WouldBlock) => std::thread::sleep(Duration::from_millis(1)),
        | Err(nb::Error::Other(e)) => return Err(e),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::msg::{self, Method};
  use crate::req::Req;
  use crate::test::SockMock;

  fn path(s: &str) -> crate::path::Path {
    s.parse().unwrap()
  }

  fn server() -> Server<SockMock> {
    let server = Server::new(SockMock::new());
    server.register_value(path("/name"), "coap_server").unwrap();
    server.register_collection(path("/dynamic")).unwrap();
    server
  }

  fn client_addr() -> SocketAddr {
    "127.0.0.1:4444".parse().unwrap()
  }

  #[test]
  fn idle_socket_would_block() {
    let server = server();
    assert!(matches!(server.poll(), Err(nb::Error::WouldBlock)));
  }

  #[test]
  fn poll_answers_a_request() {
    let server = server();
    let req = msg::req_to_bytes(Id(9), &Req::new(Method::Get, path("/name"))).unwrap();
    SockMock::recv_into(&server.sock, Addrd(req.to_vec(), client_addr()));

    server.poll().unwrap();

    let sent = SockMock::sent(&server.sock);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].addr(), client_addr());

    let (id, resp) = msg::resp_from_bytes(sent[0].data()).unwrap();
    assert_eq!(id, Id(9));
    assert_eq!(resp.code(), code::CONTENT);
    assert_eq!(resp.payload(), Some("coap_server"));
  }

  #[test]
  fn bad_method_gets_bad_request() {
    let server = server();
    SockMock::recv_into(&server.sock,
                        Addrd(b"3 OBSERVE /name".to_vec(), client_addr()));

    server.poll().unwrap();

    let sent = SockMock::sent(&server.sock);
    let (id, resp) = msg::resp_from_bytes(sent[0].data()).unwrap();
    assert_eq!(id, Id(3));
    assert_eq!(resp.code(), code::BAD_REQUEST);
  }

  #[test]
  fn garbage_is_dropped() {
    let server = server();
    SockMock::recv_into(&server.sock, Addrd(b"nonsense".to_vec(), client_addr()));

    server.poll().unwrap();
    assert!(SockMock::sent(&server.sock).is_empty());
  }

  #[test]
  fn duplicate_registration_is_a_conflict() {
    let server = server();
    assert!(matches!(server.register_value(path("/name"), "again"),
                     Err(Error::Registry(registry::Error::Conflict(_)))));
  }
}
