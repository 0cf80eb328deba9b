use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::logging;
use crate::msg::{self, Id, Method};
use crate::net::{Addrd, Socket};
use crate::req::Req;
use crate::resp::{code, Resp};
use crate::retry::{RetryTimer, YouShould};
use crate::uri::{self, Uri};

/// Errors encountered sending a request
#[derive(Debug)]
pub struct Error<E> {
  /// What was happening when the error occurred
  pub when: When,
  /// What went wrong
  pub what: What<E>,
}

/// What went wrong
#[derive(Debug)]
pub enum What<E> {
  /// The underlying socket failed
  SockError(E),
  /// The request would not fit in a datagram
  MsgTooLong,
  /// The target was not a valid `coap://` URI
  UriInvalid(uri::Error),
}

/// What was happening when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
  /// Encoding or transmitting the request
  Sending,
  /// Waiting for a response
  Polling,
}

impl When {
  fn what<E>(self, what: What<E>) -> Error<E> {
    Error { when: self, what }
  }
}

/// A blocking request/response client.
///
/// [`Client::send`] transmits a request and blocks until a response
/// arrives, retransmitting per the [`Config`]'s retry strategy. A host
/// that never answers within the retry window does not surface as an
/// `Err`; it resolves to a synthetic `5.03 ServiceUnavailable`
/// response, so "the server said no" and "the server said nothing" read
/// the same way downstream.
#[derive(Debug)]
pub struct Client<S: Socket> {
  sock: S,
  config: Config,
  next_id: u16,
}

impl Client<UdpSocket> {
  /// Create a client whose socket is bound to a local UDP address
  pub fn try_new<A: ToSocketAddrs>(addr: A, config: Config) -> std::io::Result<Self> {
    <UdpSocket as Socket>::bind(addr).map(|sock| Self::new(sock, config))
  }
}

impl<S: Socket> Client<S> {
  /// Create a client from an already-bound socket.
  ///
  /// Message ids start at 1 and wrap at `u16::MAX`.
  pub fn new(sock: S, config: Config) -> Self {
    Self { sock,
           config,
           next_id: 1 }
  }

  /// Parse `target` as a `coap://` URI, resolve its host and perform
  /// `method` against its path, yielding the response rendered as
  /// status + payload lines.
  ///
  /// A hostname that does not resolve is indistinguishable from a host
  /// that never answers, so both render as `503-ServiceUnavailable`.
  pub fn run(&mut self,
             method: Method,
             target: &str,
             payload: Option<String>)
             -> Result<Vec<String>, Error<S::Error>> {
    let uri = target.parse::<Uri>()
                    .map_err(|e| When::Sending.what(What::UriInvalid(e)))?;

    let addr = match uri.socket_addr() {
      | Ok(addr) => addr,
      | Err(e) => {
        log::warn!("{} did not resolve: {}", uri.host, e);
        return Ok(Resp::new(code::SERVICE_UNAVAILABLE).lines());
      },
    };

    let mut req = Req::new(method, uri.path);
    if let Some(payload) = payload {
      req.set_payload(payload);
    }

    self.send(Addrd(req, addr)).map(|resp| resp.lines())
  }

  /// Send a request and block until its response arrives (or the retry
  /// window closes, yielding a synthetic `5.03`).
  pub fn send(&mut self, req: Addrd<Req>) -> Result<Resp, Error<S::Error>> {
    let id = Id(self.next_id);
    self.next_id = self.next_id.wrapping_add(1).max(1);

    let bytes = msg::req_to_bytes(id, req.data()).map_err(|_| {
                                                   When::Sending.what(What::MsgTooLong)
                                                 })?;

    log::trace!("-> {} {}", req.addr(), logging::req_summary(req.data()));
    self.transmit(Addrd(bytes.as_slice(), req.addr()))?;

    let mut retry = RetryTimer::new(Instant::now(),
                                    self.config.retry_strategy,
                                    self.config.max_attempts);

    loop {
      match self.sock
                .poll()
                .map_err(|e| When::Polling.what(What::SockError(e)))?
      {
        | Some(dgram) => match self.pair(id, req.addr(), &dgram) {
          | Some(resp) => return Ok(resp),
          | None => continue,
        },
        | None => match retry.what_should_i_do(Instant::now()) {
          | Ok(YouShould::Retry) => {
            log::debug!("{} unanswered, retransmitting", id);
            self.transmit(Addrd(bytes.as_slice(), req.addr()))?;
          },
          | Ok(YouShould::Cry) => {
            log::warn!("{} went unanswered by {}", id, req.addr());
            return Ok(Resp::new(code::SERVICE_UNAVAILABLE));
          },
          | Err(nb::Error::WouldBlock) => std::thread::sleep(Duration::from_millis(1)),
          | Err(nb::Error::Other(never)) => match never {},
        },
      }
    }
  }

  fn transmit(&self, bytes: Addrd<&[u8]>) -> Result<(), Error<S::Error>> {
    nb::block!(self.sock.send(bytes)).map_err(|e| When::Sending.what(What::SockError(e)))
  }

  /// Does this datagram answer the request we are waiting on?
  ///
  /// Datagrams from other addresses, responses to retransmits we have
  /// stopped waiting on and undecodable noise are all discarded here.
  fn pair(&self, id: Id, addr: SocketAddr, dgram: &Addrd<crate::net::Dgram>) -> Option<Resp> {
    if dgram.addr() != addr {
      log::trace!("ignoring datagram from unexpected address {}", dgram.addr());
      return None;
    }

    match msg::resp_from_bytes(dgram.data()) {
      | Ok((resp_id, resp)) if resp_id == id => {
        log::trace!("<- {} {}", dgram.addr(), logging::resp_summary(&resp));
        Some(resp)
      },
      | Ok((stale, _)) => {
        log::trace!("discarding stale response {}", stale);
        None
      },
      | Err(e) => {
        log::debug!("discarding undecipherable response: {:?}", e);
        None
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::retry::{Attempts, Strategy};
  use crate::test::SockMock;

  fn server_addr() -> SocketAddr {
    "127.0.0.1:5683".parse().unwrap()
  }

  fn fast_config() -> Config {
    Config { retry_strategy: Strategy::Delay { min: Duration::from_millis(1),
                                               max: Duration::from_millis(1) },
             max_attempts: Attempts(2) }
  }

  fn queue_resp(sock: &SockMock, id: Id, resp: &Resp) {
    let bytes = msg::resp_to_bytes(id, resp).unwrap();
    SockMock::recv_into(sock, Addrd(bytes.to_vec(), server_addr()));
  }

  #[test]
  fn send_pairs_response_by_id() {
    let mut client = Client::new(SockMock::new(), fast_config());

    let mut expected = Resp::new(code::CONTENT);
    expected.set_payload("coap_server");
    queue_resp(&client.sock, Id(1), &expected);

    let req = Req::get("/name".parse().unwrap());
    let resp = client.send(Addrd(req, server_addr())).unwrap();

    assert_eq!(resp, expected);

    let sent = SockMock::sent(&client.sock);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].data().as_slice(), b"1 GET /name");
  }

  #[test]
  fn send_discards_stale_and_foreign_responses() {
    let mut client = Client::new(SockMock::new(), fast_config());

    // a response to some older request
    queue_resp(&client.sock, Id(900), &Resp::new(code::CONTENT));

    // a response from somebody else entirely
    let foreign = msg::resp_to_bytes(Id(1), &Resp::new(code::CONTENT)).unwrap();
    SockMock::recv_into(&client.sock,
                        Addrd(foreign.to_vec(), "127.0.0.1:9090".parse().unwrap()));

    queue_resp(&client.sock, Id(1), &Resp::new(code::DELETED));

    let req = Req::delete("/dynamic/1".parse().unwrap());
    let resp = client.send(Addrd(req, server_addr())).unwrap();

    assert_eq!(resp.code(), code::DELETED);
  }

  #[test]
  fn unanswered_send_resolves_to_service_unavailable() {
    let mut client = Client::new(SockMock::new(), fast_config());

    let req = Req::get("/name".parse().unwrap());
    let resp = client.send(Addrd(req, server_addr())).unwrap();

    assert_eq!(resp.code(), code::SERVICE_UNAVAILABLE);
    // transmitted once, retransmitted once
    assert_eq!(SockMock::sent(&client.sock).len(), 2);
  }

  #[test]
  fn run_rejects_non_coap_uris() {
    let mut client = Client::new(SockMock::new(), fast_config());

    let err = client.run(Method::Get, "http://localhost/name", None)
                    .unwrap_err();

    assert_eq!(err.when, When::Sending);
    assert!(matches!(err.what, What::UriInvalid(uri::Error::SchemeUnsupported)));
  }

  #[test]
  fn ids_increment_across_requests() {
    let mut client = Client::new(SockMock::new(), fast_config());

    queue_resp(&client.sock, Id(1), &Resp::new(code::CONTENT));
    client.send(Addrd(Req::get("/name".parse().unwrap()), server_addr()))
          .unwrap();

    queue_resp(&client.sock, Id(2), &Resp::new(code::CONTENT));
    let resp = client.send(Addrd(Req::get("/name".parse().unwrap()), server_addr()))
                     .unwrap();

    assert_eq!(resp.code(), code::CONTENT);
  }
}
