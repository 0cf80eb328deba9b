use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use tinyvec::ArrayVec;

/// The largest datagram we will send or receive.
pub const MAX_DGRAM: usize = 1152;

/// Buffer type used for receiving and sending datagrams
pub type Dgram = ArrayVec<[u8; MAX_DGRAM]>;

pub(crate) fn empty_dgram() -> Dgram {
  // a zero-length buffer reads zero bytes; recv wants len == capacity.
  ArrayVec::from([0u8; MAX_DGRAM])
}

/// Data that came from (or is headed to) a network socket
#[derive(PartialEq, PartialOrd, Eq, Ord, Hash, Debug, Clone, Copy)]
pub struct Addrd<T>(pub T, pub SocketAddr);

impl<T> Addrd<T> {
  /// Map the data contained in this Addressed
  pub fn map<R>(self, f: impl FnOnce(T) -> R) -> Addrd<R> {
    Addrd(f(self.0), self.1)
  }

  /// Borrow the contents of the addressed item
  pub fn data(&self) -> &T {
    &self.0
  }

  /// Copy the socket address for the data
  pub fn addr(&self) -> SocketAddr {
    self.1
  }
}

/// A non-blocking datagram socket.
///
/// This mirrors [`std::net::UdpSocket`] but allows swapping the network
/// out from under the client and server (e.g. for the mock socket used
/// in tests).
pub trait Socket: Sized {
  /// The error yielded by socket operations
  type Error: core::fmt::Debug;

  /// Bind the socket to a local address, in non-blocking mode.
  ///
  /// Binds to the first address if `addr` yields multiple addresses.
  fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, Self::Error>;

  /// Get the local address this socket is bound to
  fn local_addr(&self) -> Result<SocketAddr, Self::Error>;

  /// Send a message to a remote address
  fn send(&self, msg: Addrd<&[u8]>) -> nb::Result<(), Self::Error>;

  /// Pull a buffered datagram from the socket, along with the address of
  /// the sender.
  ///
  /// It is expected that (like [`std::net::UdpSocket`]) if the message is
  /// larger than the buffer, the excess bytes are dropped and not
  /// considered an error condition.
  fn recv(&self, buffer: &mut [u8]) -> nb::Result<Addrd<usize>, Self::Error>;

  /// Poll the socket for a datagram, yielding `None` when the receive
  /// queue is empty.
  fn poll(&self) -> Result<Option<Addrd<Dgram>>, Self::Error> {
    let mut buf = empty_dgram();

    match self.recv(&mut buf) {
      | Ok(Addrd(n, addr)) => {
        buf.truncate(n);
        Ok(Some(Addrd(buf, addr)))
      },
      | Err(nb::Error::WouldBlock) => Ok(None),
      | Err(nb::Error::Other(e)) => Err(e),
    }
  }
}

impl Socket for UdpSocket {
  type Error = io::Error;

  fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, Self::Error> {
    UdpSocket::bind(addr).and_then(|sock| sock.set_nonblocking(true).map(|()| sock))
  }

  fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
    UdpSocket::local_addr(self)
  }

  fn send(&self, msg: Addrd<&[u8]>) -> nb::Result<(), Self::Error> {
    self.send_to(msg.data(), msg.addr())
        .map(|_| ())
        .map_err(io_to_nb)
  }

  fn recv(&self, buffer: &mut [u8]) -> nb::Result<Addrd<usize>, Self::Error> {
    self.recv_from(buffer)
        .map(|(n, addr)| Addrd(n, addr))
        .map_err(io_to_nb)
  }
}

fn io_to_nb(err: io::Error) -> nb::Error<io::Error> {
  match err.kind() {
    | io::ErrorKind::WouldBlock => nb::Error::WouldBlock,
    | _ => nb::Error::Other(err),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test::SockMock;

  #[test]
  fn addrd_map_keeps_addr() {
    let addr: SocketAddr = "127.0.0.1:5683".parse().unwrap();
    let addrd = Addrd(2u8, addr).map(|n| n * 2);

    assert_eq!(addrd, Addrd(4u8, addr));
    assert_eq!(addrd.addr(), addr);
  }

  #[test]
  fn poll_yields_none_when_idle() {
    let sock = SockMock::new();
    assert_eq!(sock.poll().unwrap(), None);
  }

  #[test]
  fn poll_yields_queued_dgram() {
    let addr: SocketAddr = "127.0.0.1:2222".parse().unwrap();
    let sock = SockMock::new();
    sock.rx.lock().unwrap().push(Addrd(vec![1, 2, 3], addr));

    let polled = sock.poll().unwrap().unwrap();
    assert_eq!(polled.addr(), addr);
    assert_eq!(polled.data().as_slice(), &[1, 2, 3]);
  }
}
