//! The datagram codec.
//!
//! The byte-exact RFC 7252 encoding is out of scope for this crate; the
//! logical request/response contract travels in a line-oriented datagram
//! instead:
//!
//! ```text
//! request  = <id> SP <METHOD> SP <path> [LF <payload...>]
//! response = <id> SP <class> "." <detail> [LF <payload...>]
//! ```
//!
//! The id is a decimal u16 assigned by the client and echoed verbatim by
//! the server; the client uses it to pair responses with requests and to
//! discard stale responses to retransmitted requests. The payload is
//! everything after the first LF and may itself contain LFs.

use core::fmt;
use core::str::FromStr;

use crate::net::{Dgram, MAX_DGRAM};
use crate::req::Req;
use crate::resp::code::Code;
use crate::resp::Resp;

/// A message id pairing a response with the request it answers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(pub u16);

impl fmt::Display for Id {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Request methods
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
  /// Retrieve the value of a resource
  Get,
  /// Replace the value of a Static or Item resource
  Put,
  /// Create a new member of a Collection resource
  Post,
  /// Remove an Item resource
  Delete,
}

impl Method {
  /// The method's name as it appears on the wire
  pub fn as_str(&self) -> &'static str {
    match self {
      | Self::Get => "GET",
      | Self::Put => "PUT",
      | Self::Post => "POST",
      | Self::Delete => "DELETE",
    }
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Method {
  type Err = ParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      | _ if s.eq_ignore_ascii_case("get") => Ok(Self::Get),
      | _ if s.eq_ignore_ascii_case("put") => Ok(Self::Put),
      | _ if s.eq_ignore_ascii_case("post") => Ok(Self::Post),
      | _ if s.eq_ignore_ascii_case("delete") => Ok(Self::Delete),
      | _ => Err(ParseError::MethodInvalid),
    }
  }
}

/// A datagram that could not be decoded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
  /// The datagram was empty
  Empty,
  /// The header line was not utf8
  HeaderNotUtf8,
  /// The header line did not have the expected fields
  HeaderMalformed,
  /// The id field was not a decimal u16
  IdInvalid,
  /// The method field named no known method
  MethodInvalid,
  /// The code field was not `class.detail`
  CodeInvalid,
  /// The payload was not utf8
  PayloadNotUtf8,
}

/// A message that could not be encoded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodeError {
  /// Header + payload exceed [`MAX_DGRAM`]
  TooLong,
}

/// Encode a request datagram
pub fn req_to_bytes(id: Id, req: &Req) -> Result<Dgram, EncodeError> {
  let header = format!("{} {} {}", id, req.method(), req.path());
  to_bytes(&header, req.payload())
}

/// Encode a response datagram
pub fn resp_to_bytes(id: Id, resp: &Resp) -> Result<Dgram, EncodeError> {
  let header = format!("{} {}", id, resp.code());
  to_bytes(&header, resp.payload())
}

fn to_bytes(header: &str, payload: Option<&str>) -> Result<Dgram, EncodeError> {
  let len = header.len() + payload.map(|p| 1 + p.len()).unwrap_or(0);
  if len > MAX_DGRAM {
    return Err(EncodeError::TooLong);
  }

  let mut dgram = Dgram::default();
  dgram.extend_from_slice(header.as_bytes());

  if let Some(payload) = payload {
    dgram.push(b'\n');
    dgram.extend_from_slice(payload.as_bytes());
  }

  Ok(dgram)
}

/// Decode a request datagram
pub fn req_from_bytes(bytes: &[u8]) -> Result<(Id, Req), ParseError> {
  let (header, payload) = split(bytes)?;

  let mut fields = header.split_whitespace();
  match (fields.next(), fields.next(), fields.next(), fields.next()) {
    | (Some(id), Some(method), Some(path), None) => {
      let id = parse_id(id)?;
      let method = method.parse::<Method>()?;
      let path = path.parse().map_err(|_| ParseError::HeaderMalformed)?;

      let mut req = Req::new(method, path);
      if let Some(payload) = payload {
        req.set_payload(payload);
      }

      Ok((id, req))
    },
    | _ => Err(ParseError::HeaderMalformed),
  }
}

/// Decode a response datagram
pub fn resp_from_bytes(bytes: &[u8]) -> Result<(Id, Resp), ParseError> {
  let (header, payload) = split(bytes)?;

  let mut fields = header.split_whitespace();
  match (fields.next(), fields.next(), fields.next()) {
    | (Some(id), Some(code), None) => {
      let id = parse_id(id)?;

      let mut resp = Resp::new(parse_code(code)?);
      if let Some(payload) = payload {
        resp.set_payload(payload);
      }

      Ok((id, resp))
    },
    | _ => Err(ParseError::HeaderMalformed),
  }
}

/// Best-effort extraction of the id from a datagram that may otherwise be
/// garbage, so the server can still address an error response.
pub fn peek_id(bytes: &[u8]) -> Option<Id> {
  split(bytes).ok()
              .and_then(|(header, _)| header.split_whitespace().next().map(String::from))
              .and_then(|id| parse_id(&id).ok())
}

fn split(bytes: &[u8]) -> Result<(String, Option<String>), ParseError> {
  if bytes.is_empty() {
    return Err(ParseError::Empty);
  }

  let (header, payload) = match bytes.iter().position(|b| *b == b'\n') {
    | Some(lf) => (&bytes[..lf], Some(&bytes[lf + 1..])),
    | None => (bytes, None),
  };

  let header = core::str::from_utf8(header).map_err(|_| ParseError::HeaderNotUtf8)?
                                           .to_string();
  let payload = payload.map(|p| {
                         core::str::from_utf8(p).map(String::from)
                                                .map_err(|_| ParseError::PayloadNotUtf8)
                       })
                       .transpose()?;

  Ok((header, payload))
}

fn parse_id(s: &str) -> Result<Id, ParseError> {
  s.parse::<u16>().map(Id).map_err(|_| ParseError::IdInvalid)
}

fn parse_code(s: &str) -> Result<Code, ParseError> {
  match s.split_once('.') {
    | Some((class, detail)) => {
      let class = class.parse::<u8>().map_err(|_| ParseError::CodeInvalid)?;
      let detail = detail.parse::<u8>().map_err(|_| ParseError::CodeInvalid)?;
      Ok(Code::new(class, detail))
    },
    | None => Err(ParseError::CodeInvalid),
  }
}
