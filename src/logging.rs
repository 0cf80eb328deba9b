//! One-line renderings of requests & responses for log output.

use crate::req::Req;
use crate::resp::Resp;

pub(crate) fn req_summary(req: &Req) -> String {
  match req.payload() {
    | Some(payload) => format!("{} {} ({}b payload)", req.method(), req.path(), payload.len()),
    | None => format!("{} {}", req.method(), req.path()),
  }
}

pub(crate) fn resp_summary(resp: &Resp) -> String {
  match resp.payload() {
    | Some(payload) => format!("{} ({}b payload)", resp.code(), payload.len()),
    | None => format!("{}", resp.code()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resp::code;

  #[test]
  fn summaries_never_leak_payloads() {
    let req = Req::put("/name".parse().unwrap(), "secret");
    assert_eq!(req_summary(&req), "PUT /name (6b payload)");

    let mut resp = Resp::new(code::CONTENT);
    resp.set_payload("secret");
    assert_eq!(resp_summary(&resp), "2.05 (6b payload)");
    assert_eq!(resp_summary(&Resp::new(code::NOT_FOUND)), "4.04");
  }
}
