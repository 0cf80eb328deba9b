use std::sync::{PoisonError, RwLock};

use crate::msg::Method;
use crate::req::Req;
use crate::resp::{code, Resp};
use crate::server::registry::{Kind, Registry};

/// Apply a request to the registry, yielding the response to send back.
///
/// Every request gets a response; "the path does not resolve" is `4.04`
/// and "the path resolves but its kind forbids the method" is `4.05`.
/// Requests that mutate (PUT, POST, DELETE) hold the write lock for the
/// whole resolve-then-mutate, so concurrent POSTs always observe
/// distinct member ids.
pub fn dispatch(registry: &RwLock<Registry>, req: &Req) -> Resp {
  let resp = match req.method() {
    | Method::Get => get(registry, req),
    | Method::Put => put(registry, req),
    | Method::Post => post(registry, req),
    | Method::Delete => delete(registry, req),
  };

  log::debug!("{} {} -> {}", req.method(), req.path(), resp.code());
  resp
}

fn get(registry: &RwLock<Registry>, req: &Req) -> Resp {
  let reg = registry.read().unwrap_or_else(PoisonError::into_inner);

  match reg.kind(req.path()) {
    | None => status(code::NOT_FOUND),
    // Collections have no value; GET on one is well-formed but empty.
    | Some(Kind::Collection) => status(code::CONTENT),
    | Some(Kind::Static) | Some(Kind::Item) => {
      match reg.get(req.path()) {
        | Some(value) => content(value),
        | None => status(code::NOT_FOUND),
      }
    },
  }
}

fn put(registry: &RwLock<Registry>, req: &Req) -> Resp {
  let mut reg = registry.write().unwrap_or_else(PoisonError::into_inner);

  match reg.kind(req.path()) {
    | None => status(code::NOT_FOUND),
    | Some(Kind::Collection) => status(code::METHOD_NOT_ALLOWED),
    | Some(Kind::Static) | Some(Kind::Item) => {
      match reg.replace_value(req.path(), req.payload().unwrap_or_default()) {
        | Ok(()) => status(code::CHANGED),
        | Err(_) => status(code::NOT_FOUND),
      }
    },
  }
}

fn post(registry: &RwLock<Registry>, req: &Req) -> Resp {
  let mut reg = registry.write().unwrap_or_else(PoisonError::into_inner);

  match reg.kind(req.path()) {
    | None => status(code::NOT_FOUND),
    | Some(Kind::Static) | Some(Kind::Item) => status(code::METHOD_NOT_ALLOWED),
    | Some(Kind::Collection) => {
      match reg.create_member(req.path(), req.payload().unwrap_or_default()) {
        | Ok(id) => created(id),
        | Err(_) => status(code::NOT_FOUND),
      }
    },
  }
}

fn delete(registry: &RwLock<Registry>, req: &Req) -> Resp {
  let mut reg = registry.write().unwrap_or_else(PoisonError::into_inner);

  match reg.kind(req.path()) {
    | None => status(code::NOT_FOUND),
    | Some(Kind::Static) | Some(Kind::Collection) => status(code::METHOD_NOT_ALLOWED),
    | Some(Kind::Item) => {
      match reg.remove_member(req.path()) {
        | Ok(()) => status(code::DELETED),
        | Err(_) => status(code::NOT_FOUND),
      }
    },
  }
}

fn status(code: code::Code) -> Resp {
  Resp::new(code)
}

fn content(value: &str) -> Resp {
  let mut resp = Resp::new(code::CONTENT);
  resp.set_payload(value);
  resp
}

fn created(id: u32) -> Resp {
  let mut resp = Resp::new(code::CREATED);
  resp.set_payload(id.to_string());
  resp
}
