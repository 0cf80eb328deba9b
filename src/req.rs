use crate::msg::Method;
use crate::path::Path;

/// A request to perform a method against a resource path,
/// optionally carrying a payload.
///
/// ```
/// use newt::req::Req;
///
/// let req = Req::put("/name".parse().unwrap(), "newt_server");
/// assert_eq!(req.method(), newt::msg::Method::Put);
/// assert_eq!(req.payload(), Some("newt_server"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Req {
  method: Method,
  path: Path,
  payload: Option<String>,
}

impl Req {
  /// Create a request with no payload
  pub fn new(method: Method, path: Path) -> Self {
    Self { method,
           path,
           payload: None }
  }

  /// Create a GET request
  pub fn get(path: Path) -> Self {
    Self::new(Method::Get, path)
  }

  /// Create a PUT request carrying the replacement value
  pub fn put(path: Path, payload: impl Into<String>) -> Self {
    let mut req = Self::new(Method::Put, path);
    req.set_payload(payload);
    req
  }

  /// Create a POST request carrying the new member's value
  pub fn post(path: Path, payload: impl Into<String>) -> Self {
    let mut req = Self::new(Method::Post, path);
    req.set_payload(payload);
    req
  }

  /// Create a DELETE request
  pub fn delete(path: Path) -> Self {
    Self::new(Method::Delete, path)
  }

  /// The method this request performs
  pub fn method(&self) -> Method {
    self.method
  }

  /// The path this request addresses
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// The payload, if any
  pub fn payload(&self) -> Option<&str> {
    self.payload.as_deref()
  }

  /// Attach (or replace) the payload
  pub fn set_payload(&mut self, payload: impl Into<String>) {
    self.payload = Some(payload.into());
  }
}
