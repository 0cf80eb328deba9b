/// Response codes
pub mod code;

pub use code::Code;

/// A response to a request: a [`Code`] and an optional payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resp {
  code: Code,
  payload: Option<String>,
}

impl Resp {
  /// Create a response with no payload
  pub fn new(code: Code) -> Self {
    Self { code, payload: None }
  }

  /// The response code
  pub fn code(&self) -> Code {
    self.code
  }

  /// The payload, if any
  pub fn payload(&self) -> Option<&str> {
    self.payload.as_deref()
  }

  /// Attach (or replace) the payload
  pub fn set_payload(&mut self, payload: impl Into<String>) {
    self.payload = Some(payload.into());
  }

  /// Render this response for humans: a `<status>-<reason>` line
  /// followed by one line per payload line.
  ///
  /// An empty payload renders the same as no payload; it would
  /// otherwise produce a stray blank line after the status.
  ///
  /// ```
  /// use newt::resp::{code, Resp};
  ///
  /// let mut resp = Resp::new(code::CONTENT);
  /// resp.set_payload("coap_server");
  ///
  /// assert_eq!(resp.lines(), vec!["205-Content".to_string(),
  ///                               "coap_server".to_string()]);
  /// ```
  pub fn lines(&self) -> Vec<String> {
    let status = format!("{}-{}", self.code.status(), self.code.reason());

    core::iter::once(status).chain(self.payload
                                       .iter()
                                       .filter(|p| !p.is_empty())
                                       .flat_map(|p| p.split('\n'))
                                       .map(String::from))
                            .collect()
  }
}
