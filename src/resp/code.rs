use core::fmt;

/// A response code: a class (2 success, 4 client error, 5 server error)
/// and a detail, rendered `c.dd` on the wire and `cdd-Reason` to humans.
///
/// ```
/// use newt::resp::code;
///
/// assert_eq!(code::CONTENT.to_string(), "2.05");
/// assert_eq!(code::CONTENT.status(), 205);
/// assert_eq!(code::CONTENT.reason(), "Content");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Code {
  /// The class (first digit) of this code
  pub class: u8,
  /// The detail (last two digits) of this code
  pub detail: u8,
}

impl Code {
  /// Create a code from a class and detail
  pub const fn new(class: u8, detail: u8) -> Self {
    Self { class, detail }
  }

  /// The 3-digit form used in rendered status lines, e.g. `205`
  pub fn status(&self) -> u16 {
    u16::from(self.class) * 100 + u16::from(self.detail)
  }

  /// The fixed human-readable tag paired with this code.
  ///
  /// The reason is a pure function of the code; status and reason always
  /// travel together.
  pub fn reason(&self) -> &'static str {
    match (self.class, self.detail) {
      | (2, 1) => "Created",
      | (2, 2) => "Deleted",
      | (2, 4) => "Changed",
      | (2, 5) => "Content",
      | (4, 0) => "BadRequest",
      | (4, 4) => "NotFound",
      | (4, 5) => "MethodNotAllowed",
      | (5, 3) => "ServiceUnavailable",
      | _ => "Unknown",
    }
  }
}

impl fmt::Display for Code {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{:02}", self.class, self.detail)
  }
}

macro_rules! code {
  ($(#[$doc:meta])* $name:ident = $c:literal * $d:literal) => {
    $(#[$doc])*
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: Code = Code::new($c, $d);
  };
}

// 2.xx
code!(/// 2.01; a POST created a new member, the assigned id follows
      CREATED = 2 * 01);
code!(/// 2.02; a DELETE removed the item
      DELETED = 2 * 02);
code!(/// 2.04; a PUT replaced the resource's value
      CHANGED = 2 * 04);
code!(/// 2.05; a GET succeeded, the value follows
      CONTENT = 2 * 05);

// 4.xx
code!(/// 4.00; the request datagram could not be understood
      BAD_REQUEST = 4 * 00);
code!(/// 4.04; the path does not resolve for the requested operation
      NOT_FOUND = 4 * 04);
code!(/// 4.05; the path resolves but its kind forbids the method
      METHOD_NOT_ALLOWED = 4 * 05);

// 5.xx
code!(/// 5.03; transport-level: the host never answered within the
      /// bounded retry window. Synthesized client-side, never sent by
      /// the dispatcher.
      SERVICE_UNAVAILABLE = 5 * 03);
