use core::fmt;
use core::str::FromStr;

/// An absolute URI path; an ordered sequence of non-empty segments.
///
/// `Path` is the registry's key type: no two resources share a path.
/// Parsing is tolerant of leading, trailing and doubled slashes, so
/// `"/name"`, `"name"` and `"/name/"` all denote the same path.
///
/// ```
/// use newt::path::Path;
///
/// let path: Path = "/dynamic/1".parse().unwrap();
/// assert_eq!(path.segments(), &["dynamic".to_string(), "1".to_string()]);
/// assert_eq!(path.to_string(), "/dynamic/1");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<String>);

impl Path {
  /// Borrow the segments of this path
  pub fn segments(&self) -> &[String] {
    &self.0
  }

  /// Is this the root path?
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// The path one segment shorter than this one.
  ///
  /// Yields `None` for the root path.
  pub fn parent(&self) -> Option<Path> {
    match self.0.split_last() {
      | Some((_, init)) => Some(Path(init.to_vec())),
      | None => None,
    }
  }

  /// The final segment, if any
  pub fn last(&self) -> Option<&str> {
    self.0.last().map(String::as_str)
  }

  /// This path extended with one more segment
  pub fn child(&self, segment: impl Into<String>) -> Path {
    let mut segments = self.0.clone();
    segments.push(segment.into());
    Path(segments)
  }
}

impl FromStr for Path {
  type Err = core::convert::Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(Path(s.split('/')
             .filter(|seg| !seg.is_empty())
             .map(String::from)
             .collect()))
  }
}

impl fmt::Display for Path {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.0.is_empty() {
      return write!(f, "/");
    }

    self.0.iter().try_for_each(|seg| write!(f, "/{}", seg))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn path(s: &str) -> Path {
    s.parse().unwrap()
  }

  #[test]
  fn parse_ignores_extra_slashes() {
    assert_eq!(path("/name"), path("name"));
    assert_eq!(path("/name"), path("/name/"));
    assert_eq!(path("/a//b"), path("/a/b"));
  }

  #[test]
  fn display_roundtrips() {
    assert_eq!(path("/dynamic/1").to_string(), "/dynamic/1");
    assert_eq!(path("").to_string(), "/");
  }

  #[test]
  fn parent_and_last() {
    let item = path("/dynamic/1");

    assert_eq!(item.parent(), Some(path("/dynamic")));
    assert_eq!(item.last(), Some("1"));
    assert_eq!(path("").parent(), None);
  }

  #[test]
  fn child_appends() {
    assert_eq!(path("/dynamic").child("3"), path("/dynamic/3"));
  }
}
