use std::collections::BTreeMap;

use crate::path::Path;

/// How a registered path behaves under the four methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
  /// A fixed resource registered at server start; readable and replaceable
  Static,
  /// A parent of dynamically created members; accepts POST
  Collection,
  /// A member of a collection; readable, replaceable and deletable
  Item,
}

/// Registry mutations that could not be applied
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
  /// The path is already registered
  Conflict(Path),
  /// The path does not resolve to a resource
  NotFound,
}

#[derive(Clone, Debug)]
enum Entry {
  Value(String),
  Collection {
    // last id handed out; the next member gets last_id + 1. Never
    // decremented, so ids are not reused after a delete.
    last_id: u32,
    members: BTreeMap<u32, String>,
  },
}

/// The set of resources a server exposes, keyed by [`Path`].
///
/// Static values and collections are registered up front; items only
/// come into existence through [`Registry::create_member`]. Item paths
/// are the collection's path plus the member id in canonical decimal
/// form, so `/dynamic/01` never resolves even when member 1 exists.
#[derive(Clone, Debug, Default)]
pub struct Registry {
  entries: BTreeMap<Path, Entry>,
}

impl Registry {
  /// Create an empty registry
  pub fn new() -> Self {
    Self::default()
  }

  /// What kind of resource lives at `path`, if any?
  pub fn kind(&self, path: &Path) -> Option<Kind> {
    match self.entries.get(path) {
      | Some(Entry::Value(_)) => Some(Kind::Static),
      | Some(Entry::Collection { .. }) => Some(Kind::Collection),
      | None => self.resolve_member(path).map(|_| Kind::Item),
    }
  }

  /// Read the value at `path`.
  ///
  /// Collections have no value of their own; this yields `None` for a
  /// collection path even though [`Registry::kind`] resolves it.
  pub fn get(&self, path: &Path) -> Option<&str> {
    match self.entries.get(path) {
      | Some(Entry::Value(value)) => Some(value.as_str()),
      | Some(Entry::Collection { .. }) => None,
      | None => {
        let (parent, id) = self.resolve_member(path)?;
        match self.entries.get(&parent) {
          | Some(Entry::Collection { members, .. }) => members.get(&id).map(String::as_str),
          | _ => None,
        }
      },
    }
  }

  /// Register a static value resource
  pub fn insert_value(&mut self,
                      path: Path,
                      value: impl Into<String>)
                      -> Result<(), Error> {
    self.insert(path, Entry::Value(value.into()))
  }

  /// Register an empty collection resource
  pub fn insert_collection(&mut self, path: Path) -> Result<(), Error> {
    self.insert(path,
                Entry::Collection { last_id: 0,
                                    members: BTreeMap::new() })
  }

  fn insert(&mut self, path: Path, entry: Entry) -> Result<(), Error> {
    if self.kind(&path).is_some() {
      return Err(Error::Conflict(path));
    }

    self.entries.insert(path, entry);
    Ok(())
  }

  /// Create a new member under the collection at `path`, yielding the
  /// id assigned to it.
  ///
  /// Ids count up from 1 and are never reused, even after the member
  /// they named is deleted.
  pub fn create_member(&mut self,
                       path: &Path,
                       value: impl Into<String>)
                       -> Result<u32, Error> {
    match self.entries.get_mut(path) {
      | Some(Entry::Collection { last_id, members }) => {
        *last_id += 1;
        members.insert(*last_id, value.into());
        Ok(*last_id)
      },
      | _ => Err(Error::NotFound),
    }
  }

  /// Remove the item at `path`
  pub fn remove_member(&mut self, path: &Path) -> Result<(), Error> {
    let (parent, id) = self.resolve_member(path).ok_or(Error::NotFound)?;

    match self.entries.get_mut(&parent) {
      | Some(Entry::Collection { members, .. }) => {
        members.remove(&id).map(|_| ()).ok_or(Error::NotFound)
      },
      | _ => Err(Error::NotFound),
    }
  }

  /// Replace the value of the static resource or item at `path`
  pub fn replace_value(&mut self,
                       path: &Path,
                       value: impl Into<String>)
                       -> Result<(), Error> {
    if let Some(Entry::Value(existing)) = self.entries.get_mut(path) {
      *existing = value.into();
      return Ok(());
    }

    let (parent, id) = self.resolve_member(path).ok_or(Error::NotFound)?;
    match self.entries.get_mut(&parent) {
      | Some(Entry::Collection { members, .. }) => match members.get_mut(&id) {
        | Some(existing) => {
          *existing = value.into();
          Ok(())
        },
        | None => Err(Error::NotFound),
      },
      | _ => Err(Error::NotFound),
    }
  }

  /// A path names an existing member when its parent is a collection,
  /// its last segment is a decimal id in canonical form, and the
  /// collection contains that id.
  fn resolve_member(&self, path: &Path) -> Option<(Path, u32)> {
    let parent = path.parent()?;
    let segment = path.last()?;
    let id = segment.parse::<u32>().ok()?;

    if segment != id.to_string() {
      return None;
    }

    match self.entries.get(&parent) {
      | Some(Entry::Collection { members, .. }) if members.contains_key(&id) => {
        Some((parent, id))
      },
      | _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn path(s: &str) -> Path {
    s.parse().unwrap()
  }

  fn registry() -> Registry {
    let mut reg = Registry::new();
    reg.insert_value(path("/name"), "coap_server").unwrap();
    reg.insert_collection(path("/dynamic")).unwrap();
    reg
  }

  #[test]
  fn kinds() {
    let mut reg = registry();
    reg.create_member(&path("/dynamic"), "something").unwrap();

    assert_eq!(reg.kind(&path("/name")), Some(Kind::Static));
    assert_eq!(reg.kind(&path("/dynamic")), Some(Kind::Collection));
    assert_eq!(reg.kind(&path("/dynamic/1")), Some(Kind::Item));
    assert_eq!(reg.kind(&path("/nope")), None);
    assert_eq!(reg.kind(&path("/dynamic/2")), None);
  }

  #[test]
  fn member_ids_count_from_one() {
    let mut reg = registry();
    let coll = path("/dynamic");

    assert_eq!(reg.create_member(&coll, "a").unwrap(), 1);

    let id = reg.create_member(&coll, "b").unwrap();
    assert_eq!(id, 2);
    assert_eq!(reg.get(&coll.child(id.to_string())), Some("b"));
  }

  #[test]
  fn member_ids_never_reused() {
    let mut reg = registry();

    reg.create_member(&path("/dynamic"), "a").unwrap();
    reg.remove_member(&path("/dynamic/1")).unwrap();

    assert_eq!(reg.create_member(&path("/dynamic"), "b").unwrap(), 2);
    assert_eq!(reg.get(&path("/dynamic/1")), None);
  }

  #[test]
  fn member_ids_are_canonical_decimal() {
    let mut reg = registry();
    reg.create_member(&path("/dynamic"), "a").unwrap();

    assert_eq!(reg.kind(&path("/dynamic/01")), None);
    assert_eq!(reg.get(&path("/dynamic/01")), None);
  }

  #[test]
  fn replace_static_and_member() {
    let mut reg = registry();
    reg.create_member(&path("/dynamic"), "a").unwrap();

    reg.replace_value(&path("/name"), "CoaPP").unwrap();
    reg.replace_value(&path("/dynamic/1"), "b").unwrap();

    assert_eq!(reg.get(&path("/name")), Some("CoaPP"));
    assert_eq!(reg.get(&path("/dynamic/1")), Some("b"));
    assert_eq!(reg.replace_value(&path("/nope"), "x"), Err(Error::NotFound));
  }

  #[test]
  fn registration_conflicts() {
    let mut reg = registry();

    assert_eq!(reg.insert_value(path("/name"), "again"),
               Err(Error::Conflict(path("/name"))));
    assert_eq!(reg.insert_collection(path("/dynamic")),
               Err(Error::Conflict(path("/dynamic"))));
  }

  #[test]
  fn collections_have_no_value() {
    let reg = registry();
    assert_eq!(reg.get(&path("/dynamic")), None);
  }
}
