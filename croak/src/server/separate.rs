use core::fmt;

use crate::msg::Msg;

/// A path that cannot be registered for separate responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPath(pub String);

impl fmt::Display for InvalidPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "'{}' is not a valid separate response path", self.0)
  }
}

impl std::error::Error for InvalidPath {}

/// Paths whose requests are answered with an empty ACK first,
/// and the actual response later in its own CON message.
///
/// ```
/// use croak::msg::{Message, OptNumber};
/// use croak::server::SeparatePaths;
///
/// let mut paths = SeparatePaths::default();
/// paths.add("separate").unwrap();
/// assert!(paths.add("/").is_err());
///
/// let mut req = Message::default();
/// req.add(OptNumber::URI_PATH, "separate").unwrap();
/// assert!(paths.contains(&req));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeparatePaths(Vec<String>);

impl SeparatePaths {
  /// Register a path. A leading `/` is optional.
  pub fn add(&mut self, path: &str) -> Result<(), InvalidPath> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
      return Err(InvalidPath(path.to_string()));
    }

    let path = format!("/{}", trimmed);
    if !self.0.contains(&path) {
      self.0.push(path);
    }

    Ok(())
  }

  /// Number of registered paths
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Whether no paths are registered
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Whether the Uri-Path of `req` is a registered path
  pub fn contains<M: Msg>(&self, req: &M) -> bool {
    if self.0.is_empty() {
      return false;
    }

    let needed = req.render_path(&mut []);
    let mut buf = vec![0u8; needed + 1];
    let n = req.render_path(&mut buf);

    self.0.iter().any(|p| p.as_bytes() == &buf[..n])
  }
}

#[cfg(test)]
mod tests {
  use croak_msg::{Message, OptNumber};

  use super::*;

  fn req(path: &[&str]) -> Message {
    let mut req = Message::default();
    path.iter()
        .for_each(|s| req.add(OptNumber::URI_PATH, s).unwrap());
    req
  }

  #[test]
  fn normalizes_slashes() {
    let mut paths = SeparatePaths::default();
    paths.add("separate").unwrap();
    paths.add("/separate").unwrap();
    paths.add("/a/b/").unwrap();

    assert_eq!(paths.len(), 2);
    assert!(paths.contains(&req(&["separate"])));
    assert!(paths.contains(&req(&["a", "b"])));
  }

  #[test]
  fn rejects_root_and_empty() {
    let mut paths = SeparatePaths::default();
    assert_eq!(paths.add(""), Err(InvalidPath("".into())));
    assert_eq!(paths.add("/"), Err(InvalidPath("/".into())));
    assert_eq!(paths.add("//"), Err(InvalidPath("//".into())));
    assert!(paths.is_empty());
  }

  #[test]
  fn exact_match_only() {
    let mut paths = SeparatePaths::default();
    paths.add("/separate").unwrap();

    assert!(!paths.contains(&req(&[])));
    assert!(!paths.contains(&req(&["separate", "more"])));
    assert!(!paths.contains(&req(&["Separate"])));
    assert!(!paths.contains(&req(&["sep"])));
  }
}
