/// A cursor over a byte array (std- and alloc-less port of `std::io::Cursor`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor<T> {
  t: T,
  cursor: usize,
}

impl<T: AsRef<[u8]>> Cursor<T> {
  /// Creates a new cursor
  pub(crate) fn new(t: T) -> Cursor<T> {
    Cursor { t, cursor: 0 }
  }

  fn len(&self) -> usize {
    self.t.as_ref().len()
  }

  /// Number of bytes not yet consumed
  pub(crate) fn remaining(&self) -> usize {
    self.len() - self.cursor
  }

  /// Take the next byte in the cursor, returning None
  /// if the cursor is exhausted.
  pub(crate) fn next(&mut self) -> Option<u8> {
    self.take_exact(1).map(|a| a[0])
  }

  /// Look at the next byte without consuming it
  pub(crate) fn peek(&self) -> Option<u8> {
    self.t.as_ref().get(self.cursor).copied()
  }

  /// Take `n` bytes from the cursor, returning None if
  /// the end of the buffer is encountered.
  pub(crate) fn take_exact(&mut self, n: usize) -> Option<&[u8]> {
    if n > self.remaining() {
      None
    } else {
      let start = self.cursor;
      self.cursor += n;
      Some(&self.t.as_ref()[start..start + n])
    }
  }

  /// Consume the rest of the buffer
  pub(crate) fn take_until_end(&mut self) -> &[u8] {
    let start = self.cursor;
    self.cursor = self.len();
    &self.t.as_ref()[start..]
  }

  /// Whether every byte has been consumed
  pub(crate) fn is_exhausted(&self) -> bool {
    self.remaining() == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn take_exact() {
    let mut cur = Cursor::new([1u8, 2, 3]);
    assert_eq!(cur.peek(), Some(1));
    assert_eq!(cur.take_exact(2), Some([1u8, 2].as_ref()));
    assert_eq!(cur.take_exact(2), None);
    assert_eq!(cur.next(), Some(3));
    assert!(cur.is_exhausted());
    assert_eq!(cur.next(), None);
  }

  #[test]
  fn take_until_end() {
    let mut cur = Cursor::new([1u8, 2, 3]);
    cur.next();
    assert_eq!(cur.take_until_end(), &[2, 3]);
    assert_eq!(cur.take_until_end(), &[] as &[u8]);
    assert_eq!(cur.remaining(), 0);
  }
}
