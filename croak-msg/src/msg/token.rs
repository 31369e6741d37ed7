use tinyvec::ArrayVec;
use toad_macros::rfc_7252_doc;

#[doc = rfc_7252_doc!("5.3.1")]
#[derive(Copy, Clone, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Token(pub ArrayVec<[u8; 8]>);

impl Token {
  /// The most bytes a token may hold
  pub const MAX_LEN: usize = 8;

  /// Copy a byte slice into a token, yielding `None` if
  /// it is longer than [`Token::MAX_LEN`].
  ///
  /// ```
  /// use croak_msg::Token;
  ///
  /// assert_eq!(Token::from_slice(&[1, 2, 3]).unwrap().as_bytes(), &[1, 2, 3]);
  /// assert_eq!(Token::from_slice(&[0; 9]), None);
  /// ```
  pub fn from_slice(bytes: &[u8]) -> Option<Token> {
    if bytes.len() > Self::MAX_LEN {
      return None;
    }

    let mut token = ArrayVec::new();
    token.extend_from_slice(bytes);
    Some(Token(token))
  }

  /// Borrow the token's bytes
  pub fn as_bytes(&self) -> &[u8] {
    self.0.as_slice()
  }

  /// Number of bytes in the token
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Whether this is the zero-length token
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}
