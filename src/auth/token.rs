//! Redacted access token wrapper.

// crates.io
use http::HeaderValue;
// self
use crate::_prelude::*;

/// Bearer access token that keeps its value out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Filters out tokens that cannot be attached to a request.
	///
	/// An empty token counts as absent.
	pub fn usable(token: Option<Self>) -> Option<Self> {
		token.filter(|token| !token.0.is_empty())
	}

	/// Renders the `Authorization` header value (`Bearer <token>`).
	///
	/// Returns `None` when the token contains bytes that are not valid in a header value.
	pub fn bearer_header(&self) -> Option<HeaderValue> {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0)).ok()?;

		value.set_sensitive(true);

		Some(value)
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<&str> for AccessToken {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for AccessToken {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_formatters_redact() {
		let token = AccessToken::new("super-secret");

		assert_eq!(format!("{token:?}"), "AccessToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
	}

	#[test]
	fn empty_token_is_not_usable() {
		assert_eq!(AccessToken::usable(Some(AccessToken::new(""))), None);
		assert_eq!(AccessToken::usable(None), None);
		assert_eq!(
			AccessToken::usable(Some(AccessToken::new("abc"))).map(|token| token.0),
			Some("abc".to_owned())
		);
	}

	#[test]
	fn bearer_header_formats_and_marks_sensitive() {
		let header =
			AccessToken::new("abc").bearer_header().expect("Plain token should form a header.");

		assert_eq!(header.to_str().expect("Header should be visible ASCII."), "Bearer abc");
		assert!(header.is_sensitive());
		assert!(AccessToken::new("line\nbreak").bearer_header().is_none());
	}
}
