//! Text codec for device assertions.
//!
//! An assertion is a block of `name: value` header lines, optionally
//! followed by a blank line and a body of exactly `body-length` bytes, and
//! optionally followed by a blank line and a base64 signature:
//!
//! ```text
//! type: serial
//! brand-id: acme
//! model: widget
//! serial: A1234
//! device-key: <base64 ed25519 public key>
//! body-length: 5
//!
//! hello
//!
//! <base64 signature>
//! ```

use crate::error::CryptoError;

const SEPARATOR: &[u8] = b"\n\n";

/// A decoded assertion. Header order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    signature: Option<String>,
}

impl Assertion {
    /// Start an unsigned assertion of the given type.
    pub fn new(assertion_type: &str) -> Self {
        Self {
            headers: vec![("type".to_string(), assertion_type.to_string())],
            body: Vec::new(),
            signature: None,
        }
    }

    /// Set a header, replacing an existing value of the same name.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.headers.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The declared `type` header. Always present on decoded assertions.
    pub fn assertion_type(&self) -> &str {
        self.header("type").unwrap_or_default()
    }

    /// The declared `revision`, 0 when absent.
    pub fn revision(&self) -> i64 {
        self.header("revision")
            .and_then(|r| r.parse().ok())
            .unwrap_or(0)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Encode headers and body, without any signature.
    ///
    /// This is exactly the byte string a signature covers.
    pub fn content(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut first = true;
        for (name, value) in &self.headers {
            if name == "body-length" {
                continue;
            }
            if !first {
                out.push(b'\n');
            }
            first = false;
            out.extend_from_slice(format!("{name}: {value}").as_bytes());
        }
        if !self.body.is_empty() {
            out.extend_from_slice(format!("\nbody-length: {}", self.body.len()).as_bytes());
            out.extend_from_slice(SEPARATOR);
            out.extend_from_slice(&self.body);
        }
        out
    }

    /// Encode the assertion, including its signature when present.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.content();
        if let Some(sig) = &self.signature {
            out.extend_from_slice(SEPARATOR);
            out.extend_from_slice(sig.as_bytes());
        }
        out
    }

    pub(crate) fn set_signature(&mut self, signature: String) {
        self.signature = Some(signature);
    }
}

/// Decode an assertion from its text form.
pub fn decode(data: &[u8]) -> Result<Assertion, CryptoError> {
    let (head, rest) = match find(data, SEPARATOR) {
        Some(pos) => (&data[..pos], Some(&data[pos + SEPARATOR.len()..])),
        None => (data, None),
    };

    let head = std::str::from_utf8(head)
        .map_err(|_| CryptoError::Malformed("headers are not valid UTF-8".into()))?;
    let headers = parse_headers(head)?;

    let mut assertion = Assertion {
        headers,
        body: Vec::new(),
        signature: None,
    };

    match assertion.header("type") {
        Some(t) if !t.is_empty() => {}
        _ => return Err(CryptoError::MissingHeader("type")),
    }
    if let Some(rev) = assertion.header("revision") {
        if rev.parse::<u32>().is_err() {
            return Err(CryptoError::Malformed(format!("invalid revision '{rev}'")));
        }
    }

    let body_length = match assertion.header("body-length") {
        Some(len) => Some(
            len.parse::<usize>()
                .map_err(|_| CryptoError::Malformed(format!("invalid body-length '{len}'")))?,
        ),
        None => None,
    };

    let trailer = match (body_length, rest) {
        (Some(0) | None, rest) => rest,
        (Some(len), Some(rest)) if rest.len() >= len => {
            assertion.body = rest[..len].to_vec();
            let after = &rest[len..];
            if after.is_empty() {
                None
            } else {
                Some(after.strip_prefix(SEPARATOR).ok_or_else(|| {
                    CryptoError::Malformed("body is longer than body-length".into())
                })?)
            }
        }
        (Some(len), _) => {
            return Err(CryptoError::Malformed(format!(
                "body is shorter than body-length {len}"
            )));
        }
    };

    if let Some(sig) = trailer {
        let sig = std::str::from_utf8(sig)
            .map_err(|_| CryptoError::Malformed("signature is not valid UTF-8".into()))?
            .trim_end();
        if sig.contains('\n') {
            return Err(CryptoError::Malformed("unexpected content after headers".into()));
        }
        if !sig.is_empty() {
            assertion.signature = Some(sig.to_string());
        }
    }

    Ok(assertion)
}

fn parse_headers(head: &str) -> Result<Vec<(String, String)>, CryptoError> {
    let mut headers: Vec<(String, String)> = Vec::new();
    for line in head.lines() {
        let (name, value) = line
            .split_once(": ")
            .ok_or_else(|| CryptoError::Malformed(format!("invalid header line '{line}'")))?;
        let valid_name = !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid_name {
            return Err(CryptoError::Malformed(format!("invalid header name '{name}'")));
        }
        if headers.iter().any(|(n, _)| n == name) {
            return Err(CryptoError::Malformed(format!("repeated header '{name}'")));
        }
        headers.push((name.to_string(), value.trim().to_string()));
    }
    if headers.is_empty() {
        return Err(CryptoError::Malformed("no headers".into()));
    }
    Ok(headers)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn serial_text() -> &'static str {
        "type: serial\nbrand-id: acme\nmodel: widget\nserial: A1\nrevision: 2"
    }

    #[test]
    fn decodes_headers_in_order() {
        let a = decode(serial_text().as_bytes()).unwrap();
        assert_eq!(a.assertion_type(), "serial");
        assert_eq!(a.header("model"), Some("widget"));
        assert_eq!(a.revision(), 2);
        assert_eq!(a.headers()[1].0, "brand-id");
        assert!(a.body().is_empty());
        assert!(a.signature().is_none());
    }

    #[test]
    fn decodes_body_and_signature() {
        let text = "type: serial\nbody-length: 5\n\nhello\n\nc2ln";
        let a = decode(text.as_bytes()).unwrap();
        assert_eq!(a.body(), b"hello");
        assert_eq!(a.signature(), Some("c2ln"));
        assert_eq!(a.encode(), text.as_bytes());
    }

    #[test]
    fn missing_type_is_rejected() {
        let err = decode(b"brand-id: acme").unwrap_err();
        assert!(matches!(err, CryptoError::MissingHeader("type")));
    }

    #[test]
    fn short_body_is_rejected() {
        let err = decode(b"type: serial\nbody-length: 10\n\nhello").unwrap_err();
        assert!(matches!(err, CryptoError::Malformed(_)));
    }

    #[test]
    fn repeated_header_is_rejected() {
        assert!(decode(b"type: serial\ntype: model").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode(b"\x00\x01not an assertion").is_err());
        assert!(decode(b"").is_err());
    }

    #[test]
    fn builder_output_decodes() {
        let a = Assertion::new("serial")
            .with_header("serial", "A1")
            .with_body("payload");
        let decoded = decode(&a.encode()).unwrap();
        assert_eq!(decoded.header("serial"), Some("A1"));
        assert_eq!(decoded.header("body-length"), Some("7"));
        assert_eq!(decoded.body(), b"payload");
    }
}
