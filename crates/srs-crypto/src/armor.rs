//! ASCII armor for public keys and detached signatures.
//!
//! The armor wraps hex-encoded bytes between `-----BEGIN <LABEL>-----` and
//! `-----END <LABEL>-----` lines, 64 hex characters per body line:
//!
//! ```text
//! -----BEGIN SRS PUBLIC KEY-----
//! 3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29
//! -----END SRS PUBLIC KEY-----
//! ```

use thiserror::Error;

const LINE_WIDTH: usize = 64;

/// What an armored block contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArmorKind {
    PublicKey,
    Signature,
}

impl ArmorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::PublicKey => "SRS PUBLIC KEY",
            Self::Signature => "SRS SIGNATURE",
        }
    }

    fn begin(self) -> String {
        format!("-----BEGIN {}-----", self.label())
    }

    fn end(self) -> String {
        format!("-----END {}-----", self.label())
    }
}

/// Errors from armor decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArmorError {
    #[error("missing armor header for {0}")]
    MissingHeader(&'static str),

    #[error("missing armor footer for {0}")]
    MissingFooter(&'static str),

    #[error("armored {0} has an empty body")]
    EmptyBody(&'static str),

    #[error("armor body is not valid hex: {0}")]
    InvalidBody(String),
}

/// Armor raw bytes.
pub fn encode(kind: ArmorKind, bytes: &[u8]) -> String {
    let body = hex::encode(bytes);
    let mut out = kind.begin();
    out.push('\n');
    for chunk in body.as_bytes().chunks(LINE_WIDTH) {
        // Hex output is ASCII, so every chunk boundary is a char boundary.
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push('\n');
    }
    out.push_str(&kind.end());
    out.push('\n');
    out
}

/// Strip the armor and decode the body bytes.
///
/// Leading and trailing whitespace around the block and around each body
/// line is ignored.
pub fn decode(kind: ArmorKind, text: &str) -> Result<Vec<u8>, ArmorError> {
    let mut lines = text.trim().lines().map(str::trim);

    if lines.next() != Some(kind.begin().as_str()) {
        return Err(ArmorError::MissingHeader(kind.label()));
    }

    let end = kind.end();
    let mut body = String::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line == end {
            closed = true;
            break;
        }
        body.push_str(line);
    }
    if !closed {
        return Err(ArmorError::MissingFooter(kind.label()));
    }
    if body.is_empty() {
        return Err(ArmorError::EmptyBody(kind.label()));
    }

    hex::decode(&body).map_err(|e| ArmorError::InvalidBody(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_wraps_long_bodies() {
        let armored = encode(ArmorKind::Signature, &[0xab; 64]);
        let lines: Vec<&str> = armored.lines().collect();
        assert_eq!(lines.first(), Some(&"-----BEGIN SRS SIGNATURE-----"));
        assert_eq!(lines.last(), Some(&"-----END SRS SIGNATURE-----"));
        // 128 hex chars over two body lines.
        assert_eq!(lines.len(), 4);
        assert_eq!(decode(ArmorKind::Signature, &armored).unwrap(), vec![0xab; 64]);
    }

    #[test]
    fn decode_tolerates_surrounding_whitespace() {
        let armored = format!("\n\n  {}  \n", encode(ArmorKind::PublicKey, &[7; 32]));
        assert_eq!(decode(ArmorKind::PublicKey, &armored).unwrap(), vec![7; 32]);
    }

    #[test]
    fn decode_rejects_wrong_kind() {
        let armored = encode(ArmorKind::PublicKey, &[7; 32]);
        assert_eq!(
            decode(ArmorKind::Signature, &armored),
            Err(ArmorError::MissingHeader("SRS SIGNATURE"))
        );
    }

    #[test]
    fn decode_rejects_truncated_block() {
        let armored = "-----BEGIN SRS PUBLIC KEY-----\nabcd\n";
        assert_eq!(
            decode(ArmorKind::PublicKey, armored),
            Err(ArmorError::MissingFooter("SRS PUBLIC KEY"))
        );
    }

    #[test]
    fn decode_rejects_empty_and_garbled_bodies() {
        let empty = "-----BEGIN SRS SIGNATURE-----\n-----END SRS SIGNATURE-----";
        assert_eq!(
            decode(ArmorKind::Signature, empty),
            Err(ArmorError::EmptyBody("SRS SIGNATURE"))
        );

        let garbled = "-----BEGIN SRS SIGNATURE-----\nxyz\n-----END SRS SIGNATURE-----";
        assert!(matches!(
            decode(ArmorKind::Signature, garbled),
            Err(ArmorError::InvalidBody(_))
        ));
    }
}
