//! Short canonical identifier of a public key, used to tell which key material an installation
//! was registered with without logging the key itself.
//!
//! For RSA the fingerprint is derived from the modulus and exponent in big-endian form rather
//! than from a DER or PEM encoding, since encodings may differ between implementations.

use std::fmt;

use sha2::{Digest, Sha256};

/// A SHA-256 fingerprint of a public key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Derives a fingerprint from the canonical parts of a public key.
    ///
    /// Each part is hashed separately and the concatenated hashes are hashed again,
    /// `H(H(part1)|H(part2)|...)`. Plain concatenation of the parts is not injective: for RSA
    /// `|nnnnnn|ee|` and `|nnnnnnn|e|` would collide.
    pub(crate) fn from_parts(parts: &[Vec<u8>]) -> Self {
        let mut outer = Sha256::new();
        for part in parts {
            outer.update(Sha256::digest(part));
        }
        Self(outer.finalize().into())
    }

    #[allow(missing_docs)]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fingerprint").field(&self.to_hex()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_are_not_concatenated() {
        let a = Fingerprint::from_parts(&[vec![1, 2, 3], vec![4]]);
        let b = Fingerprint::from_parts(&[vec![1, 2], vec![3, 4]]);
        assert_ne!(a, b);
    }

    #[test]
    fn hex_is_lowercase_and_full_length() {
        let fp = Fingerprint::from_parts(&[vec![0xff]]);
        let hex = fp.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex, hex.to_lowercase());
        assert_eq!(fp.to_string(), hex);
    }
}
