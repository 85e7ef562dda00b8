//! Content hashing and storage file names.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::StorageError;

/// Hex digits of the content hash kept in hash-mode names.
const HASH_PREFIX_LEN: usize = 16;
/// Random suffix length in timestamp-mode names.
const RANDOM_SUFFIX_LEN: usize = 6;
const RANDOM_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// How an upload's stored file name is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilenameMode {
    /// `{slug}-{unix_millis}-{random}{.ext}`; unique per upload.
    #[default]
    Timestamp,
    /// `{slug}-{hash prefix}{.ext}`; identical content gets identical names.
    Hash,
}

impl fmt::Display for FilenameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timestamp => "timestamp",
            Self::Hash => "hash",
        })
    }
}

impl FromStr for FilenameMode {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp" => Ok(Self::Timestamp),
            "hash" => Ok(Self::Hash),
            other => Err(StorageError::InvalidKey(format!(
                "unknown naming mode '{other}'"
            ))),
        }
    }
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Stored file name for an upload.
///
/// `hash` must be the [`content_hash`] of the uploaded bytes.
#[must_use]
pub fn generate_filename(original_name: &str, mode: FilenameMode, hash: &str) -> String {
    let (stem, ext) = split_extension(original_name);
    let slug = slugify(stem);

    match mode {
        FilenameMode::Hash => {
            let prefix = hash.get(..HASH_PREFIX_LEN).unwrap_or(hash);
            format!("{slug}-{prefix}{ext}")
        }
        FilenameMode::Timestamp => {
            let millis = Utc::now().timestamp_millis();
            let suffix = random_suffix();
            format!("{slug}-{millis}-{suffix}{ext}")
        }
    }
}

/// Lowercase, ASCII-alphanumeric words joined by single hyphens.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        "file".to_string()
    } else {
        slug
    }
}

/// Splits `name` into stem and `.ext` (lowercased, empty if none).
fn split_extension(name: &str) -> (&str, String) {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 10
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            (stem, format!(".{}", ext.to_ascii_lowercase()))
        }
        _ => (base, String::new()),
    }
}

fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..RANDOM_SUFFIX_LEN)
        .map(|_| char::from(RANDOM_ALPHABET[rng.random_range(0..RANDOM_ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_known_value() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_mode_format() {
        let hash = content_hash(b"<button/>");
        let name = generate_filename("Glow Button.TSX", FilenameMode::Hash, &hash);
        assert_eq!(name, format!("glow-button-{}.tsx", &hash[..16]));
    }

    #[test]
    fn test_timestamp_mode_format() {
        let name = generate_filename("hero.png", FilenameMode::Timestamp, &content_hash(b"x"));
        let rest = name.strip_prefix("hero-").unwrap();
        let rest = rest.strip_suffix(".png").unwrap();
        let (millis, suffix) = rest.split_once('-').unwrap();

        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 6);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My  Card (v2)"), "my-card-v2");
        assert_eq!(slugify("--hero--"), "hero");
        assert_eq!(slugify("日本語"), "file");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.tar.gz"), ("a.tar", ".gz".to_string()));
        assert_eq!(split_extension(".env"), (".env", String::new()));
        assert_eq!(split_extension("README"), ("README", String::new()));
        assert_eq!(split_extension("dir/x.PNG"), ("x", ".png".to_string()));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("hash".parse::<FilenameMode>().unwrap(), FilenameMode::Hash);
        assert!("uuid".parse::<FilenameMode>().is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Byte-identical content always yields the same hash-mode name.
        #[test]
        fn prop_hash_mode_is_deterministic(
            name in "[a-zA-Z0-9 _.-]{1,40}",
            content in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let first = generate_filename(&name, FilenameMode::Hash, &content_hash(&content));
            let second = generate_filename(&name, FilenameMode::Hash, &content_hash(&content));
            prop_assert_eq!(first, second);
        }

        // Different content never shares a hash-mode name for the same original.
        #[test]
        fn prop_hash_mode_distinguishes_content(
            a in proptest::collection::vec(any::<u8>(), 1..256),
            b in proptest::collection::vec(any::<u8>(), 1..256),
        ) {
            prop_assume!(a != b);
            let name_a = generate_filename("card.tsx", FilenameMode::Hash, &content_hash(&a));
            let name_b = generate_filename("card.tsx", FilenameMode::Hash, &content_hash(&b));
            prop_assert_ne!(name_a, name_b);
        }

        #[test]
        fn prop_slug_is_url_safe(input in ".*") {
            let slug = slugify(&input);
            prop_assert!(!slug.is_empty());
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }
    }
}
