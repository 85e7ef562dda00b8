//! Named storage disks and the strategy that routes writes to them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// A named storage backend instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageDisk {
    /// AWS S3, public bucket.
    S3,
    /// AWS S3, private bucket.
    S3Private,
    /// Cloudflare R2, public bucket.
    R2,
    /// Cloudflare R2, private bucket.
    R2Private,
    /// Local filesystem, publicly served.
    Public,
    /// Local filesystem, private.
    Fs,
}

impl StorageDisk {
    /// All disks, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::S3,
        Self::S3Private,
        Self::R2,
        Self::R2Private,
        Self::Public,
        Self::Fs,
    ];

    /// Returns the disk identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::S3Private => "s3_private",
            Self::R2 => "r2",
            Self::R2Private => "r2_private",
            Self::Public => "public",
            Self::Fs => "fs",
        }
    }

    /// Whether objects on this disk are publicly readable.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::S3 | Self::R2 | Self::Public)
    }
}

impl fmt::Display for StorageDisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageDisk {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|disk| disk.as_str() == s)
            .ok_or_else(|| StorageError::configuration(format!("unknown storage disk '{s}'")))
    }
}

/// Which backend(s) receive writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageStrategy {
    /// Cloudflare R2 only.
    R2,
    /// AWS S3 only.
    S3,
    /// Local filesystem only.
    #[default]
    Fs,
    /// R2 as source of truth, mirrored to S3.
    Dual,
}

impl StorageStrategy {
    /// Returns the strategy name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::R2 => "r2",
            Self::S3 => "s3",
            Self::Fs => "fs",
            Self::Dual => "dual",
        }
    }

    /// Disk that receives the write for the given visibility.
    #[must_use]
    pub const fn primary_disk(self, is_public: bool) -> StorageDisk {
        match (self, is_public) {
            (Self::R2 | Self::Dual, true) => StorageDisk::R2,
            (Self::R2 | Self::Dual, false) => StorageDisk::R2Private,
            (Self::S3, true) => StorageDisk::S3,
            (Self::S3, false) => StorageDisk::S3Private,
            (Self::Fs, true) => StorageDisk::Public,
            (Self::Fs, false) => StorageDisk::Fs,
        }
    }

    /// Mirror disk, only present in dual mode.
    #[must_use]
    pub const fn secondary_disk(self, is_public: bool) -> Option<StorageDisk> {
        match (self, is_public) {
            (Self::Dual, true) => Some(StorageDisk::S3),
            (Self::Dual, false) => Some(StorageDisk::S3Private),
            _ => None,
        }
    }

    /// Every disk this strategy can route to.
    #[must_use]
    pub fn required_disks(self) -> Vec<StorageDisk> {
        [true, false]
            .into_iter()
            .flat_map(|is_public| {
                std::iter::once(self.primary_disk(is_public)).chain(self.secondary_disk(is_public))
            })
            .collect()
    }
}

impl fmt::Display for StorageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageStrategy {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r2" => Ok(Self::R2),
            "s3" => Ok(Self::S3),
            "fs" | "local" => Ok(Self::Fs),
            "dual" => Ok(Self::Dual),
            other => Err(StorageError::configuration(format!(
                "unknown storage provider '{other}', expected s3, r2, fs or dual"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(StorageStrategy::R2, true, StorageDisk::R2)]
    #[case(StorageStrategy::R2, false, StorageDisk::R2Private)]
    #[case(StorageStrategy::S3, true, StorageDisk::S3)]
    #[case(StorageStrategy::S3, false, StorageDisk::S3Private)]
    #[case(StorageStrategy::Fs, true, StorageDisk::Public)]
    #[case(StorageStrategy::Fs, false, StorageDisk::Fs)]
    #[case(StorageStrategy::Dual, true, StorageDisk::R2)]
    #[case(StorageStrategy::Dual, false, StorageDisk::R2Private)]
    fn test_primary_disk(
        #[case] strategy: StorageStrategy,
        #[case] is_public: bool,
        #[case] expected: StorageDisk,
    ) {
        assert_eq!(strategy.primary_disk(is_public), expected);
    }

    #[test]
    fn test_secondary_disk_only_in_dual() {
        assert_eq!(
            StorageStrategy::Dual.secondary_disk(true),
            Some(StorageDisk::S3)
        );
        assert_eq!(
            StorageStrategy::Dual.secondary_disk(false),
            Some(StorageDisk::S3Private)
        );
        assert_eq!(StorageStrategy::R2.secondary_disk(true), None);
        assert_eq!(StorageStrategy::Fs.secondary_disk(false), None);
    }

    #[test]
    fn test_required_disks() {
        assert_eq!(
            StorageStrategy::Fs.required_disks(),
            vec![StorageDisk::Public, StorageDisk::Fs]
        );
        assert_eq!(StorageStrategy::Dual.required_disks().len(), 4);
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("DUAL".parse::<StorageStrategy>().unwrap(), StorageStrategy::Dual);
        assert_eq!(" r2 ".parse::<StorageStrategy>().unwrap(), StorageStrategy::R2);
        assert!("azure".parse::<StorageStrategy>().is_err());
    }

    #[test]
    fn test_disk_round_trip() {
        for disk in StorageDisk::ALL {
            assert_eq!(disk.as_str().parse::<StorageDisk>().unwrap(), disk);
        }
    }

    fn any_strategy() -> impl Strategy<Value = StorageStrategy> {
        prop_oneof![
            Just(StorageStrategy::R2),
            Just(StorageStrategy::S3),
            Just(StorageStrategy::Fs),
            Just(StorageStrategy::Dual),
        ]
    }

    proptest! {
        // The chosen disk always has the requested visibility.
        #[test]
        fn prop_routing_preserves_visibility(strategy in any_strategy(), is_public: bool) {
            prop_assert_eq!(strategy.primary_disk(is_public).is_public(), is_public);
            if let Some(secondary) = strategy.secondary_disk(is_public) {
                prop_assert_eq!(secondary.is_public(), is_public);
                prop_assert_ne!(secondary, strategy.primary_disk(is_public));
            }
        }
    }
}
