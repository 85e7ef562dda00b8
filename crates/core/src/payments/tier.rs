//! Pure helpers: tier selection, display names and license keys.

use rand::Rng;
use rust_decimal::Decimal;

use super::types::LicenseTier;

/// Minimum amount (major units) for an enterprise license.
const ENTERPRISE_THRESHOLD: i64 = 500;
/// Minimum amount (major units) for a team license.
const TEAM_THRESHOLD: i64 = 200;

const KEY_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const KEY_GROUPS: usize = 4;
const KEY_GROUP_LEN: usize = 4;

/// Pick the license tier for a checkout.
///
/// A recognised `tier` from session metadata wins; otherwise the amount in
/// major currency units decides.
#[must_use]
pub fn determine_license_tier(amount: Decimal, metadata_tier: Option<&str>) -> LicenseTier {
    if let Some(tier) = metadata_tier.and_then(|t| LicenseTier::parse(&t.trim().to_lowercase())) {
        return tier;
    }

    if amount >= Decimal::from(ENTERPRISE_THRESHOLD) {
        LicenseTier::Enterprise
    } else if amount >= Decimal::from(TEAM_THRESHOLD) {
        LicenseTier::Team
    } else {
        LicenseTier::Pro
    }
}

/// Convert minor units (cents) to major units.
#[must_use]
pub fn major_units(amount_cents: i64) -> Decimal {
    Decimal::new(amount_cents, 2)
}

/// Derive a display name from an email's local part.
///
/// `.`, `_` and `-` become word breaks and each word is capitalised:
/// `jane_smith-99@x.com` gives `Jane Smith 99`.
#[must_use]
pub fn extract_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();

    let name = local
        .split(['.', '_', '-'])
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        "Customer".to_string()
    } else {
        name
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Generate a license key, `ONA-XXXX-XXXX-XXXX-XXXX`.
#[must_use]
pub fn generate_license_key() -> String {
    let mut rng = rand::rng();
    let groups: Vec<String> = (0..KEY_GROUPS)
        .map(|_| {
            (0..KEY_GROUP_LEN)
                .map(|_| char::from(KEY_ALPHABET[rng.random_range(0..KEY_ALPHABET.len())]))
                .collect()
        })
        .collect();
    format!("ONA-{}", groups.join("-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(150), None, LicenseTier::Pro)]
    #[case(dec!(199.99), None, LicenseTier::Pro)]
    #[case(dec!(200), None, LicenseTier::Team)]
    #[case(dec!(250), None, LicenseTier::Team)]
    #[case(dec!(500), None, LicenseTier::Enterprise)]
    #[case(dec!(600), None, LicenseTier::Enterprise)]
    #[case(dec!(50), Some("enterprise"), LicenseTier::Enterprise)]
    #[case(dec!(900), Some("pro"), LicenseTier::Pro)]
    #[case(dec!(250), Some(" Team "), LicenseTier::Team)]
    #[case(dec!(250), Some("platinum"), LicenseTier::Team)]
    fn test_determine_license_tier(
        #[case] amount: Decimal,
        #[case] metadata: Option<&str>,
        #[case] expected: LicenseTier,
    ) {
        assert_eq!(determine_license_tier(amount, metadata), expected);
    }

    #[test]
    fn test_major_units() {
        assert_eq!(major_units(50_000), dec!(500));
        assert_eq!(major_units(19_999), dec!(199.99));
    }

    #[rstest]
    #[case("john.doe@x.com", "John Doe")]
    #[case("jane_smith-99@x.com", "Jane Smith 99")]
    #[case("ALICE@x.com", "Alice")]
    #[case("a..b@x.com", "A B")]
    #[case("@x.com", "Customer")]
    fn test_extract_name_from_email(#[case] email: &str, #[case] expected: &str) {
        assert_eq!(extract_name_from_email(email), expected);
    }

    #[test]
    fn test_license_key_format() {
        let key = generate_license_key();
        let parts: Vec<&str> = key.split('-').collect();

        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0], "ONA");
        for part in &parts[1..] {
            assert_eq!(part.len(), 4);
            assert!(part.bytes().all(|b| KEY_ALPHABET.contains(&b)));
        }
    }
}
