//! Country dialing and currency metadata.
//!
//! Every exchange rate is relative to INR, so converting a catalog amount is
//! a single multiplication regardless of the target currency.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// One country's dialing and currency metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyProfile {
    /// Display name, also the key the UI sends back ("United States").
    pub country: String,
    /// International dialing code with leading `+`.
    pub phone_code: String,
    /// ISO 3166-1 alpha-2 code.
    pub iso_code: String,
    pub currency_symbol: String,
    pub currency_code: String,
    /// Exchange rate from INR into the local currency.
    pub exchange_rate: Decimal,
}

/// Read-only table of supported countries.
///
/// Built once at startup and shared; lookups are case-insensitive and accept
/// the ISO code and common short forms ("usa", "uk", "uae") so compound
/// phone tokens typed by users still resolve.
#[derive(Debug, Clone)]
pub struct CurrencyTable {
    profiles: Vec<CurrencyProfile>,
}

impl CurrencyTable {
    /// The built-in country set.
    pub fn builtin() -> Self {
        let profiles = vec![
            CurrencyProfile {
                country: "India".into(),
                phone_code: "+91".into(),
                iso_code: "IN".into(),
                currency_symbol: "₹".into(),
                currency_code: "INR".into(),
                exchange_rate: dec!(1.0),
            },
            CurrencyProfile {
                country: "United States".into(),
                phone_code: "+1".into(),
                iso_code: "US".into(),
                currency_symbol: "$".into(),
                currency_code: "USD".into(),
                exchange_rate: dec!(0.012),
            },
            CurrencyProfile {
                country: "United Kingdom".into(),
                phone_code: "+44".into(),
                iso_code: "GB".into(),
                currency_symbol: "£".into(),
                currency_code: "GBP".into(),
                exchange_rate: dec!(0.0095),
            },
            CurrencyProfile {
                country: "United Arab Emirates".into(),
                phone_code: "+971".into(),
                iso_code: "AE".into(),
                currency_symbol: "د.إ".into(),
                currency_code: "AED".into(),
                exchange_rate: dec!(0.044),
            },
        ];
        Self { profiles }
    }

    /// Resolve a country by name, ISO code, or short alias.
    pub fn resolve(&self, raw: &str) -> Option<&CurrencyProfile> {
        let needle = raw.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.profiles.iter().find(|p| {
            p.country.to_lowercase() == needle
                || p.iso_code.to_lowercase() == needle
                || alias_of(&p.iso_code).iter().any(|a| *a == needle)
        })
    }

    /// Country display names, in table order (used by the phone form).
    pub fn country_names(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.country.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyProfile> {
        self.profiles.iter()
    }
}

/// Short-form aliases per ISO code.
fn alias_of(iso: &str) -> &'static [&'static str] {
    match iso {
        "US" => &["usa", "united states of america", "america"],
        "GB" => &["uk", "great britain", "britain", "england"],
        "AE" => &["uae", "emirates"],
        "IN" => &["bharat"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_display_name() {
        let table = CurrencyTable::builtin();
        let us = table.resolve("United States").unwrap();
        assert_eq!(us.currency_code, "USD");
        assert_eq!(us.exchange_rate, dec!(0.012));
    }

    #[test]
    fn resolves_case_insensitively_and_by_alias() {
        let table = CurrencyTable::builtin();
        assert_eq!(table.resolve("usa").unwrap().iso_code, "US");
        assert_eq!(table.resolve("UK").unwrap().iso_code, "GB");
        assert_eq!(table.resolve("uae").unwrap().iso_code, "AE");
        assert_eq!(table.resolve("india").unwrap().currency_code, "INR");
        assert_eq!(table.resolve("gb").unwrap().iso_code, "GB");
    }

    #[test]
    fn unknown_country_is_none() {
        let table = CurrencyTable::builtin();
        assert!(table.resolve("Atlantis").is_none());
        assert!(table.resolve("").is_none());
        assert!(table.resolve("  ").is_none());
    }

    #[test]
    fn inr_rate_is_identity() {
        let table = CurrencyTable::builtin();
        assert_eq!(table.resolve("India").unwrap().exchange_rate, dec!(1.0));
    }

    #[test]
    fn country_names_preserve_order() {
        let table = CurrencyTable::builtin();
        assert_eq!(
            table.country_names(),
            vec![
                "India",
                "United States",
                "United Kingdom",
                "United Arab Emirates"
            ]
        );
    }
}
