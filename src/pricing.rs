//! Pricing engine — discount policy, currency conversion, cost breakdown.
//!
//! All arithmetic stays in `Decimal` until formatting; rounding happens only
//! when a display string is produced, so the discount and total never
//! accumulate rounding error.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::catalog::CatalogEntry;
use crate::currency::CurrencyProfile;

/// One converted, formatted line of the cost table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CostLine {
    pub item: String,
    pub cost: String,
}

/// The computed, currency-converted, discounted pricing result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CostBreakdown {
    pub lines: Vec<CostLine>,
    /// Unrounded local-currency subtotal (sum of the six converted components).
    pub subtotal: Decimal,
    pub discount_rate: Decimal,
    pub discount_amount: Decimal,
    pub final_total: Decimal,
    pub subtotal_display: String,
    pub discount_rate_display: String,
    pub discount_display: String,
    pub final_total_display: String,
}

/// Discount rate for a company-size label.
///
/// Fixed policy table over the exact labels the size dropdown offers;
/// anything else gets no discount.
pub fn discount_for_tier(size_label: &str) -> Decimal {
    match size_label.trim() {
        "0-10" => dec!(0.40),
        "10-100" => dec!(0.25),
        "100-500" => dec!(0.15),
        "500+" => dec!(0.10),
        _ => Decimal::ZERO,
    }
}

/// Compute the full cost breakdown for a catalog entry in local currency.
///
/// Each INR component is converted by `currency.exchange_rate`; the subtotal
/// is always the sum of the six converted components, never the stored
/// aggregate, so the table and the totals cannot drift apart.
pub fn compute(
    entry: &CatalogEntry,
    currency: &CurrencyProfile,
    size_label: &str,
) -> CostBreakdown {
    let rate = currency.exchange_rate;
    let symbol = currency.currency_symbol.as_str();

    let mut lines = Vec::with_capacity(6);
    let mut subtotal = Decimal::ZERO;
    for (item, inr) in entry.components() {
        let local = inr * rate;
        subtotal += local;
        lines.push(CostLine {
            item: item.to_string(),
            cost: format_amount(local, symbol),
        });
    }

    let discount_rate = discount_for_tier(size_label);
    let discount_amount = subtotal * discount_rate;
    let final_total = subtotal - discount_amount;

    CostBreakdown {
        subtotal_display: format_amount(subtotal, symbol),
        discount_rate_display: format_rate(discount_rate),
        discount_display: format!("-{}", format_amount(discount_amount, symbol)),
        final_total_display: format_amount(final_total, symbol),
        lines,
        subtotal,
        discount_rate,
        discount_amount,
        final_total,
    }
}

/// Format a local-currency amount: symbol prefix, zero decimals, thousands
/// separators. Rounding is banker's, matching the rest of the Decimal stack.
pub fn format_amount(amount: Decimal, symbol: &str) -> String {
    let rounded = amount.round_dp(0);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    format!("{sign}{symbol}{}", group_thousands(&digits))
}

/// Format a discount rate as a whole percentage ("40%").
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * dec!(100)).round_dp(0).trunc())
}

fn group_thousands(digits: &str) -> String {
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*b as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyTable;

    fn entry(costs: [i64; 6]) -> CatalogEntry {
        CatalogEntry {
            category: "Retail Storefront App".into(),
            project_overview: String::new(),
            core_modules: String::new(),
            ui_ux_cost_inr: costs[0].into(),
            frontend_cost_inr: costs[1].into(),
            backend_cost_inr: costs[2].into(),
            qa_cost_inr: costs[3].into(),
            pm_cost_inr: costs[4].into(),
            optional_addons_cost_inr: costs[5].into(),
            // Deliberately inconsistent aggregate: must be ignored.
            avg_cost_inr: dec!(9999999),
        }
    }

    fn usd() -> CurrencyProfile {
        CurrencyTable::builtin().resolve("usa").unwrap().clone()
    }

    #[test]
    fn discount_table_is_exact() {
        assert_eq!(discount_for_tier("0-10"), dec!(0.40));
        assert_eq!(discount_for_tier("10-100"), dec!(0.25));
        assert_eq!(discount_for_tier("100-500"), dec!(0.15));
        assert_eq!(discount_for_tier("500+"), dec!(0.10));
        assert_eq!(discount_for_tier("11-50"), Decimal::ZERO);
        assert_eq!(discount_for_tier("enterprise"), Decimal::ZERO);
        assert_eq!(discount_for_tier(""), Decimal::ZERO);
        // Substrings of a real label must not match.
        assert_eq!(discount_for_tier("0-1"), Decimal::ZERO);
        assert_eq!(discount_for_tier("10"), Decimal::ZERO);
    }

    #[test]
    fn small_company_scenario() {
        let breakdown = compute(
            &entry([100_000, 150_000, 200_000, 50_000, 50_000, 0]),
            &usd(),
            "0-10",
        );
        assert_eq!(breakdown.subtotal, dec!(6600));
        assert_eq!(breakdown.discount_amount, dec!(2640));
        assert_eq!(breakdown.final_total, dec!(3960));
        assert_eq!(breakdown.subtotal_display, "$6,600");
        assert_eq!(breakdown.discount_rate_display, "40%");
        assert_eq!(breakdown.discount_display, "-$2,640");
        assert_eq!(breakdown.final_total_display, "$3,960");
        assert_eq!(breakdown.lines[0].cost, "$1,200");
        assert_eq!(breakdown.lines[5].cost, "$0");
    }

    #[test]
    fn subtotal_is_rate_times_component_sum() {
        let e = entry([123_456, 1, 98_765, 4_321, 0, 777]);
        for country in ["India", "usa", "uk", "uae"] {
            let profile = CurrencyTable::builtin().resolve(country).unwrap().clone();
            let breakdown = compute(&e, &profile, "100-500");
            let inr_sum: Decimal = e.components().iter().map(|(_, c)| *c).sum();
            assert_eq!(breakdown.subtotal, inr_sum * profile.exchange_rate);
            assert_eq!(
                breakdown.final_total,
                breakdown.subtotal * (Decimal::ONE - dec!(0.15))
            );
        }
    }

    #[test]
    fn aggregate_field_never_feeds_the_subtotal() {
        let breakdown = compute(&entry([0, 0, 0, 0, 0, 0]), &usd(), "500+");
        assert_eq!(breakdown.subtotal, Decimal::ZERO);
        assert_eq!(breakdown.final_total_display, "$0");
    }

    #[test]
    fn unrecognized_tier_gets_no_discount() {
        let breakdown = compute(&entry([100_000, 0, 0, 0, 0, 0]), &usd(), "huge");
        assert_eq!(breakdown.discount_amount, Decimal::ZERO);
        assert_eq!(breakdown.subtotal, breakdown.final_total);
        assert_eq!(breakdown.discount_rate_display, "0%");
    }

    #[test]
    fn formatting_rounds_only_at_the_edge() {
        // 1234.5 with banker's rounding -> 1234
        assert_eq!(format_amount(dec!(1234.5), "$"), "$1,234");
        assert_eq!(format_amount(dec!(1235.5), "$"), "$1,236");
        assert_eq!(format_amount(dec!(999999.9), "₹"), "₹1,000,000");
        assert_eq!(format_amount(dec!(0), "£"), "£0");
        assert_eq!(format_rate(dec!(0.25)), "25%");
    }

    #[test]
    fn grouping_handles_all_widths() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("12"), "12");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
