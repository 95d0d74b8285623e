//! Display helpers used when building response views.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round half away from zero to `dp` decimal places.
pub fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

pub fn title_case(value: &str) -> String {
    value
        .to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// English conjunction list: "A", "A and B", "A, B, and C".
pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head = init
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{head}, and {}", last.as_ref())
        }
    }
}

/// USD with thousands separators, e.g. `$1,234.50`.
pub fn format_currency(amount: Decimal) -> String {
    let fixed = format!("{:.2}", round(amount.abs(), 2));
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// Lowercase, hyphen-separated form of a product name.
///
/// Runs of anything that is not ASCII alphanumeric collapse into one hyphen;
/// the result never starts or ends with a hyphen.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    #[test]
    fn rounds_prices() {
        assert_eq!(round(dec("1.005"), 2), dec("1.01"));
        assert_eq!(round(dec("19.999"), 2), dec("20.00"));
        assert_eq!(round(dec("-2.345"), 2), dec("-2.35"));
        assert_eq!(round(Decimal::from(30), 2), Decimal::from(30));
    }

    #[test]
    fn title_cases_words() {
        assert_eq!(title_case("CASH ON delivery"), "Cash On Delivery");
        assert_eq!(title_case("student"), "Student");
    }

    #[test]
    fn formats_lists() {
        assert_eq!(format_list::<&str>(&[]), "");
        assert_eq!(format_list(&["Books"]), "Books");
        assert_eq!(format_list(&["Books", "Electronics"]), "Books and Electronics");
        assert_eq!(
            format_list(&["Books", "Electronics", "Kitchen"]),
            "Books, Electronics, and Kitchen"
        );
    }

    #[test]
    fn formats_currency() {
        assert_eq!(format_currency(Decimal::from(30)), "$30.00");
        assert_eq!(format_currency(dec("1234.5")), "$1,234.50");
        assert_eq!(format_currency(Decimal::from(1_000_000)), "$1,000,000.00");
        assert_eq!(format_currency(dec("0.1") + dec("0.2")), "$0.30");
        assert_eq!(format_currency(dec("-12.5")), "-$12.50");
    }

    #[test]
    fn slug_is_stable_and_idempotent() {
        assert_eq!(slugify("Book Title"), "book-title");
        assert_eq!(slugify("  Dell Inspiron 15!  "), "dell-inspiron-15");
        assert_eq!(slugify("Calculus 101 -- Textbook"), "calculus-101-textbook");
        let once = slugify("French Press Coffee Maker");
        assert_eq!(slugify(&once), once);
        assert_eq!(slugify("French Press Coffee Maker"), once);
    }
}
