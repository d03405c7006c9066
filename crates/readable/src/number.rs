//! Number abbreviation with K/M/B suffixes.

const UNITS: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Decimals kept for values that need no suffix.
const UNSCALED_DECIMALS: usize = 2;

/// Abbreviates `value` with the default precision.
///
/// Values of a thousand or more are scaled to a whole number of units
/// (`2194` becomes `2K`); smaller values keep up to two decimals.
pub fn abbreviation(value: f64) -> String {
    format_abbreviated(value, None)
}

/// Abbreviates `value` keeping up to `decimals` digits after the separator.
pub fn abbreviation_with(value: f64, decimals: usize) -> String {
    format_abbreviated(value, Some(decimals))
}

fn format_abbreviated(value: f64, decimals: Option<usize>) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let magnitude = value.abs();
    let unit = UNITS
        .iter()
        .position(|(threshold, _)| magnitude >= *threshold);
    let Some(mut index) = unit else {
        let text = format!("{:.*}", decimals.unwrap_or(UNSCALED_DECIMALS), value);
        return normalize_zero(remove_trailing_zeros(&text));
    };

    let decimals = decimals.unwrap_or(0);
    let mut text = format!("{:.*}", decimals, value / UNITS[index].0);
    // 999_999 rounds to "1000K"; carry into the next unit instead.
    while index > 0 && rounded_magnitude(&text) >= 1000.0 {
        index -= 1;
        text = format!("{:.*}", decimals, value / UNITS[index].0);
    }
    format!("{}{}", remove_trailing_zeros(&text), UNITS[index].1)
}

fn rounded_magnitude(text: &str) -> f64 {
    text.trim_start_matches('-').parse().unwrap_or(0.0)
}

fn normalize_zero(text: String) -> String {
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

/// Drops trailing zeros after the decimal separator, and the separator
/// itself when nothing is left behind it.
///
/// Text without a separator is returned unchanged, so `10000` stays intact.
pub fn remove_trailing_zeros(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Abbreviation for numeric primitives.
pub trait Abbreviate {
    /// See [`abbreviation`].
    fn abbreviation(&self) -> String;

    /// See [`abbreviation_with`].
    fn abbreviation_with(&self, decimals: usize) -> String;
}

macro_rules! abbreviate {
    ($($ty:ty),*) => {
        $(
            impl Abbreviate for $ty {
                fn abbreviation(&self) -> String {
                    abbreviation(*self as f64)
                }

                fn abbreviation_with(&self, decimals: usize) -> String {
                    abbreviation_with(*self as f64, decimals)
                }
            }
        )*
    };
}

abbreviate!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
