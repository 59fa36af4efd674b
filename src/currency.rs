// Number formatting for the result screen.
//
// Prices follow the `id-ID` locale with the `IDR` currency and no
// fractional digits, the same output a browser gives for
// `Intl.NumberFormat('id-ID', { style: 'currency', currency: 'IDR',
// maximumFractionDigits: 0 })`.

const CURRENCY_SYMBOL: &str = "Rp";
/// `id-ID` puts a no-break space between the symbol and the amount.
const SYMBOL_SEPARATOR: char = '\u{a0}';
const GROUP_SEPARATOR: char = '.';

/// Format `amount` as Indonesian rupiah, e.g. `15000.0` → `"Rp 15.000"`.
pub fn format_rupiah(amount: f64) -> String {
    if amount.is_nan() {
        return format!("{CURRENCY_SYMBOL}{SYMBOL_SEPARATOR}NaN");
    }

    // f64::round rounds half away from zero, which is what Intl does.
    // Intl keeps the sign of anything that rounds to negative zero.
    let rounded = amount.abs().round();
    let negative = amount.is_sign_negative();
    let digits = if rounded.is_infinite() {
        "∞".to_string()
    } else {
        group_thousands(&format!("{rounded:.0}"))
    };

    let sign = if negative { "-" } else { "" };
    format!("{sign}{CURRENCY_SYMBOL}{SYMBOL_SEPARATOR}{digits}")
}

/// Format an emission figure in kilograms: shortest representation, but
/// always with at least one decimal so ranges read `2.0 - 2.8`.
pub fn format_kg(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    out
}
