// shared/src/money.rs

const RUPEE: char = '₹';
const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;

/// Groups the integer part the Indian way: last three digits, then pairs.
/// `1234567` -> `12,34,567`.
fn group_indian(int_part: u64) -> String {
    let digits = int_part.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// en-IN number formatting with at most two fraction digits.
fn format_indian(value: f64) -> String {
    let neg = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let int_part = cents / 100;
    let frac = cents % 100;

    let mut out = String::new();
    if neg && cents > 0 {
        out.push('-');
    }
    out.push_str(&group_indian(int_part));
    if frac > 0 {
        let f = format!("{frac:02}");
        out.push('.');
        out.push_str(f.trim_end_matches('0'));
    }
    out
}

/// `₹12,34,567`
pub fn format_inr(value: f64) -> String {
    format!("{RUPEE}{}", format_indian(value))
}

/// Popup price line: currency when positive, otherwise "Price on Request".
pub fn price_label(price: f64) -> String {
    if price.is_finite() && price > 0.0 {
        format_inr(price)
    } else {
        "Price on Request".to_string()
    }
}

/// Dashboard notation: `2.50 Cr`, `75.00 L`, or plain en-IN grouping below a lakh.
pub fn format_compact_inr(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value >= CRORE {
        format!("{:.2} Cr", value / CRORE)
    } else if value >= LAKH {
        format!("{:.2} L", value / LAKH)
    } else {
        format_indian(value)
    }
}
