/// Format a number for display.
///
/// Without a precision this is the shortest text that parses back to the
/// same `f64`. With one, integers print without decimals and everything else
/// is rounded to `precision` places with trailing zeros dropped.
pub fn format_number(n: f64, precision: Option<usize>) -> String {
    // Fold -0 into 0.
    let n = if n == 0.0 { 0.0 } else { n };
    if n.is_nan() {
        return "#NAN!".to_string();
    }
    if n.is_infinite() {
        return "#INF!".to_string();
    }

    let Some(precision) = precision else {
        return n.to_string();
    };

    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{:.0}", n);
    }

    let fixed = format!("{:.*}", precision, n);
    if !fixed.contains('.') {
        return fixed;
    }
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
