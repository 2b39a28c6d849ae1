//! Number formatting compatible with C's `%g`, which the file format is specified in.

use std::fmt::Display;

/// Formats like `%.<precision>g`, honouring width and alignment of the format string.
#[derive(Debug, Clone, Copy)]
pub struct G {
    value: f64,
    precision: usize,
}

/// `%g`: 6 significant digits
pub fn g(value: f64) -> G {
    G {
        value,
        precision: 6,
    }
}

/// `%.9g`: 9 significant digits
pub fn g9(value: f64) -> G {
    G {
        value,
        precision: 9,
    }
}

impl Display for G {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format_g(self.value, self.precision))
    }
}

/// Negative zero is written as `0`.
pub fn format_g(x: f64, precision: usize) -> String {
    if x.is_nan() {
        return "nan".to_owned();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    if x == 0.0 {
        return "0".to_owned();
    }

    let precision = precision.max(1);
    // The exponent after rounding to `precision` significant digits decides the style
    let sci = format!("{:.*e}", precision - 1, x);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= precision as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", strip_zeros(mantissa), exp.abs())
    } else {
        let decimals = (precision as i32 - 1 - exp) as usize;
        strip_zeros(&format!("{x:.decimals$}")).to_owned()
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_notation() {
        assert_eq!(format_g(100.0, 6), "100");
        assert_eq!(format_g(-0.5, 6), "-0.5");
        assert_eq!(format_g(0.0001, 6), "0.0001");
        assert_eq!(format_g(0.1 + 0.2, 9), "0.3");
        assert_eq!(format_g(123456.7, 6), "123457");
        assert_eq!(format_g(-0.0, 6), "0");
    }

    #[test]
    fn scientific_notation() {
        assert_eq!(format_g(1e-7, 9), "1e-07");
        assert_eq!(format_g(1e-5, 9), "1e-05");
        assert_eq!(format_g(1234567.0, 6), "1.23457e+06");
        assert_eq!(format_g(42.577478518e6, 9), "42577478.5");
        assert_eq!(format_g(2.5e100, 6), "2.5e+100");
    }

    #[test]
    fn width_and_alignment() {
        assert_eq!(format!("{:>8}", g(2500.0)), "    2500");
        assert_eq!(format!("{:<6}|", g9(0.25)), "0.25  |");
    }
}
