use crate::model::AnalysisMode;

/// Rounds half away from zero to `decimals` places and clears negative zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Fixed-point text with `,` thousands separators, e.g. `-12,345.60`.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let rounded = round_to(value, i32::try_from(decimals).unwrap_or(i32::MAX));
    let digits = format!("{:.*}", decimals, rounded.abs());
    let (int_part, frac_part) = digits
        .split_once('.')
        .map_or((digits.as_str(), None), |(int, frac)| (int, Some(frac)));

    let mut out = String::with_capacity(digits.len() + int_part.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    let len = int_part.len();
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

pub fn format_average(average: f64, mode: AnalysisMode) -> String {
    match mode {
        AnalysisMode::Percentage => format!("{:.2}%", round_to(average, 2)),
        AnalysisMode::Absolute => format_grouped(average, 2),
    }
}

/// Monthly value cell. Counts drop their decimals, percentages keep two.
pub fn format_value(value: f64, mode: AnalysisMode) -> String {
    match mode {
        AnalysisMode::Percentage => format!("{:.2}%", round_to(value, 2)),
        AnalysisMode::Absolute => format_grouped(value, 0),
    }
}

/// Signed deviation cell. Zero renders as `+0.00`.
pub fn format_deviation(deviation: f64, mode: AnalysisMode) -> String {
    let rounded = round_to(deviation, 2);
    let magnitude = match mode {
        AnalysisMode::Percentage => format!("{:.2}", rounded.abs()),
        AnalysisMode::Absolute => format_grouped(rounded.abs(), 2),
    };
    if rounded < 0.0 {
        format!("-{magnitude}")
    } else {
        format!("+{magnitude}")
    }
}
