use crate::error::VariabilityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

pub const MONTHS_PER_YEAR: usize = 12;

pub const MONTH_LABELS: [&str; MONTHS_PER_YEAR] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Twelve monthly values, January first. Missing months are stored as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MonthlySeries([f64; MONTHS_PER_YEAR]);

impl MonthlySeries {
    pub const fn new(values: [f64; MONTHS_PER_YEAR]) -> Self {
        Self(values)
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn mean(&self) -> f64 {
        self.total() / MONTHS_PER_YEAR as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

impl TryFrom<&[f64]> for MonthlySeries {
    type Error = VariabilityError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let array: [f64; MONTHS_PER_YEAR] =
            values
                .try_into()
                .map_err(|_| VariabilityError::InvalidSeriesLength {
                    actual: values.len(),
                })?;
        Ok(Self(array))
    }
}

impl Index<usize> for MonthlySeries {
    type Output = f64;

    fn index(&self, month: usize) -> &Self::Output {
        &self.0[month]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl EntityId {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Text(trimmed.to_string()), Self::Number)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    pub id: EntityId,
    pub absolute_values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_values: Option<Vec<f64>>,
}

impl EntityRecord {
    /// Builds a record from monthly counts, deriving the percentage series.
    pub fn from_counts(
        name: impl Into<String>,
        id: EntityId,
        counts: [f64; MONTHS_PER_YEAR],
    ) -> Self {
        Self {
            name: name.into(),
            id,
            absolute_values: counts.to_vec(),
            percentage_values: Some(percentages_from_counts(&counts).to_vec()),
        }
    }
}

/// `count / total * 100` per month; all zeros when the total is zero.
pub fn percentages_from_counts(counts: &[f64; MONTHS_PER_YEAR]) -> [f64; MONTHS_PER_YEAR] {
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return [0.0; MONTHS_PER_YEAR];
    }
    counts.map(|count| count / total * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisMode {
    Percentage,
    Absolute,
}

impl AnalysisMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Absolute => "absolute",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Percentage => "Percentages",
            Self::Absolute => "Absolute",
        }
    }

    pub const fn average_unit(self) -> Unit {
        match self {
            Self::Percentage => Unit::Percent,
            Self::Absolute => Unit::Count,
        }
    }

    pub const fn deviation_unit(self) -> Unit {
        match self {
            Self::Percentage => Unit::PercentagePoints,
            Self::Absolute => Unit::Count,
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AnalysisMode {
    type Err = VariabilityError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percentages" => Ok(Self::Percentage),
            "absolute" => Ok(Self::Absolute),
            _ => Err(VariabilityError::InvalidMode(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Percent,
    PercentagePoints,
    Count,
}

impl Unit {
    /// Label used next to headings, e.g. `Average Mix (%)`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Percent => "%",
            Self::PercentagePoints => "pp",
            Self::Count => "calls",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_requires_twelve_values() {
        let short = vec![1.0; 11];
        assert_eq!(
            MonthlySeries::try_from(short.as_slice()),
            Err(VariabilityError::InvalidSeriesLength { actual: 11 })
        );
        let full = vec![2.0; 12];
        let series = MonthlySeries::try_from(full.as_slice()).unwrap();
        assert!((series.total() - 24.0).abs() < f64::EPSILON);
        assert!((series[11] - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percentages_sum_to_hundred() {
        let counts = [
            1200.0, 1100.0, 1300.0, 1400.0, 1500.0, 1600.0, 1700.0, 1600.0, 1500.0, 1400.0,
            1300.0, 1200.0,
        ];
        let percentages = percentages_from_counts(&counts);
        let sum: f64 = percentages.iter().sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((percentages[0] - 1200.0 / 16800.0 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn percentages_of_empty_year_are_zero() {
        assert_eq!(percentages_from_counts(&[0.0; 12]), [0.0; 12]);
    }

    #[test]
    fn mode_parsing_accepts_known_names_only() {
        assert_eq!("Percentage".parse(), Ok(AnalysisMode::Percentage));
        assert_eq!("percentages".parse(), Ok(AnalysisMode::Percentage));
        assert_eq!(" ABSOLUTE ".parse(), Ok(AnalysisMode::Absolute));
        assert_eq!(
            "relative".parse::<AnalysisMode>(),
            Err(VariabilityError::InvalidMode("relative".to_string()))
        );
    }

    #[test]
    fn entity_id_parses_numbers_and_text() {
        assert_eq!(EntityId::parse(" 42 "), EntityId::Number(42));
        assert_eq!(EntityId::parse("acme-7"), EntityId::Text("acme-7".to_string()));
        assert_eq!(EntityId::Number(7).to_string(), "7");
    }

    #[test]
    fn records_deserialize_with_optional_percentages() {
        let json = r#"[{"name":"Monarch HVAC","id":1,"absolute_values":[1,1,1,1,1,1,1,1,1,1,1,1]},
                       {"name":"Elite","id":"E-2","absolute_values":[],"percentage_values":[]}]"#;
        let records: Vec<EntityRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].id, EntityId::Number(1));
        assert!(records[0].percentage_values.is_none());
        assert_eq!(records[1].id, EntityId::Text("E-2".to_string()));
        assert_eq!(records[1].percentage_values, Some(Vec::new()));
    }
}
