use serde::Serialize;
use std::cmp::Ordering;

/// Visual class of a single table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleTag {
    Header,
    AverageCell,
    ValueCell,
    DeviationPositive,
    DeviationNegative,
    DeviationZero,
}

impl StyleTag {
    pub const ALL: [Self; 6] = [
        Self::Header,
        Self::AverageCell,
        Self::ValueCell,
        Self::DeviationPositive,
        Self::DeviationNegative,
        Self::DeviationZero,
    ];

    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Header => "cell-company",
            Self::AverageCell => "cell-average",
            Self::ValueCell => "cell-value",
            Self::DeviationPositive => "cell-up",
            Self::DeviationNegative => "cell-down",
            Self::DeviationZero => "cell-flat",
        }
    }

    pub const fn css_rule(self) -> &'static str {
        match self {
            Self::Header => "font-weight: bold; background-color: #f8f9fa",
            Self::AverageCell => "background-color: #fff2cc; font-weight: bold",
            Self::ValueCell => "background-color: #e8f4f8",
            Self::DeviationPositive => "background-color: #d4edda; color: #155724",
            Self::DeviationNegative => "background-color: #f8d7da; color: #721c24",
            Self::DeviationZero => "background-color: #f8f9fa",
        }
    }

    pub const fn legend(self) -> &'static str {
        match self {
            Self::Header => "Company",
            Self::AverageCell => "Average Mix",
            Self::ValueCell => "Monthly Values",
            Self::DeviationPositive => "Positive Variability",
            Self::DeviationNegative => "Negative Variability",
            Self::DeviationZero => "No Variability",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Company,
    Average,
    Value,
    Deviation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
    Zero,
}

impl Sign {
    /// Sign of an already rounded numeric deviation.
    pub fn of(value: f64) -> Self {
        match value.partial_cmp(&0.0) {
            Some(Ordering::Greater) => Self::Positive,
            Some(Ordering::Less) => Self::Negative,
            _ => Self::Zero,
        }
    }
}

const STYLE_TABLE: [(ColumnRole, Option<Sign>, StyleTag); 6] = [
    (ColumnRole::Company, None, StyleTag::Header),
    (ColumnRole::Average, None, StyleTag::AverageCell),
    (ColumnRole::Value, None, StyleTag::ValueCell),
    (
        ColumnRole::Deviation,
        Some(Sign::Positive),
        StyleTag::DeviationPositive,
    ),
    (
        ColumnRole::Deviation,
        Some(Sign::Negative),
        StyleTag::DeviationNegative,
    ),
    (ColumnRole::Deviation, Some(Sign::Zero), StyleTag::DeviationZero),
];

/// Resolves the tag for a cell. Deviation columns key on the sign, every other
/// role ignores it.
pub fn style_for(role: ColumnRole, sign: Option<Sign>) -> StyleTag {
    let sign = match role {
        ColumnRole::Deviation => Some(sign.unwrap_or(Sign::Zero)),
        _ => None,
    };
    STYLE_TABLE
        .iter()
        .find(|(r, s, _)| *r == role && *s == sign)
        .map_or(StyleTag::DeviationZero, |(_, _, tag)| *tag)
}

/// One row of tags per data row, aligned with the table columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StyleMap {
    rows: Vec<Vec<StyleTag>>,
}

impl StyleMap {
    pub(crate) fn with_capacity(rows: usize) -> Self {
        Self {
            rows: Vec::with_capacity(rows),
        }
    }

    pub(crate) fn push_row(&mut self, tags: Vec<StyleTag>) {
        self.rows.push(tags);
    }

    pub fn rows(&self) -> &[Vec<StyleTag>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[StyleTag]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn tag(&self, row: usize, column: usize) -> Option<StyleTag> {
        self.rows.get(row).and_then(|tags| tags.get(column)).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_comes_from_numeric_value() {
        assert_eq!(Sign::of(0.01), Sign::Positive);
        assert_eq!(Sign::of(-0.01), Sign::Negative);
        assert_eq!(Sign::of(0.0), Sign::Zero);
        assert_eq!(Sign::of(-0.0), Sign::Zero);
    }

    #[test]
    fn lookup_covers_every_role() {
        assert_eq!(style_for(ColumnRole::Company, None), StyleTag::Header);
        assert_eq!(
            style_for(ColumnRole::Average, Some(Sign::Negative)),
            StyleTag::AverageCell
        );
        assert_eq!(style_for(ColumnRole::Value, None), StyleTag::ValueCell);
        assert_eq!(
            style_for(ColumnRole::Deviation, Some(Sign::Positive)),
            StyleTag::DeviationPositive
        );
        assert_eq!(
            style_for(ColumnRole::Deviation, Some(Sign::Negative)),
            StyleTag::DeviationNegative
        );
        assert_eq!(
            style_for(ColumnRole::Deviation, Some(Sign::Zero)),
            StyleTag::DeviationZero
        );
    }

    #[test]
    fn css_classes_are_distinct() {
        let mut classes: Vec<&str> = StyleTag::ALL.iter().map(|tag| tag.css_class()).collect();
        classes.sort_unstable();
        classes.dedup();
        assert_eq!(classes.len(), StyleTag::ALL.len());
    }
}
