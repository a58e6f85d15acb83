use crate::calculator::{VariabilityResult, compute};
use crate::error::VariabilityError;
use crate::formatting::{format_average, format_deviation, format_value};
use crate::model::{
    AnalysisMode, EntityRecord, MONTH_LABELS, MONTHS_PER_YEAR, percentages_from_counts,
};
use crate::styling::{ColumnRole, Sign, StyleMap, StyleTag, style_for};
use std::array;
use tracing::debug;

pub const COMPANY_COLUMN: &str = "Company";
pub const AVERAGE_COLUMN: &str = "Average Mix";
pub const VARIABILITY_SUFFIX: &str = "_var";
pub const COLUMN_COUNT: usize = 2 + 2 * MONTHS_PER_YEAR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCells {
    pub value: String,
    pub deviation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub entity_name: String,
    pub average_cell: String,
    pub months: [MonthCells; MONTHS_PER_YEAR],
}

impl TableRow {
    /// The row's 26 cells in column order.
    pub fn cells(&self) -> Vec<&str> {
        let mut cells = Vec::with_capacity(COLUMN_COUNT);
        cells.push(self.entity_name.as_str());
        cells.push(self.average_cell.as_str());
        for month in &self.months {
            cells.push(month.value.as_str());
            cells.push(month.deviation.as_str());
        }
        cells
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub mode: AnalysisMode,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    fn empty(mode: AnalysisMode, capacity: usize) -> Self {
        Self {
            mode,
            columns: column_names(),
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// `Company`, `Average Mix`, then `<Month>` / `<Month>_var` for January
/// through December.
pub fn column_names() -> Vec<String> {
    let mut columns = Vec::with_capacity(COLUMN_COUNT);
    columns.push(COMPANY_COLUMN.to_string());
    columns.push(AVERAGE_COLUMN.to_string());
    for month in MONTH_LABELS {
        columns.push(month.to_string());
        columns.push(format!("{month}{VARIABILITY_SUFFIX}"));
    }
    columns
}

/// Builds one row per entity, in input order, together with the style tag of
/// every cell. The first malformed entity aborts the whole build.
pub fn build(
    entities: &[EntityRecord],
    mode: AnalysisMode,
) -> Result<(Table, StyleMap), VariabilityError> {
    let mut table = Table::empty(mode, entities.len());
    let mut styles = StyleMap::with_capacity(entities.len());

    for record in entities {
        let (values, result) = evaluate(record, mode)?;
        debug!(
            entity = %record.id,
            name = %record.name,
            average = result.average,
            "computed variability"
        );
        let (row, tags) = shape_row(record, &values, &result, mode);
        table.rows.push(row);
        styles.push_row(tags);
    }

    Ok((table, styles))
}

/// Validates a record and runs the calculator on the series selected by mode.
pub(crate) fn evaluate(
    record: &EntityRecord,
    mode: AnalysisMode,
) -> Result<([f64; MONTHS_PER_YEAR], VariabilityResult), VariabilityError> {
    let series = select_series(record, mode)?;
    let result = compute(&series, mode)
        .map_err(|err| VariabilityError::entity(&record.id, err.to_string()))?;
    Ok((series, result))
}

pub(crate) fn select_series(
    record: &EntityRecord,
    mode: AnalysisMode,
) -> Result<[f64; MONTHS_PER_YEAR], VariabilityError> {
    if record.name.trim().is_empty() {
        return Err(VariabilityError::entity(&record.id, "company name is empty"));
    }
    let absolute = checked_series(record, &record.absolute_values, "absolute")?;
    match mode {
        AnalysisMode::Absolute => Ok(absolute),
        AnalysisMode::Percentage => match &record.percentage_values {
            Some(values) => checked_series(record, values, "percentage"),
            None => Ok(percentages_from_counts(&absolute)),
        },
    }
}

fn checked_series(
    record: &EntityRecord,
    values: &[f64],
    kind: &str,
) -> Result<[f64; MONTHS_PER_YEAR], VariabilityError> {
    let series: [f64; MONTHS_PER_YEAR] = values.try_into().map_err(|_| {
        VariabilityError::entity(
            &record.id,
            format!(
                "expected {MONTHS_PER_YEAR} {kind} values, got {}",
                values.len()
            ),
        )
    })?;
    if let Some(month) = series.iter().position(|value| !value.is_finite()) {
        return Err(VariabilityError::entity(
            &record.id,
            format!("non-numeric {kind} value for {}", MONTH_LABELS[month]),
        ));
    }
    Ok(series)
}

fn shape_row(
    record: &EntityRecord,
    values: &[f64; MONTHS_PER_YEAR],
    result: &VariabilityResult,
    mode: AnalysisMode,
) -> (TableRow, Vec<StyleTag>) {
    let mut tags = Vec::with_capacity(COLUMN_COUNT);
    tags.push(style_for(ColumnRole::Company, None));
    tags.push(style_for(ColumnRole::Average, None));
    for deviation in result.deviations.iter() {
        tags.push(style_for(ColumnRole::Value, None));
        tags.push(style_for(ColumnRole::Deviation, Some(Sign::of(deviation))));
    }

    let row = TableRow {
        entity_name: record.name.clone(),
        average_cell: format_average(result.average, mode),
        months: array::from_fn(|month| MonthCells {
            value: format_value(values[month], mode),
            deviation: format_deviation(result.deviations[month], mode),
        }),
    };
    (row, tags)
}
