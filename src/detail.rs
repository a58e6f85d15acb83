use crate::error::VariabilityError;
use crate::formatting::{format_average, format_deviation, format_value};
use crate::model::{AnalysisMode, EntityId, EntityRecord, MONTH_LABELS, MONTHS_PER_YEAR};
use crate::styling::{ColumnRole, Sign, StyleTag, style_for};
use crate::table::evaluate;
use std::array;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthDetail {
    pub month: &'static str,
    pub value: String,
    pub deviation: String,
    pub tag: StyleTag,
}

/// Vertical breakdown of a single entity with unit-qualified labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDetail {
    pub name: String,
    pub id: EntityId,
    pub average_label: String,
    pub average_cell: String,
    pub value_label: String,
    pub variability_label: String,
    pub months: [MonthDetail; MONTHS_PER_YEAR],
}

pub fn describe_entity(
    record: &EntityRecord,
    mode: AnalysisMode,
) -> Result<EntityDetail, VariabilityError> {
    let (values, result) = evaluate(record, mode)?;
    let average_unit = result.average_unit.label();

    Ok(EntityDetail {
        name: record.name.clone(),
        id: record.id.clone(),
        average_label: format!("Average Mix ({average_unit})"),
        average_cell: format_average(result.average, mode),
        value_label: format!("Monthly Values ({average_unit})"),
        variability_label: format!("Variability ({})", result.deviation_unit.label()),
        months: array::from_fn(|month| {
            let deviation = result.deviations[month];
            MonthDetail {
                month: MONTH_LABELS[month],
                value: format_value(values[month], mode),
                deviation: format_deviation(deviation, mode),
                tag: style_for(ColumnRole::Deviation, Some(Sign::of(deviation))),
            }
        }),
    })
}

/// Looks an entity up by exact name first, then by id.
pub fn find_entity<'a>(entities: &'a [EntityRecord], key: &str) -> Option<&'a EntityRecord> {
    let key = key.trim();
    entities
        .iter()
        .find(|record| record.name == key)
        .or_else(|| {
            let id = EntityId::parse(key);
            entities.iter().find(|record| record.id == id)
        })
}
