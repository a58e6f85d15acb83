use crate::error::VariabilityError;
use crate::formatting::format_grouped;
use crate::model::{AnalysisMode, EntityRecord, MONTHS_PER_YEAR};
use crate::table::select_series;
use ndarray::{Array2, Axis};
use serde::Serialize;
use std::array;

/// Cross-entity figures for one analysis mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalStatistics {
    pub overall_average: f64,
    pub monthly_averages: [f64; MONTHS_PER_YEAR],
    /// Population standard deviation of every monthly value.
    pub total_variability: f64,
    pub entities_count: usize,
}

impl HistoricalStatistics {
    pub fn overall_average_label(&self, mode: AnalysisMode) -> String {
        match mode {
            AnalysisMode::Percentage => format!("{:.2}%", self.overall_average),
            AnalysisMode::Absolute => format_grouped(self.overall_average, 0),
        }
    }
}

/// Returns `None` when there are no entities to aggregate.
pub fn calculate_statistics(
    entities: &[EntityRecord],
    mode: AnalysisMode,
) -> Result<Option<HistoricalStatistics>, VariabilityError> {
    if entities.is_empty() {
        return Ok(None);
    }

    let matrix = series_matrix(entities, mode)?;

    let monthly = matrix.mean_axis(Axis(0));
    let monthly_averages: [f64; MONTHS_PER_YEAR] = array::from_fn(|month| {
        monthly
            .as_ref()
            .map_or(0.0, |averages| averages[month])
    });

    Ok(Some(HistoricalStatistics {
        overall_average: matrix.mean().unwrap_or(0.0),
        monthly_averages,
        total_variability: matrix.std(0.0),
        entities_count: entities.len(),
    }))
}

/// Mean of the per-entity yearly averages, the headline figure of a run.
pub fn overall_average(
    entities: &[EntityRecord],
    mode: AnalysisMode,
) -> Result<Option<f64>, VariabilityError> {
    if entities.is_empty() {
        return Ok(None);
    }
    let per_entity = series_matrix(entities, mode)?.mean_axis(Axis(1));
    Ok(per_entity.and_then(|averages| averages.mean()))
}

fn series_matrix(
    entities: &[EntityRecord],
    mode: AnalysisMode,
) -> Result<Array2<f64>, VariabilityError> {
    let rows = entities
        .iter()
        .map(|record| select_series(record, mode))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Array2::from_shape_fn(
        (rows.len(), MONTHS_PER_YEAR),
        |(row, month)| rows[row][month],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityId;

    fn entity(name: &str, counts: [f64; 12]) -> EntityRecord {
        EntityRecord::from_counts(name, EntityId::Text(name.to_string()), counts)
    }

    #[test]
    fn empty_input_has_no_statistics() {
        assert_eq!(calculate_statistics(&[], AnalysisMode::Absolute), Ok(None));
    }

    #[test]
    fn aggregates_across_entities() {
        let mut peaked = [10.0; 12];
        peaked[0] = 34.0;
        let entities = [entity("steady", [10.0; 12]), entity("peaked", peaked)];
        let stats = calculate_statistics(&entities, AnalysisMode::Absolute)
            .unwrap()
            .unwrap();

        assert_eq!(stats.entities_count, 2);
        assert!((stats.overall_average - 11.0).abs() < 1e-9);
        assert!((stats.monthly_averages[0] - 22.0).abs() < 1e-9);
        assert!((stats.monthly_averages[5] - 10.0).abs() < 1e-9);
        // 23 values of 10 and one of 34 around a mean of 11
        let expected = ((23.0 * 1.0 + 23.0 * 23.0) / 24.0_f64).sqrt();
        assert!((stats.total_variability - expected).abs() < 1e-9);
        assert_eq!(stats.overall_average_label(AnalysisMode::Absolute), "11");
    }

    #[test]
    fn percentage_mode_averages_to_one_twelfth() {
        let entities = [
            entity("a", [5.0; 12]),
            entity("b", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]),
        ];
        let stats = calculate_statistics(&entities, AnalysisMode::Percentage)
            .unwrap()
            .unwrap();
        assert_eq!(stats.overall_average_label(AnalysisMode::Percentage), "8.33%");
    }

    #[test]
    fn overall_average_is_mean_of_entity_means() {
        let entities = [entity("low", [12.0; 12]), entity("high", [36.0; 12])];
        let average = overall_average(&entities, AnalysisMode::Absolute).unwrap();
        assert_eq!(average, Some(24.0));
        assert_eq!(overall_average(&[], AnalysisMode::Absolute), Ok(None));

        let stats = calculate_statistics(&entities, AnalysisMode::Absolute)
            .unwrap()
            .unwrap();
        assert!((stats.overall_average - 24.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_entity_is_reported() {
        let mut broken = entity("broken", [1.0; 12]);
        broken.absolute_values.truncate(3);
        assert!(calculate_statistics(&[broken], AnalysisMode::Absolute).is_err());
    }
}
