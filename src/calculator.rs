use crate::error::VariabilityError;
use crate::formatting::round_to;
use crate::model::{AnalysisMode, MONTHS_PER_YEAR, MonthlySeries, Unit};

/// Yearly average of one entity and each month's signed distance from it.
#[derive(Debug, Clone, PartialEq)]
pub struct VariabilityResult {
    pub average: f64,
    pub deviations: MonthlySeries,
    pub average_unit: Unit,
    pub deviation_unit: Unit,
}

/// Averages the 12 monthly values and measures every month against it.
///
/// Both the average and the deviations are rounded to two decimals, half away
/// from zero. Each deviation is taken from the raw monthly value and the
/// rounded average, so the rendered table and the sign classification share
/// a single number.
pub fn compute(
    monthly_values: &[f64],
    mode: AnalysisMode,
) -> Result<VariabilityResult, VariabilityError> {
    let series = MonthlySeries::try_from(monthly_values)?;
    let average = round_to(series.mean(), 2);

    let mut deviations = [0.0; MONTHS_PER_YEAR];
    for (slot, value) in deviations.iter_mut().zip(series.iter()) {
        *slot = round_to(value - average, 2);
    }

    Ok(VariabilityResult {
        average,
        deviations: MonthlySeries::new(deviations),
        average_unit: mode.average_unit(),
        deviation_unit: mode.deviation_unit(),
    })
}
