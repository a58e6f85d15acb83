//! Monthly variability of per-company volumes against their own yearly
//! average, shaped into a row-per-company table with a parallel style map.

pub mod calculator;
pub mod cli;
pub mod detail;
pub mod error;
pub mod export;
pub mod formatting;
pub mod logging;
pub mod model;
pub mod progress;
pub mod report;
pub mod sources;
pub mod statistics;
pub mod styling;
pub mod summary;
pub mod table;

pub use calculator::{VariabilityResult, compute};
pub use detail::{EntityDetail, describe_entity, find_entity};
pub use error::VariabilityError;
pub use model::{
    AnalysisMode, EntityId, EntityRecord, MONTH_LABELS, MonthlySeries, Unit,
    percentages_from_counts,
};
pub use statistics::{HistoricalStatistics, calculate_statistics, overall_average};
pub use styling::{StyleMap, StyleTag};
pub use table::{Table, TableRow, build};
