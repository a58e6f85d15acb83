use thiserror::Error;

use crate::model::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariabilityError {
    #[error("monthly series must contain exactly 12 values, got {actual}")]
    InvalidSeriesLength { actual: usize },

    #[error("invalid data for entity {entity_id}: {reason}")]
    InvalidEntityData { entity_id: EntityId, reason: String },

    #[error("unknown analysis mode '{0}' (expected 'percentage' or 'absolute')")]
    InvalidMode(String),
}

impl VariabilityError {
    pub(crate) fn entity(entity_id: &EntityId, reason: impl Into<String>) -> Self {
        Self::InvalidEntityData {
            entity_id: entity_id.clone(),
            reason: reason.into(),
        }
    }
}
