use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculator::Breakdown;

/// Service name reported by the health check
pub const SERVICE_NAME: &str = "pack-calculator";

/// Request to calculate a pack distribution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackRequest {
    pub quantity: i64,
    /// Per-request pack sizes; the configured sizes are used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_sizes: Option<Vec<i64>>,
}

impl PackRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity <= 0 {
            return Err(ValidationError::new("quantity must be greater than 0"));
        }
        Ok(())
    }

    pub fn has_pack_sizes(&self) -> bool {
        self.pack_sizes.as_ref().is_some_and(|sizes| !sizes.is_empty())
    }

    /// Only the positive sizes from the request, in the order given
    pub fn valid_pack_sizes(&self) -> Vec<u64> {
        self.pack_sizes
            .iter()
            .flatten()
            .filter(|&&size| size > 0)
            .map(|&size| size as u64)
            .collect()
    }
}

/// Calculated pack distribution with totals
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackResponse {
    pub quantity: i64,
    pub total_items: u64,
    pub total_packs: u64,
    pub pack_breakdown: Breakdown,
    pub pack_sizes_used: Vec<u64>,
}

impl PackResponse {
    pub fn new(quantity: i64, pack_breakdown: Breakdown, pack_sizes_used: Vec<u64>) -> Self {
        let total_items = pack_breakdown.iter().map(|(size, count)| size * count).sum();
        let total_packs = pack_breakdown.values().sum();
        PackResponse {
            quantity,
            total_items,
            total_packs,
            pack_breakdown,
            pack_sizes_used,
        }
    }

    /// Items shipped beyond what was ordered
    pub fn overshipment(&self) -> u64 {
        self.total_items.saturating_sub(self.quantity.max(0) as u64)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdatePackSizesRequest {
    pub pack_sizes: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackSizesResponse {
    pub pack_sizes: Vec<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdatePackSizesResponse {
    pub message: String,
    pub pack_sizes: Vec<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        HealthResponse {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: impl ToString) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}

/// Rejected input, reported back to the caller as-is
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError(message.into())
    }
}
