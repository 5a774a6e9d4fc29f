//! Pack calculation business logic
//! Validates requests, picks the pack sizes to use and runs the calculator

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::calculator::{CalculatorError, PackCalculator};
use crate::models::{PackRequest, PackResponse, ValidationError};
use crate::repository::PackRepository;

/// Largest quantity accepted unless configured otherwise.
/// Calculator tables grow linearly with the quantity plus the largest
/// pack size, so pack sizes are held to the same limit.
pub const DEFAULT_MAX_QUANTITY: i64 = 10_000_000;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("failed to access pack sizes: {0}")]
    Storage(anyhow::Error),
}

impl ServiceError {
    /// True when the caller can fix the request
    pub fn is_client_error(&self) -> bool {
        match self {
            ServiceError::Validation(_) => true,
            ServiceError::Calculation(err) => err.is_input_error(),
            ServiceError::Storage(_) => false,
        }
    }
}

pub struct PackService {
    calculator: Box<dyn PackCalculator>,
    repository: Arc<dyn PackRepository>,
    max_quantity: i64,
}

impl PackService {
    pub fn new(calculator: Box<dyn PackCalculator>, repository: Arc<dyn PackRepository>) -> Self {
        PackService {
            calculator,
            repository,
            max_quantity: DEFAULT_MAX_QUANTITY,
        }
    }

    pub fn with_max_quantity(mut self, max_quantity: i64) -> Self {
        self.max_quantity = max_quantity;
        self
    }

    /// Calculate the pack distribution for a request.
    /// Uses the request's own pack sizes when it has any, the configured ones otherwise.
    pub fn calculate_pack_distribution(&self, request: &PackRequest) -> Result<PackResponse, ServiceError> {
        request.validate()?;
        if request.quantity > self.max_quantity {
            return Err(ValidationError::new(format!(
                "quantity must not exceed {}",
                self.max_quantity
            ))
            .into());
        }

        let pack_sizes = if request.has_pack_sizes() {
            request.valid_pack_sizes()
        } else {
            self.repository.get_all_pack_sizes().map_err(ServiceError::Storage)?
        };

        if pack_sizes.is_empty() {
            return Err(ValidationError::new("no valid pack sizes available").into());
        }
        // Stored sizes are checked too, the limit may have changed since they were set
        self.check_pack_size_limit(pack_sizes.iter().copied())?;

        let breakdown = self.calculator.calculate(request.quantity, &pack_sizes)?;
        let response = PackResponse::new(request.quantity, breakdown, pack_sizes);
        info!(
            quantity = response.quantity,
            total_items = response.total_items,
            total_packs = response.total_packs,
            "pack distribution calculated"
        );
        Ok(response)
    }

    pub fn available_pack_sizes(&self) -> Result<Vec<u64>, ServiceError> {
        self.repository.get_all_pack_sizes().map_err(ServiceError::Storage)
    }

    /// Replace the configured pack sizes, returning them as stored
    pub fn update_pack_sizes(&self, sizes: &[i64]) -> Result<Vec<u64>, ServiceError> {
        if sizes.is_empty() {
            return Err(ValidationError::new("pack sizes cannot be empty").into());
        }
        if let Some(size) = sizes.iter().find(|&&size| size <= 0) {
            return Err(ValidationError::new(format!("all pack sizes must be positive, got: {}", size)).into());
        }

        let sizes: Vec<u64> = sizes.iter().map(|&size| size as u64).collect();
        self.check_pack_size_limit(sizes.iter().copied())?;
        self.repository.set_pack_sizes(&sizes).map_err(ServiceError::Storage)?;
        info!(?sizes, "pack sizes updated");
        self.available_pack_sizes()
    }

    fn check_pack_size_limit(&self, sizes: impl IntoIterator<Item = u64>) -> Result<(), ValidationError> {
        let limit = u64::try_from(self.max_quantity).unwrap_or(0);
        match sizes.into_iter().find(|&size| size > limit) {
            Some(size) => Err(ValidationError::new(format!(
                "pack sizes must not exceed {}, got: {}",
                self.max_quantity, size
            ))),
            None => Ok(()),
        }
    }
}
