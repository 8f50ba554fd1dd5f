//! Forecast engine
//!
//! Fetches records from a [`ForecastDataSource`], builds demand and capacity
//! matrices, and keeps them in a [`ResultCache`]. Aggregate matrices live
//! under `matrix-*` keys; per-client views live under `client-<id>-*` keys.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::source::ForecastDataSource;
use forecast_cache::{CacheKey, CacheStats, ResultCache};
use forecast_core::{
    CapacityMatrix, ClientRecord, DateRange, FilterConfig, GapCell, MatrixData,
    StaffCapacityRecord, TaskRecord,
};
use forecast_matrix::{
    align_capacity, build_capacity, gap_analysis, MatrixFilterEngine, MatrixObserver,
    MatrixTransformer, PerformanceReport, TracingObserver,
};
use forecast_validation::{StructuralValidator, ValidationResult};
use serde::Serialize;
use std::sync::Arc;

const MATRIX_CATEGORY: &str = "matrix";

/// Everything a forecast needs, fetched in one round
#[derive(Debug, Clone, Default)]
struct ForecastInputs {
    tasks: Vec<TaskRecord>,
    clients: Vec<ClientRecord>,
    staff: Vec<StaffCapacityRecord>,
}

/// Demand, capacity and their comparison for one range and filter
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReport {
    /// Filtered demand
    pub demand: MatrixData,
    /// Capacity on the demand matrix's axes
    pub capacity: CapacityMatrix,
    pub gaps: Vec<GapCell>,
    /// Present when validation is enabled
    pub validation: Option<ValidationResult>,
    pub performance: PerformanceReport,
}

impl ForecastReport {
    /// Cells where demand exceeds capacity
    pub fn shortages(&self) -> impl Iterator<Item = &GapCell> {
        self.gaps.iter().filter(|g| g.is_shortage())
    }
}

/// Cached demand/capacity forecasting
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    source: Arc<dyn ForecastDataSource>,
    config: EngineConfig,
    cache: ResultCache,
    transformer: MatrixTransformer,
    filter: MatrixFilterEngine,
    validator: StructuralValidator,
}

impl ForecastEngine {
    /// Create engine over `source`
    #[must_use]
    pub fn new(source: Arc<dyn ForecastDataSource>, config: EngineConfig) -> Self {
        let observer: Arc<dyn MatrixObserver> = Arc::new(TracingObserver);
        Self {
            cache: ResultCache::with_ttl(config.cache.max_capacity, config.cache.ttl()),
            source,
            config,
            transformer: MatrixTransformer::new().with_observer(Arc::clone(&observer)),
            filter: MatrixFilterEngine::new().with_observer(observer),
            validator: StructuralValidator::new(),
        }
    }

    /// With checkpoint observer for builds and filters
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn MatrixObserver>) -> Self {
        self.transformer = self.transformer.with_observer(Arc::clone(&observer));
        self.filter = self.filter.with_observer(observer);
        self
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The configured horizon starting with the current month
    #[must_use]
    pub fn default_range(&self) -> DateRange {
        let today = chrono::Utc::now().date_naive();
        DateRange::months_from(today, self.config.horizon_months)
    }

    /// Dense demand matrix for `range`, cached
    pub async fn demand_matrix(&self, range: &DateRange) -> EngineResult<Arc<MatrixData>> {
        let key = matrix_key("demand", range);
        self.cache
            .get_or_try_compute(&key, None, || async {
                let inputs = self.fetch_inputs().await?;
                self.build_demand(&inputs, range)
            })
            .await
    }

    /// Capacity matrix for `range`, cached
    pub async fn capacity_matrix(&self, range: &DateRange) -> EngineResult<Arc<CapacityMatrix>> {
        let key = matrix_key("capacity", range);
        self.cache
            .get_or_try_compute(&key, None, || async {
                let staff = self.source.staff_capacity().await?;
                let capacity = build_capacity(&staff, range)?;
                tracing::info!(
                    skills = capacity.skills.len(),
                    total_capacity = capacity.total_capacity,
                    "capacity matrix built"
                );
                Ok::<_, EngineError>(capacity)
            })
            .await
    }

    /// Demand matrix for `range` narrowed by `filter`
    pub async fn filtered_demand(
        &self,
        range: &DateRange,
        filter: &FilterConfig,
    ) -> EngineResult<MatrixData> {
        let base = self.demand_matrix(range).await?;
        Ok(self.filter.apply_filter(&base, filter))
    }

    /// Demand of one client for `range`, cached under the client's scope
    pub async fn client_demand(
        &self,
        client_id: &str,
        range: &DateRange,
    ) -> EngineResult<Arc<MatrixData>> {
        let key = CacheKey::client(client_id)
            .with("demand")
            .with(range.start)
            .with(range.end)
            .build();
        self.cache
            .get_or_try_compute(&key, None, || async {
                let base = self.demand_matrix(range).await?;
                let filter = FilterConfig::new().with_clients([client_id]);
                Ok::<_, EngineError>(self.filter.apply_filter(&base, &filter))
            })
            .await
    }

    /// Filtered demand, capacity on the same axes, and their gaps
    pub async fn forecast(
        &self,
        range: &DateRange,
        filter: &FilterConfig,
    ) -> EngineResult<ForecastReport> {
        let (base, capacity) =
            futures::try_join!(self.demand_matrix(range), self.capacity_matrix(range))?;

        let demand = self.filter.apply_filter(&base, filter);
        let capacity = align_capacity(&capacity, &demand.skills, &demand.months);
        let gaps = gap_analysis(&demand, &capacity);
        let performance = PerformanceReport::new(&base, &demand, filter);
        let validation = self
            .config
            .validate_results
            .then(|| self.validator.validate(&demand));

        let shortages = gaps.iter().filter(|g| g.is_shortage()).count();
        tracing::info!(
            months = demand.months.len(),
            skills = demand.skills.len(),
            total_demand = demand.total_demand,
            total_capacity = capacity.total_capacity,
            shortages,
            "forecast computed"
        );

        Ok(ForecastReport {
            demand,
            capacity,
            gaps,
            validation,
            performance,
        })
    }

    /// Drop cached results that include `client_id`
    ///
    /// Aggregate matrices contain every client, so they go too.
    pub async fn invalidate_client(&self, client_id: &str) -> EngineResult<()> {
        self.cache.clear_client(client_id)?;
        self.cache.clear_prefix(&format!("{MATRIX_CATEGORY}-"))?;
        self.cache.run_pending_tasks().await;
        tracing::info!(client_id, "client forecasts invalidated");
        Ok(())
    }

    /// Drop every cached result
    pub async fn invalidate_all(&self) {
        self.cache.clear();
        self.cache.run_pending_tasks().await;
        tracing::info!("all forecasts invalidated");
    }

    /// Cache statistics
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn fetch_inputs(&self) -> EngineResult<ForecastInputs> {
        let (tasks, clients, staff) = futures::try_join!(
            self.source.tasks(),
            self.source.clients(),
            self.source.staff_capacity(),
        )?;
        tracing::debug!(
            tasks = tasks.len(),
            clients = clients.len(),
            staff = staff.len(),
            "forecast inputs fetched"
        );
        Ok(ForecastInputs {
            tasks,
            clients,
            staff,
        })
    }

    fn build_demand(&self, inputs: &ForecastInputs, range: &DateRange) -> EngineResult<MatrixData> {
        if self.config.validate_results {
            let records =
                self.validator
                    .validate_records(&inputs.tasks, &inputs.clients, &inputs.staff);
            report_validation("records", &records);
        }

        let matrix =
            self.transformer
                .build_matrix(&inputs.tasks, &inputs.clients, &inputs.staff, range)?;

        if self.config.validate_results {
            report_validation("demand matrix", &self.validator.validate(&matrix));
        }
        Ok(matrix)
    }
}

fn matrix_key(kind: &str, range: &DateRange) -> String {
    CacheKey::new(MATRIX_CATEGORY, kind)
        .with(range.start)
        .with(range.end)
        .build()
}

/// Log findings; validation never blocks a result
fn report_validation(subject: &str, result: &ValidationResult) {
    for error in &result.errors {
        tracing::warn!(subject, kind = ?error.kind, "{}", error.message);
    }
    for warning in &result.warnings {
        tracing::debug!(subject, kind = ?warning.kind, "{}", warning.message);
    }
    if !result.is_valid {
        tracing::warn!(
            subject,
            errors = result.errors.len(),
            "validation failed, returning result anyway"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn matrix_keys_carry_kind_and_range() {
        let range = DateRange::months_from(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 3);
        assert_eq!(
            matrix_key("demand", &range),
            "matrix-demand-2025-01-01-2025-03-01"
        );
    }
}
