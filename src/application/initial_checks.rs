// Initial checks - Heuristic axis-truncation and cherry-picking detection
use crate::domain::check::{CheckResult, InitialChecks};
use crate::domain::series::NumericSeries;
use crate::domain::table::{DataTable, TableError};

const AXIS_TRUNCATED: &str = "The axis may be truncated, potentially misleading the viewer.";
const AXIS_OK: &str = "Axes appear properly scaled.";
const RANGE_NARROWED: &str = "The chart data may be cherry-picked, not reflecting the full dataset.";
const RANGE_EXCEEDED: &str = "The chart data extends beyond the range of the full dataset, so the two tables may not describe the same data.";
const TREND_DIFFERS: &str = "The chart data may be cherry-picked, as the overall trend differs from the full dataset.";
const REPRESENTATIVE: &str = "Data appears representative of the entire dataset.";

/// Which table columns carry the label and the value.
#[derive(Debug, Clone)]
pub struct SeriesColumns {
    pub value: String,
    pub label: Option<String>,
}

impl SeriesColumns {
    fn numeric(&self, table: &DataTable) -> Result<NumericSeries, TableError> {
        let raw = table.value_series(&self.value, self.label.as_deref())?;
        let series = raw.normalize();
        if series.len() < raw.len() {
            tracing::debug!(
                "Dropped {} non-numeric values from column '{}'",
                raw.len() - series.len(),
                self.value
            );
        }
        Ok(series)
    }
}

#[derive(Debug, Clone)]
pub struct InitialChecker {
    columns: SeriesColumns,
}

impl InitialChecker {
    pub fn new(columns: SeriesColumns) -> Self {
        Self { columns }
    }

    /// Run each check whose inputs are present. A failing check leaves its
    /// slot empty; this never fails as a whole.
    pub fn run(&self, chart: Option<&DataTable>, full: Option<&DataTable>) -> InitialChecks {
        let chart = chart.filter(|t| !t.is_empty());
        let full = full.filter(|t| !t.is_empty());

        let mut checks = InitialChecks::default();

        if let Some(chart) = chart {
            checks.axis = self.check_truncated_axes(chart).unwrap_or_else(|e| {
                tracing::warn!("Axis check skipped: {}", e);
                CheckResult::Empty
            });
        }

        if let (Some(chart), Some(full)) = (chart, full) {
            checks.cherry_pick = self.check_cherry_picking(full, chart).unwrap_or_else(|e| {
                tracing::warn!("Cherry-picking check skipped: {}", e);
                CheckResult::Empty
            });
        }

        tracing::debug!(axis = ?checks.axis, cherry_pick = ?checks.cherry_pick, "Initial checks complete");
        checks
    }

    /// A value axis whose floor is strictly above zero is treated as truncated.
    pub fn check_truncated_axes(&self, chart: &DataTable) -> Result<CheckResult, TableError> {
        let series = self.columns.numeric(chart)?;
        if series.is_empty() {
            return Ok(CheckResult::Empty);
        }

        Ok(match series.min() {
            Some(min) if min > 0.0 => CheckResult::warning(AXIS_TRUNCATED),
            _ => CheckResult::informational(AXIS_OK),
        })
    }

    /// Compare the chart subset's range and trend against the full dataset.
    pub fn check_cherry_picking(
        &self,
        full: &DataTable,
        chart: &DataTable,
    ) -> Result<CheckResult, TableError> {
        let full = self.columns.numeric(full)?;
        let chart = self.columns.numeric(chart)?;

        let (Some((full_min, full_max)), Some((chart_min, chart_max))) = (full.range(), chart.range())
        else {
            return Ok(CheckResult::Empty);
        };

        if chart_min > full_min || chart_max < full_max {
            return Ok(CheckResult::warning(RANGE_NARROWED));
        }

        if chart_min < full_min || chart_max > full_max {
            return Ok(CheckResult::warning(RANGE_EXCEEDED));
        }

        if chart.trend() != full.trend() {
            if let (Some(first), Some(last)) = (chart.points().first(), chart.points().last()) {
                tracing::debug!(
                    "Chart trend {:?} ({} to {}) differs from full dataset trend {:?}",
                    chart.trend(),
                    first.label,
                    last.label,
                    full.trend()
                );
            }
            return Ok(CheckResult::warning(TREND_DIFFERS));
        }

        Ok(CheckResult::informational(REPRESENTATIVE))
    }
}
