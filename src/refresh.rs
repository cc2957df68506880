//! Contract between the filter coordinator in [`crate::state`] and the
//! chart renderers.
//!
//! Renderers never look at the store or the predicate. They receive a
//! [`ViewRefresh`] and redraw every chart from it, discarding whatever they
//! drew before. Full re-render on every change is fine at this dataset size.

use crate::data::model::{Origin, RecordStore};
use crate::data::series::DashboardSeries;

/// Messages the UI sends to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardEvent {
    YearChanged(YearChoice),
    SliceClicked(Origin),
    ResetClicked,
}

/// Value of the year selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearChoice {
    #[default]
    All,
    Year(i32),
}

/// How the last refresh distributed data over the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Every chart, pie included, shows the same subset.
    Uniform,
    /// The pie keeps the full set with `highlight` emphasised; the four
    /// detail charts show only that origin.
    TwoPhase { highlight: Origin },
}

/// One complete redraw instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRefresh {
    pub mode: RefreshMode,
    /// Store indices behind the pie.
    pub categorical: Vec<usize>,
    /// Store indices behind line, scatter, bar and heatmap.
    pub detail: Vec<usize>,
    pub series: DashboardSeries,
    /// Monotonic counter, one per refresh.
    pub generation: u64,
}

impl ViewRefresh {
    /// Redraw all five charts from `subset`.
    pub fn uniform(store: &RecordStore, subset: Vec<usize>, generation: u64) -> Self {
        let series = DashboardSeries::build(store, &subset, &subset);
        log::debug!(
            "uniform refresh #{generation}: {} of {} records",
            subset.len(),
            store.len()
        );
        ViewRefresh {
            mode: RefreshMode::Uniform,
            categorical: subset.clone(),
            detail: subset,
            series,
            generation,
        }
    }

    /// Redraw the pie from `full` and the detail charts from `narrowed`.
    pub fn two_phase(
        store: &RecordStore,
        full: Vec<usize>,
        narrowed: Vec<usize>,
        highlight: Origin,
        generation: u64,
    ) -> Self {
        let series = DashboardSeries::build(store, &full, &narrowed);
        log::debug!(
            "two-phase refresh #{generation}: pie {} records, details {} records ({highlight})",
            full.len(),
            narrowed.len()
        );
        ViewRefresh {
            mode: RefreshMode::TwoPhase { highlight },
            categorical: full,
            detail: narrowed,
            series,
            generation,
        }
    }

    /// Slice to emphasise in the pie, if any.
    pub fn highlight(&self) -> Option<Origin> {
        match self.mode {
            RefreshMode::Uniform => None,
            RefreshMode::TwoPhase { highlight } => Some(highlight),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::scenario_store;

    #[test]
    fn uniform_feeds_every_chart_the_same_subset() {
        let store = scenario_store();
        let refresh = ViewRefresh::uniform(&store, vec![0, 1], 7);
        assert_eq!(refresh.categorical, refresh.detail);
        assert_eq!(refresh.highlight(), None);
        assert_eq!(refresh.series.pie_total(), 2);
        assert_eq!(refresh.generation, 7);
    }

    #[test]
    fn two_phase_keeps_the_pie_whole() {
        let store = scenario_store();
        let refresh = ViewRefresh::two_phase(&store, vec![0, 1, 2], vec![1], Origin::Japanese, 1);
        assert_eq!(refresh.highlight(), Some(Origin::Japanese));
        assert_eq!(refresh.series.pie_total(), 3);
        assert_eq!(refresh.series.scatter.len(), 1);
    }
}
