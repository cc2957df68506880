use crate::data::filter::{filtered_indices, Predicate};
use crate::data::model::{Origin, RecordStore};
use crate::refresh::{DashboardEvent, ViewRefresh, YearChoice};

// ---------------------------------------------------------------------------
// Load tickets
// ---------------------------------------------------------------------------

/// Identifies one load request. Only the most recently issued ticket may
/// install its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Owns the record store and
/// the single active predicate, and turns every interaction into a fresh
/// [`ViewRefresh`].
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a load succeeds).
    pub store: Option<RecordStore>,

    /// Display name of the loaded file.
    pub source_name: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,

    predicate: Predicate,
    refresh: Option<ViewRefresh>,
    generation: u64,
    latest_ticket: u64,
}

impl AppState {
    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    /// What the charts should currently show. `None` until a dataset is loaded.
    pub fn refresh(&self) -> Option<&ViewRefresh> {
        self.refresh.as_ref()
    }

    /// The reset control is shown exactly while a non-identity predicate is active.
    pub fn reset_visible(&self) -> bool {
        !self.predicate.is_identity()
    }

    /// Value the year selector should display.
    pub fn year_choice(&self) -> YearChoice {
        match self.predicate {
            Predicate::ModelYear(y) => YearChoice::Year(y),
            _ => YearChoice::All,
        }
    }

    // -- Loading --

    /// Start a load; any load started earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        self.loading = true;
        LoadTicket(self.latest_ticket)
    }

    /// Install the outcome of a load. Returns `false` when the ticket is
    /// stale and the outcome was discarded.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        source_name: &str,
        outcome: anyhow::Result<RecordStore>,
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            log::warn!(
                "Discarding stale load of {source_name} (ticket {}, latest {})",
                ticket.0,
                self.latest_ticket
            );
            return false;
        }
        self.loading = false;

        match outcome {
            Ok(store) => {
                log::info!(
                    "Loaded {} records from {source_name} ({} skipped)",
                    store.len(),
                    store.skipped()
                );
                self.set_dataset(store, source_name);
            }
            Err(e) => {
                log::error!("Failed to load {source_name}: {e:#}");
                self.status_message = Some(format!("Error loading {source_name}: {e:#}"));
            }
        }
        true
    }

    /// Ingest a newly loaded dataset and show all of it.
    pub fn set_dataset(&mut self, store: RecordStore, source_name: &str) {
        self.status_message = (store.skipped() > 0)
            .then(|| format!("{} malformed rows skipped", store.skipped()));
        self.store = Some(store);
        self.source_name = Some(source_name.to_string());
        self.set_predicate(Predicate::All);
    }

    // -- Filter coordination --

    /// Replace the active predicate and redraw every chart from the result.
    /// Ignored until a dataset is loaded.
    pub fn set_predicate(&mut self, predicate: Predicate) {
        let Some(store) = &self.store else {
            log::debug!("Ignoring filter {predicate}: no dataset loaded");
            return;
        };
        log::info!("Filter: {predicate}");
        self.predicate = predicate;

        let subset = filtered_indices(store, &predicate);
        self.generation += 1;
        self.refresh = Some(ViewRefresh::uniform(store, subset, self.generation));
    }

    /// Back to the identity predicate.
    pub fn reset(&mut self) {
        self.set_predicate(Predicate::All);
    }

    /// Pie-slice selection: filter by origin, but keep every slice visible.
    pub fn select_by_slice(&mut self, origin: Origin) {
        let predicate = Predicate::Origin(origin);
        let Some(store) = &self.store else {
            log::debug!("Ignoring slice {origin}: no dataset loaded");
            return;
        };
        log::info!("Filter: {predicate} (slice)");
        self.predicate = predicate;

        let full = filtered_indices(store, &Predicate::All);
        let narrowed = filtered_indices(store, &predicate);
        self.generation += 1;
        self.refresh = Some(ViewRefresh::two_phase(
            store,
            full,
            narrowed,
            origin,
            self.generation,
        ));
    }

    pub fn select_year(&mut self, choice: YearChoice) {
        match choice {
            YearChoice::All => self.set_predicate(Predicate::All),
            YearChoice::Year(y) => self.set_predicate(Predicate::ModelYear(y)),
        }
    }

    /// Single entry point for UI events.
    pub fn handle(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::YearChanged(choice) => self.select_year(choice),
            DashboardEvent::SliceClicked(origin) => self.select_by_slice(origin),
            DashboardEvent::ResetClicked => self.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::scenario_store;
    use crate::refresh::RefreshMode;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(scenario_store(), "cars.csv");
        state
    }

    #[test]
    fn load_shows_everything_uniformly() {
        let state = loaded();
        let refresh = state.refresh().unwrap();
        assert_eq!(refresh.mode, RefreshMode::Uniform);
        assert_eq!(refresh.detail.len(), 3);
        assert!(!state.reset_visible());
    }

    #[test]
    fn slice_click_narrows_details_but_not_the_pie() {
        let mut state = loaded();
        state.handle(DashboardEvent::SliceClicked(Origin::Japanese));

        let refresh = state.refresh().unwrap();
        assert_eq!(refresh.mode, RefreshMode::TwoPhase { highlight: Origin::Japanese });
        assert_eq!(refresh.detail, vec![1]);
        assert_eq!(refresh.categorical.len(), 3);
        assert_eq!(refresh.series.pie_total(), 3);
        assert_eq!(refresh.series.scatter.len(), 1);
        assert!(state.reset_visible());
    }

    #[test]
    fn year_selection_applies_to_all_five_charts() {
        let mut state = loaded();
        state.handle(DashboardEvent::YearChanged(YearChoice::Year(1970)));

        let refresh = state.refresh().unwrap();
        assert_eq!(refresh.mode, RefreshMode::Uniform);
        assert_eq!(refresh.detail, vec![0, 1]);
        assert_eq!(refresh.categorical, vec![0, 1]);
        assert_eq!(refresh.series.pie_total(), 2);
        assert_eq!(state.year_choice(), YearChoice::Year(1970));
        assert!(state.reset_visible());
    }

    #[test]
    fn new_selection_replaces_the_previous_one() {
        let mut state = loaded();
        state.handle(DashboardEvent::YearChanged(YearChoice::Year(1971)));
        state.handle(DashboardEvent::SliceClicked(Origin::Japanese));

        assert_eq!(state.predicate(), Predicate::Origin(Origin::Japanese));
        assert_eq!(state.year_choice(), YearChoice::All);
        assert_eq!(state.refresh().unwrap().detail, vec![1]);
    }

    #[test]
    fn choosing_all_years_hides_reset() {
        let mut state = loaded();
        state.handle(DashboardEvent::YearChanged(YearChoice::Year(1970)));
        state.handle(DashboardEvent::YearChanged(YearChoice::All));
        assert!(!state.reset_visible());
        assert_eq!(state.refresh().unwrap().detail.len(), 3);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut state = loaded();
        state.handle(DashboardEvent::SliceClicked(Origin::American));

        state.handle(DashboardEvent::ResetClicked);
        let once = state.refresh().cloned().unwrap();
        let predicate_once = state.predicate();

        state.handle(DashboardEvent::ResetClicked);
        let twice = state.refresh().cloned().unwrap();

        assert_eq!(predicate_once, Predicate::All);
        assert_eq!(state.predicate(), predicate_once);
        assert_eq!(once.mode, twice.mode);
        assert_eq!(once.categorical, twice.categorical);
        assert_eq!(once.detail, twice.detail);
        assert_eq!(once.series, twice.series);
        assert!(!state.reset_visible());
    }

    #[test]
    fn unknown_year_yields_empty_series() {
        let mut state = loaded();
        state.select_year(YearChoice::Year(1999));
        let refresh = state.refresh().unwrap();
        assert!(refresh.detail.is_empty());
        assert!(refresh.series.pie.is_empty());
        assert!(refresh.series.heatmap.cells.is_empty());
    }

    #[test]
    fn interactions_before_load_are_ignored() {
        let mut state = AppState::default();
        state.handle(DashboardEvent::SliceClicked(Origin::European));
        state.handle(DashboardEvent::YearChanged(YearChoice::Year(1970)));

        assert!(state.refresh().is_none());
        assert_eq!(state.predicate(), Predicate::All);
        assert!(!state.reset_visible());

        state.set_dataset(scenario_store(), "cars.csv");
        assert_eq!(state.refresh().unwrap().detail.len(), 3);
    }

    #[test]
    fn stale_load_is_discarded() {
        let mut state = AppState::default();
        let first = state.begin_load();
        let second = state.begin_load();

        assert!(state.finish_load(second, "new.csv", Ok(scenario_store())));
        assert!(!state.finish_load(first, "old.csv", Ok(RecordStore::default())));

        assert_eq!(state.source_name.as_deref(), Some("new.csv"));
        assert_eq!(state.store.as_ref().map(|s| s.len()), Some(3));
        assert!(!state.loading);
    }

    #[test]
    fn failed_load_keeps_previous_dataset_and_reports() {
        let mut state = loaded();
        let ticket = state.begin_load();
        assert!(state.finish_load(ticket, "broken.csv", Err(anyhow::anyhow!("boom"))));

        assert_eq!(state.store.as_ref().map(|s| s.len()), Some(3));
        assert!(state.status_message.as_deref().unwrap().contains("boom"));
        assert!(!state.loading);
    }

    #[test]
    fn each_refresh_gets_a_new_generation() {
        let mut state = loaded();
        let g0 = state.refresh().unwrap().generation;
        state.reset();
        assert_eq!(state.refresh().unwrap().generation, g0 + 1);
    }
}
