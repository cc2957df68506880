use std::fmt;

use super::model::{Origin, Record, RecordStore};

// ---------------------------------------------------------------------------
// Filter predicate: at most one equality test is active at a time
// ---------------------------------------------------------------------------

/// The active selection. Selecting a new one replaces the old one; predicates
/// never compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Predicate {
    /// Identity: every record passes.
    #[default]
    All,
    Origin(Origin),
    ModelYear(i32),
}

impl Predicate {
    pub fn matches(&self, record: &Record) -> bool {
        match *self {
            Predicate::All => true,
            Predicate::Origin(o) => record.origin == o,
            Predicate::ModelYear(y) => record.model_year == y,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Predicate::All)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::All => write!(f, "all"),
            Predicate::Origin(o) => write!(f, "Origin = {o}"),
            Predicate::ModelYear(y) => write!(f, "Model Year = {y}"),
        }
    }
}

/// Indices into [`RecordStore::all`] of the records passing `predicate`,
/// in store order.
pub fn filtered_indices(store: &RecordStore, predicate: &Predicate) -> Vec<usize> {
    store
        .all()
        .iter()
        .enumerate()
        .filter(|(_, rec)| predicate.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Resolve a subset of indices back to records.
pub fn select<'a>(
    store: &'a RecordStore,
    indices: &'a [usize],
) -> impl Iterator<Item = &'a Record> + Clone + 'a {
    indices.iter().filter_map(move |&i| store.all().get(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::scenario_store;

    #[test]
    fn identity_keeps_everything_in_order() {
        let store = scenario_store();
        assert_eq!(filtered_indices(&store, &Predicate::All), vec![0, 1, 2]);
    }

    #[test]
    fn equality_predicates_narrow_the_store() {
        let store = scenario_store();
        assert_eq!(
            filtered_indices(&store, &Predicate::Origin(Origin::Japanese)),
            vec![1]
        );
        assert_eq!(filtered_indices(&store, &Predicate::ModelYear(1970)), vec![0, 1]);
        assert!(filtered_indices(&store, &Predicate::Origin(Origin::European)).is_empty());
    }

    #[test]
    fn select_resolves_indices() {
        let store = scenario_store();
        let idx = vec![2, 0];
        let mpgs: Vec<f64> = select(&store, &idx).map(|r| r.mpg).collect();
        assert_eq!(mpgs, vec![10.0, 20.0]);
    }

    #[test]
    fn display_names_the_selection() {
        assert_eq!(Predicate::All.to_string(), "all");
        assert_eq!(Predicate::ModelYear(1978).to_string(), "Model Year = 1978");
        assert!(Predicate::All.is_identity());
        assert!(!Predicate::Origin(Origin::American).is_identity());
    }
}
