use std::collections::HashMap;
use std::hash::Hash;

use super::model::Record;

// ---------------------------------------------------------------------------
// Group-by primitives
// ---------------------------------------------------------------------------
//
// All functions take the subset to aggregate explicitly and never fail:
// an empty subset yields an empty (or zero-filled) result. Groups come back
// in first-encounter order; sorting is left to the caller.

/// One cell of a two-key aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossCell<A, B> {
    pub a: A,
    pub b: B,
    pub mean: f64,
}

/// Count records per key.
pub fn count_by<'a, K, F>(
    records: impl IntoIterator<Item = &'a Record>,
    key: F,
) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    F: Fn(&Record) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, usize)> = Vec::new();

    for rec in records {
        let k = key(rec);
        match slots.get(&k) {
            Some(&i) => groups[i].1 += 1,
            None => {
                slots.insert(k.clone(), groups.len());
                groups.push((k, 1));
            }
        }
    }
    groups
}

/// Arithmetic mean of `value` per key. Groups are never empty because they
/// are discovered from the records themselves.
pub fn mean_by<'a, K, F, V>(
    records: impl IntoIterator<Item = &'a Record>,
    key: F,
    value: V,
) -> Vec<(K, f64)>
where
    K: Eq + Hash + Clone,
    F: Fn(&Record) -> K,
    V: Fn(&Record) -> f64,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut sums: Vec<(K, f64, usize)> = Vec::new();

    for rec in records {
        let k = key(rec);
        let i = match slots.get(&k) {
            Some(&i) => i,
            None => {
                slots.insert(k.clone(), sums.len());
                sums.push((k, 0.0, 0));
                sums.len() - 1
            }
        };
        sums[i].1 += value(rec);
        sums[i].2 += 1;
    }

    sums.into_iter()
        .map(|(k, sum, n)| (k, sum / n as f64))
        .collect()
}

/// Mean of `value` over the full cross product `domain_a × domain_b`,
/// `domain_a`-major. Combinations with no records get a mean of `0.0`.
/// Records whose keys fall outside the domains are ignored.
pub fn cross_mean_by<'a, A, B, FA, FB, V>(
    records: impl IntoIterator<Item = &'a Record>,
    key_a: FA,
    key_b: FB,
    value: V,
    domain_a: &[A],
    domain_b: &[B],
) -> Vec<CrossCell<A, B>>
where
    A: Eq + Hash + Clone,
    B: Eq + Hash + Clone,
    FA: Fn(&Record) -> A,
    FB: Fn(&Record) -> B,
    V: Fn(&Record) -> f64,
{
    let mut sums: HashMap<(A, B), (f64, usize)> = HashMap::new();
    for rec in records {
        let entry = sums.entry((key_a(rec), key_b(rec))).or_insert((0.0, 0));
        entry.0 += value(rec);
        entry.1 += 1;
    }

    let mut cells = Vec::with_capacity(domain_a.len() * domain_b.len());
    for a in domain_a {
        for b in domain_b {
            let mean = match sums.get(&(a.clone(), b.clone())) {
                Some(&(sum, n)) if n > 0 => sum / n as f64,
                _ => 0.0,
            };
            cells.push(CrossCell {
                a: a.clone(),
                b: b.clone(),
                mean,
            });
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{rec, scenario_store};
    use crate::data::model::Origin;

    /// Every subset of `records`, enumerated by bitmask.
    fn subsets(records: &[Record]) -> Vec<Vec<&Record>> {
        (0u32..(1 << records.len()))
            .map(|mask| {
                records
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, r)| r)
                    .collect()
            })
            .collect()
    }

    fn sample() -> Vec<Record> {
        vec![
            rec(Origin::American, 18.0, 1970),
            rec(Origin::European, 26.0, 1970),
            rec(Origin::Japanese, 31.0, 1972),
            rec(Origin::American, 15.0, 1972),
            rec(Origin::Japanese, 40.5, 1980),
            rec(Origin::European, 29.0, 1980),
        ]
    }

    #[test]
    fn scenario_counts_and_means() {
        let store = scenario_store();
        assert_eq!(
            count_by(store.all(), |r| r.origin),
            vec![(Origin::American, 2), (Origin::Japanese, 1)]
        );
        assert_eq!(
            mean_by(store.all(), |r| r.model_year, |r| r.mpg),
            vec![(1970, 25.0), (1971, 10.0)]
        );
    }

    #[test]
    fn count_by_partitions_every_subset() {
        let records = sample();
        for subset in subsets(&records) {
            let groups = count_by(subset.iter().copied(), |r| r.origin);
            let total: usize = groups.iter().map(|(_, n)| n).sum();
            assert_eq!(total, subset.len());

            for r in &subset {
                let hits = groups.iter().filter(|(o, _)| *o == r.origin).count();
                assert_eq!(hits, 1);
            }
        }
    }

    #[test]
    fn group_means_stay_within_subset_range() {
        let records = sample();
        for subset in subsets(&records) {
            let min = subset.iter().map(|r| r.mpg).fold(f64::INFINITY, f64::min);
            let max = subset.iter().map(|r| r.mpg).fold(f64::NEG_INFINITY, f64::max);
            for (_, mean) in mean_by(subset.iter().copied(), |r| r.model_year, |r| r.mpg) {
                assert!(mean >= min && mean <= max, "{mean} outside [{min}, {max}]");
            }
        }
    }

    #[test]
    fn cross_mean_by_covers_full_cross_product() {
        let records = sample();
        let years = [1970, 1971, 1972, 1980, 1982];
        for subset in subsets(&records) {
            let cells = cross_mean_by(
                subset.iter().copied(),
                |r| r.model_year,
                |r| r.origin,
                |r| r.mpg,
                &years,
                &Origin::ALL,
            );
            assert_eq!(cells.len(), years.len() * Origin::ALL.len());
        }
    }

    #[test]
    fn cross_mean_by_zero_fills_missing_combinations() {
        let store = scenario_store();
        let cells = cross_mean_by(
            store.all(),
            |r| r.model_year,
            |r| r.origin,
            |r| r.mpg,
            &[1970, 1971],
            &Origin::ALL,
        );

        let at = |year: i32, origin: Origin| {
            cells
                .iter()
                .find(|c| c.a == year && c.b == origin)
                .map(|c| c.mean)
        };
        assert_eq!(at(1970, Origin::American), Some(20.0));
        assert_eq!(at(1970, Origin::Japanese), Some(30.0));
        assert_eq!(at(1970, Origin::European), Some(0.0));
        assert_eq!(at(1971, Origin::Japanese), Some(0.0));
        // domain_a-major ordering
        assert_eq!(cells[0].a, 1970);
        assert_eq!(cells[3].a, 1971);
    }

    #[test]
    fn empty_input_degrades_gracefully() {
        let none: Vec<Record> = Vec::new();
        assert!(count_by(&none, |r| r.cylinders).is_empty());
        assert!(mean_by(&none, |r| r.model_year, |r| r.mpg).is_empty());

        let cells = cross_mean_by(
            &none,
            |r| r.model_year,
            |r| r.origin,
            |r| r.mpg,
            &[1975],
            &Origin::ALL,
        );
        assert_eq!(cells.len(), 3);
        assert!(cells.iter().all(|c| c.mean == 0.0));
    }
}
