use super::aggregate::{count_by, cross_mean_by, mean_by, CrossCell};
use super::filter::select;
use super::model::{distinct_years, Origin, Record, RecordStore};

// ---------------------------------------------------------------------------
// Per-chart series
// ---------------------------------------------------------------------------

/// Pie: vehicle count per origin, canonical origin order.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub origin: Origin,
    pub count: usize,
}

/// Scatter: one point per record.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub horsepower: f64,
    pub weight: f64,
    pub mpg: f64,
    pub origin: Origin,
    pub name: String,
}

/// Heatmap: mean MPG over years × origins, year-major.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Heatmap {
    pub years: Vec<i32>,
    pub cells: Vec<CrossCell<i32, Origin>>,
}

impl Heatmap {
    /// Upper end of the colour domain; the lower end is always 0.
    pub fn max_mean(&self) -> f64 {
        self.cells.iter().map(|c| c.mean).fold(0.0, f64::max)
    }
}

/// Everything the five charts need for one redraw.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardSeries {
    pub pie: Vec<PieSlice>,
    /// Mean MPG per model year, ascending years.
    pub line: Vec<(i32, f64)>,
    pub scatter: Vec<ScatterPoint>,
    /// Vehicle count per cylinder count, ascending.
    pub bars: Vec<(u32, usize)>,
    pub heatmap: Heatmap,
}

impl DashboardSeries {
    /// Derive the pie from `categorical` and the four detail charts from
    /// `detail`. Both are index subsets of `store`.
    pub fn build(store: &RecordStore, categorical: &[usize], detail: &[usize]) -> Self {
        let details = select(store, detail);
        DashboardSeries {
            pie: pie_series(select(store, categorical)),
            line: line_series(details.clone()),
            scatter: scatter_series(details.clone()),
            bars: bar_series(details.clone()),
            heatmap: heatmap_series(details),
        }
    }

    pub fn pie_total(&self) -> usize {
        self.pie.iter().map(|s| s.count).sum()
    }
}

pub fn pie_series<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<PieSlice> {
    let mut slices: Vec<PieSlice> = count_by(records, |r| r.origin)
        .into_iter()
        .map(|(origin, count)| PieSlice { origin, count })
        .collect();
    slices.sort_by_key(|s| s.origin);
    slices
}

pub fn line_series<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<(i32, f64)> {
    let mut points = mean_by(records, |r| r.model_year, |r| r.mpg);
    points.sort_by_key(|&(year, _)| year);
    points
}

pub fn scatter_series<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<ScatterPoint> {
    records
        .into_iter()
        .map(|r| ScatterPoint {
            horsepower: r.horsepower,
            weight: r.weight,
            mpg: r.mpg,
            origin: r.origin,
            name: r.name.clone(),
        })
        .collect()
}

pub fn bar_series<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<(u32, usize)> {
    let mut bars = count_by(records, |r| r.cylinders);
    bars.sort_by_key(|&(cyl, _)| cyl);
    bars
}

/// Heatmap over the model years present in `records`.
pub fn heatmap_series<'a, I>(records: I) -> Heatmap
where
    I: IntoIterator<Item = &'a Record>,
    I::IntoIter: Clone,
{
    let iter = records.into_iter();
    let years = distinct_years(iter.clone());
    heatmap_over(iter, &years)
}

/// Heatmap over an explicit year domain; every origin row is present.
pub fn heatmap_over<'a>(records: impl IntoIterator<Item = &'a Record>, years: &[i32]) -> Heatmap {
    Heatmap {
        years: years.to_vec(),
        cells: cross_mean_by(
            records,
            |r| r.model_year,
            |r| r.origin,
            |r| r.mpg,
            years,
            &Origin::ALL,
        ),
    }
}

/// `(min, max)` of `values`, or `None` when empty.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, Predicate};
    use crate::data::model::tests::{rec, scenario_store};

    #[test]
    fn pie_uses_canonical_origin_order() {
        let records = vec![
            rec(Origin::Japanese, 30.0, 1970),
            rec(Origin::American, 20.0, 1970),
            rec(Origin::European, 25.0, 1971),
        ];
        let order: Vec<Origin> = pie_series(&records).iter().map(|s| s.origin).collect();
        assert_eq!(order, Origin::ALL.to_vec());
    }

    #[test]
    fn line_and_bars_are_sorted_ascending() {
        let mut records = vec![
            rec(Origin::American, 12.0, 1975),
            rec(Origin::American, 22.0, 1971),
        ];
        records[0].cylinders = 8;
        assert_eq!(line_series(&records), vec![(1971, 22.0), (1975, 12.0)]);
        assert_eq!(bar_series(&records), vec![(4, 1), (8, 1)]);
    }

    #[test]
    fn build_splits_categorical_and_detail() {
        let store = scenario_store();
        let all = filtered_indices(&store, &Predicate::All);
        let japanese = filtered_indices(&store, &Predicate::Origin(Origin::Japanese));

        let series = DashboardSeries::build(&store, &all, &japanese);
        assert_eq!(series.pie_total(), 3);
        assert_eq!(series.scatter.len(), 1);
        assert_eq!(series.line, vec![(1970, 30.0)]);
        assert_eq!(series.heatmap.years, vec![1970]);
        assert_eq!(series.heatmap.cells.len(), 3);
        assert_eq!(series.heatmap.max_mean(), 30.0);
    }

    #[test]
    fn empty_category_zero_fills_its_heatmap_row() {
        let store = scenario_store();
        let european = filtered_indices(&store, &Predicate::Origin(Origin::European));
        assert!(european.is_empty());

        let series = DashboardSeries::build(&store, &european, &european);
        assert!(series.scatter.is_empty());
        assert!(series.line.is_empty());
        assert!(series.bars.is_empty());
        assert!(series.heatmap.cells.is_empty());

        let full = heatmap_over(select(&store, &european), &store.model_years());
        assert_eq!(full.cells.len(), 6);
        assert!(full
            .cells
            .iter()
            .filter(|c| c.b == Origin::European)
            .all(|c| c.mean == 0.0));
        assert_eq!(full.max_mean(), 0.0);
    }

    #[test]
    fn extent_of_values() {
        assert_eq!(extent(vec![3.0, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(extent(Vec::new()), None);
    }
}
