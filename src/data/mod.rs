/// Data layer: records, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawRow → RecordStore
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  one predicate → subset of store indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  count_by / mean_by / cross_mean_by
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  series   │  per-chart series for one redraw
///   └──────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod series;
