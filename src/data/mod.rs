/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (+ skipped-row count)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, year/state/cause domains
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply Selection → surviving indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  indices → per-year / per-state totals
///   └───────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
pub mod aggregate;
