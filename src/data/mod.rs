/// Data layer: survey types, grid/workbook adapters and the numeric kernels.
///
/// Architecture:
/// ```text
///  .xlsx / .ods / .csv / .json / .parquet        editable grid
///        │                                             │
///        ▼                                             ▼
///   ┌──────────┐                                ┌──────────┐
///   │  loader   │  sheets → schema check →      │   grid    │  text ⇄ numbers
///   └──────────┘  Workbook { main, auxiliary }   └──────────┘
///        │                                             │
///        └──────────────────────┬──────────────────────┘
///                               ▼
///                       ┌──────────────┐
///                       │ SurveyTable  │  Vec<SurveyRecord>, valid rows
///                       └──────────────┘
///                               │
///                               ▼
///        ┌──────────┐   ┌──────────────────┐   ┌──────────────────┐
///        │  filter   │ → │ stats::weighted_ │ → │ stats::correct_  │
///        │ (z-score) │   │     average      │   │     vectors      │
///        └──────────┘   └──────────────────┘   └──────────────────┘
/// ```

pub mod filter;
pub mod grid;
pub mod loader;
pub mod model;
pub mod stats;
