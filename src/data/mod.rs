/// Data layer: series model, loading, and export.
///
/// Architecture:
/// ```text
///  .ascii / .txt / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows → SampleSeries (original + working copy)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SampleSeries  │  original is write-once, working.flux is edited
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  working copy → name.bpm.ext
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod writer;
