/// Masking core: from a user-chosen wavelength interval to repaired flux.
///
/// ```text
///   command ──► session ──► region ──► interpolate ──► SampleSeries.working
///                  │                                       │
///                  ├──► ledger (accepted masks)            ▼
///                  └──► frontend (console, view, exporter) ◄── snapshot
/// ```

pub mod command;
pub mod frontend;
pub mod interpolate;
pub mod ledger;
pub mod region;
pub mod session;
