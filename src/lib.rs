//! # bocfx
//!
//! Analytics for the Bank of China USD/CNY reference rate.
//!
//! Published rate snapshots are loaded per month, summarized per day, turned
//! into USD-exposure impact figures under three comparison modes, and exported
//! as CSV, JSON, or a two-sheet SpreadsheetML workbook.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bocfx::prelude::*;
//!
//! # fn main() -> bocfx::error::Result<()> {
//! let source = FsQuoteSource::new("data");
//! let store = InMemoryBaselineStore::new();
//! let month = YearMonth::new(2024, 6)?;
//!
//! let ctx = FxContext::load(&source, &store, month, RateColumn::Middle, 714.6)?;
//! for day in ctx.daily() {
//!     println!("{} avg {:.2} ({} publishes)", day.date, day.avg, day.publishes);
//! }
//!
//! if let Ok(summary) = ctx.impact(ImpactMode::PrevDayAvg, Exposure::Cny(1.5e9)) {
//!     println!("impact {:.0} USD", summary.figures.impact);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod alerts;
pub mod baseline;
pub mod capture;
pub mod constants;
pub mod context;
pub mod error;
pub mod export;
pub mod exposure;
pub mod intraday;
pub mod quote;
pub mod source;
pub mod stats;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::aggregate::{DailyAggregate, DailyAggregator, DailyChange};
    pub use crate::alerts::{ImpactAlert, PublishMoveAlert};
    pub use crate::baseline::{BaselineStore, InMemoryBaselineStore};
    #[cfg(feature = "rusqlite-support")]
    pub use crate::baseline::SqliteBaselineStore;
    pub use crate::capture::CaptureStatus;
    pub use crate::context::FxContext;
    pub use crate::error::{Availability, FxError, Result, Unavailable};
    pub use crate::export::Workbook;
    pub use crate::exposure::{Exposure, ExposureModel, ImpactFigures, ImpactMode, ImpactSummary};
    pub use crate::intraday::IntradaySeries;
    pub use crate::quote::QuoteRecord;
    pub use crate::source::{FsQuoteSource, InMemoryQuoteSource, QuoteSource};
    pub use crate::types::*;
}
