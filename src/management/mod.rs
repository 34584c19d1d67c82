mod dataset;
mod dispatch;
mod limiter;
mod report;
mod table;

pub use dataset::DatasetFiles;
pub use dataset::merge_dataset;
pub use dataset::persist_reports;
pub use dataset::prepare_artists;
pub use dataset::prepare_features;
pub use dispatch::BatchOutcome;
pub use dispatch::Dispatcher;
pub use limiter::FixedDelay;
pub use limiter::NoDelay;
pub use limiter::RateLimiter;
pub use report::FailedRequest;
pub use report::PhaseReport;
pub use table::RowAccumulator;
pub use table::Table;
