pub mod ingestor;
pub mod outcome;

pub use ingestor::BatchIngestor;
pub use outcome::{BatchReport, BatchStatus, ItemOutcome};
