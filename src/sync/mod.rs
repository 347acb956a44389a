pub mod error;
pub mod plan;
pub mod synchronizer;

pub use error::{LoadError, SaveError, SaveStage};
pub use synchronizer::{SaveReport, Synchronizer};
