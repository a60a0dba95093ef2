//! Model seam and scoring

mod regressor;
mod scorer;
#[cfg(test)]
mod stub;

#[cfg(test)]
pub use regressor::MockQualityModel;
pub use regressor::{ModelError, ModelInput, QualityModel};
pub use scorer::Scorer;
#[cfg(test)]
pub use stub::StubModel;
