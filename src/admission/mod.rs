//! Admission decisions for drawn candidate households

pub mod quality;
pub mod scorer;

pub use quality::quality_fraction;
pub use scorer::{AdmissionScorer, ScoreBreakdown};
