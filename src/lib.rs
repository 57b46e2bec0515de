//! Care Homes - resident matching and admission for care facilities

pub mod admission;
pub mod capacity;
pub mod core;
pub mod facility;
pub mod matching;
pub mod population;
pub mod rng;
pub mod simulation;
