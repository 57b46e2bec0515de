//! Facility room capacity management

pub mod reconciler;

pub use reconciler::{CapacityReconciler, ReconcileOutcome};
