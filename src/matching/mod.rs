//! Resident matching: eligibility rules, the candidate pool and its scanner

pub mod eligibility;
pub mod guard;
pub mod pool;
pub mod scanner;

pub use eligibility::{Classification, Eligibility};
pub use guard::TryLock;
pub use pool::{CandidateList, CandidatePool, PoolState};
pub use scanner::{EligibilityScanner, ScanOutcome};
