//! Violation Ledger: validates infraction reports, finds a witness, and turns
//! each report into an immutable [`ViolationRecord`] carrying its heat delta
//! and fine.

mod calculations;
mod state;
mod systems;


pub use calculations::{
    next_stack_count, validate_report, violation_fine, violation_heat, ReportRejected,
};
pub use state::{ReportContext, StackState, ViolationLedger, ViolationRecord, Witness};
pub use systems::{find_witness, record_violations, ViolationLedgerPlugin};
