// Catalog reconciliation
pub mod reconciler;

// Operator tasks
pub mod admin;
pub mod maintenance;

pub use admin::{hash_password, verify_password, AdminSeedOutcome, AdminService};
pub use maintenance::{clean_database, CleanSummary};
pub use reconciler::{
    CatalogReconciler, CategoryCount, CategoryRename, CommitSummary, ReconciliationPlan,
    RunSummary, VerificationReport,
};
