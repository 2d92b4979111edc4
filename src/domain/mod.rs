//! Billing domain records written by the engine.
//!
//! Three flat record types, each persisted to its own resource:
//! `customers.csv`, `invoices.csv`, and `loans.csv`.

mod factory;
mod fixed;
mod models;

pub use factory::{RecordFactory, STREAM_BATCH_CEILING, SyntheticFactory};
pub use fixed::Fixed2;
pub use models::{Customer, Invoice, Loan, customer_key, invoice_key, loan_key};

/// Which record type (and therefore which resource) a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Customer,
    Invoice,
    Loan,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Customer, RecordKind::Invoice, RecordKind::Loan];

    /// Resource name, which is also the file name under the output directory.
    pub fn resource(self) -> &'static str {
        match self {
            RecordKind::Customer => "customers.csv",
            RecordKind::Invoice => "invoices.csv",
            RecordKind::Loan => "loans.csv",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Customer => write!(f, "customer"),
            RecordKind::Invoice => write!(f, "invoice"),
            RecordKind::Loan => write!(f, "loan"),
        }
    }
}
