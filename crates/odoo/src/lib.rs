pub mod client;
pub mod dry_run;
pub mod tools;
pub mod types;
pub mod xmlrpc;

pub use client::{OdooClient, OdooConfig, Session};
pub use tools::OdooTools;
pub use types::{
    DomainTerm, Expense, FinancialSummary, Invoice, InvoiceLine, NewExpense, NewInvoice,
    NewPartner, Partner, Reference,
};
