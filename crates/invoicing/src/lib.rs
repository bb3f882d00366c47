//! Invoicing domain module.
//!
//! This crate contains business rules for invoices and payments, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod invoice;

pub use invoice::{
    Invoice, InvoiceId, InvoiceLine, InvoicePatch, InvoiceStatus, InvoiceTotals, NewInvoice,
};
