//! Parties domain module: clients, customers and employees.
//!
//! Pure validation and state-change rules (no IO, no HTTP, no storage).

pub mod client;
pub mod contact;
pub mod customer;
pub mod employee;

pub use client::{Client, ClientId, ClientPatch, NewClient};
pub use contact::ContactPoint;
pub use customer::{Customer, CustomerId, CustomerPatch, NewCustomer};
pub use employee::{Employee, EmployeeId, EmployeePatch, NewEmployee};
