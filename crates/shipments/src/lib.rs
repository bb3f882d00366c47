//! Shipments domain module: containers, orders (packages) and tracking events.
//!
//! Status values are free-form labels supplied by staff; there is no enforced
//! transition graph. This crate only normalizes and validates them.

pub mod codes;
pub mod container;
pub mod order;
pub mod status;
pub mod tracking;

pub use codes::{generate_invoice_number, generate_order_number, generate_qr_code, normalize_code};
pub use container::{Container, ContainerId, ContainerPatch, NewContainer, INITIAL_CONTAINER_STATUS};
pub use order::{NewOrder, Order, OrderId, OrderPatch, INITIAL_ORDER_STATUS};
pub use status::StatusLabel;
pub use tracking::{NewTrackingEvent, TrackingEvent, TrackingEventId, TrackingView};
