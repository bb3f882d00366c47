use std::sync::Arc;

use sqlx::PgPool;

use cargodesk_inventory::InventoryItem;
use cargodesk_invoicing::Invoice;
use cargodesk_parties::{Client, Customer, Employee};
use cargodesk_shipments::{Container, Order, TrackingEvent};

use super::{InMemoryRecordStore, PgRecordStore, RecordStore};

/// One store per record type, shared by the HTTP layer and the notification flows.
#[derive(Clone)]
pub struct Stores {
    pub clients: Arc<dyn RecordStore<Client>>,
    pub customers: Arc<dyn RecordStore<Customer>>,
    pub employees: Arc<dyn RecordStore<Employee>>,
    pub containers: Arc<dyn RecordStore<Container>>,
    pub orders: Arc<dyn RecordStore<Order>>,
    pub tracking_events: Arc<dyn RecordStore<TrackingEvent>>,
    pub inventory: Arc<dyn RecordStore<InventoryItem>>,
    pub invoices: Arc<dyn RecordStore<Invoice>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            clients: Arc::new(InMemoryRecordStore::new()),
            customers: Arc::new(InMemoryRecordStore::new()),
            employees: Arc::new(InMemoryRecordStore::new()),
            containers: Arc::new(InMemoryRecordStore::new()),
            orders: Arc::new(InMemoryRecordStore::new()),
            tracking_events: Arc::new(InMemoryRecordStore::new()),
            inventory: Arc::new(InMemoryRecordStore::new()),
            invoices: Arc::new(InMemoryRecordStore::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            clients: Arc::new(PgRecordStore::new(pool.clone())),
            customers: Arc::new(PgRecordStore::new(pool.clone())),
            employees: Arc::new(PgRecordStore::new(pool.clone())),
            containers: Arc::new(PgRecordStore::new(pool.clone())),
            orders: Arc::new(PgRecordStore::new(pool.clone())),
            tracking_events: Arc::new(PgRecordStore::new(pool.clone())),
            inventory: Arc::new(PgRecordStore::new(pool.clone())),
            invoices: Arc::new(PgRecordStore::new(pool)),
        }
    }
}
