//! Table mappings for every persisted record type (see `sql/schema.sql`).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::types::Json;
use sqlx::{Postgres, Row};
use uuid::Uuid;

use cargodesk_core::Locale;
use cargodesk_inventory::InventoryItem;
use cargodesk_invoicing::{Invoice, InvoiceLine, InvoiceStatus};
use cargodesk_parties::{Client, Customer, Employee};
use cargodesk_shipments::{Container, Order, StatusLabel, TrackingEvent};

use super::postgres::{decode_error, PgRecord};

fn opt_id<T: Into<Uuid>>(id: Option<T>) -> Option<Uuid> {
    id.map(Into::into)
}

fn locale_code(locale: Option<Locale>) -> Option<String> {
    locale.map(|l| l.as_str().to_string())
}

fn read_locale(row: &PgRow, column: &str) -> Result<Option<Locale>, sqlx::Error> {
    let tag: Option<String> = row.try_get(column)?;
    Ok(tag.as_deref().and_then(Locale::parse_tag))
}

fn read_status(row: &PgRow, column: &str) -> Result<StatusLabel, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    StatusLabel::parse(&raw).map_err(decode_error)
}

fn read_id<T: From<Uuid>>(row: &PgRow, column: &str) -> Result<T, sqlx::Error> {
    Ok(T::from(row.try_get::<Uuid, _>(column)?))
}

fn read_opt_id<T: From<Uuid>>(row: &PgRow, column: &str) -> Result<Option<T>, sqlx::Error> {
    Ok(row.try_get::<Option<Uuid>, _>(column)?.map(T::from))
}

impl PgRecord for Client {
    const TABLE: &'static str = "clients";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "company",
        "email",
        "phone",
        "address",
        "preferred_locale",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Client {
            id: read_id(row, "id")?,
            name: row.try_get("name")?,
            company: row.try_get("company")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            preferred_locale: read_locale(row, "preferred_locale")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }

    fn push_binds<'args>(&self, values: &mut Separated<'_, 'args, Postgres, &'static str>) {
        values
            .push_bind(Uuid::from(self.id))
            .push_bind(self.name.clone())
            .push_bind(self.company.clone())
            .push_bind(self.email.clone())
            .push_bind(self.phone.clone())
            .push_bind(self.address.clone())
            .push_bind(locale_code(self.preferred_locale))
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl PgRecord for Customer {
    const TABLE: &'static str = "customers";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "client_id",
        "name",
        "email",
        "phone",
        "address",
        "preferred_locale",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Customer {
            id: read_id(row, "id")?,
            client_id: read_opt_id(row, "client_id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            preferred_locale: read_locale(row, "preferred_locale")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn push_binds<'args>(&self, values: &mut Separated<'_, 'args, Postgres, &'static str>) {
        values
            .push_bind(Uuid::from(self.id))
            .push_bind(opt_id(self.client_id))
            .push_bind(self.name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.phone.clone())
            .push_bind(self.address.clone())
            .push_bind(locale_code(self.preferred_locale))
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl PgRecord for Employee {
    const TABLE: &'static str = "employees";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "full_name",
        "email",
        "phone",
        "position",
        "department",
        "hired_on",
        "active",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Employee {
            id: read_id(row, "id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            position: row.try_get("position")?,
            department: row.try_get("department")?,
            hired_on: row.try_get::<Option<NaiveDate>, _>("hired_on")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn push_binds<'args>(&self, values: &mut Separated<'_, 'args, Postgres, &'static str>) {
        values
            .push_bind(Uuid::from(self.id))
            .push_bind(self.full_name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.phone.clone())
            .push_bind(self.position.clone())
            .push_bind(self.department.clone())
            .push_bind(self.hired_on)
            .push_bind(self.active)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl PgRecord for Container {
    const TABLE: &'static str = "containers";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "container_number",
        "status",
        "origin",
        "destination",
        "departure_date",
        "arrival_date",
        "notes",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Container {
            id: read_id(row, "id")?,
            container_number: row.try_get("container_number")?,
            status: read_status(row, "status")?,
            origin: row.try_get("origin")?,
            destination: row.try_get("destination")?,
            departure_date: row.try_get("departure_date")?,
            arrival_date: row.try_get("arrival_date")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn push_binds<'args>(&self, values: &mut Separated<'_, 'args, Postgres, &'static str>) {
        values
            .push_bind(Uuid::from(self.id))
            .push_bind(self.container_number.clone())
            .push_bind(self.status.as_str().to_string())
            .push_bind(self.origin.clone())
            .push_bind(self.destination.clone())
            .push_bind(self.departure_date)
            .push_bind(self.arrival_date)
            .push_bind(self.notes.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl PgRecord for Order {
    const TABLE: &'static str = "orders";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "order_number",
        "qr_code",
        "customer_id",
        "client_id",
        "container_id",
        "description",
        "weight_kg",
        "origin",
        "destination",
        "status",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Order {
            id: read_id(row, "id")?,
            order_number: row.try_get("order_number")?,
            qr_code: row.try_get("qr_code")?,
            customer_id: read_opt_id(row, "customer_id")?,
            client_id: read_opt_id(row, "client_id")?,
            container_id: read_opt_id(row, "container_id")?,
            description: row.try_get("description")?,
            weight_kg: row.try_get::<Option<f64>, _>("weight_kg")?,
            origin: row.try_get("origin")?,
            destination: row.try_get("destination")?,
            status: read_status(row, "status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn push_binds<'args>(&self, values: &mut Separated<'_, 'args, Postgres, &'static str>) {
        values
            .push_bind(Uuid::from(self.id))
            .push_bind(self.order_number.clone())
            .push_bind(self.qr_code.clone())
            .push_bind(opt_id(self.customer_id))
            .push_bind(opt_id(self.client_id))
            .push_bind(opt_id(self.container_id))
            .push_bind(self.description.clone())
            .push_bind(self.weight_kg)
            .push_bind(self.origin.clone())
            .push_bind(self.destination.clone())
            .push_bind(self.status.as_str().to_string())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl PgRecord for TrackingEvent {
    const TABLE: &'static str = "tracking_events";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "order_id",
        "status",
        "location",
        "description",
        "occurred_at",
    ];
    const ORDER_BY: &'static str = "occurred_at DESC";

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(TrackingEvent {
            id: read_id(row, "id")?,
            order_id: read_id(row, "order_id")?,
            status: read_status(row, "status")?,
            location: row.try_get("location")?,
            description: row.try_get("description")?,
            occurred_at: row.try_get("occurred_at")?,
        })
    }

    fn push_binds<'args>(&self, values: &mut Separated<'_, 'args, Postgres, &'static str>) {
        values
            .push_bind(Uuid::from(self.id))
            .push_bind(Uuid::from(self.order_id))
            .push_bind(self.status.as_str().to_string())
            .push_bind(self.location.clone())
            .push_bind(self.description.clone())
            .push_bind(self.occurred_at);
    }
}

impl PgRecord for InventoryItem {
    const TABLE: &'static str = "inventory_items";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "sku",
        "name",
        "description",
        "quantity",
        "unit",
        "location",
        "client_id",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(InventoryItem {
            id: read_id(row, "id")?,
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            quantity: row.try_get::<i64, _>("quantity")?,
            unit: row.try_get("unit")?,
            location: row.try_get("location")?,
            client_id: read_opt_id(row, "client_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn push_binds<'args>(&self, values: &mut Separated<'_, 'args, Postgres, &'static str>) {
        values
            .push_bind(Uuid::from(self.id))
            .push_bind(self.sku.clone())
            .push_bind(self.name.clone())
            .push_bind(self.description.clone())
            .push_bind(self.quantity)
            .push_bind(self.unit.clone())
            .push_bind(self.location.clone())
            .push_bind(opt_id(self.client_id))
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

impl PgRecord for Invoice {
    const TABLE: &'static str = "invoices";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "invoice_number",
        "client_id",
        "customer_id",
        "order_id",
        "lines",
        "tax_rate_bps",
        "subtotal_cents",
        "tax_cents",
        "total_cents",
        "amount_paid_cents",
        "status",
        "issued_on",
        "due_on",
        "notes",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let lines: Json<Vec<InvoiceLine>> = row.try_get("lines")?;
        let tax_rate_bps: i32 = row.try_get("tax_rate_bps")?;
        let status: String = row.try_get("status")?;
        Ok(Invoice {
            id: read_id(row, "id")?,
            invoice_number: row.try_get("invoice_number")?,
            client_id: read_opt_id(row, "client_id")?,
            customer_id: read_opt_id(row, "customer_id")?,
            order_id: read_opt_id(row, "order_id")?,
            lines: lines.0,
            tax_rate_bps: u32::try_from(tax_rate_bps).map_err(decode_error)?,
            subtotal_cents: row.try_get("subtotal_cents")?,
            tax_cents: row.try_get("tax_cents")?,
            total_cents: row.try_get("total_cents")?,
            amount_paid_cents: row.try_get("amount_paid_cents")?,
            status: InvoiceStatus::parse(&status).map_err(decode_error)?,
            issued_on: row.try_get("issued_on")?,
            due_on: row.try_get("due_on")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn push_binds<'args>(&self, values: &mut Separated<'_, 'args, Postgres, &'static str>) {
        // Tax rate is capped at 10000 bps by the domain, so it always fits an INT.
        let tax_rate_bps = i32::try_from(self.tax_rate_bps).unwrap_or(i32::MAX);
        values
            .push_bind(Uuid::from(self.id))
            .push_bind(self.invoice_number.clone())
            .push_bind(opt_id(self.client_id))
            .push_bind(opt_id(self.customer_id))
            .push_bind(opt_id(self.order_id))
            .push_bind(Json(self.lines.clone()))
            .push_bind(tax_rate_bps)
            .push_bind(self.subtotal_cents)
            .push_bind(self.tax_cents)
            .push_bind(self.total_cents)
            .push_bind(self.amount_paid_cents)
            .push_bind(self.status.as_str().to_string())
            .push_bind(self.issued_on)
            .push_bind(self.due_on)
            .push_bind(self.notes.clone())
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mapping<R: PgRecord>() {
        assert_eq!(R::COLUMNS.first(), Some(&"id"), "{} must list id first", R::TABLE);
        let mut seen = std::collections::HashSet::new();
        for c in R::COLUMNS {
            assert!(seen.insert(*c), "{} lists {c} twice", R::TABLE);
        }
    }

    #[test]
    fn every_mapping_starts_with_id_and_has_unique_columns() {
        assert_mapping::<Client>();
        assert_mapping::<Customer>();
        assert_mapping::<Employee>();
        assert_mapping::<Container>();
        assert_mapping::<Order>();
        assert_mapping::<TrackingEvent>();
        assert_mapping::<InventoryItem>();
        assert_mapping::<Invoice>();
    }

    #[test]
    fn record_filter_columns_exist_in_tables() {
        assert!(Order::COLUMNS.contains(&"container_id"));
        assert!(Order::COLUMNS.contains(&"qr_code"));
        assert!(TrackingEvent::COLUMNS.contains(&"order_id"));
        assert!(Customer::COLUMNS.contains(&"email"));
        assert!(Invoice::COLUMNS.contains(&"status"));
    }
}
