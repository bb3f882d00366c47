use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cargodesk_core::patch::double_option;
use cargodesk_core::{validate, DomainError, DomainResult, FieldValue, Record};
use cargodesk_parties::{ClientId, CustomerId};

use crate::codes;
use crate::container::ContainerId;
use crate::status::StatusLabel;

cargodesk_core::record_id!(
    /// Order (package) identifier.
    OrderId,
    "OrderId"
);

/// Status an order starts in when none is given.
pub const INITIAL_ORDER_STATUS: &str = "pending";

/// A customer shipment (package), optionally loaded into a container.
///
/// `order_number` and `qr_code` are generated at creation and never change;
/// they are the two public lookup keys for tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub qr_code: String,
    pub customer_id: Option<CustomerId>,
    pub client_id: Option<ClientId>,
    pub container_id: Option<ContainerId>,
    pub description: String,
    pub weight_kg: Option<f64>,
    pub origin: String,
    pub destination: String,
    pub status: StatusLabel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: Option<CustomerId>,
    pub client_id: Option<ClientId>,
    pub container_id: Option<ContainerId>,
    pub description: String,
    pub weight_kg: Option<f64>,
    pub origin: String,
    pub destination: String,
    pub status: Option<String>,
}

/// Partial update; status changes go through the notification flow instead.
///
/// The id fields take `null` to unlink: `container_id: Some(None)` unloads the
/// order from its container. An order keeps at least one of customer or client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(default, with = "double_option")]
    pub customer_id: Option<Option<CustomerId>>,
    #[serde(default, with = "double_option")]
    pub client_id: Option<Option<ClientId>>,
    #[serde(default, with = "double_option")]
    pub container_id: Option<Option<ContainerId>>,
    pub description: Option<String>,
    pub weight_kg: Option<f64>,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

impl Order {
    pub fn create(id: OrderId, input: NewOrder, now: DateTime<Utc>) -> DomainResult<Self> {
        check_owner(input.customer_id, input.client_id)?;
        Ok(Self {
            id,
            order_number: codes::generate_order_number(now.date_naive()),
            qr_code: codes::generate_qr_code(),
            customer_id: input.customer_id,
            client_id: input.client_id,
            container_id: input.container_id,
            description: validate::required("description", &input.description)?,
            weight_kg: check_weight(input.weight_kg)?,
            origin: validate::required("origin", &input.origin)?,
            destination: validate::required("destination", &input.destination)?,
            status: StatusLabel::parse(input.status.as_deref().unwrap_or(INITIAL_ORDER_STATUS))?,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: OrderPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(customer_id) = patch.customer_id {
            next.customer_id = customer_id;
        }
        if let Some(client_id) = patch.client_id {
            next.client_id = client_id;
        }
        check_owner(next.customer_id, next.client_id)?;
        if let Some(container_id) = patch.container_id {
            next.container_id = container_id;
        }
        if let Some(v) = patch.description.as_deref() {
            next.description = validate::required("description", v)?;
        }
        if patch.weight_kg.is_some() {
            next.weight_kg = check_weight(patch.weight_kg)?;
        }
        if let Some(v) = patch.origin.as_deref() {
            next.origin = validate::required("origin", v)?;
        }
        if let Some(v) = patch.destination.as_deref() {
            next.destination = validate::required("destination", v)?;
        }
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Replace the status; returns the previous one.
    pub fn set_status(&mut self, status: StatusLabel, now: DateTime<Utc>) -> StatusLabel {
        self.updated_at = now;
        std::mem::replace(&mut self.status, status)
    }
}

fn check_owner(customer_id: Option<CustomerId>, client_id: Option<ClientId>) -> DomainResult<()> {
    if customer_id.is_none() && client_id.is_none() {
        return Err(DomainError::validation(
            "order needs a customer_id or a client_id",
        ));
    }
    Ok(())
}

fn check_weight(weight: Option<f64>) -> DomainResult<Option<f64>> {
    match weight {
        Some(w) if !w.is_finite() || w <= 0.0 => {
            Err(DomainError::validation("weight_kg must be a positive number"))
        }
        other => Ok(other),
    }
}

impl Record for Order {
    type Id = OrderId;
    const KIND: &'static str = "order";

    fn id(&self) -> OrderId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Id(self.id.into())),
            "order_number" => Some(FieldValue::Text(self.order_number.clone())),
            "qr_code" => Some(FieldValue::Text(self.qr_code.clone())),
            "customer_id" => self.customer_id.map(|v| FieldValue::Id(v.into())),
            "client_id" => self.client_id.map(|v| FieldValue::Id(v.into())),
            "container_id" => self.container_id.map(|v| FieldValue::Id(v.into())),
            _ => None,
        }
    }

    fn unique_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("order_number", FieldValue::Text(self.order_number.clone())),
            ("qr_code", FieldValue::Text(self.qr_code.clone())),
        ]
    }
}
