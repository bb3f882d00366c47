use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cargodesk_core::{validate, DomainResult, FieldValue, Record};

use crate::container::Container;
use crate::order::{Order, OrderId};
use crate::status::StatusLabel;

cargodesk_core::record_id!(
    /// Tracking event identifier.
    TrackingEventId,
    "TrackingEventId"
);

/// A timestamped status/location entry on an order's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub id: TrackingEventId,
    pub order_id: OrderId,
    pub status: StatusLabel,
    pub location: Option<String>,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrackingEvent {
    pub status: String,
    pub location: Option<String>,
    pub description: Option<String>,
    /// Defaults to "now" when omitted.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl TrackingEvent {
    pub fn record(
        id: TrackingEventId,
        order_id: OrderId,
        input: NewTrackingEvent,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            order_id,
            status: StatusLabel::parse(&input.status)?,
            location: validate::optional_trimmed(input.location.as_deref()),
            description: validate::optional_trimmed(input.description.as_deref()),
            occurred_at: input.occurred_at.unwrap_or(now),
        })
    }
}

impl Record for TrackingEvent {
    type Id = TrackingEventId;
    const KIND: &'static str = "tracking_event";

    fn id(&self) -> TrackingEventId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Id(self.id.into())),
            "order_id" => Some(FieldValue::Id(self.order_id.into())),
            _ => None,
        }
    }
}

/// What a customer sees when looking up a package.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingView {
    pub order_number: String,
    pub qr_code: String,
    pub description: String,
    pub origin: String,
    pub destination: String,
    pub status: StatusLabel,
    pub container_number: Option<String>,
    pub container_status: Option<StatusLabel>,
    pub estimated_arrival: Option<chrono::NaiveDate>,
    /// Oldest first.
    pub events: Vec<TrackingEvent>,
    pub updated_at: DateTime<Utc>,
}

impl TrackingView {
    /// Assemble the public view. Events belonging to other orders are dropped.
    pub fn build(order: &Order, container: Option<&Container>, mut events: Vec<TrackingEvent>) -> Self {
        events.retain(|e| e.order_id == order.id);
        events.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then(a.id.cmp(&b.id)));
        Self {
            order_number: order.order_number.clone(),
            qr_code: order.qr_code.clone(),
            description: order.description.clone(),
            origin: order.origin.clone(),
            destination: order.destination.clone(),
            status: order.status.clone(),
            container_number: container.map(|c| c.container_number.clone()),
            container_status: container.map(|c| c.status.clone()),
            estimated_arrival: container.and_then(|c| c.arrival_date),
            events,
            updated_at: order.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::NewOrder;
    use cargodesk_parties::CustomerId;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn order() -> Order {
        Order::create(
            OrderId::new(),
            NewOrder {
                customer_id: Some(CustomerId::new()),
                description: "TV".to_string(),
                origin: "Miami".to_string(),
                destination: "La Romana".to_string(),
                ..NewOrder::default()
            },
            now(),
        )
        .unwrap()
    }

    fn event(order_id: OrderId, status: &str, at: DateTime<Utc>) -> TrackingEvent {
        TrackingEvent::record(
            TrackingEventId::new(),
            order_id,
            NewTrackingEvent {
                status: status.to_string(),
                occurred_at: Some(at),
                ..NewTrackingEvent::default()
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn occurred_at_defaults_to_now() {
        let e = TrackingEvent::record(
            TrackingEventId::new(),
            OrderId::new(),
            NewTrackingEvent {
                status: "received".to_string(),
                location: Some("  Miami warehouse ".to_string()),
                ..NewTrackingEvent::default()
            },
            now(),
        )
        .unwrap();
        assert_eq!(e.occurred_at, now());
        assert_eq!(e.location.as_deref(), Some("Miami warehouse"));
    }

    #[test]
    fn view_sorts_events_and_drops_foreign_ones() {
        let o = order();
        let events = vec![
            event(o.id, "in_transit", now() + Duration::hours(5)),
            event(OrderId::new(), "delivered", now()),
            event(o.id, "received", now()),
        ];
        let view = TrackingView::build(&o, None, events);
        let statuses: Vec<&str> = view.events.iter().map(|e| e.status.as_str()).collect();
        assert_eq!(statuses, vec!["received", "in_transit"]);
        assert_eq!(view.container_number, None);
    }
}
