//! Status-change notification flows.
//!
//! Changing a container's or an order's status persists the new label,
//! records tracking history, works out who should hear about it, and fans the
//! notice out over email and SMS. Delivery problems never fail the status
//! change itself; they are reported in the returned [`DispatchReport`].

use std::collections::HashSet;

use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use cargodesk_core::{Filter, Locale};
use cargodesk_notify::{
    dedup_recipients, status_notice, DispatchReport, NoticeSubject, NotificationDispatcher, Outbound,
    Recipient,
};
use cargodesk_parties::{ClientId, ContactPoint, CustomerId};
use cargodesk_shipments::{
    Container, ContainerId, NewTrackingEvent, Order, OrderId, StatusLabel, TrackingEvent,
    TrackingEventId,
};

use crate::error::ServiceResult;
use crate::store::Stores;

/// Builds public tracking links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingLinks {
    base_url: String,
}

impl TrackingLinks {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Link encoded in QR labels and sent in order notices.
    pub fn for_qr_code(&self, qr_code: &str) -> String {
        format!("{}/track/{}", self.base_url, qr_code)
    }
}

/// What both flows need to reach people.
#[derive(Clone)]
pub struct NotifyContext {
    pub stores: Stores,
    pub dispatcher: NotificationDispatcher,
    pub links: TrackingLinks,
    /// Locale for parties without a stated preference.
    pub default_locale: Locale,
}

impl NotifyContext {
    fn recipient(&self, contact: ContactPoint) -> Option<Recipient> {
        if !contact.is_reachable() {
            return None;
        }
        Some(Recipient {
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            locale: contact.locale.unwrap_or(self.default_locale),
        })
    }

    /// Customers and clients behind `orders`, deduplicated by record and by address.
    async fn recipients_for(&self, orders: &[Order]) -> ServiceResult<Vec<Recipient>> {
        let mut customer_ids: Vec<CustomerId> = Vec::new();
        let mut client_ids: Vec<ClientId> = Vec::new();
        let mut seen_customers = HashSet::new();
        let mut seen_clients = HashSet::new();
        for order in orders {
            if let Some(id) = order.customer_id {
                if seen_customers.insert(id) {
                    customer_ids.push(id);
                }
            }
            if let Some(id) = order.client_id {
                if seen_clients.insert(id) {
                    client_ids.push(id);
                }
            }
        }

        let mut recipients = Vec::new();
        for id in customer_ids {
            match self.stores.customers.get(id).await? {
                Some(customer) => recipients.extend(self.recipient(customer.contact_point())),
                None => tracing::warn!(customer_id = %id, "order references a missing customer"),
            }
        }
        for id in client_ids {
            match self.stores.clients.get(id).await? {
                Some(client) => recipients.extend(self.recipient(client.contact_point())),
                None => tracing::warn!(client_id = %id, "order references a missing client"),
            }
        }
        Ok(dedup_recipients(recipients))
    }

    async fn send(&self, subject: &NoticeSubject, status: &StatusLabel, recipients: Vec<Recipient>) -> DispatchReport {
        let key = status.key();
        let outbound = recipients
            .into_iter()
            .map(|recipient| Outbound {
                message: status_notice(subject, status.as_str(), &key, &recipient),
                recipient,
            })
            .collect();
        self.dispatcher.dispatch(outbound).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatusChange {
    pub status: String,
    /// Also move every order in the container to the new status.
    pub cascade_orders: bool,
    pub notify: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContainerStatusOutcome {
    pub container: Container,
    pub previous_status: StatusLabel,
    pub orders_updated: usize,
    /// `None` when notification was not requested.
    pub notifications: Option<DispatchReport>,
}

/// Container status changes with customer fan-out.
#[derive(Clone)]
pub struct ContainerNotifier {
    ctx: NotifyContext,
}

impl ContainerNotifier {
    pub fn new(ctx: NotifyContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, change), fields(status = %change.status, cascade = change.cascade_orders), err)]
    pub async fn change_status(
        &self,
        container_id: ContainerId,
        change: ContainerStatusChange,
    ) -> ServiceResult<ContainerStatusOutcome> {
        let stores = &self.ctx.stores;
        let mut container = stores.containers.require(container_id).await?;
        let status = StatusLabel::parse(&change.status)?;
        let now = Utc::now();

        let previous_status = container.set_status(status.clone(), now);
        let container = stores.containers.update(container).await?;

        let orders = stores
            .orders
            .find_by(Filter::eq("container_id", container_id.as_uuid()))
            .await?;

        let mut orders_updated = 0;
        if change.cascade_orders {
            for mut order in orders.iter().cloned() {
                order.set_status(status.clone(), now);
                let order = stores.orders.update(order).await?;
                let event = TrackingEvent::record(
                    TrackingEventId::new(),
                    order.id,
                    NewTrackingEvent {
                        status: status.as_str().to_string(),
                        location: None,
                        description: Some(format!("Container {}: {}", container.container_number, status)),
                        occurred_at: Some(now),
                    },
                    now,
                )?;
                stores.tracking_events.insert(event).await?;
                orders_updated += 1;
            }
        }

        let notifications = if change.notify {
            let recipients = self.ctx.recipients_for(&orders).await?;
            let subject = NoticeSubject::Container {
                container_number: container.container_number.clone(),
            };
            Some(self.ctx.send(&subject, &status, recipients).await)
        } else {
            None
        };

        tracing::info!(
            container_id = %container.id,
            from = %previous_status,
            to = %container.status,
            orders = orders.len(),
            orders_updated,
            "container status changed"
        );

        Ok(ContainerStatusOutcome {
            container,
            previous_status,
            orders_updated,
            notifications,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatusChange {
    pub status: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub notify: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusOutcome {
    pub order: Order,
    pub previous_status: StatusLabel,
    pub event: TrackingEvent,
    pub notifications: Option<DispatchReport>,
}

/// Order status changes with tracking history and customer fan-out.
#[derive(Clone)]
pub struct OrderNotifier {
    ctx: NotifyContext,
}

impl OrderNotifier {
    pub fn new(ctx: NotifyContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, change), fields(status = %change.status), err)]
    pub async fn change_status(
        &self,
        order_id: OrderId,
        change: OrderStatusChange,
    ) -> ServiceResult<OrderStatusOutcome> {
        let stores = &self.ctx.stores;
        let mut order = stores.orders.require(order_id).await?;
        let status = StatusLabel::parse(&change.status)?;
        let now = Utc::now();

        let event = TrackingEvent::record(
            TrackingEventId::new(),
            order_id,
            NewTrackingEvent {
                status: status.as_str().to_string(),
                location: change.location,
                description: change.description,
                occurred_at: Some(now),
            },
            now,
        )?;

        let previous_status = order.set_status(status.clone(), now);
        let order = stores.orders.update(order).await?;
        let event = stores.tracking_events.insert(event).await?;

        let notifications = if change.notify {
            let recipients = self.ctx.recipients_for(std::slice::from_ref(&order)).await?;
            let subject = NoticeSubject::Order {
                order_number: order.order_number.clone(),
                tracking_url: self.ctx.links.for_qr_code(&order.qr_code),
            };
            Some(self.ctx.send(&subject, &status, recipients).await)
        } else {
            None
        };

        tracing::info!(
            order_id = %order.id,
            from = %previous_status,
            to = %order.status,
            "order status changed"
        );

        Ok(OrderStatusOutcome {
            order,
            previous_status,
            event,
            notifications,
        })
    }
}
