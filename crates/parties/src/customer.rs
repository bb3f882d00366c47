use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cargodesk_core::patch::double_option;
use cargodesk_core::{validate, DomainError, DomainResult, FieldValue, Locale, Record};

use crate::client::ClientId;
use crate::contact::ContactPoint;

cargodesk_core::record_id!(
    /// Customer identifier.
    CustomerId,
    "CustomerId"
);

/// The person a shipment is for.
///
/// Customers may belong to a client (the shipper that brought them in).
/// A customer must be reachable: at least one of email or phone is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub client_id: Option<ClientId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub preferred_locale: Option<Locale>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub client_id: Option<ClientId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub preferred_locale: Option<Locale>,
}

/// Partial update. For optional columns an empty string clears the value;
/// `client_id: null` detaches the customer from its client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPatch {
    #[serde(default, with = "double_option")]
    pub client_id: Option<Option<ClientId>>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub preferred_locale: Option<Locale>,
}

impl Customer {
    pub fn create(id: CustomerId, input: NewCustomer, now: DateTime<Utc>) -> DomainResult<Self> {
        let customer = Self {
            id,
            client_id: input.client_id,
            name: validate::required("name", &input.name)?,
            email: validate::optional_email("email", input.email.as_deref())?,
            phone: validate::optional_phone("phone", input.phone.as_deref())?,
            address: validate::optional_trimmed(input.address.as_deref()),
            preferred_locale: input.preferred_locale,
            created_at: now,
            updated_at: now,
        };
        customer.ensure_reachable()?;
        Ok(customer)
    }

    pub fn apply_patch(&mut self, patch: CustomerPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(name) = patch.name.as_deref() {
            next.name = validate::required("name", name)?;
        }
        if let Some(email) = patch.email.as_deref() {
            next.email = validate::optional_email("email", Some(email))?;
        }
        if let Some(phone) = patch.phone.as_deref() {
            next.phone = validate::optional_phone("phone", Some(phone))?;
        }
        if let Some(address) = patch.address.as_deref() {
            next.address = validate::optional_trimmed(Some(address));
        }
        if let Some(client_id) = patch.client_id {
            next.client_id = client_id;
        }
        if patch.preferred_locale.is_some() {
            next.preferred_locale = patch.preferred_locale;
        }
        next.ensure_reachable()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    fn ensure_reachable(&self) -> DomainResult<()> {
        if self.email.is_none() && self.phone.is_none() {
            return Err(DomainError::validation(
                "customer needs at least an email or a phone number",
            ));
        }
        Ok(())
    }

    pub fn contact_point(&self) -> ContactPoint {
        ContactPoint {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            locale: self.preferred_locale,
        }
    }
}

impl Record for Customer {
    type Id = CustomerId;
    const KIND: &'static str = "customer";

    fn id(&self) -> CustomerId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Id(self.id.into())),
            "client_id" => self.client_id.map(|c| FieldValue::Id(c.into())),
            "email" => self.email.clone().map(FieldValue::Text),
            "phone" => self.phone.clone().map(FieldValue::Text),
            _ => None,
        }
    }

    fn unique_fields(&self) -> Vec<(&'static str, FieldValue)> {
        self.email
            .clone()
            .map(|e| vec![("email", FieldValue::Text(e))])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn phone_only_customer_is_valid() {
        let customer = Customer::create(
            CustomerId::new(),
            NewCustomer {
                name: "Pedro".to_string(),
                phone: Some("809-555-0142".to_string()),
                ..NewCustomer::default()
            },
            now(),
        )
        .unwrap();
        assert_eq!(customer.email, None);
        assert_eq!(customer.phone.as_deref(), Some("8095550142"));
    }

    #[test]
    fn unreachable_customer_is_rejected() {
        let err = Customer::create(
            CustomerId::new(),
            NewCustomer {
                name: "Nobody".to_string(),
                email: Some("  ".to_string()),
                ..NewCustomer::default()
            },
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn patch_cannot_clear_last_channel() {
        let mut customer = Customer::create(
            CustomerId::new(),
            NewCustomer {
                name: "Ana".to_string(),
                email: Some("ana@example.com".to_string()),
                ..NewCustomer::default()
            },
            now(),
        )
        .unwrap();
        let before = customer.clone();
        let err = customer
            .apply_patch(
                CustomerPatch {
                    email: Some(String::new()),
                    ..CustomerPatch::default()
                },
                now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(customer, before);
    }

    #[test]
    fn patch_null_client_detaches_customer() {
        let mut customer = Customer::create(
            CustomerId::new(),
            NewCustomer {
                client_id: Some(ClientId::new()),
                name: "Ana".to_string(),
                phone: Some("809-555-0142".to_string()),
                ..NewCustomer::default()
            },
            now(),
        )
        .unwrap();
        customer
            .apply_patch(
                CustomerPatch {
                    client_id: Some(None),
                    ..CustomerPatch::default()
                },
                now(),
            )
            .unwrap();
        assert_eq!(customer.client_id, None);
    }

    #[test]
    fn client_id_is_filterable() {
        let client_id = ClientId::new();
        let customer = Customer::create(
            CustomerId::new(),
            NewCustomer {
                client_id: Some(client_id),
                name: "Ana".to_string(),
                email: Some("ana@example.com".to_string()),
                ..NewCustomer::default()
            },
            now(),
        )
        .unwrap();
        assert!(cargodesk_core::Filter::eq("client_id", *client_id.as_uuid()).matches(&customer));
    }
}
