use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cargodesk_core::{validate, DomainResult, FieldValue, Locale, Record};

use crate::contact::ContactPoint;

cargodesk_core::record_id!(
    /// Client identifier.
    ClientId,
    "ClientId"
);

/// A business account shipping goods through the company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub preferred_locale: Option<Locale>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input: create a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub preferred_locale: Option<Locale>,
}

/// Input: partial update. `None` keeps the existing value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub preferred_locale: Option<Locale>,
}

impl Client {
    pub fn create(id: ClientId, input: NewClient, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validate::required("name", &input.name)?,
            company: validate::optional_trimmed(input.company.as_deref()),
            email: validate::email("email", &input.email)?,
            phone: validate::optional_phone("phone", input.phone.as_deref())?,
            address: validate::optional_trimmed(input.address.as_deref()),
            preferred_locale: input.preferred_locale,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: ClientPatch, now: DateTime<Utc>) -> DomainResult<()> {
        // Validate everything first so a bad field leaves the record untouched.
        let name = patch
            .name
            .as_deref()
            .map(|v| validate::required("name", v))
            .transpose()?;
        let email = patch
            .email
            .as_deref()
            .map(|v| validate::email("email", v))
            .transpose()?;
        let phone = match patch.phone.as_deref() {
            Some(v) => Some(validate::optional_phone("phone", Some(v))?),
            None => None,
        };

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(company) = patch.company.as_deref() {
            self.company = validate::optional_trimmed(Some(company));
        }
        if let Some(address) = patch.address.as_deref() {
            self.address = validate::optional_trimmed(Some(address));
        }
        if patch.preferred_locale.is_some() {
            self.preferred_locale = patch.preferred_locale;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn contact_point(&self) -> ContactPoint {
        ContactPoint {
            name: self.company.clone().unwrap_or_else(|| self.name.clone()),
            email: Some(self.email.clone()),
            phone: self.phone.clone(),
            locale: self.preferred_locale,
        }
    }
}

impl Record for Client {
    type Id = ClientId;
    const KIND: &'static str = "client";

    fn id(&self) -> ClientId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Id(self.id.into())),
            "email" => Some(FieldValue::Text(self.email.clone())),
            _ => None,
        }
    }

    fn unique_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![("email", FieldValue::Text(self.email.clone()))]
    }
}
