use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cargodesk_core::{validate, DomainError, DomainResult, FieldValue, Record};

use crate::status::StatusLabel;

cargodesk_core::record_id!(
    /// Container identifier.
    ContainerId,
    "ContainerId"
);

/// Status a container starts in when none is given.
pub const INITIAL_CONTAINER_STATUS: &str = "planned";

/// A shipping container, tracked from planning through delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub container_number: String,
    pub status: StatusLabel,
    pub origin: String,
    pub destination: String,
    pub departure_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContainer {
    pub container_number: String,
    pub status: Option<String>,
    pub origin: String,
    pub destination: String,
    pub departure_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Partial update. Status changes go through [`Container::set_status`] so the
/// notification flow sees them; a patch never touches the status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPatch {
    pub container_number: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Container {
    pub fn create(id: ContainerId, input: NewContainer, now: DateTime<Utc>) -> DomainResult<Self> {
        let status = StatusLabel::parse(input.status.as_deref().unwrap_or(INITIAL_CONTAINER_STATUS))?;
        let container = Self {
            id,
            container_number: validate::required("container_number", &input.container_number)?
                .to_ascii_uppercase(),
            status,
            origin: validate::required("origin", &input.origin)?,
            destination: validate::required("destination", &input.destination)?,
            departure_date: input.departure_date,
            arrival_date: input.arrival_date,
            notes: validate::optional_trimmed(input.notes.as_deref()),
            created_at: now,
            updated_at: now,
        };
        container.ensure_dates()?;
        Ok(container)
    }

    pub fn apply_patch(&mut self, patch: ContainerPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(v) = patch.container_number.as_deref() {
            next.container_number = validate::required("container_number", v)?.to_ascii_uppercase();
        }
        if let Some(v) = patch.origin.as_deref() {
            next.origin = validate::required("origin", v)?;
        }
        if let Some(v) = patch.destination.as_deref() {
            next.destination = validate::required("destination", v)?;
        }
        if patch.departure_date.is_some() {
            next.departure_date = patch.departure_date;
        }
        if patch.arrival_date.is_some() {
            next.arrival_date = patch.arrival_date;
        }
        if let Some(v) = patch.notes.as_deref() {
            next.notes = validate::optional_trimmed(Some(v));
        }
        next.ensure_dates()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Replace the status. Any label is accepted; returns the previous one.
    pub fn set_status(&mut self, status: StatusLabel, now: DateTime<Utc>) -> StatusLabel {
        self.updated_at = now;
        std::mem::replace(&mut self.status, status)
    }

    fn ensure_dates(&self) -> DomainResult<()> {
        if let (Some(dep), Some(arr)) = (self.departure_date, self.arrival_date) {
            if arr < dep {
                return Err(DomainError::validation(
                    "arrival_date cannot be before departure_date",
                ));
            }
        }
        Ok(())
    }
}

impl Record for Container {
    type Id = ContainerId;
    const KIND: &'static str = "container";

    fn id(&self) -> ContainerId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Id(self.id.into())),
            "container_number" => Some(FieldValue::Text(self.container_number.clone())),
            _ => None,
        }
    }

    fn unique_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![(
            "container_number",
            FieldValue::Text(self.container_number.clone()),
        )]
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

    fn input() -> NewContainer {
        NewContainer {
            container_number: "msku 1234567".to_string(),
            origin: "Miami, FL".to_string(),
            destination: "Santo Domingo".to_string(),
            ..NewContainer::default()
        }
    }

    #[test]
    fn defaults_to_planned_status() {
        let c = Container::create(ContainerId::new(), input(), now()).unwrap();
        assert_eq!(c.status.as_str(), INITIAL_CONTAINER_STATUS);
        assert_eq!(c.container_number, "MSKU 1234567");
    }

    #[test]
    fn arrival_before_departure_is_rejected() {
        let mut i = input();
        i.departure_date = NaiveDate::from_ymd_opt(2026, 3, 10);
        i.arrival_date = NaiveDate::from_ymd_opt(2026, 3, 2);
        assert!(Container::create(ContainerId::new(), i, now()).is_err());
    }

    #[test]
    fn set_status_returns_previous() {
        let mut c = Container::create(ContainerId::new(), input(), now()).unwrap();
        let prev = c.set_status(StatusLabel::parse("In Transit").unwrap(), now());
        assert_eq!(prev.as_str(), "planned");
        assert_eq!(c.status.key(), "in_transit");
    }
}
