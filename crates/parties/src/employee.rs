use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cargodesk_core::{validate, DomainError, DomainResult, FieldValue, Record};

cargodesk_core::record_id!(
    /// Employee identifier.
    EmployeeId,
    "EmployeeId"
);

/// Staff member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub department: Option<String>,
    pub hired_on: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub department: Option<String>,
    pub hired_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub hired_on: Option<NaiveDate>,
    pub active: Option<bool>,
}

impl Employee {
    pub fn create(id: EmployeeId, input: NewEmployee, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id,
            full_name: validate::required("full_name", &input.full_name)?,
            email: validate::email("email", &input.email)?,
            phone: validate::optional_phone("phone", input.phone.as_deref())?,
            position: validate::required("position", &input.position)?,
            department: validate::optional_trimmed(input.department.as_deref()),
            hired_on: input.hired_on,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: EmployeePatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(v) = patch.full_name.as_deref() {
            next.full_name = validate::required("full_name", v)?;
        }
        if let Some(v) = patch.email.as_deref() {
            next.email = validate::email("email", v)?;
        }
        if let Some(v) = patch.phone.as_deref() {
            next.phone = validate::optional_phone("phone", Some(v))?;
        }
        if let Some(v) = patch.position.as_deref() {
            next.position = validate::required("position", v)?;
        }
        if let Some(v) = patch.department.as_deref() {
            next.department = validate::optional_trimmed(Some(v));
        }
        if patch.hired_on.is_some() {
            next.hired_on = patch.hired_on;
        }
        if let Some(active) = patch.active {
            next.active = active;
        }
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Mark the employee as no longer active. Deactivating twice is a conflict.
    pub fn deactivate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.active {
            return Err(DomainError::conflict("employee is already inactive"));
        }
        self.active = false;
        self.updated_at = now;
        Ok(())
    }
}

impl Record for Employee {
    type Id = EmployeeId;
    const KIND: &'static str = "employee";

    fn id(&self) -> EmployeeId {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn employee() -> Employee {
        Employee::create(
            EmployeeId::new(),
            NewEmployee {
                full_name: "Luis Perez".to_string(),
                email: "luis@cargodesk.test".to_string(),
                position: "Warehouse lead".to_string(),
                ..NewEmployee::default()
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn new_employees_are_active() {
        assert!(employee().active);
    }

    #[test]
    fn position_is_required() {
        let err = Employee::create(
            EmployeeId::new(),
            NewEmployee {
                full_name: "Luis".to_string(),
                email: "luis@cargodesk.test".to_string(),
                position: " ".to_string(),
                ..NewEmployee::default()
            },
            now(),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::validation("position is required"));
    }

    #[test]
    fn deactivate_twice_conflicts() {
        let mut e = employee();
        e.deactivate(now()).unwrap();
        assert!(!e.active);
        assert!(matches!(e.deactivate(now()), Err(DomainError::Conflict(_))));
    }
}
