use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cargodesk_core::{validate, DomainError, DomainResult, FieldValue, Record};
use cargodesk_parties::{ClientId, CustomerId};
use cargodesk_shipments::{generate_invoice_number, OrderId};

cargodesk_core::record_id!(
    /// Invoice identifier.
    InvoiceId,
    "InvoiceId"
);

/// Upper bound for a tax rate: 100% in basis points.
const MAX_TAX_RATE_BPS: u32 = 10_000;

/// Stored invoice status.
///
/// `Overdue` is never stored: it is derived by [`Invoice::effective_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Void => "void",
        }
    }

    pub fn parse(value: &str) -> DomainResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "void" => Ok(InvoiceStatus::Void),
            other => Err(DomainError::validation(format!(
                "unknown invoice status '{other}'"
            ))),
        }
    }
}

/// Invoice line. Amounts are in the smallest currency unit (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl InvoiceLine {
    pub fn total_cents(&self) -> DomainResult<i64> {
        if self.quantity <= 0 {
            return Err(DomainError::validation(
                "invoice line quantity must be positive",
            ));
        }
        if self.unit_price_cents <= 0 {
            return Err(DomainError::validation(
                "invoice line unit_price_cents must be positive",
            ));
        }
        self.quantity
            .checked_mul(self.unit_price_cents)
            .ok_or_else(|| DomainError::invariant("invoice line amount overflow"))
    }
}

/// Computed amounts for a set of lines at a tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl InvoiceTotals {
    pub fn compute(lines: &[InvoiceLine], tax_rate_bps: u32) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("invoice needs at least one line"));
        }
        if tax_rate_bps > MAX_TAX_RATE_BPS {
            return Err(DomainError::validation("tax_rate_bps cannot exceed 10000"));
        }

        let mut subtotal: i64 = 0;
        for line in lines {
            subtotal = subtotal
                .checked_add(line.total_cents()?)
                .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;
        }

        // Round half up on the cent.
        let tax = (subtotal as i128 * tax_rate_bps as i128 + 5_000) / 10_000;
        let tax = i64::try_from(tax).map_err(|_| DomainError::invariant("invoice tax overflow"))?;
        let total = subtotal
            .checked_add(tax)
            .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;

        Ok(Self {
            subtotal_cents: subtotal,
            tax_cents: tax,
            total_cents: total,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub client_id: Option<ClientId>,
    pub customer_id: Option<CustomerId>,
    pub order_id: Option<OrderId>,
    pub lines: Vec<InvoiceLine>,
    pub tax_rate_bps: u32,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub status: InvoiceStatus,
    pub issued_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub client_id: Option<ClientId>,
    pub customer_id: Option<CustomerId>,
    pub order_id: Option<OrderId>,
    pub lines: Vec<InvoiceLine>,
    #[serde(default)]
    pub tax_rate_bps: u32,
    pub issued_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Partial update. Lines and tax rate can only change while the invoice is a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePatch {
    pub lines: Option<Vec<InvoiceLine>>,
    pub tax_rate_bps: Option<u32>,
    pub due_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Invoice {
    pub fn create(id: InvoiceId, input: NewInvoice, now: DateTime<Utc>) -> DomainResult<Self> {
        if input.client_id.is_none() && input.customer_id.is_none() {
            return Err(DomainError::validation(
                "invoice needs a client_id or a customer_id",
            ));
        }
        let lines = normalize_lines(input.lines)?;
        let totals = InvoiceTotals::compute(&lines, input.tax_rate_bps)?;
        let issued_on = input.issued_on.unwrap_or_else(|| now.date_naive());
        check_due(issued_on, input.due_on)?;

        Ok(Self {
            id,
            invoice_number: generate_invoice_number(issued_on),
            client_id: input.client_id,
            customer_id: input.customer_id,
            order_id: input.order_id,
            lines,
            tax_rate_bps: input.tax_rate_bps,
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            total_cents: totals.total_cents,
            amount_paid_cents: 0,
            status: InvoiceStatus::Draft,
            issued_on,
            due_on: input.due_on,
            notes: validate::optional_trimmed(input.notes.as_deref()),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: InvoicePatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if patch.lines.is_some() || patch.tax_rate_bps.is_some() {
            if self.status != InvoiceStatus::Draft {
                return Err(DomainError::conflict(
                    "lines can only be changed while the invoice is a draft",
                ));
            }
            if let Some(lines) = patch.lines {
                next.lines = normalize_lines(lines)?;
            }
            if let Some(bps) = patch.tax_rate_bps {
                next.tax_rate_bps = bps;
            }
            let totals = InvoiceTotals::compute(&next.lines, next.tax_rate_bps)?;
            next.subtotal_cents = totals.subtotal_cents;
            next.tax_cents = totals.tax_cents;
            next.total_cents = totals.total_cents;
        }
        if patch.due_on.is_some() {
            check_due(next.issued_on, patch.due_on)?;
            next.due_on = patch.due_on;
        }
        if let Some(notes) = patch.notes.as_deref() {
            next.notes = validate::optional_trimmed(Some(notes));
        }
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    pub fn outstanding_cents(&self) -> i64 {
        self.total_cents.saturating_sub(self.amount_paid_cents)
    }

    /// Stored status, with `sent` reported as `overdue` once the due date has passed.
    pub fn effective_status(&self, today: NaiveDate) -> InvoiceStatus {
        match (self.status, self.due_on) {
            (InvoiceStatus::Sent, Some(due)) if today > due => InvoiceStatus::Overdue,
            (status, _) => status,
        }
    }

    pub fn mark_sent(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != InvoiceStatus::Draft {
            return Err(DomainError::conflict(format!(
                "only draft invoices can be sent (status: {})",
                self.status.as_str()
            )));
        }
        self.status = InvoiceStatus::Sent;
        self.updated_at = now;
        Ok(())
    }

    /// Record a payment; the invoice becomes `paid` once nothing is outstanding.
    pub fn register_payment(&mut self, amount_cents: i64, now: DateTime<Utc>) -> DomainResult<()> {
        if matches!(self.status, InvoiceStatus::Void | InvoiceStatus::Paid) {
            return Err(DomainError::invariant(
                "cannot register payment on void or fully paid invoice",
            ));
        }
        if amount_cents <= 0 {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        let new_paid = self
            .amount_paid_cents
            .checked_add(amount_cents)
            .ok_or_else(|| DomainError::invariant("payment total overflow"))?;
        if new_paid > self.total_cents {
            return Err(DomainError::invariant("cannot overpay invoice"));
        }

        self.amount_paid_cents = new_paid;
        if new_paid == self.total_cents {
            self.status = InvoiceStatus::Paid;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn void(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            InvoiceStatus::Void => Err(DomainError::conflict("invoice is already void")),
            InvoiceStatus::Paid => Err(DomainError::conflict("a paid invoice cannot be voided")),
            _ => {
                self.status = InvoiceStatus::Void;
                self.updated_at = now;
                Ok(())
            }
        }
    }
}

fn normalize_lines(lines: Vec<InvoiceLine>) -> DomainResult<Vec<InvoiceLine>> {
    lines
        .into_iter()
        .map(|l| {
            Ok(InvoiceLine {
                description: validate::required("line description", &l.description)?,
                ..l
            })
        })
        .collect()
}

fn check_due(issued_on: NaiveDate, due_on: Option<NaiveDate>) -> DomainResult<()> {
    match due_on {
        Some(due) if due < issued_on => Err(DomainError::validation(
            "due_on cannot be before issued_on",
        )),
        _ => Ok(()),
    }
}

impl Record for Invoice {
    type Id = InvoiceId;
    const KIND: &'static str = "invoice";

    fn id(&self) -> InvoiceId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Id(self.id.into())),
            "invoice_number" => Some(FieldValue::Text(self.invoice_number.clone())),
            "client_id" => self.client_id.map(|v| FieldValue::Id(v.into())),
            "customer_id" => self.customer_id.map(|v| FieldValue::Id(v.into())),
            "order_id" => self.order_id.map(|v| FieldValue::Id(v.into())),
            "status" => Some(FieldValue::Text(self.status.as_str().to_string())),
            _ => None,
        }
    }

    fn unique_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![(
            "invoice_number",
            FieldValue::Text(self.invoice_number.clone()),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn line(quantity: i64, unit_price_cents: i64) -> InvoiceLine {
        InvoiceLine {
            description: "Sea freight, per box".to_string(),
            quantity,
            unit_price_cents,
        }
    }

    fn invoice(lines: Vec<InvoiceLine>, tax_rate_bps: u32) -> Invoice {
        Invoice::create(
            InvoiceId::new(),
            NewInvoice {
                client_id: Some(ClientId::new()),
                lines,
                tax_rate_bps,
                due_on: NaiveDate::from_ymd_opt(2026, 3, 31),
                ..NewInvoice::default()
            },
            test_time(),
        )
        .unwrap()
    }

    #[test]
    fn totals_include_rounded_tax() {
        // 3 × 33.33 = 99.99; 18% = 17.9982 → 18.00
        let inv = invoice(vec![line(3, 3_333)], 1_800);
        assert_eq!(inv.subtotal_cents, 9_999);
        assert_eq!(inv.tax_cents, 1_800);
        assert_eq!(inv.total_cents, 11_799);
        assert_eq!(inv.status, InvoiceStatus::Draft);
        assert!(inv.invoice_number.starts_with("INV-202603-"));
    }

    #[test]
    fn create_rejects_empty_lines_and_missing_party() {
        assert!(Invoice::create(
            InvoiceId::new(),
            NewInvoice {
                client_id: Some(ClientId::new()),
                ..NewInvoice::default()
            },
            test_time()
        )
        .is_err());

        assert!(Invoice::create(
            InvoiceId::new(),
            NewInvoice {
                lines: vec![line(1, 100)],
                ..NewInvoice::default()
            },
            test_time()
        )
        .is_err());
    }

    #[test]
    fn payments_settle_the_invoice() {
        let mut inv = invoice(vec![line(2, 5_000)], 0);
        inv.mark_sent(test_time()).unwrap();
        inv.register_payment(4_000, test_time()).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Sent);
        assert_eq!(inv.outstanding_cents(), 6_000);

        inv.register_payment(6_000, test_time()).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Paid);
        assert_eq!(inv.outstanding_cents(), 0);
    }

    #[test]
    fn overpayment_is_rejected() {
        let mut inv = invoice(vec![line(1, 1_000)], 0);
        assert!(matches!(
            inv.register_payment(1_001, test_time()),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn void_rules() {
        let mut paid = invoice(vec![line(1, 1_000)], 0);
        paid.register_payment(1_000, test_time()).unwrap();
        assert!(matches!(paid.void(test_time()), Err(DomainError::Conflict(_))));

        let mut draft = invoice(vec![line(1, 1_000)], 0);
        draft.void(test_time()).unwrap();
        assert!(draft.register_payment(100, test_time()).is_err());
        assert!(matches!(draft.void(test_time()), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn lines_are_frozen_after_sending() {
        let mut inv = invoice(vec![line(1, 1_000)], 0);
        inv.mark_sent(test_time()).unwrap();
        let err = inv
            .apply_patch(
                InvoicePatch {
                    lines: Some(vec![line(2, 1_000)]),
                    ..InvoicePatch::default()
                },
                test_time(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn patch_recomputes_totals_for_drafts() {
        let mut inv = invoice(vec![line(1, 1_000)], 0);
        inv.apply_patch(
            InvoicePatch {
                tax_rate_bps: Some(1_000),
                ..InvoicePatch::default()
            },
            test_time(),
        )
        .unwrap();
        assert_eq!(inv.total_cents, 1_100);
    }

    #[test]
    fn sent_invoice_past_due_reads_as_overdue() {
        let mut inv = invoice(vec![line(1, 1_000)], 0);
        inv.mark_sent(test_time()).unwrap();
        let before = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let after = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        assert_eq!(inv.effective_status(before), InvoiceStatus::Sent);
        assert_eq!(inv.effective_status(after), InvoiceStatus::Overdue);
    }

    proptest! {
        #[test]
        fn subtotal_is_sum_of_lines(items in proptest::collection::vec((1i64..1_000, 1i64..100_000), 1..20)) {
            let lines: Vec<InvoiceLine> = items.iter().map(|(q, p)| line(*q, *p)).collect();
            let totals = InvoiceTotals::compute(&lines, 0).unwrap();
            let expected: i64 = items.iter().map(|(q, p)| q * p).sum();
            prop_assert_eq!(totals.subtotal_cents, expected);
            prop_assert_eq!(totals.total_cents, expected);
        }
    }
}
