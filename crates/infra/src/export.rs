//! CSV exports (RFC 4180: CRLF line endings, fields quoted when needed).

use cargodesk_invoicing::Invoice;
use cargodesk_shipments::Order;

fn push_field(out: &mut String, field: &str) {
    let needs_quotes = field.contains([',', '"', '\r', '\n']) || field.starts_with(' ') || field.ends_with(' ');
    if needs_quotes {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

fn push_row<S: AsRef<str>>(out: &mut String, row: &[S]) {
    for (i, field) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field.as_ref());
    }
    out.push_str("\r\n");
}

/// Render a header row followed by `rows`.
pub fn to_csv<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> String {
    let mut out = String::new();
    push_row(&mut out, headers);
    for row in rows {
        push_row(&mut out, row);
    }
    out
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn cents(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

pub const ORDER_HEADERS: &[&str] = &[
    "order_number",
    "qr_code",
    "status",
    "description",
    "weight_kg",
    "origin",
    "destination",
    "customer_id",
    "client_id",
    "container_id",
    "created_at",
    "updated_at",
];

pub fn orders_csv(orders: &[Order]) -> String {
    let rows: Vec<Vec<String>> = orders
        .iter()
        .map(|o| {
            vec![
                o.order_number.clone(),
                o.qr_code.clone(),
                o.status.to_string(),
                o.description.clone(),
                opt(o.weight_kg),
                o.origin.clone(),
                o.destination.clone(),
                opt(o.customer_id),
                opt(o.client_id),
                opt(o.container_id),
                o.created_at.to_rfc3339(),
                o.updated_at.to_rfc3339(),
            ]
        })
        .collect();
    to_csv(ORDER_HEADERS, &rows)
}

pub const INVOICE_HEADERS: &[&str] = &[
    "invoice_number",
    "status",
    "issued_on",
    "due_on",
    "client_id",
    "customer_id",
    "order_id",
    "subtotal",
    "tax",
    "total",
    "paid",
    "outstanding",
];

/// Invoice export. `status` is the effective status on `today` (so overdue shows).
pub fn invoices_csv(invoices: &[Invoice], today: chrono::NaiveDate) -> String {
    let rows: Vec<Vec<String>> = invoices
        .iter()
        .map(|inv| {
            vec![
                inv.invoice_number.clone(),
                inv.effective_status(today).as_str().to_string(),
                inv.issued_on.to_string(),
                opt(inv.due_on),
                opt(inv.client_id),
                opt(inv.customer_id),
                opt(inv.order_id),
                cents(inv.subtotal_cents),
                cents(inv.tax_cents),
                cents(inv.total_cents),
                cents(inv.amount_paid_cents),
                cents(inv.outstanding_cents()),
            ]
        })
        .collect();
    to_csv(INVOICE_HEADERS, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cargodesk_invoicing::{InvoiceId, InvoiceLine, NewInvoice};
    use cargodesk_parties::CustomerId;
    use cargodesk_shipments::{NewOrder, OrderId};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn quotes_only_when_needed() {
        let csv = to_csv(
            &["a", "b", "c"],
            &[vec!["plain", "has,comma", "say \"hi\""], vec!["multi\nline", "", " padded"]],
        );
        assert_eq!(
            csv,
            "a,b,c\r\nplain,\"has,comma\",\"say \"\"hi\"\"\"\r\n\"multi\nline\",,\" padded\"\r\n"
        );
    }

    #[test]
    fn formats_cents() {
        assert_eq!(cents(0), "0.00");
        assert_eq!(cents(1234), "12.34");
        assert_eq!(cents(5), "0.05");
        assert_eq!(cents(-150), "-1.50");
    }

    #[test]
    fn order_rows_follow_headers() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("date");
        let order = Order::create(
            OrderId::new(),
            NewOrder {
                customer_id: Some(CustomerId::new()),
                description: "Boxes, fragile".to_string(),
                weight_kg: Some(12.5),
                origin: "Miami".to_string(),
                destination: "Santo Domingo".to_string(),
                ..NewOrder::default()
            },
            now,
        )
        .expect("order");

        let csv = orders_csv(std::slice::from_ref(&order));
        let mut lines = csv.split("\r\n");
        assert_eq!(lines.next(), Some(ORDER_HEADERS.join(",").as_str()));
        let row = lines.next().expect("data row");
        assert!(row.starts_with(&format!("{},{},pending,\"Boxes, fragile\",12.5,Miami", order.order_number, order.qr_code)));
    }

    #[test]
    fn invoice_rows_report_effective_status_and_money() {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).single().expect("date");
        let mut invoice = Invoice::create(
            InvoiceId::new(),
            NewInvoice {
                customer_id: Some(CustomerId::new()),
                lines: vec![InvoiceLine {
                    description: "Freight".to_string(),
                    quantity: 2,
                    unit_price_cents: 10_000,
                }],
                tax_rate_bps: 1_800,
                due_on: NaiveDate::from_ymd_opt(2026, 1, 31),
                ..NewInvoice::default()
            },
            now,
        )
        .expect("invoice");
        invoice.mark_sent(now).expect("send");

        let today = NaiveDate::from_ymd_opt(2026, 2, 15).expect("date");
        let csv = invoices_csv(&[invoice.clone()], today);
        let row = csv.split("\r\n").nth(1).expect("data row");
        assert!(row.starts_with(&format!("{},overdue,2026-01-10,2026-01-31", invoice.invoice_number)));
        assert!(row.ends_with("200.00,36.00,236.00,0.00,236.00"));
    }
}
