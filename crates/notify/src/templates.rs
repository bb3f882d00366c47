//! Status-change message templates.
//!
//! Wording is keyed by the normalized status key (`in_transit`, `delivered`, ...).
//! Statuses without dedicated wording get a generic "status updated" sentence
//! quoting the label as entered.

use cargodesk_core::Locale;

use crate::message::{Message, Recipient};

/// What the notice is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeSubject {
    Container { container_number: String },
    Order { order_number: String, tracking_url: String },
}

/// Predicate phrase for a known status key, completing "Your package ...".
fn status_phrase(status_key: &str, locale: Locale) -> Option<&'static str> {
    let phrase = match (status_key, locale) {
        ("planned" | "pending", Locale::En) => "has been registered and is being prepared",
        ("planned" | "pending", Locale::Es) => "ha sido registrado y se está preparando",
        ("loading", Locale::En) => "is being loaded",
        ("loading", Locale::Es) => "está siendo cargado",
        ("departed", Locale::En) => "has departed",
        ("departed", Locale::Es) => "ha salido",
        ("in_transit", Locale::En) => "is in transit",
        ("in_transit", Locale::Es) => "está en tránsito",
        ("at_port", Locale::En) => "has arrived at the port",
        ("at_port", Locale::Es) => "ha llegado al puerto",
        ("arrived", Locale::En) => "has arrived at its destination",
        ("arrived", Locale::Es) => "ha llegado a su destino",
        ("customs", Locale::En) => "is being processed by customs",
        ("customs", Locale::Es) => "está en proceso de aduanas",
        ("out_for_delivery", Locale::En) => "is out for delivery",
        ("out_for_delivery", Locale::Es) => "está en ruta de entrega",
        ("delivered", Locale::En) => "has been delivered",
        ("delivered", Locale::Es) => "ha sido entregado",
        ("delayed", Locale::En) => "has been delayed",
        ("delayed", Locale::Es) => "ha sido retrasado",
        ("cancelled" | "canceled", Locale::En) => "has been cancelled",
        ("cancelled" | "canceled", Locale::Es) => "ha sido cancelado",
        _ => return None,
    };
    Some(phrase)
}

fn describe_status(status_label: &str, status_key: &str, locale: Locale) -> String {
    match status_phrase(status_key, locale) {
        Some(p) => p.to_string(),
        None => match locale {
            Locale::En => format!("changed status to \"{status_label}\""),
            Locale::Es => format!("cambió de estado a \"{status_label}\""),
        },
    }
}

/// Render a status-change notice for one recipient in their locale.
pub fn status_notice(
    subject: &NoticeSubject,
    status_label: &str,
    status_key: &str,
    recipient: &Recipient,
) -> Message {
    let locale = recipient.locale;
    let phrase = describe_status(status_label, status_key, locale);

    let (greeting, sign_off) = match locale {
        Locale::En => (format!("Hello {},", recipient.name), "Thank you for shipping with us."),
        Locale::Es => (format!("Hola {},", recipient.name), "Gracias por enviar con nosotros."),
    };

    match subject {
        NoticeSubject::Container { container_number } => {
            let (subject_line, sentence) = match locale {
                Locale::En => (
                    format!("Container {container_number}: status update"),
                    format!("The container {container_number} carrying your shipment {phrase}."),
                ),
                Locale::Es => (
                    format!("Contenedor {container_number}: actualización de estado"),
                    format!("El contenedor {container_number} con su envío {phrase}."),
                ),
            };
            let text = format!("{greeting} {sentence} {sign_off}");
            let html = format!(
                "<p>{}</p><p>{}</p><p>{}</p>",
                escape_html(&greeting),
                escape_html(&sentence),
                escape_html(sign_off)
            );
            Message {
                subject: subject_line,
                text,
                html,
            }
        }
        NoticeSubject::Order {
            order_number,
            tracking_url,
        } => {
            let (subject_line, sentence, track) = match locale {
                Locale::En => (
                    format!("Package {order_number}: status update"),
                    format!("Your package {order_number} {phrase}."),
                    "Track it here:",
                ),
                Locale::Es => (
                    format!("Paquete {order_number}: actualización de estado"),
                    format!("Su paquete {order_number} {phrase}."),
                    "Rastréelo aquí:",
                ),
            };
            let text = format!("{greeting} {sentence} {track} {tracking_url}");
            let html = format!(
                "<p>{}</p><p>{}</p><p>{} <a href=\"{}\">{}</a></p><p>{}</p>",
                escape_html(&greeting),
                escape_html(&sentence),
                escape_html(track),
                escape_html(tracking_url),
                escape_html(tracking_url),
                escape_html(sign_off)
            );
            Message {
                subject: subject_line,
                text,
                html,
            }
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient(locale: Locale) -> Recipient {
        Recipient {
            name: "Ana".to_string(),
            email: Some("ana@example.com".to_string()),
            phone: None,
            locale,
        }
    }

    fn order_subject() -> NoticeSubject {
        NoticeSubject::Order {
            order_number: "ORD-20260301-ABC123".to_string(),
            tracking_url: "https://track.example.com/track/PKG-1".to_string(),
        }
    }

    #[test]
    fn order_notice_in_english() {
        let m = status_notice(&order_subject(), "In Transit", "in_transit", &recipient(Locale::En));
        assert_eq!(m.subject, "Package ORD-20260301-ABC123: status update");
        assert!(m.text.starts_with("Hello Ana,"));
        assert!(m.text.contains("is in transit"));
        assert!(m.text.ends_with("https://track.example.com/track/PKG-1"));
        assert!(m.html.contains("<a href=\"https://track.example.com/track/PKG-1\">"));
    }

    #[test]
    fn container_notice_in_spanish() {
        let subject = NoticeSubject::Container {
            container_number: "MSKU1234567".to_string(),
        };
        let m = status_notice(&subject, "Customs", "customs", &recipient(Locale::Es));
        assert!(m.subject.starts_with("Contenedor MSKU1234567"));
        assert!(m.text.contains("está en proceso de aduanas"));
    }

    #[test]
    fn unknown_status_quotes_label() {
        let m = status_notice(&order_subject(), "Held at depot", "held_at_depot", &recipient(Locale::En));
        assert!(m.text.contains("changed status to \"Held at depot\""));
    }

    #[test]
    fn html_escapes_interpolated_text() {
        let r = Recipient {
            name: "<b>Eve</b>".to_string(),
            ..recipient(Locale::En)
        };
        let m = status_notice(&order_subject(), "delivered", "delivered", &r);
        assert!(m.html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(!m.html.contains("<b>Eve"));
    }
}
