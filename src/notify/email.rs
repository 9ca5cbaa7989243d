//! Order emails, rendered with askama and delivered through the upstream
//! `send-email` endpoints.

use askama::Template;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::domain::aggregates::{Order, OrderStatus};

/// Which upstream endpoint delivers the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audience {
    /// `POST /api/admin/send-email`, used by the back office.
    Admin,
    /// `POST /api/send-email`, used by the storefront.
    Customer,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

pub fn format_amount(amount: Decimal) -> String { format!("₹{:.2}", amount) }

struct EmailLine {
    name: String,
    detail: String,
    quantity: u32,
    amount: String,
}

fn lines(order: &Order) -> Vec<EmailLine> {
    order
        .items
        .iter()
        .map(|i| EmailLine {
            name: i.name.clone(),
            detail: [i.color.as_deref(), i.size.as_deref()].into_iter().flatten().collect::<Vec<_>>().join(" / "),
            quantity: i.quantity,
            amount: format_amount(i.line_total()),
        })
        .collect()
}

/// Headline and body copy for each order status.
fn status_copy(status: OrderStatus) -> (&'static str, &'static str) {
    match status {
        OrderStatus::Pending => ("We have received your order", "Your order is waiting for confirmation. We will let you know as soon as it moves ahead."),
        OrderStatus::Confirmed => ("Your order is confirmed", "Thank you for shopping with us. Your order has been confirmed and will be prepared shortly."),
        OrderStatus::Processing => ("We are preparing your order", "Our team is fitting and quality-checking your eyewear."),
        OrderStatus::Shipped => ("Your order is on its way", "Your order has left our warehouse and is on its way to you."),
        OrderStatus::Delivered => ("Your order has been delivered", "We hope you love your new eyewear. Reach out if anything is not quite right."),
        OrderStatus::Cancelled => ("Your order has been cancelled", "Your order was cancelled. Any payment made will be refunded to the original method."),
    }
}

#[derive(Template)]
#[template(path = "email/order_status.html")]
struct OrderStatusHtml<'a> {
    store_name: &'a str,
    customer_name: &'a str,
    order_number: &'a str,
    status_label: &'a str,
    headline: &'a str,
    body: &'a str,
    lines: &'a [EmailLine],
    total: &'a str,
    address: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_status.txt")]
struct OrderStatusText<'a> {
    store_name: &'a str,
    customer_name: &'a str,
    order_number: &'a str,
    status_label: &'a str,
    headline: &'a str,
    body: &'a str,
    lines: &'a [EmailLine],
    total: &'a str,
    address: &'a str,
}

/// Email telling the customer their order moved to `status`.
/// `None` when the order has no contact address.
pub fn order_status_email(store_name: &str, order: &Order, status: OrderStatus) -> Result<Option<EmailMessage>, EmailError> {
    let Some(to) = order.contact_email() else { return Ok(None) };
    let (headline, body) = status_copy(status);
    let lines = lines(order);
    let total = format_amount(order.total);
    let address = order.shipping_address.one_line();
    let customer_name = if order.customer_name().is_empty() { "there" } else { order.customer_name() };

    let html = OrderStatusHtml {
        store_name,
        customer_name,
        order_number: order.number(),
        status_label: status.label(),
        headline,
        body,
        lines: &lines,
        total: &total,
        address: &address,
    }
    .render()?;
    let text = OrderStatusText {
        store_name,
        customer_name,
        order_number: order.number(),
        status_label: status.label(),
        headline,
        body,
        lines: &lines,
        total: &total,
        address: &address,
    }
    .render()?;

    Ok(Some(EmailMessage {
        to: to.to_string(),
        subject: format!("{store_name}: order {} is {}", order.number(), status.as_str()),
        html,
        text,
    }))
}

/// Confirmation sent right after checkout.
pub fn order_confirmation_email(store_name: &str, order: &Order) -> Result<Option<EmailMessage>, EmailError> {
    let message = order_status_email(store_name, order, OrderStatus::Pending)?;
    Ok(message.map(|m| EmailMessage { subject: format!("{store_name}: thank you for your order {}", order.number()), ..m }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::CartItem;

    fn order() -> Order {
        let mut order = Order { order_id: "ORD42".into(), total: Decimal::new(375, 1), ..Order::default() };
        order.customer_email = Some("asha@example.com".into());
        order.shipping_address.full_name = "Asha <Rao>".into();
        order.shipping_address.city = "Pune".into();
        order.items.push(CartItem { product_id: "p1".into(), name: "Aviator".into(), price: Decimal::new(10, 0), quantity: 2, color: Some("gold".into()), size: None, image: None });
        order
    }

    #[test]
    fn test_status_email_content() {
        let message = order_status_email("Optica", &order(), OrderStatus::Shipped).unwrap().unwrap();
        assert_eq!(message.to, "asha@example.com");
        assert_eq!(message.subject, "Optica: order ORD42 is shipped");
        assert!(message.html.contains("Your order is on its way"));
        assert!(message.html.contains("Asha &lt;Rao&gt;"));
        assert!(message.html.contains("₹37.50"));
        assert!(message.text.contains("Asha <Rao>"));
        assert!(message.text.contains("Aviator (gold) x 2"));
    }

    #[test]
    fn test_no_email_without_contact() {
        let mut order = order();
        order.customer_email = None;
        assert!(order_status_email("Optica", &order, OrderStatus::Delivered).unwrap().is_none());
    }

    #[test]
    fn test_confirmation_subject() {
        let message = order_confirmation_email("Optica", &order()).unwrap().unwrap();
        assert_eq!(message.subject, "Optica: thank you for your order ORD42");
        assert!(message.text.contains("We have received your order"));
    }
}
