//! # Report Rendering
//!
//! Fixed-width text tables over a [`DatabaseState`] snapshot.
//!
//! Every table has the same shape:
//! ```text
//! *** Clients         ***
//! ID  | Name                                     | Active | Created At           | Updated At
//! -----------------------------------------------------------------------------------------------------
//! 1   | Los Angeles Lakers                       | true   |  16 Oct 26 09:30 UTC |  16 Oct 26 09:30 UTC
//! Total: 1 row(s)
//! ```
//!
//! The renderers never touch the database; they return the text and the
//! caller prints it.

use chrono::{DateTime, Utc};

use crm_core::{Client, CustomerProductRow, CustomerRow, DatabaseState, Product};

/// RFC 822 style, e.g. `16 Oct 26 09:30 UTC`.
const TIMESTAMP_FORMAT: &str = "%d %b %y %H:%M UTC";

const NAMED_RULE: usize = 101;
const CUSTOMER_RULE: usize = 194;
const CUSTOMER_PRODUCT_RULE: usize = 99;

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn title(name: &str) -> String {
    format!("*** {:<15} ***", name)
}

fn total(rows: usize) -> String {
    format!("Total: {} row(s)", rows)
}

/// Shared layout for clients and products, which have identical columns.
fn render_named<'a>(
    name: &str,
    rows: impl ExactSizeIterator<Item = (i64, &'a str, bool, &'a DateTime<Utc>, &'a DateTime<Utc>)>,
) -> String {
    let count = rows.len();
    let mut lines = Vec::with_capacity(count + 4);

    lines.push(title(name));
    lines.push(format!(
        "{:<3} | {:<40} | {} | {:<20} | {:<20}",
        "ID", "Name", "Active", "Created At", "Updated At"
    ));
    lines.push("-".repeat(NAMED_RULE));
    for (id, name, active, created_at, updated_at) in rows {
        lines.push(format!(
            "{:<3} | {:<40} | {:<6} | {:>20} | {:>20}",
            id,
            name,
            active,
            timestamp(created_at),
            timestamp(updated_at)
        ));
    }
    lines.push(total(count));

    lines.join("\n")
}

/// Renders the client table.
pub fn render_clients(clients: &[Client]) -> String {
    render_named(
        "Clients",
        clients
            .iter()
            .map(|c| (c.id, c.name.as_str(), c.active, &c.created_at, &c.updated_at)),
    )
}

/// Renders the product table.
pub fn render_products(products: &[Product]) -> String {
    render_named(
        "Products",
        products
            .iter()
            .map(|p| (p.id, p.name.as_str(), p.active, &p.created_at, &p.updated_at)),
    )
}

/// Renders customers joined with their client name.
pub fn render_customers(customers: &[CustomerRow]) -> String {
    let mut lines = Vec::with_capacity(customers.len() + 4);

    lines.push(title("Customers"));
    lines.push(format!(
        "{:<3} | {:<10} | {:<20} | {:<20} | {:<40} | {:<40} | {:>20} | {:>20}",
        "ID", "Code", "First Name", "Last Name", "Email", "Client", "Created At", "Updated At"
    ));
    lines.push("-".repeat(CUSTOMER_RULE));
    for c in customers {
        lines.push(format!(
            "{:<3} | {:<10} | {:<20} | {:<20} | {:<40} | {:<40} | {:>20} | {:>20}",
            c.id,
            c.code,
            c.first_name,
            c.last_name,
            c.email_address,
            c.client_name,
            timestamp(&c.created_at),
            timestamp(&c.updated_at)
        ));
    }
    lines.push(total(customers.len()));

    lines.join("\n")
}

/// Renders one line per customer/product link.
pub fn render_customer_products(rows: &[CustomerProductRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 4);

    lines.push(title("Customer/Products"));
    lines.push(format!(
        "{:<10} | {:<20} | {:<20} | {:<40}",
        "Code", "First Name", "Last Name", "Product"
    ));
    lines.push("-".repeat(CUSTOMER_PRODUCT_RULE));
    for row in rows {
        lines.push(format!(
            "{:<10} | {:<20} | {:<20} | {:<40}",
            row.code, row.first_name, row.last_name, row.product_name
        ));
    }
    lines.push(total(rows.len()));

    lines.join("\n")
}

/// Renders all four tables: clients, products, customers, links.
pub fn render_state(state: &DatabaseState) -> String {
    [
        render_clients(&state.clients),
        render_products(&state.products),
        render_customers(&state.customers),
        render_customer_products(&state.customer_products),
    ]
    .join("\n\n")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_empty_state_renders_headers_and_zero_totals() {
        let text = render_state(&DatabaseState::default());

        assert!(text.contains("*** Clients         ***"));
        assert!(text.contains("*** Products        ***"));
        assert!(text.contains("*** Customers       ***"));
        assert!(text.contains("*** Customer/Products ***"));
        assert_eq!(text.matches("Total: 0 row(s)").count(), 4);
    }

    #[test]
    fn test_rules_have_fixed_width() {
        let state = DatabaseState::default();

        let clients = render_clients(&state.clients);
        assert_eq!(clients.lines().nth(2).unwrap().len(), 101);

        let customers = render_customers(&state.customers);
        assert_eq!(customers.lines().nth(2).unwrap().len(), 194);

        let links = render_customer_products(&state.customer_products);
        assert_eq!(links.lines().nth(2).unwrap().len(), 99);
    }

    #[test]
    fn test_client_row_layout() {
        let client = Client {
            id: 1,
            name: "Los Angeles Lakers".to_string(),
            active: true,
            created_at: at(),
            updated_at: at(),
        };

        let text = render_clients(&[client]);
        let row = text.lines().nth(3).unwrap();

        assert!(row.starts_with("1   | Los Angeles Lakers "));
        assert!(row.contains("| true   |"));
        assert!(row.ends_with(" 16 Oct 26 09:30 UTC"));
        assert_eq!(row.len(), 101);
        assert!(text.ends_with("Total: 1 row(s)"));
    }

    #[test]
    fn test_customer_row_includes_client_name() {
        let row = CustomerRow {
            id: 4,
            code: "456".to_string(),
            first_name: "Lew".to_string(),
            last_name: "Alcindor".to_string(),
            email_address: "kabduljabbar@lakers.com".to_string(),
            client_name: "Los Angeles Lakers".to_string(),
            created_at: at(),
            updated_at: at(),
            product_names: Vec::new(),
        };

        let text = render_customers(&[row]);
        let line = text.lines().nth(3).unwrap();

        assert!(line.starts_with("4   | 456        | Lew "));
        assert!(line.contains("| Los Angeles Lakers "));
        assert_eq!(line.len(), 194);
    }

    #[test]
    fn test_customer_products_rows() {
        let rows = vec![CustomerProductRow {
            code: "567".to_string(),
            first_name: "Jerry".to_string(),
            last_name: "West".to_string(),
            product_name: "Fantastic Identity Monitoring".to_string(),
        }];

        let text = render_customer_products(&rows);

        assert!(text.contains("567        | Jerry "));
        assert!(text.contains("| Fantastic Identity Monitoring"));
        assert!(text.ends_with("Total: 1 row(s)"));
    }
}
