//! Model-shaped mock replies for `execute_kw` in dry-run mode.

use bridge_core::today;

use crate::xmlrpc::Value;

pub const SESSION_UID: i64 = 1;

pub fn execute(model: &str, method: &str) -> Value {
    match method {
        "create" => Value::Int(1),
        "search_read" | "read" => Value::Array(fixtures(model)),
        _ => Value::Bool(true),
    }
}

fn fixtures(model: &str) -> Vec<Value> {
    let record = match model {
        "res.partner" => Value::structure([
            ("id", Value::Int(1)),
            ("name", Value::from("Test Customer")),
            ("email", Value::from("customer@example.com")),
            ("phone", Value::Bool(false)),
            ("is_company", Value::Bool(false)),
        ]),
        "account.move" => Value::structure([
            ("id", Value::Int(1)),
            ("name", Value::from("INV/2026/0001")),
            ("partner_id", Value::Array(vec![Value::Int(1), Value::from("Test Customer")])),
            ("invoice_date", Value::from(today())),
            ("amount_total", Value::Double(1000.0)),
            ("state", Value::from("draft")),
            ("payment_state", Value::from("not_paid")),
        ]),
        "hr.expense" => Value::structure([
            ("id", Value::Int(1)),
            ("name", Value::from("Office Supplies")),
            ("employee_id", Value::Array(vec![Value::Int(1), Value::from("Dry Run Employee")])),
            ("price_unit", Value::Double(50.0)),
            ("quantity", Value::Double(1.0)),
            ("total_amount", Value::Double(50.0)),
            ("date", Value::from(today())),
            ("state", Value::from("draft")),
        ]),
        "hr.employee" => Value::structure([
            ("id", Value::Int(1)),
            ("name", Value::from("Dry Run Employee")),
        ]),
        "product.product" => Value::structure([
            ("id", Value::Int(1)),
            ("name", Value::from("Consulting Service")),
            ("list_price", Value::Double(100.0)),
        ]),
        _ => Value::structure([("id", Value::Int(1)), ("name", Value::from("Mock Data"))]),
    };
    vec![record]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_follow_method() {
        assert_eq!(execute("res.partner", "create"), Value::Int(1));
        assert_eq!(execute("res.partner", "unlink"), Value::Bool(true));
        assert_eq!(execute("res.partner", "write"), Value::Bool(true));

        let rows = execute("account.move", "search_read");
        let first = &rows.as_array().unwrap()[0];
        assert_eq!(first.get("name").and_then(Value::as_str), Some("INV/2026/0001"));

        let generic = execute("crm.lead", "search_read");
        assert_eq!(
            generic.as_array().unwrap()[0].get("name").and_then(Value::as_str),
            Some("Mock Data")
        );
    }
}
