use bridge_core::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::xmlrpc::Value;

/// One element of an Odoo search domain, in Polish (prefix) notation.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainTerm {
    Condition {
        field: &'static str,
        operator: &'static str,
        value: Value,
    },
    Or,
    And,
}

impl DomainTerm {
    pub fn condition(field: &'static str, operator: &'static str, value: impl Into<Value>) -> Self {
        Self::Condition {
            field,
            operator,
            value: value.into(),
        }
    }

    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Self::condition(field, "=", value)
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Condition {
                field,
                operator,
                value,
            } => Value::Array(vec![Value::from(*field), Value::from(*operator), value.clone()]),
            Self::Or => Value::from("|"),
            Self::And => Value::from("&"),
        }
    }
}

pub fn domain_value(terms: &[DomainTerm]) -> Value {
    Value::Array(terms.iter().map(DomainTerm::to_value).collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: f64,
    pub price_unit: f64,
    pub product_id: Option<i64>,
}

impl InvoiceLine {
    /// The `(0, 0, values)` create command for a one2many field.
    pub fn to_command(&self) -> Value {
        let mut values = BTreeMap::new();
        values.insert("name".to_string(), Value::from(self.name.as_str()));
        values.insert("quantity".to_string(), Value::from(self.quantity));
        values.insert("price_unit".to_string(), Value::from(self.price_unit));
        if let Some(product) = self.product_id {
            values.insert("product_id".to_string(), Value::from(product));
        }
        Value::Array(vec![Value::Int(0), Value::Int(0), Value::Struct(values)])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub partner_id: i64,
    pub invoice_date: Option<String>,
    pub lines: Vec<InvoiceLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub name: String,
    pub price_unit: f64,
    pub quantity: f64,
    pub product_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub date: Option<String>,
}

impl NewExpense {
    pub fn new(name: impl Into<String>, price_unit: f64) -> Self {
        Self {
            name: name.into(),
            price_unit,
            quantity: 1.0,
            product_id: None,
            employee_id: None,
            date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPartner {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_company: bool,
}

impl NewPartner {
    pub fn to_value(&self) -> Value {
        let mut values = BTreeMap::new();
        values.insert("name".to_string(), Value::from(self.name.as_str()));
        if let Some(email) = &self.email {
            values.insert("email".to_string(), Value::from(email.as_str()));
        }
        if let Some(phone) = &self.phone {
            values.insert("phone".to_string(), Value::from(phone.as_str()));
        }
        values.insert("is_company".to_string(), Value::from(self.is_company));
        Value::Struct(values)
    }
}

/// A many2one value: `[id, "display name"]` on the wire, `false` when unset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    pub id: i64,
    pub name: String,
}

impl Reference {
    fn from_value(value: &Value) -> Option<Self> {
        match value.as_array()? {
            [id, name, ..] => Some(Self {
                id: id.as_i64()?,
                name: name.as_str().unwrap_or_default().to_string(),
            }),
            _ => None,
        }
    }
}

/// Read access to one `search_read` row. Odoo reports empty fields as
/// `false`, so every accessor falls back to a neutral value.
pub(crate) struct Record<'a>(&'a BTreeMap<String, Value>);

impl<'a> Record<'a> {
    pub fn new(value: &'a Value) -> Result<Self> {
        value
            .as_struct()
            .map(Record)
            .ok_or_else(|| Error::protocol("expected a record struct"))
    }

    pub fn int(&self, key: &str) -> i64 {
        self.0.get(key).and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn float(&self, key: &str) -> f64 {
        self.0.get(key).and_then(Value::as_f64).unwrap_or(0.0)
    }

    pub fn text(&self, key: &str) -> String {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn reference(&self, key: &str) -> Option<Reference> {
        self.0.get(key).and_then(Reference::from_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    pub id: i64,
    pub name: String,
    pub partner: Option<Reference>,
    pub invoice_date: String,
    pub amount_total: f64,
    pub state: String,
    pub payment_state: String,
}

impl Invoice {
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "partner_id",
        "invoice_date",
        "amount_total",
        "state",
        "payment_state",
    ];

    pub(crate) fn from_record(r: &Record<'_>) -> Self {
        Self {
            id: r.int("id"),
            name: r.text("name"),
            partner: r.reference("partner_id"),
            invoice_date: r.text("invoice_date"),
            amount_total: r.float("amount_total"),
            state: r.text("state"),
            payment_state: r.text("payment_state"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub id: i64,
    pub name: String,
    pub employee: Option<Reference>,
    pub price_unit: f64,
    pub quantity: f64,
    pub total_amount: f64,
    pub date: String,
    pub state: String,
}

impl Expense {
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "employee_id",
        "price_unit",
        "quantity",
        "total_amount",
        "date",
        "state",
    ];

    pub(crate) fn from_record(r: &Record<'_>) -> Self {
        Self {
            id: r.int("id"),
            name: r.text("name"),
            employee: r.reference("employee_id"),
            price_unit: r.float("price_unit"),
            quantity: r.float("quantity"),
            total_amount: r.float("total_amount"),
            date: r.text("date"),
            state: r.text("state"),
        }
    }

    /// Recorded total, or unit price times quantity (at least one) when the
    /// server left it empty.
    pub fn amount(&self) -> f64 {
        if self.total_amount != 0.0 {
            self.total_amount
        } else {
            let quantity = if self.quantity == 0.0 { 1.0 } else { self.quantity };
            self.price_unit * quantity
        }
    }

    pub fn counts_toward_totals(&self) -> bool {
        matches!(self.state.as_str(), "approved" | "done")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partner {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub is_company: bool,
}

impl Partner {
    pub const FIELDS: &'static [&'static str] = &["name", "email", "phone", "is_company"];

    pub(crate) fn from_record(r: &Record<'_>) -> Self {
        Self {
            id: r.int("id"),
            name: r.text("name"),
            email: r.text("email"),
            phone: r.text("phone"),
            is_company: r.flag("is_company"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Revenue {
    pub total: f64,
    pub paid: f64,
    pub unpaid: f64,
    pub invoice_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpenseTotals {
    pub total: f64,
    pub expense_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Period {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub revenue: Revenue,
    pub expenses: ExpenseTotals,
    pub profit: f64,
    pub period: Period,
}

impl FinancialSummary {
    /// Only posted invoices and approved or done expenses count toward totals.
    pub fn compute(invoices: &[Invoice], expenses: &[Expense], period: Period) -> Self {
        let mut revenue = Revenue {
            invoice_count: invoices.len(),
            ..Revenue::default()
        };
        for invoice in invoices.iter().filter(|i| i.state == "posted") {
            revenue.total += invoice.amount_total;
            if invoice.payment_state == "paid" {
                revenue.paid += invoice.amount_total;
            } else {
                revenue.unpaid += invoice.amount_total;
            }
        }

        let total_expenses = expenses
            .iter()
            .filter(|e| e.counts_toward_totals())
            .map(Expense::amount)
            .sum();

        Self {
            profit: revenue.total - total_expenses,
            revenue,
            expenses: ExpenseTotals {
                total: total_expenses,
                expense_count: expenses.len(),
            },
            period,
        }
    }
}
