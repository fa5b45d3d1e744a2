use bridge_core::{parse_args, Error, Result, ToolHandler, ToolReply, ToolSpec};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::OdooClient;
use crate::types::{InvoiceLine, NewExpense, NewInvoice, NewPartner, Reference};


pub struct OdooTools {
    client: OdooClient,
}

impl OdooTools {
    pub fn new(client: OdooClient) -> Self {
        Self { client }
    }

    fn message(&self, dry_run: &'static str, live: &'static str) -> &'static str {
        if self.client.is_dry_run() {
            dry_run
        } else {
            live
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct InvoiceItem {
    #[schemars(description = "Item description", length(min = 1))]
    name: String,
    #[schemars(description = "Quantity")]
    quantity: f64,
    #[schemars(description = "Unit price")]
    price: f64,
    #[schemars(description = "Product ID (optional)")]
    product_id: Option<i64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateInvoiceArgs {
    #[schemars(description = "Customer/Partner ID in Odoo", range(min = 1))]
    customer_id: i64,
    #[schemars(description = "Invoice line items")]
    items: Vec<InvoiceItem>,
    #[serde(default)]
    #[schemars(
        schema_with = "bridge_core::schema::date",
        description = "Invoice date (YYYY-MM-DD, defaults to today)"
    )]
    invoice_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
enum InvoiceState {
    Draft,
    Posted,
    Paid,
}

impl InvoiceState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Paid => "paid",
        }
    }
}

fn default_limit() -> usize {
    10
}

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetInvoicesArgs {
    #[serde(default = "default_limit")]
    #[schemars(
        description = "Maximum number of invoices to retrieve",
        range(min = 1, max = 1000)
    )]
    limit: usize,
    #[serde(default)]
    #[schemars(with = "InvoiceState", description = "Filter by state: draft, posted, or paid")]
    state: Option<InvoiceState>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct RecordExpenseArgs {
    #[schemars(description = "Expense description", length(min = 1))]
    name: String,
    #[schemars(description = "Expense amount")]
    amount: f64,
    #[serde(default = "default_quantity")]
    #[schemars(description = "Quantity (default: 1)")]
    quantity: f64,
    #[schemars(description = "Product/Category ID (optional)")]
    product_id: Option<i64>,
    #[schemars(description = "Employee ID (optional, defaults to the current user's employee)")]
    employee_id: Option<i64>,
    #[serde(default)]
    #[schemars(
        schema_with = "bridge_core::schema::date",
        description = "Expense date (YYYY-MM-DD, defaults to today)"
    )]
    date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct LimitArgs {
    #[serde(default = "default_limit")]
    #[schemars(
        description = "Maximum number of expenses to retrieve",
        range(min = 1, max = 1000)
    )]
    limit: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SummaryArgs {
    #[serde(default)]
    #[schemars(
        schema_with = "bridge_core::schema::date",
        description = "Start date (YYYY-MM-DD, optional)"
    )]
    start_date: Option<String>,
    #[serde(default)]
    #[schemars(
        schema_with = "bridge_core::schema::date",
        description = "End date (YYYY-MM-DD, optional)"
    )]
    end_date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchPartnersArgs {
    #[schemars(description = "Name or email to search", length(min = 1))]
    search_term: String,
    #[serde(default = "default_limit")]
    #[schemars(description = "Maximum results", range(min = 1, max = 1000))]
    limit: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CreatePartnerArgs {
    #[schemars(description = "Partner/Customer name", length(min = 1))]
    name: String,
    #[schemars(description = "Email address (optional)")]
    email: Option<String>,
    #[schemars(description = "Phone number (optional)")]
    phone: Option<String>,
    #[serde(default)]
    #[schemars(description = "Is this a company?")]
    is_company: bool,
}

fn display_name(reference: Option<&Reference>) -> &str {
    reference.map_or("Unknown", |r| r.name.as_str())
}

impl ToolHandler for OdooTools {
    fn server_name(&self) -> &'static str {
        "odoo-mcp-server"
    }

    fn specs(&self) -> Vec<ToolSpec> {
        vec![
            ToolSpec::new::<CreateInvoiceArgs>(
                "create_invoice",
                "Create a new customer invoice in Odoo. Returns invoice ID.",
            ),
            ToolSpec::new::<GetInvoicesArgs>(
                "get_invoices",
                "Retrieve recent invoices from Odoo. Filter by state (draft, posted, paid) if needed.",
            ),
            ToolSpec::new::<RecordExpenseArgs>(
                "record_expense",
                "Record a new expense in Odoo. Returns expense ID.",
            ),
            ToolSpec::new::<LimitArgs>("get_expenses", "Retrieve recent expenses from Odoo."),
            ToolSpec::new::<SummaryArgs>(
                "get_financial_summary",
                "Get financial summary including revenue, expenses, and profit for a date range.",
            ),
            ToolSpec::new::<SearchPartnersArgs>(
                "search_partners",
                "Search for customers/partners by name or email.",
            ),
            ToolSpec::new::<CreatePartnerArgs>(
                "create_partner",
                "Create a new customer/partner in Odoo. Returns partner ID.",
            ),
            ToolSpec::without_arguments(
                "test_odoo_connection",
                "Test connection to Odoo server. Useful for verifying configuration.",
            ),
        ]
    }

    fn invoke(&self, name: &str, arguments: Value) -> Result<ToolReply> {
        let reply = match name {
            "create_invoice" => {
                let args: CreateInvoiceArgs = parse_args(arguments)?;
                let invoice = NewInvoice {
                    partner_id: args.customer_id,
                    invoice_date: args.invoice_date,
                    lines: args
                        .items
                        .into_iter()
                        .map(|item| InvoiceLine {
                            name: item.name,
                            quantity: item.quantity,
                            price_unit: item.price,
                            product_id: item.product_id,
                        })
                        .collect(),
                };
                let id = self.client.create_invoice(&invoice)?;
                json!({
                    "success": true,
                    "invoice_id": id,
                    "message": self.message("DRY RUN: Invoice would be created", "Invoice created successfully"),
                    "customer_id": invoice.partner_id,
                    "total_items": invoice.lines.len(),
                })
            }
            "get_invoices" => {
                let args: GetInvoicesArgs = parse_args(arguments)?;
                let invoices = self
                    .client
                    .get_invoices(args.limit, args.state.map(InvoiceState::as_str))?;
                json!({
                    "success": true,
                    "count": invoices.len(),
                    "invoices": invoices.iter().map(|inv| json!({
                        "id": inv.id,
                        "name": inv.name,
                        "customer": display_name(inv.partner.as_ref()),
                        "date": inv.invoice_date,
                        "amount": inv.amount_total,
                        "state": inv.state,
                        "payment_state": inv.payment_state,
                    })).collect::<Vec<_>>(),
                })
            }
            "record_expense" => {
                let args: RecordExpenseArgs = parse_args(arguments)?;
                let expense = NewExpense {
                    name: args.name,
                    price_unit: args.amount,
                    quantity: args.quantity,
                    product_id: args.product_id,
                    employee_id: args.employee_id,
                    date: args.date,
                };
                let id = self.client.record_expense(&expense)?;
                json!({
                    "success": true,
                    "expense_id": id,
                    "message": self.message("DRY RUN: Expense would be recorded", "Expense recorded successfully"),
                    "amount": expense.price_unit,
                })
            }
            "get_expenses" => {
                let args: LimitArgs = parse_args(arguments)?;
                let expenses = self.client.get_expenses(args.limit)?;
                json!({
                    "success": true,
                    "count": expenses.len(),
                    "expenses": expenses.iter().map(|exp| json!({
                        "id": exp.id,
                        "name": exp.name,
                        "employee": display_name(exp.employee.as_ref()),
                        "amount": exp.amount(),
                        "date": exp.date,
                        "state": exp.state,
                    })).collect::<Vec<_>>(),
                })
            }
            "get_financial_summary" => {
                let args: SummaryArgs = parse_args(arguments)?;
                let summary = self
                    .client
                    .get_financial_summary(args.start_date.as_deref(), args.end_date.as_deref())?;
                json!({
                    "success": true,
                    "summary": {
                        "revenue": {
                            "total": summary.revenue.total,
                            "paid": summary.revenue.paid,
                            "unpaid": summary.revenue.unpaid,
                            "invoices": summary.revenue.invoice_count,
                        },
                        "expenses": {
                            "total": summary.expenses.total,
                            "count": summary.expenses.expense_count,
                        },
                        "profit": summary.profit,
                        "period": summary.period,
                    },
                    "message": self.message("DRY RUN: Financial data", "Financial summary retrieved"),
                })
            }
            "search_partners" => {
                let args: SearchPartnersArgs = parse_args(arguments)?;
                let partners = self.client.search_partners(&args.search_term, args.limit)?;
                json!({
                    "success": true,
                    "count": partners.len(),
                    "partners": partners,
                })
            }
            "create_partner" => {
                let args: CreatePartnerArgs = parse_args(arguments)?;
                let partner = NewPartner {
                    name: args.name,
                    email: args.email,
                    phone: args.phone,
                    is_company: args.is_company,
                };
                let id = self.client.create_partner(&partner)?;
                json!({
                    "success": true,
                    "partner_id": id,
                    "message": self.message("DRY RUN: Partner would be created", "Partner created successfully"),
                    "name": partner.name,
                })
            }
            "test_odoo_connection" => {
                let connected = self.client.test_connection();
                json!({
                    "success": connected,
                    "connected": connected,
                    "message": if connected {
                        format!("Connected to Odoo at {}", self.client.url())
                    } else {
                        "Connection failed - check credentials".to_string()
                    },
                    "mode": if self.client.is_dry_run() { "DRY RUN" } else { "LIVE" },
                    "server": self.client.url(),
                    "database": self.client.database(),
                })
            }
            other => return Err(Error::UnknownTool(other.to_string())),
        };

        Ok(ToolReply::json(&reply))
    }

    fn error_reply(&self, error: &Error) -> ToolReply {
        ToolReply::json_error(&json!({
            "success": false,
            "error": error.to_string(),
        }))
    }
}
