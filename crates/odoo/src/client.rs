//! Odoo external API client over XML-RPC.
//!
//! The client authenticates lazily on the first business operation and
//! keeps the returned uid for the rest of its life. The session lives in a
//! mutex held across the authenticate call, so a shared client never logs in
//! twice.

use bridge_core::{today, Error, HttpRequest, HttpTransport, ReqwestTransport, Result, Simulation};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use url::Url;

use crate::dry_run;
use crate::types::{
    domain_value, DomainTerm, Expense, FinancialSummary, Invoice, NewExpense, NewInvoice,
    NewPartner, Partner, Period, Record,
};
use crate::xmlrpc::{self, MethodResponse, Value};

const COMMON_ENDPOINT: &str = "xmlrpc/2/common";
const OBJECT_ENDPOINT: &str = "xmlrpc/2/object";

#[derive(Debug, Clone)]
pub struct OdooConfig {
    pub url: String,
    pub db: String,
    pub username: String,
    pub password: String,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Unauthenticated,
    Authenticated(i64),
}

pub struct OdooClient {
    http: Box<dyn HttpTransport>,
    base_url: String,
    db: String,
    username: String,
    password: String,
    session: Mutex<Session>,
    simulation: Simulation,
}

impl OdooClient {
    pub fn new(config: OdooConfig) -> Result<Self> {
        Self::with_transport(config, ReqwestTransport::new()?)
    }

    pub fn with_transport(config: OdooConfig, http: impl HttpTransport + 'static) -> Result<Self> {
        let url = Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("invalid ODOO_URL `{}`: {}", config.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "ODOO_URL must be http or https, got `{}`",
                url.scheme()
            )));
        }

        debug!(url = %url, db = %config.db, dry_run = config.dry_run, "odoo client initialized");
        Ok(Self {
            http: Box::new(http),
            base_url: url.as_str().trim_end_matches('/').to_string(),
            db: config.db,
            username: config.username,
            password: config.password,
            session: Mutex::new(Session::Unauthenticated),
            simulation: Simulation::new("odoo", config.dry_run),
        })
    }

    pub fn is_dry_run(&self) -> bool {
        self.simulation.is_dry_run()
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn database(&self) -> &str {
        &self.db
    }

    pub fn session(&self) -> Session {
        *self.lock_session()
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn call(&self, endpoint: &str, method: &str, params: &[Value]) -> Result<Value> {
        let body = xmlrpc::encode_call(method, params)?;
        let request = HttpRequest::post(format!("{}/{}", self.base_url, endpoint))
            .text("text/xml", body);

        let response = self
            .http
            .send(request)
            .map_err(|e| Error::transport(format!("Odoo request failed: {}", e)))?;
        if !response.is_success() {
            return Err(Error::transport(format!(
                "Odoo request failed: HTTP {}",
                response.status
            )));
        }

        match xmlrpc::decode_response(&response.body)? {
            MethodResponse::Success(value) => Ok(value),
            MethodResponse::Fault { code, message } => {
                debug!(code, %message, "xml-rpc fault");
                Err(Error::transport(format!("Odoo error: {}", message)))
            }
        }
    }

    /// The session uid, authenticating first if this client never has.
    pub fn uid(&self) -> Result<i64> {
        let mut session = self.lock_session();
        if let Session::Authenticated(uid) = *session {
            return Ok(uid);
        }

        let uid = self.simulation.run(
            &format!("authenticate as {}", self.username),
            || dry_run::SESSION_UID,
            || self.authenticate(),
        )?;
        *session = Session::Authenticated(uid);
        debug!(uid, "odoo session established");
        Ok(uid)
    }

    fn authenticate(&self) -> Result<i64> {
        let result = self
            .call(
                COMMON_ENDPOINT,
                "authenticate",
                &[
                    Value::from(self.db.as_str()),
                    Value::from(self.username.as_str()),
                    Value::from(self.password.as_str()),
                    Value::Struct(BTreeMap::new()),
                ],
            )
            .map_err(|e| match e {
                Error::Transport(msg) => {
                    Error::Transport(format!("Odoo authentication failed: {}", msg))
                }
                other => other,
            })?;

        match result {
            Value::Int(uid) if uid > 0 => Ok(uid),
            _ => Err(Error::Auth(
                "Odoo authentication failed: invalid credentials".to_string(),
            )),
        }
    }

    pub fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: BTreeMap<String, Value>,
    ) -> Result<Value> {
        let uid = self.uid()?;
        debug!(model, method, "execute_kw");

        self.simulation.run(
            &format!("call {}.{}", model, method),
            || dry_run::execute(model, method),
            || {
                self.call(
                    OBJECT_ENDPOINT,
                    "execute_kw",
                    &[
                        Value::from(self.db.as_str()),
                        Value::Int(uid),
                        Value::from(self.password.as_str()),
                        Value::from(model),
                        Value::from(method),
                        Value::Array(args),
                        Value::Struct(kwargs),
                    ],
                )
            },
        )
    }

    pub fn search_read(
        &self,
        model: &str,
        domain: &[DomainTerm],
        fields: &[&str],
        limit: Option<usize>,
    ) -> Result<Vec<Value>> {
        let mut kwargs = BTreeMap::new();
        kwargs.insert(
            "fields".to_string(),
            Value::Array(fields.iter().map(|f| Value::from(*f)).collect()),
        );
        if let Some(limit) = limit {
            kwargs.insert("limit".to_string(), Value::Int(limit as i64));
        }

        match self.execute_kw(model, "search_read", vec![domain_value(domain)], kwargs)? {
            Value::Array(rows) => Ok(rows),
            other => Err(Error::protocol(format!(
                "{}.search_read returned {:?}",
                model, other
            ))),
        }
    }

    pub fn create(&self, model: &str, values: Value) -> Result<i64> {
        self.execute_kw(model, "create", vec![values], BTreeMap::new())?
            .as_i64()
            .ok_or_else(|| Error::protocol(format!("{}.create returned no id", model)))
    }

    pub fn write(&self, model: &str, ids: &[i64], values: Value) -> Result<bool> {
        let ids = Value::Array(ids.iter().copied().map(Value::Int).collect());
        Ok(self
            .execute_kw(model, "write", vec![ids, values], BTreeMap::new())?
            .as_bool()
            .unwrap_or(false))
    }

    pub fn unlink(&self, model: &str, ids: &[i64]) -> Result<bool> {
        let ids = Value::Array(ids.iter().copied().map(Value::Int).collect());
        Ok(self
            .execute_kw(model, "unlink", vec![ids], BTreeMap::new())?
            .as_bool()
            .unwrap_or(false))
    }

    fn rows<T>(rows: &[Value], map: impl Fn(&Record<'_>) -> T) -> Result<Vec<T>> {
        rows.iter()
            .map(|row| Record::new(row).map(|r| map(&r)))
            .collect()
    }

    pub fn create_invoice(&self, invoice: &NewInvoice) -> Result<i64> {
        let values = Value::structure([
            ("partner_id", Value::Int(invoice.partner_id)),
            ("move_type", Value::from("out_invoice")),
            (
                "invoice_date",
                Value::from(invoice.invoice_date.clone().unwrap_or_else(today)),
            ),
            (
                "invoice_line_ids",
                Value::Array(invoice.lines.iter().map(|l| l.to_command()).collect()),
            ),
        ]);
        self.create("account.move", values)
    }

    pub fn get_invoices(&self, limit: usize, state: Option<&str>) -> Result<Vec<Invoice>> {
        let mut domain = vec![DomainTerm::eq("move_type", "out_invoice")];
        if let Some(state) = state {
            domain.push(DomainTerm::eq("state", state));
        }
        let rows = self.search_read("account.move", &domain, Invoice::FIELDS, Some(limit))?;
        Self::rows(&rows, Invoice::from_record)
    }

    pub fn record_expense(&self, expense: &NewExpense) -> Result<i64> {
        let employee_id = match expense.employee_id {
            Some(id) => id,
            None => {
                let uid = self.uid()?;
                let employees = self.search_read(
                    "hr.employee",
                    &[DomainTerm::eq("user_id", uid)],
                    &["id"],
                    Some(1),
                )?;
                let first = employees.first().ok_or(Error::NoEmployee)?;
                Record::new(first)?.int("id")
            }
        };

        let mut values = BTreeMap::new();
        values.insert("name".to_string(), Value::from(expense.name.as_str()));
        values.insert("price_unit".to_string(), Value::from(expense.price_unit));
        values.insert("quantity".to_string(), Value::from(expense.quantity));
        if let Some(product) = expense.product_id {
            values.insert("product_id".to_string(), Value::Int(product));
        }
        values.insert("employee_id".to_string(), Value::Int(employee_id));
        values.insert(
            "date".to_string(),
            Value::from(expense.date.clone().unwrap_or_else(today)),
        );

        self.create("hr.expense", Value::Struct(values))
    }

    pub fn get_expenses(&self, limit: usize) -> Result<Vec<Expense>> {
        let rows = self.search_read("hr.expense", &[], Expense::FIELDS, Some(limit))?;
        Self::rows(&rows, Expense::from_record)
    }

    pub fn get_financial_summary(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<FinancialSummary> {
        let mut invoice_domain = vec![DomainTerm::eq("move_type", "out_invoice")];
        let mut expense_domain = Vec::new();
        if let Some(start) = start {
            invoice_domain.push(DomainTerm::condition("invoice_date", ">=", start));
            expense_domain.push(DomainTerm::condition("date", ">=", start));
        }
        if let Some(end) = end {
            invoice_domain.push(DomainTerm::condition("invoice_date", "<=", end));
            expense_domain.push(DomainTerm::condition("date", "<=", end));
        }

        let invoices = self.search_read(
            "account.move",
            &invoice_domain,
            &["amount_total", "state", "payment_state"],
            None,
        )?;
        let expenses = self.search_read(
            "hr.expense",
            &expense_domain,
            &["price_unit", "quantity", "total_amount", "state"],
            None,
        )?;

        Ok(FinancialSummary::compute(
            &Self::rows(&invoices, Invoice::from_record)?,
            &Self::rows(&expenses, Expense::from_record)?,
            Period {
                start: start.map(str::to_string),
                end: end.map(str::to_string),
            },
        ))
    }

    pub fn search_partners(&self, term: &str, limit: usize) -> Result<Vec<Partner>> {
        let domain = [
            DomainTerm::Or,
            DomainTerm::condition("name", "ilike", term),
            DomainTerm::condition("email", "ilike", term),
        ];
        let rows = self.search_read("res.partner", &domain, Partner::FIELDS, Some(limit))?;
        Self::rows(&rows, Partner::from_record)
    }

    pub fn create_partner(&self, partner: &NewPartner) -> Result<i64> {
        self.create("res.partner", partner.to_value())
    }

    pub fn test_connection(&self) -> bool {
        match self.uid() {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "odoo connection test failed");
                false
            }
        }
    }
}
