//! Dry-run simulation strategy shared by every vendor client.
//!
//! A client hands each operation to [`Simulation::run`] together with two
//! builders: the live call and a synthetic reply of the same type. In dry-run
//! mode the live closure is never invoked, so no vendor side effect can
//! start.

use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Live,
    DryRun,
}

#[derive(Debug, Clone, Copy)]
pub struct Simulation {
    vendor: &'static str,
    mode: Mode,
}

impl Simulation {
    pub fn new(vendor: &'static str, dry_run: bool) -> Self {
        Self {
            vendor,
            mode: if dry_run { Mode::DryRun } else { Mode::Live },
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode == Mode::DryRun
    }

    pub fn run<T>(
        &self,
        action: &str,
        synthetic: impl FnOnce() -> T,
        live: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        match self.mode {
            Mode::DryRun => {
                info!(vendor = self.vendor, "[DRY RUN] would {}", action);
                Ok(synthetic())
            }
            Mode::Live => live(),
        }
    }
}

/// `{prefix}{unix millis}`, the id shape used for synthetic records.
pub fn synthetic_id(prefix: &str) -> String {
    format!("{}{}", prefix, Utc::now().timestamp_millis())
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn dry_run_never_touches_live_path() {
        let sim = Simulation::new("test", true);
        let out = sim
            .run("explode", || 7, || -> Result<i32> { panic!("live path taken") })
            .unwrap();
        assert_eq!(out, 7);
    }

    #[test]
    fn live_mode_propagates_live_result() {
        let sim = Simulation::new("test", false);
        assert_eq!(sim.mode(), Mode::Live);
        let err = sim
            .run("fail", || 1, || Err(Error::transport("down")))
            .unwrap_err();
        assert_eq!(err.to_string(), "down");
    }

    #[test]
    fn synthetic_ids_carry_prefix() {
        let id = synthetic_id("dry_run_");
        assert!(id.starts_with("dry_run_"));
        assert!(id["dry_run_".len()..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn today_is_iso_date() {
        assert!(chrono::NaiveDate::parse_from_str(&today(), "%Y-%m-%d").is_ok());
    }
}
