use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crossterm::tty::IsTty;

use crate::{
    config::{ConfigLoader, ServerConfig},
    models::{expand_path, parse_date, range_to_seconds},
    option::{Opt, DEFAULT_LIMIT},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Structured,
}

/// The parts of the process environment that resolution depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub now: DateTime<Local>,
    pub interactive: bool,
}

impl Environment {
    pub fn current() -> Self {
        Self {
            now: Local::now(),
            interactive: std::io::stdout().is_tty(),
        }
    }
}

/// A fully resolved search request. Built once per invocation and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub service: Option<String>,
    pub query: String,
    pub limit: u64,
    pub tail_enabled: bool,
    pub range_seconds: u64,
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
    pub output_format: OutputFormat,
    pub color_enabled: bool,
    pub config_path: PathBuf,
    pub server_config: ServerConfig,
}

pub struct OptionResolver<L>
where
    L: ConfigLoader,
{
    loader: L,
    env: Environment,
}

impl<L: ConfigLoader> OptionResolver<L> {
    pub fn new(loader: L, env: Environment) -> Self {
        Self { loader, env }
    }

    pub fn resolve(&self, opt: Opt) -> Result<QuerySpec> {
        let config_path = expand_path(&opt.config).context("The --config path can't be resolved")?;

        let start_time = parse_date(opt.start.as_deref().unwrap_or_default(), false, self.env.now)
            .context("The --start date can't be parsed")?;
        let end_time = parse_date(opt.end.as_deref().unwrap_or_default(), true, self.env.now)
            .context("The --end date can't be parsed")?;

        let limit = if opt.limit <= 0 {
            log::debug!("limit {} replaced by {}", opt.limit, DEFAULT_LIMIT);
            DEFAULT_LIMIT as u64
        } else {
            opt.limit as u64
        };

        let tail_enabled = opt.tail && start_time.is_none();
        if opt.tail && !tail_enabled {
            log::debug!("tail disabled because --start was given");
        }

        let service = opt.service.filter(|s| !s.is_empty());
        let query = merge_query(service.as_deref(), opt.query.unwrap_or_default());

        let range_seconds = range_to_seconds(&opt.range).context("Time range can't be parsed")?;

        let color_enabled = !opt.no_colors && self.env.interactive;
        let output_format = if opt.json {
            OutputFormat::Structured
        } else {
            OutputFormat::Plain
        };

        let server_config = self
            .loader
            .load(&config_path)
            .with_context(|| format!("Failed to load config file {}", config_path.display()))?;

        let spec = QuerySpec {
            service,
            query,
            limit,
            tail_enabled,
            range_seconds,
            start_time,
            end_time,
            output_format,
            color_enabled,
            config_path,
            server_config,
        };
        log::debug!(
            "resolved query {:?} limit {} tail {} range {}s start {:?} end {:?}",
            spec.query,
            spec.limit,
            spec.tail_enabled,
            spec.range_seconds,
            spec.start_time,
            spec.end_time
        );
        Ok(spec)
    }
}

fn merge_query(service: Option<&str>, query: String) -> String {
    match service {
        Some(service) if query.is_empty() => format!("service:{}", service),
        Some(service) => format!("service:{} AND {}", service, query),
        None => query,
    }
}
