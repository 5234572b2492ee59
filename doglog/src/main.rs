mod app;
mod client;
mod config;
mod models;
mod option;

use std::{fs::File, path::PathBuf};

use anyhow::{anyhow, Result};
use simplelog::{Config, LevelFilter, WriteLogger};
use structopt::StructOpt;

use crate::{
    app::{Environment, OptionResolver, OutputFormat, QuerySpec},
    client::SearchRequest,
    config::FileConfigLoader,
};

fn setup_logging() -> Result<()> {
    let mut path = get_app_cache_path()?;
    path.push("doglog.log");
    let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), File::create(path)?);
    Ok(())
}

fn get_app_cache_path() -> Result<PathBuf> {
    let mut path = dirs_next::cache_dir().ok_or_else(|| anyhow!("failed to find os cache dir."))?;
    path.push("doglog");
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

/// The cause chain on one line, a blank line, then the usage text.
fn fatal_message(err: &anyhow::Error) -> String {
    format!("{:#}\n\n{}", err, option::usage())
}

/// Prints the cause and the usage text, then exits.
fn invalid_args(err: anyhow::Error) -> ! {
    log::error!("invalid arguments: {:#}", err);
    eprint!("{}", fatal_message(&err));
    std::process::exit(1);
}

fn print_request(spec: &QuerySpec, request: &SearchRequest) -> Result<()> {
    match spec.output_format {
        OutputFormat::Structured => println!("{}", serde_json::to_string_pretty(request)?),
        OutputFormat::Plain => {
            println!("config: {}", spec.config_path.display());
            println!("site:   {}", spec.server_config.site);
            println!("query:  {}", request.query);
            println!("from:   {}", request.window.from);
            println!("to:     {}", request.window.to);
            println!("limit:  {}", request.limit);
            println!("tail:   {}", request.tail);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    if let Err(e) = setup_logging() {
        eprintln!("logging disabled: {:#}", e);
    }

    let opt = option::Opt::from_args();
    let env = Environment::current();

    let spec = match OptionResolver::new(FileConfigLoader, env).resolve(opt) {
        Ok(spec) => spec,
        Err(e) => invalid_args(e),
    };

    let request = SearchRequest::from_spec(&spec, env.now);
    log::debug!("search request is {:?}", request);
    print_request(&spec, &request)
}
