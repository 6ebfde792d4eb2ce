//! `activerdf`: reads, finds, writes and dumps mapped resources.
//!
//! The session is declared in a TOML file (connection, options, kinds) and
//! may be seeded from an N-Triples file. Results are printed as JSON.
//!
//! **Usage:**
//! ```
//! activerdf --config people.toml all Person
//! activerdf --config people.toml get http://m3pe.org/activerdf/test/Instance_7
//! activerdf --config people.toml find Person name=renaud
//! activerdf --config people.toml find Person knows=<http://m3pe.org/activerdf/test/Instance_9>
//! activerdf --config people.toml find-by Person find_by_name_and_age audrey 19
//! activerdf --config people.toml set http://m3pe.org/activerdf/test/Instance_7 age 24 --output out.nt
//! activerdf --config people.toml dump
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::{Path, PathBuf};

use activerdf::{
    Attributes, AttributeValue, Condition, Resource, Session, SessionConfig, Value,
};
use activerdf_store::ntriples;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Map};
use tracing::info;

/// Map triple-store resources onto typed objects.
#[derive(Parser)]
#[command(name = "activerdf", about = "Read, find and write ActiveRDF resources")]
struct Cli {
    /// Session configuration (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// N-Triples file to seed the in-memory store with.
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Context to read and write in, overriding the configuration.
    #[arg(long, global = true)]
    context: Option<String>,

    /// Log diagnostics to stderr (honours RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Suppress all logging.
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one attribute of a resource, or all of them.
    Get {
        /// Resource URI.
        uri: String,
        /// Attribute name; every declared attribute when omitted.
        attribute: Option<String>,
    },
    /// List every resource of a kind.
    All {
        /// Kind name.
        kind: String,
    },
    /// Find resources of a kind by `attribute=value` conditions.
    ///
    /// Repeating an attribute matches any of its values. Values written as
    /// `<uri>` are resources.
    Find {
        /// Kind name.
        kind: String,
        /// Conditions.
        conditions: Vec<String>,
    },
    /// Run a named finder such as `find_by_name_and_age`.
    FindBy {
        /// Kind name.
        kind: String,
        /// Finder name.
        finder: String,
        /// One argument per named attribute.
        args: Vec<String>,
    },
    /// Create a resource with optional `attribute=value` initial values.
    Create {
        /// Kind name.
        kind: String,
        /// Resource URI.
        uri: String,
        /// Initial values.
        values: Vec<String>,
        /// Write the context as N-Triples afterwards.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace the values of an attribute.
    Set {
        /// Resource URI.
        uri: String,
        /// Attribute name.
        attribute: String,
        /// New values; none clears the attribute.
        values: Vec<String>,
        /// Write the context as N-Triples afterwards.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Delete a resource.
    Delete {
        /// Resource URI.
        uri: String,
        /// Write the context as N-Triples afterwards.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the context as N-Triples.
    Dump,
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose && !cli.quiet {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn open_session(cli: &Cli) -> Result<Session> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = &cli.seed {
        config.connection.seed = Some(seed.clone());
    }
    if let Some(context) = &cli.context {
        config.connection.context = Some(context.clone());
    }
    info!(adapter = %config.connection.adapter, kinds = config.kinds.len(), "opening session");
    config.open().context("Failed to open session")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);
    let session = open_session(&cli)?;

    match &cli.command {
        Command::Get { uri, attribute } => {
            let resource = existing(&session, uri)?;
            let out = match attribute {
                Some(attribute) => to_json(&session.get(&resource, attribute)?),
                None => record(&session, &resource)?,
            };
            print_json(&out)?;
        }
        Command::All { kind } => {
            let kind = session.kind(kind)?;
            print_resources(&session, &session.find_all(&kind)?)?;
        }
        Command::Find { kind, conditions } => {
            let kind = session.kind(kind)?;
            let conditions: Vec<Condition> = pairs(&session, conditions)?
                .into_iter()
                .map(|(attribute, value)| Condition::new(attribute, value))
                .collect();
            print_resources(&session, &session.find(&kind, &conditions)?)?;
        }
        Command::FindBy { kind, finder, args } => {
            let kind = session.kind(kind)?;
            let args = args
                .iter()
                .map(|arg| parse_value(&session, arg).map(AttributeValue::One))
                .collect::<Result<Vec<_>>>()?;
            print_resources(&session, &session.find_by(&kind, finder, args)?)?;
        }
        Command::Create {
            kind,
            uri,
            values,
            output,
        } => {
            let kind = session.kind(kind)?;
            let initial = pairs(&session, values)?
                .into_iter()
                .fold(Attributes::new(), |acc, (name, value)| acc.with(name, value));
            let resource = session.create_with(&kind, uri, initial)?;
            print_json(&record(&session, &resource)?)?;
            write_back(&session, output.as_deref())?;
        }
        Command::Set {
            uri,
            attribute,
            values,
            output,
        } => {
            let resource = existing(&session, uri)?;
            let values = values
                .iter()
                .map(|v| parse_value(&session, v))
                .collect::<Result<Vec<_>>>()?;
            session.set(&resource, attribute, AttributeValue::from_values(values))?;
            print_json(&record(&session, &resource)?)?;
            write_back(&session, output.as_deref())?;
        }
        Command::Delete { uri, output } => {
            let resource = existing(&session, uri)?;
            let removed = session.delete(&resource)?;
            println!("Deleted <{uri}>: {removed} triple(s) removed");
            write_back(&session, output.as_deref())?;
        }
        Command::Dump => {
            print!("{}", ntriples::to_ntriples(&session.export()?));
        }
    }
    Ok(())
}

fn existing(session: &Session, uri: &str) -> Result<Resource> {
    match session.lookup(uri)? {
        Some(resource) => Ok(resource),
        None => bail!("No resource <{uri}> in the store"),
    }
}

/// `<uri>` is a resource, anything else a literal.
fn parse_value(session: &Session, raw: &str) -> Result<Value> {
    match raw.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
        Some(uri) => {
            let resource = match session.lookup(uri)? {
                Some(found) => found,
                None => session.resolve(uri, &session.schema().generic()),
            };
            Ok(Value::Resource(resource))
        }
        None => Ok(Value::from(raw)),
    }
}

/// Groups `attribute=value` arguments by attribute, in first-seen order.
fn pairs(session: &Session, raw: &[String]) -> Result<Vec<(String, AttributeValue)>> {
    let mut grouped: Vec<(String, Vec<Value>)> = Vec::new();
    for arg in raw {
        let Some((name, value)) = arg.split_once('=') else {
            bail!("Expected attribute=value, got `{arg}`");
        };
        let value = parse_value(session, value)?;
        match grouped.iter_mut().find(|(n, _)| n == name) {
            Some((_, values)) => values.push(value),
            None => grouped.push((name.to_owned(), vec![value])),
        }
    }
    Ok(grouped
        .into_iter()
        .map(|(name, values)| (name, AttributeValue::from_values(values)))
        .collect())
}

fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Literal(lit) => json!(lit.as_str()),
        Value::Resource(r) => json!({ "uri": r.uri() }),
    }
}

fn to_json(value: &AttributeValue) -> serde_json::Value {
    match value {
        AttributeValue::Absent => serde_json::Value::Null,
        AttributeValue::One(one) => value_json(one),
        AttributeValue::Many(many) => many.iter().map(value_json).collect(),
    }
}

fn record(session: &Session, resource: &Resource) -> Result<serde_json::Value> {
    let mut fields = Map::new();
    fields.insert("uri".into(), json!(resource.uri()));
    fields.insert("kind".into(), json!(resource.kind().name));
    for (name, value) in session.attributes(resource)? {
        fields.insert(name, to_json(&value));
    }
    Ok(serde_json::Value::Object(fields))
}

fn print_resources(session: &Session, found: &[Resource]) -> Result<()> {
    let records = found
        .iter()
        .map(|r| record(session, r))
        .collect::<Result<Vec<_>>>()?;
    print_json(&serde_json::Value::Array(records))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

fn write_back(session: &Session, output: Option<&Path>) -> Result<()> {
    let Some(path) = output else {
        return Ok(());
    };
    let triples = session.export()?;
    fs::write(path, ntriples::to_ntriples(&triples))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("  Written: {} ({} triples)", path.display(), triples.len());
    Ok(())
}
