//! # webfinger
//!
//! Command-line WebFinger lookup: resolve an identifier and report the
//! well-known relations of its resource descriptor.

use std::time::Duration;

use clap::Parser;
use webfinger_client::WebFingerClient;
use webfinger_core::{Jrd, rels};

#[derive(Parser)]
#[command(name = "webfinger")]
#[command(version)]
#[command(about = "Look up a WebFinger (RFC 7033) resource descriptor")]
struct Cli {
    /// Resource identifier, e.g. alice@example.com
    resource: String,

    /// Report one link relation only (URI or mnemonic)
    #[arg(short, long)]
    rel: Option<String>,

    /// Query this host instead of the one derived from the resource
    #[arg(long)]
    host: Option<String>,

    /// Print the full descriptor as JSON
    #[arg(long)]
    json: bool,

    /// Print the full descriptor as XRD/XML
    #[arg(long, conflicts_with = "json")]
    xml: bool,

    /// Print the unparsed response body
    #[arg(long, conflicts_with_all = ["json", "xml"])]
    raw: bool,

    /// Query official provider endpoints only, skipping unofficial mirrors
    #[arg(long)]
    official: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Print debug logging to the console
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(false)
        .init();

    let mut client = WebFingerClient::with_timeout(Duration::from_secs(cli.timeout));
    if cli.official {
        client = client.official_only();
    }

    // Mnemonics are a local convenience; the wire only speaks URIs.
    let rel = cli.rel.as_deref().map(rels::name_to_uri);
    let host = cli.host.as_deref();

    if cli.raw {
        let body = client.finger_raw(&cli.resource, host, rel).await?;
        println!("{body}");
        return Ok(());
    }

    let jrd = client.finger_at(&cli.resource, host, rel).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(jrd.raw())?);
    } else if cli.xml {
        println!("{}", jrd.to_xml()?);
    } else if let Some(rel) = rel {
        report_relation(&jrd, rel);
    } else {
        report_known_relations(&jrd);
    }
    Ok(())
}

fn report_relation(jrd: &Jrd, rel: &str) {
    println!("--- {} ---", jrd.subject());
    match jrd.rel(rel) {
        Some(links) => {
            for link in links {
                println!("{rel}:\n\t{}", link.href().unwrap_or("(no href)"));
            }
        }
        None => println!("*** no link found for rel={rel}"),
    }
}

fn report_known_relations(jrd: &Jrd) {
    println!("--- {} ---", jrd.subject());
    for &(uri, name) in rels::table() {
        let hrefs: Vec<&str> = jrd
            .rel(uri)
            .unwrap_or_default()
            .iter()
            .filter_map(|link| link.href())
            .collect();
        if !hrefs.is_empty() {
            println!("{name:<18} {}", hrefs.join(", "));
        }
    }
}
