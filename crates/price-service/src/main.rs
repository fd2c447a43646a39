//! Command-line entry point for token price lookups.
//!
//! Loads the resolver configuration, then prints the native price of every
//! token address given on the command line:
//!
//! ```text
//! token-price --config config.toml So11111111111111111111111111111111111111112
//! ```

use clap::Parser;
use price_config::Config;
use price_feed::{PriceResolver, ResolvedPrice};
use price_types::TokenAddress;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the price lookup.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Upper bound in seconds on resolving a single token
	#[arg(short, long)]
	timeout_seconds: Option<u64>,

	/// Token addresses to price
	#[arg(required = true)]
	tokens: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// A missing .env file is fine; variables may come from the environment
	dotenv::dotenv().ok();

	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config = Config::from_file(&args.config).await?;
	let resolver = PriceResolver::from_config(&config)?;
	tracing::info!(
		"Loaded configuration [chain {}, providers {}]",
		resolver.chain_id(),
		resolver.provider_names().join(" -> ")
	);

	let timeout = args.timeout_seconds.map(Duration::from_secs);
	for token in args.tokens {
		let token = TokenAddress::from(token);
		let resolved = lookup(&resolver, &token, timeout).await;
		println!("{}", format_line(&token, resolved.as_ref()));
	}

	Ok(())
}

/// Resolves one token, giving up after `timeout` if one is set.
async fn lookup(
	resolver: &PriceResolver,
	token: &TokenAddress,
	timeout: Option<Duration>,
) -> Option<ResolvedPrice> {
	match timeout {
		Some(limit) => match tokio::time::timeout(limit, resolver.resolve(token)).await {
			Ok(resolved) => resolved,
			Err(_) => {
				tracing::warn!(%token, "Price lookup timed out after {:?}", limit);
				None
			},
		},
		None => resolver.resolve(token).await,
	}
}

fn format_line(token: &TokenAddress, resolved: Option<&ResolvedPrice>) -> String {
	match resolved {
		Some(r) => format!("{} {} ({})", token, r.price, r.source),
		None => format!("{} unknown", token),
	}
}
