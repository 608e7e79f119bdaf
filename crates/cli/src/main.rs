//! # TrustWalk
//!
//! Main entry point for the DNSSEC chain-of-trust diagnostic tool.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;
use trustwalk_dnssec::{recursive, simple_query, walker, ChainOfTrust, DnsClient, FastrandRng, Status, TestSuite};
use trustwalk_domain::Config;

#[derive(Parser)]
#[command(name = "trustwalk")]
#[command(version = "0.1.0")]
#[command(about = "🦀 Walks the DNS delegation chain and reports on DNSSEC health")]
#[command(group(ArgGroup::new("report_scope").args(["all", "failures"])))]
struct Cli {
    /// Fully qualified domain name to diagnose
    #[arg(long)]
    domain: String,

    /// How to render the report
    #[arg(long, value_enum, default_value_t = Ui::Server)]
    ui: Ui,

    /// Include passing test cases in the report
    #[arg(long)]
    all: bool,

    /// Report only failing test cases (the default)
    #[arg(long)]
    failures: bool,

    /// Optional TOML config file (resolvers, query timeout, trust-anchor overrides)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose console/log output; repeat for more detail (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Ui {
    Console,
    Server,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let qname = normalize_qname(&cli.domain);
    tracing::info!("🦀 TrustWalk starting diagnosis for {qname}");

    let config = Config::load(cli.config.as_deref())?;
    let client = DnsClient::with_timeout(config.timeout());
    let rng = FastrandRng;
    let chain = ChainOfTrust::from_overrides(&config.trust_anchors)?;
    let resolvers = simple_query::resolvers_from_config(&config.resolvers);

    let (dnssec_case, simple_case, recursive_case) = tokio::join!(
        walker::run_with_chain(&qname, &client, &rng, chain),
        simple_query::run(&qname, &client, &resolvers),
        recursive::run(&qname, &client, &rng),
    );

    let mut suite = TestSuite::new();
    suite.push(dnssec_case);
    suite.push(simple_case);
    suite.push(recursive_case);

    let include_success = cli.all || !cli.failures;
    match cli.ui {
        Ui::Console => render_console(&suite, cli.verbose > 0),
        Ui::Server => {
            let json = suite.to_json(include_success);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    // Exit code 0 always (§6): failures are reported in the suite, not
    // signaled via the process exit status.
    Ok(ExitCode::SUCCESS)
}

/// Sets the `tracing` log level from `-v` occurrences, unless `RUST_LOG`
/// is set — in which case that takes precedence (§9's "level driven by
/// -v count and RUST_LOG").
fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_ansi(true)
        .init();
}

fn normalize_qname(domain: &str) -> String {
    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{domain}.")
    }
}

fn render_console(suite: &TestSuite, verbose: bool) {
    println!("🦀 TrustWalk report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for case in suite.cases() {
        println!("{} {}", glyph(case.status), case.description);
        if verbose {
            for step in &case.steps {
                println!("   {} {}: {}", glyph(step.status), step.description, step.result);
            }
        }
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "{} success, {} failure(s)",
        suite.success_count(),
        suite.failure_count()
    );
}

fn glyph(status: Status) -> &'static str {
    match status {
        Status::Success => "✅",
        Status::Warning => "⚠️",
        Status::Error => "❌",
    }
}
