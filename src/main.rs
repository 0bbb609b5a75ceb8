use check_paloalto::checks::{Clock, ProbeContext};
use check_paloalto::*;
use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Plugin contract: one status line on stdout, exit 3 for anything we could not evaluate.
fn unknown(message: impl std::fmt::Display) -> ! {
    println!("UNKNOWN - {}", message.to_string().replace('\n', " "));
    std::process::exit(3);
}

#[tokio::main]
async fn main() {
    let cli = match cli::Cli::try_parse() {
        Ok(c) => c,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            std::process::exit(0);
        }
        Err(e) => {
            let rendered = e.render().to_string();
            let first = rendered.lines().next().unwrap_or_default();
            unknown(format!(
                "invalid arguments: {}",
                first.trim_start_matches("error: ")
            ))
        }
    };
    init_tracing(cli.verbose);

    let mut probe_config = match config::ProbeConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => unknown(format!("config: {:#}", e)),
    };
    cli.apply(&mut probe_config);
    tracing::debug!(?probe_config, "effective config");

    let request = match cli.to_request() {
        Ok(r) => r,
        Err(e) => unknown(e),
    };
    let client = match appliance_client::ApplianceClient::for_host(
        &cli.host,
        &cli.token,
        probe_config.timeout(),
        probe_config.appliance.verify_tls,
    ) {
        Ok(c) => c,
        Err(e) => unknown(e),
    };
    let ctx = ProbeContext {
        client,
        state_path: probe_config.state.path.clone(),
        lock_timeout: probe_config.lock_timeout(),
        clock: Clock::System,
    };

    let report = orchestrator::run(&ctx, &request).await;
    println!("{}", report.render(cli.verbose));
    std::process::exit(report.exit_code());
}
