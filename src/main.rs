//! # svcvisor demo binary
//!
//! Supervises three placeholder services (`a` = 3s, `b` = 2s, `c` = 5s) that
//! fail when their timeout elapses, restarting them while the shared retry
//! budget lasts. SIGINT / SIGTERM cancels and drains everything.
//!
//! ## Run
//! ```bash
//! cargo run                       # services fail, budget of 2 restarts
//! cargo run -- --retries 5
//! cargo run -- --clean            # services never fail; stop with Ctrl-C
//! RUST_LOG=debug cargo run
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use svcvisor::{
    LogWriter, OsSignals, RuntimeError, ServiceSpec, Subscribe, Supervisor, SupervisorConfig,
};

#[derive(Debug, Parser)]
#[command(name = "svcvisor", version, about = "Supervise services with a shared restart budget")]
struct Args {
    /// Services won't fail, requiring a signal to exit.
    #[arg(long)]
    clean: bool,

    /// Restarts allowed across all services combined.
    #[arg(long, default_value_t = 2)]
    retries: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = SupervisorConfig {
        retries: args.retries,
        never_fail: args.clean,
        ..SupervisorConfig::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sup = Supervisor::builder(cfg).with_subscribers(subs).build();

    let specs = vec![
        ServiceSpec::new("a", Duration::from_secs(3)),
        ServiceSpec::new("b", Duration::from_secs(2)),
        ServiceSpec::new("c", Duration::from_secs(5)),
    ];
    let signals = OsSignals::new().inspect_err(log_runtime_error)?;

    let report = sup.run(specs, signals).await.inspect_err(log_runtime_error)?;
    tracing::info!(exit = ?report.exit, restarts = report.restarts(), "supervisor finished");
    Ok(())
}

fn log_runtime_error(e: &RuntimeError) {
    tracing::error!(kind = e.as_label(), error = %e, "supervisor setup failed");
}
