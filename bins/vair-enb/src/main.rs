use clap::Parser;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use vair_config::{SharedConfig, toml_config};
use vair_core::debug;
use vair_entities::{RlcNet, RrcCollaborators, RrcNet, SessionRegistry};

mod standin;

use standin::LoggingStandIn;

const METRICS_INTERVAL: Duration = Duration::from_secs(10);

/// Load configuration file
fn load_config_from_toml(cfg_path: &str) -> SharedConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            println!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

/// Starts both links on one shared registry
fn build_links(cfg: &SharedConfig) -> (RrcNet, RlcNet) {
    let registry = Arc::new(SessionRegistry::from_config(&cfg.config()));
    let standin = Arc::new(LoggingStandIn::default());

    let collab = RrcCollaborators {
        signalling: standin.clone(),
        bearers: standin.clone(),
        user_plane: standin.clone(),
    };
    let rrc = match RrcNet::start(cfg, registry.clone(), collab) {
        Ok(net) => net,
        Err(e) => {
            tracing::error!("Failed to start session link: {}", e);
            std::process::exit(1);
        }
    };
    let rlc = match RlcNet::start(cfg, registry, standin) {
        Ok(net) => net,
        Err(e) => {
            tracing::error!("Failed to start dynamic-handle link: {}", e);
            rrc.stop();
            std::process::exit(1);
        }
    };
    (rrc, rlc)
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Virtual eNB air interface",
    long_about = "Runs the UDP virtual air interface of an LTE eNB using the provided TOML configuration file"
)]
struct Args {
    /// Config file (required)
    #[arg(help = "TOML config with link endpoints and rnti range")]
    config: String,
}

fn main() {
    let args = Args::parse();
    let cfg = load_config_from_toml(&args.config);
    let _log_guard = debug::setup_logging_default(cfg.config().debug_log.clone());

    let (rrc, rlc) = build_links(&cfg);
    if let (Some(rrc_addr), Some(rlc_addr)) = (rrc.local_addr(), rlc.local_addr()) {
        tracing::info!("session link on {}, dynamic-handle link on {}", rrc_addr, rlc_addr);
    }

    // Set up Ctrl+C handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        tracing::error!("Failed to set Ctrl+C handler: {}", e);
        rrc.stop();
        rlc.stop();
        std::process::exit(1);
    }

    let mut last_report = Instant::now();
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
        if last_report.elapsed() >= METRICS_INTERVAL {
            tracing::info!("RrcNet: {}", rrc.metrics());
            tracing::info!("RlcNet: {}", rlc.metrics());
            last_report = Instant::now();
        }
    }

    tracing::info!("shutting down");
    rrc.stop();
    rlc.stop();
}
