use gradcheck::{CheckConfig, run_all};
use std::process::ExitCode;
use tracing::{info, warn};

const SEED_VAR: &str = "GRADCHECK_SEED";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let mut config = CheckConfig::default();
    if let Ok(raw) = std::env::var(SEED_VAR) {
        match raw.parse::<u64>() {
            Ok(seed) => config.seed = seed,
            Err(e) => warn!(value = %raw, error = %e, "ignoring invalid {}", SEED_VAR),
        }
    }

    info!(seed = config.seed, "running algorithm checks");
    let report = run_all(&config);
    println!("{}", report);

    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
