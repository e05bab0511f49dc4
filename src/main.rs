use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vsm_timemap::{render, RenderConfig};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let config = RenderConfig::parse();
    init_tracing(config.verbose);

    let engine = match config.engine() {
        Ok(engine) => engine,
        Err(e) => {
            error!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let outcomes = match render::render_all(&config, &engine) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let mut failed = 0;
    for (input, result) in &outcomes {
        if let Err(e) = result {
            error!(input = %input.display(), "{e}");
            failed += 1;
        }
    }

    info!(
        rendered = outcomes.len() - failed,
        failed, "finished rendering timemaps"
    );
    if failed > 0 {
        std::process::exit(1);
    }
}
