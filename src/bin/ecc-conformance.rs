use std::process;

use tracing::error;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

use ecc_conformance::{always_timed, backend, io::open, App, Config};

#[path = "../bin-lib/args.rs"]
mod args;

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "ecc_conformance=debug"
        } else {
            "ecc_conformance=info"
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() {
    let args: args::Args = argh::from_env();
    init_tracing(args.verbose);
    let config = Config::from(&args);

    let input = match open(args.input.as_deref()) {
        Ok(input) => input,
        Err(err) => {
            error!("cannot open test vectors: {}", err);
            process::exit(1);
        }
    };
    let accelerator = match backend() {
        Ok(accelerator) => accelerator,
        Err(err) => {
            error!("cannot open accelerator: {}", err);
            process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    let mut app = App::new(accelerator, stdout.lock(), &config);
    match always_timed("running test vectors", || app.run(input)) {
        Ok(_) => {
            if let Err(err) = app.finish() {
                error!("writing summary: {}", err);
                process::exit(1);
            }
        }
        Err(err) => {
            if let Err(io) = app.report_fatal(&err) {
                error!("writing summary: {}", io);
            }
            process::exit(1);
        }
    }
}
