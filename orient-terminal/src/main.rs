/// Orientation Assist - batch build-feasibility check
///
/// Analyses each mesh file, prints a summary per part and optionally
/// exports the results:
///   orient-assist parts/*.stl --csv report.csv
///   orient-assist bracket.obj --direction 0,0,-1 --threshold 40
use anyhow::Context;
use clap::Parser;
use crossterm::tty::IsTty;
use orient_terminal::{Cli, ExportTargets, ReportPrinter, TerminalApp};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orient_core=info,orient_terminal=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli
        .analysis_config()
        .context("could not load analysis settings")?;
    tracing::info!(
        files = cli.files.len(),
        threshold = config.angle_threshold,
        machines = config.machines.len(),
        "starting analysis"
    );

    let mut stdout = io::stdout().lock();
    let color = !cli.no_color && stdout.is_tty();
    let app = TerminalApp::new(&config, ReportPrinter::new(color))?.with_parallel(cli.parallel);

    let report = app.run(&cli.files, &mut stdout)?;
    let targets = ExportTargets {
        csv: cli.csv,
        json: cli.json,
    };
    app.export(&report, &targets, &mut stdout)
        .context("export failed")?;

    if report.results.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
