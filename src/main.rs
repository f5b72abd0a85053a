use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use once_cell::sync::Lazy;

use leo_triplet::catalog::{Citation, LEO_TRIPLET};
use leo_triplet::config::SceneConfig;
use leo_triplet::coords::{centered_positions, verify_conventions, ConventionReport};
use leo_triplet::scene::{render, Figure};
use leo_triplet::tail::generate_tail_seeded;

static CONFIG: Lazy<SceneConfig> = Lazy::new(SceneConfig::default);

const RULE_WIDTH: usize = 80;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("{}", error_line(&err));
            ExitCode::FAILURE
        }
    }
}

/// The one line a failed run prints, with the whole context chain.
fn error_line(err: &anyhow::Error) -> String {
    format!("Error: {err:#}")
}

fn run() -> Result<()> {
    let config = &*CONFIG;
    let positions = centered_positions(&LEO_TRIPLET);
    let tail_direction = config
        .tail
        .params
        .unit_direction()
        .context("invalid tail direction")?
        .into_inner();

    let report = verify_conventions(&LEO_TRIPLET, &positions, config.view, tail_direction);
    println!("{report}");
    print_references(LEO_TRIPLET.citations());

    let anchor = positions
        .get(&config.tail.anchor)
        .ok_or_else(|| anyhow!("tail anchor {:?} is not in the catalog", config.tail.anchor))?;
    let tail = generate_tail_seeded(*anchor, &config.tail.params, config.tail.seed)
        .context("failed to generate the tidal tail")?;

    let figure = render(config, &positions, &tail).context("failed to build the scene")?;
    show(figure, config)?;

    print_summary(&report);
    Ok(())
}

#[cfg(feature = "viewer")]
fn show(mut figure: Figure, config: &SceneConfig) -> Result<()> {
    println!("\nOpening 3D view. Scroll to zoom, close the window to finish.");
    figure
        .display(config.display_dpi)
        .context("interactive view failed")
}

#[cfg(not(feature = "viewer"))]
fn show(figure: Figure, config: &SceneConfig) -> Result<()> {
    let path = "leo_triplet.png";
    figure
        .export(path, config.display_dpi)
        .with_context(|| format!("failed to export {path}"))?;
    info!("figure saved to {path}");
    println!("\nFigure saved to {path}");
    Ok(())
}

fn print_references(citations: &[Citation]) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("DATA REFERENCES:");
    println!("{}", "=".repeat(RULE_WIDTH));
    for citation in citations {
        println!("\n{}", citation.source);
        for line in &citation.details {
            println!("  {line}");
        }
    }
}

fn print_summary(report: &ConventionReport) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("VISUALIZATION COMPLETE");
    println!("{}", "=".repeat(RULE_WIDTH));
    for line in report.summary() {
        println!("✓ {line}");
    }
    info!("done");
}
