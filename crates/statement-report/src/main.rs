mod bootstrap;
mod export;
mod summary;

use anyhow::{Context, Result};
use statement_core::settings::Settings;
use statement_data::analysis::{run_report, ReportOptions};

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Statement report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Input: {}, Output: {}, Header token: {}",
        settings.input_path.display(),
        settings.output_dir.display(),
        settings.header_token
    );

    let options = ReportOptions {
        input_path: settings.input_path.clone(),
        header_token: settings.header_token.clone(),
    };
    let outcome = run_report(&options)
        .with_context(|| format!("reading statements from {}", settings.input_path.display()))?;

    if outcome.summaries.is_empty() {
        println!("No statements found in {}", settings.input_path.display());
    }

    for year_summary in &outcome.summaries {
        println!("{}", summary::render_summary(year_summary));

        if settings.no_export {
            continue;
        }
        // A failed export is reported but does not stop the other years.
        match export::write_year_csv(year_summary, &settings.output_dir) {
            Ok(path) => tracing::info!("Wrote {}", path.display()),
            Err(e) => tracing::warn!("Export of {} failed: {:#}", year_summary.year, e),
        }
    }

    if outcome.has_failures() {
        print!("{}", summary::render_failures(&outcome.failures));
    }

    Ok(())
}
