use clap::Parser;
use std::path::PathBuf;

/// Default literal that marks the true column-header line of an export.
pub const DEFAULT_HEADER_TOKEN: &str = "Buchungstag";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Yearly summaries from monthly bank-statement exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "statement-report",
    about = "Yearly summaries from monthly bank-statement exports",
    version
)]
pub struct Settings {
    /// Folder holding the monthly `<year>_<month>_*.csv` exports
    #[arg(short = 'i', long = "input-path", alias = "input_path", default_value = "files")]
    pub input_path: PathBuf,

    /// Folder the `<year>_out.csv` files are written to
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Literal that identifies the column-header line
    #[arg(long, default_value = DEFAULT_HEADER_TOKEN)]
    pub header_token: String,

    /// Print summaries only, do not write CSV files
    #[arg(long)]
    pub no_export: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`load`](Self::load) but with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Settings::try_parse_from(args).map(Self::resolve)
    }

    /// `--debug` overrides the log level.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
