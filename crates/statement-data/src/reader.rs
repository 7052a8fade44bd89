//! Statement file discovery and raw loading.
//!
//! Lists the monthly exports in the input folder, finds the true header line
//! behind each file's preamble and parses the semicolon-delimited body into a
//! [`RawTable`] for the normalizer.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use statement_core::error::{Result, StatementError};
use tracing::{debug, info, warn};

// ── Types ─────────────────────────────────────────────────────────────────────

/// A monthly export whose name yielded a (year, month) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFile {
    pub year: String,
    pub month: String,
    pub path: PathBuf,
}

/// Outcome of [`classify_file_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNameKind {
    /// `<year>_<month>[_anything].csv`
    Monthly { year: String, month: String },
    /// Hyphenated names follow an older export convention and are ignored.
    Legacy,
    /// Anything else without a usable (year, month) prefix.
    Unrecognised,
}

/// Everything [`discover_statements`] found in the input folder.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub statements: Vec<StatementFile>,
    pub skipped: Vec<PathBuf>,
}

/// A statement body split into cells, header row first.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// File the table was read from, kept for error messages.
    pub source: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// List the `.csv` files directly inside `input_path`, sorted by path.
///
/// Fails with [`StatementError::NotADirectory`] when `input_path` is not a
/// directory.
pub fn find_statement_files(input_path: &Path) -> Result<Vec<PathBuf>> {
    if !input_path.is_dir() {
        return Err(StatementError::NotADirectory(input_path.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(input_path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}

/// Decide whether a file name follows the `<year>_<month>` convention.
///
/// The year and month are the first two `_`-separated segments of the name
/// without its extension. Names containing `-` are [`FileNameKind::Legacy`]
/// regardless of anything else.
pub fn classify_file_name(file_name: &str) -> FileNameKind {
    if file_name.contains('-') {
        return FileNameKind::Legacy;
    }

    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let mut tokens = stem.split('_');
    match (tokens.next(), tokens.next()) {
        (Some(year), Some(month)) if !year.is_empty() && !month.is_empty() => {
            FileNameKind::Monthly {
                year: year.to_string(),
                month: month.to_string(),
            }
        }
        _ => FileNameKind::Unrecognised,
    }
}

/// Scan `input_path` and sort its exports into usable and skipped files.
pub fn discover_statements(input_path: &Path) -> Result<Discovery> {
    let files = find_statement_files(input_path)?;
    info!(
        "Input path: '{}', {} CSV files",
        input_path.display(),
        files.len()
    );

    let mut discovery = Discovery::default();
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match classify_file_name(&name) {
            FileNameKind::Monthly { year, month } => {
                debug!("Discovered {} as {}-{}", name, year, month);
                discovery.statements.push(StatementFile { year, month, path });
            }
            FileNameKind::Legacy => {
                info!("Skipping '{}': hyphenated names use the legacy export layout", name);
                discovery.skipped.push(path);
            }
            FileNameKind::Unrecognised => {
                warn!("Skipping '{}': name does not start with <year>_<month>", name);
                discovery.skipped.push(path);
            }
        }
    }

    Ok(discovery)
}

// ── Header location ───────────────────────────────────────────────────────────

/// Read a statement file, decoding invalid UTF-8 (Latin-1 umlauts) as U+FFFD.
pub fn read_statement_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| StatementError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Index of the first non-blank line containing `token`.
///
/// Blank lines are neither counted nor matched.
pub fn locate_header_in_text(text: &str, token: &str) -> Option<usize> {
    non_blank_lines(text).position(|line| line.contains(token))
}

/// Scan the file at `path` for the header line marked by `token`.
///
/// Returns `Ok(None)` (the "-1" sentinel) with a warning when no line carries
/// the token; callers then parse from the first non-blank line.
pub fn locate_header(path: &Path, token: &str) -> Result<Option<usize>> {
    let text = read_statement_text(path)?;
    Ok(header_offset(&text, token, path))
}

/// [`locate_header_in_text`] plus the missing-header diagnostic for `path`.
pub(crate) fn header_offset(text: &str, token: &str, path: &Path) -> Option<usize> {
    let found = locate_header_in_text(text, token);
    if found.is_none() {
        warn!(
            "File '{}' has no header row with token '{}', parsing from the first line",
            path.display(),
            token
        );
    }
    found
}

// ── Raw parse ─────────────────────────────────────────────────────────────────

/// Parse `text` as a `;`-delimited table whose header is the non-blank line
/// at `header_line` (or the first non-blank line when `None`).
///
/// Everything from the header line on is handed to the csv reader untouched,
/// so quoted cells keep their line breaks and inner whitespace. Record lengths
/// may vary; cells are trimmed and rows with no content are dropped.
pub fn parse_raw_table(text: &str, header_line: Option<usize>, source: &Path) -> Result<RawTable> {
    let body = &text[non_blank_line_offset(text, header_line.unwrap_or(0))..];

    let csv_err = |source_err: csv::Error| StatementError::CsvParse {
        path: source.to_path_buf(),
        source: source_err,
    };

    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(csv_err)?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    debug!(
        "Parsed {} rows, {} columns from {}",
        rows.len(),
        headers.len(),
        source.display()
    );

    Ok(RawTable {
        source: source.to_path_buf(),
        headers,
        rows,
    })
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Byte offset where the `n`-th non-blank line starts, or `text.len()` when
/// there are fewer lines.
fn non_blank_line_offset(text: &str, n: usize) -> usize {
    let mut offset = 0;
    let mut seen = 0;
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            if seen == n {
                return offset;
            }
            seen += 1;
        }
        offset += line.len();
    }
    text.len()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
