//! Loading and saving style sets as CSV files

use std::collections::{BTreeSet, HashSet};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::DEFAULT_STYLES_FILE;
use crate::config::Config;
use crate::error::StyleError;
use crate::set::StyleSet;
use crate::style::{Origin, PromptStyle};

const BOM: &str = "\u{feff}";
const HEADER: &str = "name,prompt,negative_prompt\n";

/// One row of a saved style file
#[derive(Debug, Serialize)]
struct StyleRow<'a> {
    name: &'a str,
    prompt: &'a str,
    negative_prompt: &'a str,
}

impl<'a> From<&'a PromptStyle> for StyleRow<'a> {
    fn from(style: &'a PromptStyle) -> Self {
        Self {
            name: &style.name,
            prompt: &style.prompt,
            negative_prompt: &style.negative_prompt,
        }
    }
}

/// Column positions found in a style file's header
#[derive(Debug, Clone, Copy)]
struct Columns {
    name: usize,
    prompt: usize,
    negative_prompt: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Option<Self> {
        let find = |field: &str| headers.iter().position(|h| h == field);
        Some(Self {
            name: find("name")?,
            // older files use "name, text"
            prompt: find("prompt").or_else(|| find("text"))?,
            negative_prompt: find("negative_prompt"),
        })
    }

    fn style(&self, record: &StringRecord, path: &Path) -> Option<PromptStyle> {
        let field = |pos: usize| record.get(pos).unwrap_or("");

        let name = field(self.name);
        if name.is_empty() || name.starts_with('#') {
            return None;
        }
        let negative_prompt = self.negative_prompt.map(field).unwrap_or("");

        Some(PromptStyle::new(name, field(self.prompt), negative_prompt).with_origin(Origin::File(path.to_path_buf())))
    }
}

/// CSV-backed storage for a style set.
///
/// The path is either a single file (`styles.csv`) or a file name with a
/// wildcard (`styles*.csv`), in which case every matching file in the directory
/// is loaded and each one is headed by a divider record.
#[derive(Debug, Clone)]
pub struct StyleRepository {
    path: PathBuf,
    default_path: PathBuf,
    backup: bool,
}

impl StyleRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let default_path = default_path_for(&path);
        Self {
            path,
            default_path,
            backup: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.styles_path).with_backups(config.backup_on_save)
    }

    /// Keep a `.bak` copy of each file before overwriting it
    pub fn with_backups(mut self, enabled: bool) -> Self {
        self.backup = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File that receives styles not loaded from any file
    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    /// Load a fresh style set
    pub fn load(&self) -> Result<StyleSet, StyleError> {
        let mut set = StyleSet::new();
        self.reload(&mut set)?;
        Ok(set)
    }

    /// Clear `set` and fill it from storage.
    ///
    /// A missing style file is not an error; the set is left empty.
    pub fn reload(&self, set: &mut StyleSet) -> Result<(), StyleError> {
        set.clear();

        let Some(prefix) = self.wildcard_prefix() else {
            if !self.path.exists() {
                warn!(path = %self.path.display(), "Style database not found");
                return Ok(());
            }
            self.load_csv(&self.path, set)?;
            return Ok(());
        };

        let folder = self.path.parent().unwrap_or(Path::new(""));
        if !folder.as_os_str().is_empty() && !folder.is_dir() {
            warn!(folder = %folder.display(), "Style directory not found");
            return Ok(());
        }

        let pattern = PathBuf::from(glob::Pattern::escape(&folder.to_string_lossy()))
            .join(format!("{}*.csv", glob::Pattern::escape(&prefix)));

        for entry in glob::glob(&pattern.to_string_lossy())? {
            let file = match entry {
                Ok(file) => file,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable style file");
                    continue;
                }
            };
            if !file.is_file() {
                continue;
            }
            if let Some(name) = file.file_name() {
                set.insert(PromptStyle::divider(name.to_string_lossy().to_uppercase()));
            }
            self.load_csv(&file, set)?;
        }

        info!(path = %self.path.display(), count = set.len(), "Loaded style files");
        Ok(())
    }

    /// Add the styles of one CSV file to `set`, returning how many were read.
    ///
    /// Rows without a name, or whose name starts with `#`, are skipped. A file
    /// whose header lacks a name or prompt column contributes nothing.
    pub fn load_csv(&self, path: &Path, set: &mut StyleSet) -> Result<usize, StyleError> {
        let content = fs::read_to_string(path).map_err(|source| StyleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = skip_initial_space(content.strip_prefix(BOM).unwrap_or(&content));

        let csv_error = |source| StyleError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(content.as_bytes());

        let headers = reader.headers().map_err(csv_error)?.clone();
        let Some(columns) = Columns::from_headers(&headers) else {
            warn!(path = %path.display(), "Style file needs name and prompt columns, skipping");
            return Ok(0);
        };

        let mut loaded = 0;
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            if let Some(style) = columns.style(&record, path) {
                set.insert(style);
                loaded += 1;
            }
        }

        debug!(path = %path.display(), loaded, "load_csv: done");
        Ok(loaded)
    }

    /// Write every style back to the file it came from.
    ///
    /// Styles without a file go to the default file, which is always written.
    /// Dividers are never written, nor are styles named after one of the files
    /// being written (e.g. "# STYLES.CSV").
    pub fn save(&self, set: &mut StyleSet) -> Result<(), StyleError> {
        set.assign_default_origin(&self.default_path);

        let mut paths: BTreeSet<PathBuf> = set
            .iter()
            .filter_map(|s| s.origin.path())
            .map(Path::to_path_buf)
            .collect();
        paths.insert(self.default_path.clone());

        let file_names: HashSet<String> = paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_lowercase())
            .collect();

        for path in &paths {
            if self.backup && path.exists() {
                backup_file(path)?;
            }

            let rows = set
                .iter()
                .filter(|s| s.origin.path() == Some(path.as_path()))
                .filter(|s| !file_names.contains(&collision_key(&s.name)));
            let written = write_csv(path, rows)?;
            info!(path = %path.display(), count = written, "Saved style file");
        }

        Ok(())
    }

    fn wildcard_prefix(&self) -> Option<String> {
        let file = self.path.file_name()?.to_string_lossy();
        file.split_once('*').map(|(prefix, _)| prefix.to_string())
    }
}

/// Where unassigned styles are saved for a given path spec
fn default_path_for(path: &Path) -> PathBuf {
    let folder = path.parent().unwrap_or(Path::new(""));
    let file = path.file_name().map(|f| f.to_string_lossy()).unwrap_or_default();

    match file.split_once('*') {
        Some((prefix, _)) if !prefix.is_empty() => folder.join(format!("{prefix}.csv")),
        Some(_) => folder.join(DEFAULT_STYLES_FILE),
        None if file.is_empty() => path.join(DEFAULT_STYLES_FILE),
        None => path.to_path_buf(),
    }
}

/// Drop spaces that directly follow a delimiter outside quotes, so that
/// `a, "b, c"` reads as two fields and `" x"` keeps its leading space.
fn skip_initial_space(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut in_quotes = false;
    let mut field_start = true;
    let mut after_delimiter = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            out.push(c);
            if c == '"' {
                // "" is an escaped quote
                if chars.peek() == Some(&'"') {
                    out.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }

        match c {
            ',' => {
                field_start = true;
                after_delimiter = true;
            }
            '\n' | '\r' => {
                field_start = true;
                after_delimiter = false;
            }
            ' ' if after_delimiter => continue,
            _ => {
                in_quotes = field_start && c == '"';
                field_start = false;
                after_delimiter = false;
            }
        }
        out.push(c);
    }

    out
}

fn collision_key(name: &str) -> String {
    name.to_lowercase().trim_matches(|c| c == '#' || c == ' ').to_string()
}

fn backup_file(path: &Path) -> Result<(), StyleError> {
    let mut backup = OsString::from(path.as_os_str());
    backup.push(".bak");
    let backup = PathBuf::from(backup);

    fs::copy(path, &backup).map_err(|source| StyleError::Backup {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(backup = %backup.display(), "backup_file: done");
    Ok(())
}

fn write_csv<'a>(path: &Path, styles: impl Iterator<Item = &'a PromptStyle>) -> Result<usize, StyleError> {
    let write_error = |source| StyleError::Write {
        path: path.to_path_buf(),
        source,
    };
    let csv_error = |source| StyleError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(path).map_err(write_error)?;
    file.write_all(BOM.as_bytes()).map_err(write_error)?;
    file.write_all(HEADER.as_bytes()).map_err(write_error)?;

    // values are always quoted so leading spaces survive the next load
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(file);

    let mut written = 0;
    for style in styles {
        writer.serialize(StyleRow::from(style)).map_err(csv_error)?;
        written += 1;
    }
    writer.flush().map_err(write_error)?;

    Ok(written)
}
