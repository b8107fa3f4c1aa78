//! Configuration schema and loader for checklist documents.
//!
//! A checklist config may be written as TOML, YAML or JSON; the format is
//! chosen from the file extension. Every format decodes into the same closed
//! schema (unknown keys are rejected, keys are kebab-case) and is then
//! validated into typed structures, so consumers never see a config that
//! violates the element or paper-size rules.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_COMPILER: &str = "xelatex";

/// Prefix of serde's `Error::unknown_field` message, shared by every format.
const UNKNOWN_FIELD_PREFIX: &str = "unknown field `";

/// Fully validated checklist configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecklistConfig {
    pub document: DocumentConfig,
    /// Checklists keyed by their config identifier, in declaration order.
    pub checklists: IndexMap<String, ChecklistData>,
}

/// Document-level metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Path of the markup file included verbatim at the top of the document.
    pub preamble: PathBuf,
    /// Base name of the generated `.tex` and `.pdf` files.
    pub name: String,
    pub title: String,
    pub version: Option<String>,
    pub date: Option<String>,
    pub papersize: PaperSize,
    /// Executable used to typeset the generated markup.
    pub compiler: String,
}

/// A single checklist block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecklistData {
    pub title: String,
    pub items: Vec<ChecklistElement>,
}

/// Checklist entry: either a value to check, or a decision with follow-up steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChecklistElement {
    Item {
        title: String,
        value: String,
        hints: Vec<String>,
    },
    Decision {
        title: String,
        steps: Vec<String>,
    },
}

impl ChecklistElement {
    pub fn title(&self) -> &str {
        match self {
            ChecklistElement::Item { title, .. } | ChecklistElement::Decision { title, .. } => {
                title
            }
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            ChecklistElement::Item { .. } => ElementKind::Item,
            ChecklistElement::Decision { .. } => ElementKind::Decision,
        }
    }
}

/// Recognised values of an element's `type` key.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ElementKind {
    Item,
    Decision,
}

impl ElementKind {
    pub const ALL: &'static [ElementKind] = &[ElementKind::Item, ElementKind::Decision];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Item => "item",
            ElementKind::Decision => "decision",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ElementKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "item" => Ok(ElementKind::Item),
            "decision" => Ok(ElementKind::Decision),
            _ => Err(()),
        }
    }
}

/// Paper sizes understood by the checklist preamble (`\papersize`).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum PaperSize {
    #[default]
    A4,
    A5,
    A6,
    A7,
}

impl PaperSize {
    pub const ALL: &'static [PaperSize] =
        &[PaperSize::A4, PaperSize::A5, PaperSize::A6, PaperSize::A7];

    /// Value as written in the config and passed to the preamble.
    pub fn as_str(self) -> &'static str {
        match self {
            PaperSize::A4 => "4",
            PaperSize::A5 => "5",
            PaperSize::A6 => "6",
            PaperSize::A7 => "7",
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaperSize {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "4" => Ok(PaperSize::A4),
            "5" => Ok(PaperSize::A5),
            "6" => Ok(PaperSize::A6),
            "7" => Ok(PaperSize::A7),
            _ => Err(()),
        }
    }
}

/// Serialisation formats accepted for config files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Picks the format from the file extension alone; the file is not opened.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        match extension {
            "toml" => Ok(ConfigFormat::Toml),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: extension.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Json => "json",
        };
        f.write_str(label)
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported config format '.{extension}' for {path} (expected .toml, .yaml, .yml or .json)")]
    UnsupportedFormat { path: PathBuf, extension: String },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Decode { path: PathBuf, source: DecodeError },
    #[error("unknown field in config {path}: {source}")]
    UnknownField { path: PathBuf, source: DecodeError },
    #[error("invalid config: {0}")]
    Validation(ConfigValidationError),
}

/// Format-specific decoder failure.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    /// True when the decoder rejected a key that is not part of the schema.
    ///
    /// Only the decoder's own message is inspected, never the quoted source snippet.
    pub fn is_unknown_field(&self) -> bool {
        match self {
            DecodeError::Toml(err) => is_unknown_field_message(err.message()),
            DecodeError::Json(err) => {
                err.classify() == serde_json::error::Category::Data
                    && is_unknown_field_message(&err.to_string())
            }
            // Rendered as `[<path>: ]<message>[ at line L column C]`.
            DecodeError::Yaml(err) => {
                let message = err.to_string();
                let bare = match message.find(": unknown field `") {
                    Some(idx) => &message[idx + 2..],
                    None => message.as_str(),
                };
                is_unknown_field_message(bare)
            }
        }
    }
}

fn is_unknown_field_message(message: &str) -> bool {
    message.starts_with(UNKNOWN_FIELD_PREFIX)
}

/// Semantic rule violated by an otherwise well-formed config.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigValidationError {
    /// Dotted path of the offending field, e.g. `checklists.preflight.items[0].value`.
    pub field: String,
    pub message: String,
}

impl ConfigValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Reads, decodes and validates the config at `path`.
pub fn parse_config(path: impl AsRef<Path>) -> Result<ChecklistConfig, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    debug!(path = %path.display(), %format, "detected config format");

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;

    let config = ChecklistConfig::from_str(&contents, format).map_err(|err| match err {
        LoadError::Decode(source) if source.is_unknown_field() => ConfigError::UnknownField {
            path: path.into(),
            source,
        },
        LoadError::Decode(source) => ConfigError::Decode {
            path: path.into(),
            source,
        },
        LoadError::Validation(err) => ConfigError::Validation(err),
    })?;

    info!(
        path = %path.display(),
        checklists = config.checklists.len(),
        "loaded checklist config"
    );
    Ok(config)
}

/// Failure from decoding an in-memory config, before a path is attached.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Decode(DecodeError),
    #[error("invalid config: {0}")]
    Validation(ConfigValidationError),
}

impl ChecklistConfig {
    /// Decodes `contents` as `format` and validates the result.
    pub fn from_str(contents: &str, format: ConfigFormat) -> Result<Self, LoadError> {
        let raw = decode(contents, format).map_err(LoadError::Decode)?;
        raw.validate().map_err(LoadError::Validation)
    }
}

fn decode(contents: &str, format: ConfigFormat) -> Result<RawConfig, DecodeError> {
    let raw: RawConfig = match format {
        ConfigFormat::Toml => toml::from_str(contents)?,
        ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
        ConfigFormat::Json => serde_json::from_str(contents)?,
    };
    Ok(raw)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawConfig {
    document: RawDocument,
    checklists: IndexMap<String, RawChecklist>,
}

impl RawConfig {
    fn validate(self) -> Result<ChecklistConfig, ConfigValidationError> {
        let document = self.document.validate()?;

        let mut checklists = IndexMap::with_capacity(self.checklists.len());
        for (key, checklist) in self.checklists {
            let data = checklist.validate(&key)?;
            checklists.insert(key, data);
        }

        Ok(ChecklistConfig {
            document,
            checklists,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawDocument {
    preamble: String,
    name: String,
    title: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default = "default_papersize")]
    papersize: String,
    #[serde(default = "default_compiler")]
    compiler: String,
}

fn default_papersize() -> String {
    PaperSize::default().as_str().to_owned()
}

fn default_compiler() -> String {
    DEFAULT_COMPILER.to_owned()
}

impl RawDocument {
    fn validate(self) -> Result<DocumentConfig, ConfigValidationError> {
        let papersize: PaperSize = self.papersize.parse().map_err(|_| {
            ConfigValidationError::new(
                "document.papersize",
                format!(
                    "papersize must be 4, 5, 6 or 7 (received '{}')",
                    self.papersize
                ),
            )
        })?;

        Ok(DocumentConfig {
            preamble: PathBuf::from(self.preamble),
            name: self.name,
            title: self.title,
            version: self.version,
            date: self.date,
            papersize,
            compiler: self.compiler,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawChecklist {
    title: String,
    items: Vec<RawElement>,
}

impl RawChecklist {
    fn validate(self, key: &str) -> Result<ChecklistData, ConfigValidationError> {
        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(idx, element)| element.validate(&format!("checklists.{key}.items[{idx}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ChecklistData {
            title: self.title,
            items,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawElement {
    #[serde(rename = "type")]
    kind: String,
    title: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    steps: Vec<String>,
    #[serde(default)]
    hints: Vec<String>,
}

impl RawElement {
    fn validate(self, context: &str) -> Result<ChecklistElement, ConfigValidationError> {
        let kind: ElementKind = self.kind.parse().map_err(|_| {
            ConfigValidationError::new(
                format!("{context}.type"),
                format!(
                    "checklist element type must be item or decision (received '{}')",
                    self.kind
                ),
            )
        })?;

        match kind {
            ElementKind::Item => {
                let value = self.value.ok_or_else(|| {
                    ConfigValidationError::new(
                        format!("{context}.value"),
                        "checklist item must have a value",
                    )
                })?;
                Ok(ChecklistElement::Item {
                    title: self.title,
                    value,
                    hints: self.hints,
                })
            }
            ElementKind::Decision => {
                if self.steps.is_empty() {
                    return Err(ConfigValidationError::new(
                        format!("{context}.steps"),
                        "checklist decision must have at least one step",
                    ));
                }
                if !self.hints.is_empty() {
                    return Err(ConfigValidationError::new(
                        format!("{context}.hints"),
                        "checklist decision can't have hints",
                    ));
                }
                // A stray `value` on a decision is tolerated; it is never rendered.
                Ok(ChecklistElement::Decision {
                    title: self.title,
                    steps: self.steps,
                })
            }
        }
    }
}
