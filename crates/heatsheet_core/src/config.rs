//! Workspace configuration (`heatsheet.yaml`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use heatsheet_convert::{ConversionConfig, LibreOfficeConverter, OutputFormat, DEFAULT_TIMEOUT_SECONDS};
use heatsheet_templates::{
    PlaceholderKey, PlaceholderRegistry, SubstitutionOptions, UnknownPlaceholderPolicy,
    DEFAULT_MARKER,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::strategy::DocumentKind;

/// Configuration file name looked up in the workspace root.
pub const CONFIG_FILE: &str = "heatsheet.yaml";

/// Read-only formatting settings shared by all resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingConfig {
    /// Sub-second digits of rendered times (0..=3)
    pub time_decimal_places: u8,
    pub score_decimal_places: u8,
    /// Minimum number of start slots on a race card
    pub race_slots: u32,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            time_decimal_places: 2,
            score_decimal_places: 1,
            race_slots: 6,
        }
    }
}

impl FormattingConfig {
    /// Render milliseconds as `m:ss,ff`. Sub-second digits are truncated.
    pub fn format_time(&self, millis: u64) -> String {
        let places = u32::from(self.time_decimal_places.min(3));
        let minutes = millis / 60_000;
        let seconds = (millis / 1000) % 60;
        let mut text = format!("{}:{:02}", minutes, seconds);
        if places > 0 {
            let fraction = (millis % 1000) / 10u64.pow(3 - places);
            text.push_str(&format!(",{:0width$}", fraction, width = places as usize));
        }
        text
    }

    /// Render a score with the configured decimal places and a decimal comma.
    pub fn format_score(&self, score: f64) -> String {
        format!("{:.*}", usize::from(self.score_decimal_places), score).replace('.', ",")
    }
}

/// Placeholder syntax settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub marker: String,
    pub unknown: UnknownPlaceholderPolicy,
    /// Extra aliases per canonical key
    pub aliases: BTreeMap<PlaceholderKey, Vec<String>>,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            unknown: UnknownPlaceholderPolicy::default(),
            aliases: BTreeMap::new(),
        }
    }
}

/// Conversion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertersConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libreoffice_path: Option<PathBuf>,
    pub timeout_seconds: u64,
    pub format: OutputFormat,
}

impl Default for ConvertersConfig {
    fn default() -> Self {
        Self {
            libreoffice_path: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            format: OutputFormat::Pdf,
        }
    }
}

/// Workspace configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub templates_dir: PathBuf,
    /// Per-kind template file overrides
    pub templates: BTreeMap<DocumentKind, PathBuf>,
    pub placeholders: PlaceholderConfig,
    pub formatting: FormattingConfig,
    pub converters: ConvertersConfig,
    /// Directory the configuration was loaded from
    #[serde(skip)]
    pub root: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            templates: BTreeMap::new(),
            placeholders: PlaceholderConfig::default(),
            formatting: FormattingConfig::default(),
            converters: ConvertersConfig::default(),
            root: PathBuf::from("."),
        }
    }
}

impl WorkspaceConfig {
    /// Load a configuration file. Relative paths inside it resolve against
    /// the file's directory.
    pub fn load(path: &Path) -> CoreResult<Self> {
        debug!("Loading configuration from {:?}", path);
        let content = fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&content)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        config.root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load `heatsheet.yaml` from `root`, falling back to defaults when absent.
    pub fn load_or_default(root: &Path) -> CoreResult<Self> {
        let path = root.join(CONFIG_FILE);
        if path.is_file() {
            return Self::load(&path);
        }
        debug!("No {} in {:?}, using defaults", CONFIG_FILE, root);
        Ok(Self {
            root: root.to_path_buf(),
            ..Self::default()
        })
    }

    /// Write the configuration as YAML.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Absolute-or-root-relative templates directory.
    pub fn templates_path(&self) -> PathBuf {
        self.root.join(&self.templates_dir)
    }

    /// Template file used for a document kind.
    pub fn template_path(&self, kind: DocumentKind) -> PathBuf {
        let file = self
            .templates
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(kind.default_template_file()));
        self.templates_path().join(file)
    }

    /// Build the alias table: defaults plus configured aliases.
    pub fn placeholder_registry(&self) -> CoreResult<PlaceholderRegistry> {
        Ok(PlaceholderRegistry::with_extra_aliases(&self.placeholders.aliases)?)
    }

    pub fn substitution_options(&self) -> SubstitutionOptions {
        SubstitutionOptions::new()
            .marker(self.placeholders.marker.clone())
            .unknown_policy(self.placeholders.unknown)
    }

    pub fn conversion_config(&self) -> ConversionConfig {
        ConversionConfig::new().timeout(self.converters.timeout_seconds)
    }

    /// LibreOffice backend honoring the configured executable.
    pub fn libreoffice(&self) -> LibreOfficeConverter {
        match &self.converters.libreoffice_path {
            Some(path) => LibreOfficeConverter::new().with_executable(self.root.join(path)),
            None => LibreOfficeConverter::new(),
        }
    }
}
