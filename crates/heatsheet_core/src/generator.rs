//! Document generator: strategy in, rendered (and optionally converted) file out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heatsheet_convert::{ConversionConfig, ConversionOutcome, ConverterSelector, OutputFormat};
use heatsheet_templates::{
    SubstitutionEngine, TemplateError, TemplateLoader, TemplateValidation,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{FormattingConfig, WorkspaceConfig};
use crate::error::CoreResult;
use crate::strategy::{DocumentKind, DocumentStrategy, PageShape};

/// Result of rendering one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOutcome {
    pub kind: DocumentKind,
    pub output: PathBuf,
    /// Number of items rendered.
    pub items: usize,
    /// Whether an output file was written.
    pub written: bool,
    /// Whether any placeholder or table was filled.
    pub modified: bool,
}

/// Renders documents through the substitution engine and hands them to the
/// converter selector.
pub struct DocumentGenerator {
    engine: SubstitutionEngine,
    formatting: FormattingConfig,
    loader: TemplateLoader,
    selector: ConverterSelector,
    conversion: ConversionConfig,
}

impl DocumentGenerator {
    /// Build a generator from the workspace configuration.
    ///
    /// Fails on a malformed marker or conflicting aliases.
    pub fn new(config: &WorkspaceConfig) -> CoreResult<Self> {
        let registry = Arc::new(config.placeholder_registry()?);
        let engine = SubstitutionEngine::new(registry, config.substitution_options())?;

        Ok(Self {
            engine,
            formatting: config.formatting.clone(),
            loader: TemplateLoader::new(config.templates_path()),
            selector: ConverterSelector::standard(config.libreoffice()),
            conversion: config.conversion_config(),
        })
    }

    /// Replace the converter backends.
    pub fn with_selector(mut self, selector: ConverterSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn engine(&self) -> &SubstitutionEngine {
        &self.engine
    }

    pub fn loader(&self) -> &TemplateLoader {
        &self.loader
    }

    pub fn selector(&self) -> &ConverterSelector {
        &self.selector
    }

    /// Render a strategy's template into `output`.
    ///
    /// A one-item-per-page document without items is not written.
    pub fn generate(&self, strategy: &dyn DocumentStrategy, output: &Path) -> CoreResult<GenerateOutcome> {
        let template = strategy.template_path();
        if !template.is_file() {
            return Err(TemplateError::NotFound(template.to_path_buf()).into());
        }
        info!("Generating {} from {:?}", strategy.kind(), template);

        let document_values = strategy.document_placeholders();
        let (items, written, modified) = match strategy.page_shape() {
            PageShape::OneItemPerPage => {
                let pages = strategy.resolve_pages(&self.formatting);
                if pages.is_empty() {
                    warn!("No items for {}, nothing written", strategy.kind());
                    (0, false, false)
                } else {
                    let modified =
                        self.engine
                            .render_pages(template, output, &pages, &document_values)?;
                    (pages.len(), true, modified)
                }
            }
            PageShape::AllItemsInOneTable => {
                let table = strategy.resolve_table(&self.formatting);
                let modified = self
                    .engine
                    .render_table(template, output, &table, &document_values)?;
                if !modified {
                    warn!("{:?} has no table with item placeholders", template);
                }
                (table.row_count(), true, modified)
            }
        };

        Ok(GenerateOutcome {
            kind: strategy.kind(),
            output: output.to_path_buf(),
            items,
            written,
            modified,
        })
    }

    /// Check the strategy's template against the keys it can fill.
    pub fn validate(&self, strategy: &dyn DocumentStrategy) -> CoreResult<TemplateValidation> {
        Ok(self.loader.validate(
            strategy.template_path(),
            &self.engine,
            &strategy.placeholder_keys(),
            strategy.supports_table_placeholders(),
        )?)
    }

    /// Convert a rendered document, skipping the converters named in `ignore`.
    pub async fn convert(
        &self,
        input: &Path,
        output: &Path,
        format: OutputFormat,
        ignore: &[String],
    ) -> CoreResult<ConversionOutcome> {
        let outcome = self
            .selector
            .convert(input, output, format, &self.conversion, ignore)
            .await?;
        info!(
            "Converted {:?} to {:?} with {} in {}ms",
            input, outcome.output, outcome.converter, outcome.duration_ms
        );
        Ok(outcome)
    }
}

impl std::fmt::Debug for DocumentGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentGenerator")
            .field("templates", &self.loader.templates_path())
            .field("converters", &self.selector.names())
            .field("formatting", &self.formatting)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompetitionData;
    use crate::registry::StrategyRegistry;
    use crate::error::CoreError;
    use tempfile::tempdir;

    #[test]
    fn test_missing_template_is_error() {
        let temp = tempdir().unwrap();
        let config = WorkspaceConfig::load_or_default(temp.path()).unwrap();
        let registry =
            StrategyRegistry::standard(Arc::new(CompetitionData::sample()), &config).unwrap();
        let generator = DocumentGenerator::new(&config).unwrap();

        let strategy = registry.get_required(DocumentKind::ResultList).unwrap();
        let result = generator.generate(strategy.as_ref(), &temp.path().join("out.docx"));
        assert!(matches!(
            result,
            Err(CoreError::Template(TemplateError::NotFound(_)))
        ));
    }

    #[test]
    fn test_invalid_marker_is_error() {
        let mut config = WorkspaceConfig::default();
        config.placeholders.marker = "x".to_string();
        assert!(matches!(
            DocumentGenerator::new(&config),
            Err(CoreError::Template(TemplateError::InvalidMarker(_)))
        ));
    }
}
