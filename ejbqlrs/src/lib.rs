pub mod ast;
pub mod catalog;
pub mod config;
pub mod dialect;
pub mod error;
pub mod metadata;
pub mod translator;
pub mod types;
pub mod validation;

use std::path::Path;

use crate::catalog::MetadataCatalog;
use crate::error::Result;

/// Load mapping metadata from disk and validate it with the provided validator.
pub fn load_and_validate<P: AsRef<Path>>(
    mapping_dir: P,
    validator: &crate::validation::CatalogValidator,
) -> Result<MetadataCatalog> {
    let catalog = MetadataCatalog::load_from_dir(mapping_dir)?;
    validator.validate(&catalog)?;
    tracing::info!(
        tables = catalog.db_entities.len(),
        entities = catalog.obj_entities.len(),
        "loaded mapping catalog"
    );
    Ok(catalog)
}

pub use crate::validation::CatalogValidator;
pub use ast::Statement;
pub use config::TranslatorConfig;
pub use error::TranslationError;
pub use translator::{
    PrefetchNode, ResultColumn, ResultSegment, SqlTranslator, TranslatedQuery, TranslationRequest,
};
