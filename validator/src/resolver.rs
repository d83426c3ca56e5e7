use std::path::PathBuf;

use dt_xsd::{
    import::{Import, ImportError, ImportResolver},
    RootContext, Schema,
};

/// Resolves `<import>`, `<include>`, and `<redefine>` schema locations relative to the directory
/// the entry schema document lives in.
pub struct LocalImportResolver {
    schema_dir: PathBuf,
}

impl LocalImportResolver {
    pub fn new(schema_dir: PathBuf) -> Self {
        Self { schema_dir }
    }

    fn resolve_path(&self, location: &str) -> Result<PathBuf, ImportError> {
        if location.contains("://") {
            return Err(ImportError::UnsupportedImport);
        }
        let path = self.schema_dir.join(location);
        if !path.exists() {
            return Err(ImportError::ValidationFailed);
        }
        Ok(path)
    }
}

impl ImportResolver for LocalImportResolver {
    fn resolve_import(
        &self,
        context: &mut RootContext,
        import: &Import,
    ) -> Result<Schema, ImportError> {
        let location = import
            .schema_location
            .as_ref()
            .ok_or(ImportError::UnsupportedImport)?;
        let path = self.resolve_path(location)?;

        let text = std::fs::read_to_string(path).map_err(|e| ImportError::UnspecifiedLoad(Box::new(e)))?;
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let xsd = roxmltree::Document::parse_with_options(&text, options)
            .map_err(|e| ImportError::UnspecifiedLoad(Box::new(e)))?;
        let schema_node = xsd.root_element();
        import.validate_imported_schema(schema_node)?;
        Schema::map_from_xml(context, schema_node).map_err(ImportError::from)
    }

    fn resolve_location(&self, location: &str) -> Result<String, ImportError> {
        let path = self.resolve_path(location)?;
        std::fs::read_to_string(path).map_err(|e| ImportError::UnspecifiedLoad(Box::new(e)))
    }
}
