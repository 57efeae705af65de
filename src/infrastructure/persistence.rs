use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::{DefinitionResult, FormDefinition};

/// Reads and writes form definitions as JSON.
pub struct FormRepository;

impl FormRepository {
    pub fn load_definition(path: &Path) -> DefinitionResult<FormDefinition> {
        let content = fs::read_to_string(path)?;
        let definition: FormDefinition = serde_json::from_str(&content)?;
        let definition = definition.normalized()?;
        info!(path = %path.display(), steps = definition.total_steps(), "form definition loaded");
        Ok(definition)
    }

    /// Writes `definition` as pretty JSON, e.g. to start a custom form from
    /// the built-in one.
    pub fn save_definition(definition: &FormDefinition, path: &Path) -> DefinitionResult<()> {
        let json = serde_json::to_string_pretty(definition)?;
        fs::write(path, json)?;
        info!(path = %path.display(), "form definition written");
        Ok(())
    }
}
