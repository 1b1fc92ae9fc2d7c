//! Environment file loader
//!
//! variable extraction → template rendering → YAML parse → validation

use crate::error::{EnvError, Result};
use crate::model::EnvironmentSet;
use crate::template::{TemplateProcessor, extract_variables};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Load and resolve an environment file.
#[instrument(fields(path = %path.display()))]
pub fn load_environment_file(path: &Path) -> Result<EnvironmentSet> {
    let content = std::fs::read_to_string(path).map_err(|e| EnvError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    load_environment_str(&content, path)
}

/// Resolve an in-memory environment document. `origin` is only used in
/// error messages.
#[instrument(skip(content), fields(origin = %origin.display()))]
pub fn load_environment_str(content: &str, origin: &Path) -> Result<EnvironmentSet> {
    debug!("Step 1: Extracting variables");
    let variables = extract_variables(content)?;

    debug!("Step 2: Preparing template processor");
    let mut processor = TemplateProcessor::new();
    processor.add_env_variables();
    // Declared variables win over the process environment
    processor.add_variables(variables);

    debug!("Step 3: Rendering");
    let rendered = processor.render_document(content, origin)?;

    debug!("Step 4: Parsing YAML");
    let set: EnvironmentSet = if rendered.trim().is_empty() {
        EnvironmentSet::default()
    } else {
        serde_yaml::from_str(&rendered)?
    };
    set.validate()?;

    info!(
        environments = set.environments.len(),
        variables = set.variables.len(),
        "Environment file loaded"
    );

    Ok(set)
}
