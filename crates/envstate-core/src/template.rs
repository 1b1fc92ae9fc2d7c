//! Template resolution
//!
//! Renders the environment document with Tera before it is parsed, so
//! `{{ region }}` (or the dotted `{{.region}}`) placeholders are replaced
//! by values from the document's `variable` block. Only `{{ }}` is
//! interpreted; `{%` and `{#` pass through untouched, so shell constructs
//! such as `${#VAR}` survive rendering.

use crate::error::{EnvError, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use tera::{Context, Tera};
use tracing::{debug, info};

/// Variable context
pub type Variables = HashMap<String, serde_json::Value>;

/// Prefix of process environment variables exposed to templates
pub const ENV_VARIABLE_PREFIX: &str = "ENVSTATE_";

static DOTTED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(-?)\s*\.([A-Za-z_][A-Za-z0-9_.]*)").expect("valid placeholder pattern")
});

static STATEMENT_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[%#]").expect("valid delimiter pattern"));

static VARIABLE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^variable\s*:").expect("valid variable key pattern"));

/// Template processor
pub struct TemplateProcessor {
    tera: Tera,
    context: Context,
}

impl TemplateProcessor {
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
            context: Context::new(),
        }
    }

    pub fn add_variable(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.context.insert(key.into(), &value);
    }

    pub fn add_variables(&mut self, variables: Variables) {
        for (key, value) in variables {
            self.context.insert(key, &value);
        }
    }

    /// Expose `ENVSTATE_*` process environment variables.
    #[tracing::instrument(skip(self))]
    pub fn add_env_variables(&mut self) {
        let mut count = 0;

        for (key, value) in std::env::vars() {
            if key.starts_with(ENV_VARIABLE_PREFIX) {
                debug!(key = %key, "Adding environment variable");
                self.context.insert(key, &serde_json::Value::String(value));
                count += 1;
            }
        }

        info!(env_var_count = count, "Added filtered environment variables");
    }

    /// Render a string
    pub fn render_str(&mut self, template: &str) -> Result<String> {
        let template = escape_statements(&normalize_placeholders(template));
        self.tera.render_str(&template, &self.context).map_err(|e| {
            let error_detail = extract_tera_error_detail(&e);
            EnvError::TemplateRenderError(error_detail)
        })
    }

    /// Render a whole document, attributing failures to `origin`
    pub fn render_document(&mut self, content: &str, origin: &Path) -> Result<String> {
        self.render_str(content).map_err(|e| {
            if let EnvError::TemplateRenderError(message) = e {
                EnvError::TemplateError {
                    file: origin.to_path_buf(),
                    message,
                }
            } else {
                e
            }
        })
    }
}

impl Default for TemplateProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite dotted placeholders (`{{.key}}`, `{{- .key }}`) into Tera's
/// `{{ key }}` form.
pub fn normalize_placeholders(template: &str) -> String {
    DOTTED_PLACEHOLDER
        .replace_all(template, "{{$1 $2")
        .into_owned()
}

/// Wrap Tera's tag and comment openers in raw blocks so they render as
/// literal text.
pub fn escape_statements(template: &str) -> String {
    STATEMENT_DELIMITER
        .replace_all(template, "{% raw %}${0}{% endraw %}")
        .into_owned()
}

/// Extract the top-level `variable` block without parsing the rest of the
/// document, which is not valid YAML until its placeholders are rendered.
pub fn extract_variables(content: &str) -> Result<Variables> {
    #[derive(Deserialize)]
    struct VariableBlock {
        #[serde(default)]
        variable: Option<Variables>,
    }

    let mut block = String::new();
    let mut in_block = false;

    for line in content.lines() {
        let trimmed = line.trim_start();
        let is_top_level = !trimmed.is_empty()
            && !trimmed.starts_with('#')
            && !line.starts_with([' ', '\t'])
            && !trimmed.starts_with('-');

        if is_top_level {
            in_block = VARIABLE_KEY.is_match(line);
        }

        if in_block {
            block.push_str(line);
            block.push('\n');
        }
    }

    if block.is_empty() {
        return Ok(Variables::new());
    }

    let parsed: VariableBlock = serde_yaml::from_str(&block)
        .map_err(|e| EnvError::InvalidConfig(format!("variable block: {e}")))?;

    Ok(parsed.variable.unwrap_or_default())
}

/// Pull the most useful message out of a Tera error chain.
fn extract_tera_error_detail(e: &tera::Error) -> String {
    use std::error::Error;

    let mut details = vec![e.to_string()];
    let mut source = e.source();
    while let Some(err) = source {
        details.push(err.to_string());
        source = err.source();
    }

    let full_error = details.join(" | ");

    if full_error.contains("not found in context")
        && let Some(start) = full_error.find("Variable `")
        && let Some(end) = full_error[start..].find("` not found")
    {
        let var_name = &full_error[start + 10..start + end];
        return format!(
            "undefined variable: `{var_name}`\nhint: declare it in the `variable` block"
        );
    }

    full_error
}
