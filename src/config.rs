//! Generator configuration.
//!
//! Handles loading, validating, and layering `routegen.toml`. Stock defaults
//! are serialized to a TOML table and the user file is merged on top of it, so
//! a config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source = "src/app/app.routes.source.ts"         # Hand-authored route array
//! routes_output = "src/app/app.routes.ts"         # Primary generated module
//! guarded_output = "src/app/guarded-routes.generated.ts"
//! export_name = "routes"                          # `export const routes ... = [`
//!
//! [filtering]
//! enabled = true            # false = copy the source through untouched
//!
//! [guard]
//! field = "canActivate"     # Array-valued field holding guards
//! identifier = "AuthGuard"  # Guard that marks a route as access-controlled
//! export_name = "GUARDED_ROUTE_PATHS"
//!
//! [render]
//! indent = "  "             # Indentation for re-emitted route objects
//!
//! [routes]                  # Inclusion map: route path -> enabled
//! "" = true
//! "**" = true
//! content = false
//! ```
//!
//! ## Path Resolution
//!
//! Relative paths resolve against the directory containing the config file,
//! or the working directory when no config file exists. The `source` value is
//! also recorded verbatim in generated provenance headers, which keeps them
//! free of machine-specific absolute paths.
//!
//! Unknown keys are rejected to catch typos early. Paths missing from
//! `[routes]` are included by default and reported as a warning.

use crate::filter::InclusionMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name looked up by the CLI.
pub const CONFIG_FILENAME: &str = "routegen.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `routegen.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Hand-authored file containing the exported route array.
    pub source: String,
    /// Primary generated route module.
    pub routes_output: String,
    /// Derived module listing access-guarded route paths.
    pub guarded_output: String,
    /// Identifier of the exported route array.
    pub export_name: String,
    /// Feature-filtering switch.
    pub filtering: FilteringConfig,
    /// Access-control predicate settings.
    pub guard: GuardConfig,
    /// Emission settings for re-indented blocks.
    pub render: RenderConfig,
    /// Route path -> enabled. Paths not listed are included.
    pub routes: InclusionMap,
    /// Directory relative paths resolve against. Set by the loader.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source: "src/app/app.routes.source.ts".to_string(),
            routes_output: "src/app/app.routes.ts".to_string(),
            guarded_output: "src/app/guarded-routes.generated.ts".to_string(),
            export_name: "routes".to_string(),
            filtering: FilteringConfig::default(),
            guard: GuardConfig::default(),
            render: RenderConfig::default(),
            routes: InclusionMap::default(),
            base_dir: PathBuf::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilteringConfig {
    /// When false the primary artifact is a byte-identical copy of the source.
    pub enabled: bool,
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Which array-valued field and identifier mark a route as access-controlled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    pub field: String,
    pub identifier: String,
    /// Name of the exported constant in the guarded-path module.
    pub export_name: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            field: "canActivate".to_string(),
            identifier: "AuthGuard".to_string(),
            export_name: "GUARDED_ROUTE_PATHS".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Whitespace prefixed to every emitted line of a route object.
    pub indent: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }
}

/// Values given on the command line, applied after the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<String>,
    pub routes_output: Option<String>,
    pub guarded_output: Option<String>,
    pub filtering: Option<bool>,
}

impl GeneratorConfig {
    /// Validate names and paths before any file is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("export_name", &self.export_name),
            ("guard.field", &self.guard.field),
            ("guard.identifier", &self.guard.identifier),
            ("guard.export_name", &self.guard.export_name),
        ] {
            if !is_identifier(value) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be an identifier, got {value:?}"
                )));
            }
        }
        if !self.render.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(ConfigError::Validation(
                "render.indent must contain only spaces or tabs".into(),
            ));
        }
        for (key, value) in [
            ("source", &self.source),
            ("routes_output", &self.routes_output),
            ("guarded_output", &self.guarded_output),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        let source = self.source_path();
        let routes = self.routes_output_path();
        let guarded = self.guarded_output_path();
        if routes == guarded {
            return Err(ConfigError::Validation(
                "routes_output and guarded_output must be different files".into(),
            ));
        }
        if routes == source || guarded == source {
            return Err(ConfigError::Validation(
                "generated outputs must not overwrite the source file".into(),
            ));
        }
        Ok(())
    }

    /// Apply command-line overrides and re-validate.
    pub fn apply_overrides(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if let Some(source) = overrides.source {
            self.source = source;
        }
        if let Some(routes_output) = overrides.routes_output {
            self.routes_output = routes_output;
        }
        if let Some(guarded_output) = overrides.guarded_output {
            self.guarded_output = guarded_output;
        }
        if let Some(enabled) = overrides.filtering {
            self.filtering.enabled = enabled;
        }
        self.validate()
    }

    pub fn source_path(&self) -> PathBuf {
        self.base_dir.join(&self.source)
    }

    pub fn routes_output_path(&self) -> PathBuf {
        self.base_dir.join(&self.routes_output)
    }

    pub fn guarded_output_path(&self) -> PathBuf {
        self.base_dir.join(&self.guarded_output)
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GeneratorConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Layer a project `routegen.toml` over the stock defaults.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
    base_dir: &Path,
) -> Result<GeneratorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let mut config: GeneratorConfig = merged.try_into()?;
    config.base_dir = base_dir.to_path_buf();
    config.validate()?;
    Ok(config)
}

/// Load the generator config from `path`.
///
/// A missing file yields stock defaults resolved against the working
/// directory. Otherwise paths resolve against the file's directory.
pub fn load_config(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    let base_dir = match (&overlay, path.parent()) {
        (Some(_), Some(parent)) => parent.to_path_buf(),
        _ => PathBuf::new(),
    };
    resolve_config(stock_defaults_value()?, overlay, &base_dir)
}

/// Returns a fully-commented stock `routegen.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# routegen configuration
# ======================
# All settings are optional. Values shown below are the defaults.
# Relative paths resolve against the directory containing this file.
# Unknown keys will cause an error.

# Hand-authored file holding the exported route array.
source = "src/app/app.routes.source.ts"

# Primary generated route module (drop-in replacement for the source).
routes_output = "src/app/app.routes.ts"

# Generated module listing the paths of access-guarded routes.
guarded_output = "src/app/guarded-routes.generated.ts"

# Name of the exported array: `export const routes: Routes = [ ... ];`
export_name = "routes"

# ---------------------------------------------------------------------------
# Feature filtering
# ---------------------------------------------------------------------------
[filtering]
# When false, the route module is a byte-identical copy of the source.
enabled = true

# ---------------------------------------------------------------------------
# Access control
# ---------------------------------------------------------------------------
[guard]
# Array-valued route field that lists guards.
field = "canActivate"

# A route is access-guarded when this identifier appears in that array.
identifier = "AuthGuard"

# Exported constant name in the guarded-path module.
export_name = "GUARDED_ROUTE_PATHS"

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[render]
# Indentation applied to every re-emitted route object line.
indent = "  "

# ---------------------------------------------------------------------------
# Inclusion map
# ---------------------------------------------------------------------------
# Route path -> enabled. Paths not listed here are kept and reported.
# The root ("") and fallback ("**") routes are mandatory: setting either
# to false fails the build.
[routes]
# "" = true
# "**" = true
# content = false
"##
}
