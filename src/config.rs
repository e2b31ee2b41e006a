//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/pomsort/pomsort.toml`
//! 3. Local config: `<project_dir>/.pomsort.toml`
//! 4. Environment variables: `POMSORT_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{
    ParentLocator, PassConfig, PassKind, PropertyRules, DEPENDENCY_VERSION_BANNER,
    MAVEN_PLUGIN_VERSION_BANNER,
};
use crate::infrastructure::xml::{AttributeWrap, WriterOptions};

/// Keys whose environment values are comma separated lists.
const LIST_KEYS: [&str; 4] = [
    "properties.excluded",
    "properties.plugin_prefixes",
    "properties.plugin_suffixes",
    "skip_dirs",
];

/// Output formatting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Spaces per nesting level
    pub indent: usize,
    /// Spread the root start tag's attributes over several lines
    pub wrap_attributes: bool,
    pub wrap_element: String,
    /// Wrap when the tag has more attributes than this
    pub wrap_threshold: usize,
    pub wrap_indent: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let wrap = AttributeWrap::default();
        Self {
            indent: 4,
            wrap_attributes: true,
            wrap_element: wrap.element,
            wrap_threshold: wrap.threshold,
            wrap_indent: wrap.indent,
        }
    }
}

/// Parent element locators, one per pass.
///
/// `a/b/c` walks direct children from the root, a bare tag picks the first
/// element with that name anywhere in the document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SectionsConfig {
    pub dependencies: String,
    pub dependency_management: String,
    pub plugins: String,
    pub plugin_management: String,
    /// Shared by the grouped and the flat properties pass
    pub properties: String,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            dependencies: PassKind::Dependencies.default_parent().into(),
            dependency_management: PassKind::DependencyManagement.default_parent().into(),
            plugins: PassKind::Plugins.default_parent().into(),
            plugin_management: PassKind::PluginManagement.default_parent().into(),
            properties: PassKind::Properties.default_parent().into(),
        }
    }
}

impl SectionsConfig {
    pub fn locator(&self, kind: PassKind) -> &str {
        match kind {
            PassKind::Dependencies => &self.dependencies,
            PassKind::DependencyManagement => &self.dependency_management,
            PassKind::Plugins => &self.plugins,
            PassKind::PluginManagement => &self.plugin_management,
            PassKind::Properties | PassKind::PropertiesVersion => &self.properties,
        }
    }
}

/// Property naming rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PropertiesConfig {
    pub version_suffix: String,
    pub excluded: Vec<String>,
    pub plugin_prefixes: Vec<String>,
    pub plugin_suffixes: Vec<String>,
    pub plugin_banner: String,
    pub dependency_banner: String,
}

impl Default for PropertiesConfig {
    fn default() -> Self {
        let rules = PropertyRules::default();
        Self {
            version_suffix: rules.version_suffix,
            excluded: rules.excluded,
            plugin_prefixes: rules.plugin_prefixes,
            plugin_suffixes: rules.plugin_suffixes,
            plugin_banner: rules.plugin_banner,
            dependency_banner: rules.dependency_banner,
        }
    }
}

/// Raw properties config for intermediate parsing (arrays are Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawPropertiesConfig {
    pub version_suffix: Option<String>,
    pub excluded: Option<Vec<String>>,
    pub plugin_prefixes: Option<Vec<String>>,
    pub plugin_suffixes: Option<Vec<String>>,
    pub plugin_banner: Option<String>,
    pub dependency_banner: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputConfig {
    pub indent: Option<usize>,
    pub wrap_attributes: Option<bool>,
    pub wrap_element: Option<String>,
    pub wrap_threshold: Option<usize>,
    pub wrap_indent: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSectionsConfig {
    pub dependencies: Option<String>,
    pub dependency_management: Option<String>,
    pub plugins: Option<String>,
    pub plugin_management: Option<String>,
    pub properties: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub skip_dirs: Option<Vec<String>>,
    pub output: RawOutputConfig,
    pub sections: RawSectionsConfig,
    pub properties: RawPropertiesConfig,
}

/// Merge arrays with union semantics and negation support.
///
/// - Items from overlay are added to base
/// - Items prefixed with `!` remove the corresponding item from the result
/// - Duplicates are de-duplicated
///
/// # Examples
/// ```ignore
/// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
/// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
/// ```
pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
    let mut result: HashSet<String> = base.iter().cloned().collect();

    for item in overlay {
        if let Some(negated) = item.strip_prefix('!') {
            result.remove(negated);
        } else {
            result.insert(item.clone());
        }
    }

    let mut vec: Vec<String> = result.into_iter().collect();
    vec.sort();
    vec
}

/// Overlay wins if specified.
fn pick<T: Clone>(overlay: &Option<T>, base: &T) -> T {
    overlay.clone().unwrap_or_else(|| base.clone())
}

fn pick_array(
    overlay: &Option<Vec<String>>,
    base: &[String],
    union: bool,
) -> Vec<String> {
    match overlay {
        Some(items) if union => merge_array(base, items),
        Some(items) => items.clone(),
        None => base.to_vec(),
    }
}

/// Unified configuration for pomsort.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory names never descended into by the recursive search
    pub skip_dirs: Vec<String>,
    pub output: OutputConfig,
    pub sections: SectionsConfig,
    pub properties: PropertiesConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            skip_dirs: vec!["target".into(), "node_modules".into(), ".git".into()],
            output: OutputConfig::default(),
            sections: SectionsConfig::default(),
            properties: PropertiesConfig::default(),
        }
    }
}

/// Get the XDG config directory for pomsort.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pomsort").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("pomsort.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".pomsort.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Environment source for `POMSORT_*` overrides.
pub fn env_source() -> Environment {
    let env = Environment::with_prefix("POMSORT")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .try_parsing(true);
    LIST_KEYS
        .iter()
        .fold(env, |env, key| env.with_list_parse_key(key))
}

impl Settings {
    /// Overlay `raw`; `union` selects UNION (local) or REPLACE (global) for arrays.
    fn overlay(&self, raw: &RawSettings, union: bool) -> Self {
        let output = &raw.output;
        let sections = &raw.sections;
        let properties = &raw.properties;
        Self {
            output: OutputConfig {
                indent: pick(&output.indent, &self.output.indent),
                wrap_attributes: pick(&output.wrap_attributes, &self.output.wrap_attributes),
                wrap_element: pick(&output.wrap_element, &self.output.wrap_element),
                wrap_threshold: pick(&output.wrap_threshold, &self.output.wrap_threshold),
                wrap_indent: pick(&output.wrap_indent, &self.output.wrap_indent),
            },
            sections: SectionsConfig {
                dependencies: pick(&sections.dependencies, &self.sections.dependencies),
                dependency_management: pick(
                    &sections.dependency_management,
                    &self.sections.dependency_management,
                ),
                plugins: pick(&sections.plugins, &self.sections.plugins),
                plugin_management: pick(
                    &sections.plugin_management,
                    &self.sections.plugin_management,
                ),
                properties: pick(&sections.properties, &self.sections.properties),
            },
            properties: PropertiesConfig {
                version_suffix: pick(&properties.version_suffix, &self.properties.version_suffix),
                excluded: pick_array(&properties.excluded, &self.properties.excluded, union),
                plugin_prefixes: pick_array(
                    &properties.plugin_prefixes,
                    &self.properties.plugin_prefixes,
                    union,
                ),
                plugin_suffixes: pick_array(
                    &properties.plugin_suffixes,
                    &self.properties.plugin_suffixes,
                    union,
                ),
                plugin_banner: pick(&properties.plugin_banner, &self.properties.plugin_banner),
                dependency_banner: pick(
                    &properties.dependency_banner,
                    &self.properties.dependency_banner,
                ),
            },
            skip_dirs: pick_array(&raw.skip_dirs, &self.skip_dirs, union),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        self.overlay(global, false)
    }

    /// Merge local config with UNION semantics for arrays (`!item` removes).
    fn merge_with(&self, local: &RawSettings) -> Self {
        self.overlay(local, true)
    }

    /// Load settings with layered precedence.
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with negation support
    /// - Any → Env vars: REPLACE
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path();
        let local = project_dir.map(local_config_path);
        Self::load_layers(global.as_deref(), local.as_deref(), env_source())
    }

    /// Load from explicit layer locations. Missing files are skipped.
    pub fn load_layers(
        global: Option<&Path>,
        local: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = global.filter(|p| p.exists()) {
            current = current.apply_global(&load_raw_settings(path)?);
        }
        if let Some(path) = local.filter(|p| p.exists()) {
            current = current.merge_with(&load_raw_settings(path)?);
        }
        current = Self::apply_env_overrides(current, env)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("output.indent") {
            settings.output.indent = val;
        }
        if let Ok(val) = config.get_bool("output.wrap_attributes") {
            settings.output.wrap_attributes = val;
        }
        if let Ok(val) = config.get_string("output.wrap_element") {
            settings.output.wrap_element = val;
        }
        if let Ok(val) = config.get::<usize>("output.wrap_threshold") {
            settings.output.wrap_threshold = val;
        }
        if let Ok(val) = config.get::<usize>("output.wrap_indent") {
            settings.output.wrap_indent = val;
        }
        for kind in [
            PassKind::Dependencies,
            PassKind::DependencyManagement,
            PassKind::Plugins,
            PassKind::PluginManagement,
            PassKind::Properties,
        ] {
            let key = format!("sections.{}", kind.name().replace('-', "_"));
            if let Ok(val) = config.get_string(&key) {
                *settings.sections.locator_mut(kind) = val;
            }
        }
        if let Ok(val) = config.get_string("properties.version_suffix") {
            settings.properties.version_suffix = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("properties.excluded") {
            settings.properties.excluded = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("properties.plugin_prefixes") {
            settings.properties.plugin_prefixes = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("properties.plugin_suffixes") {
            settings.properties.plugin_suffixes = val;
        }
        if let Ok(val) = config.get_string("properties.plugin_banner") {
            settings.properties.plugin_banner = val;
        }
        if let Ok(val) = config.get_string("properties.dependency_banner") {
            settings.properties.dependency_banner = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("skip_dirs") {
            settings.skip_dirs = val;
        }

        Ok(settings)
    }

    /// Reject values that would produce broken output.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.output.indent == 0 {
            return Err(ApplicationError::Config {
                message: "output.indent must be at least 1".into(),
            });
        }
        if self.properties.version_suffix.is_empty() {
            return Err(ApplicationError::Config {
                message: "properties.version_suffix must not be empty".into(),
            });
        }
        for (key, banner) in [
            ("properties.plugin_banner", &self.properties.plugin_banner),
            ("properties.dependency_banner", &self.properties.dependency_banner),
        ] {
            // not representable inside an XML comment
            if banner.contains("--") || banner.ends_with('-') {
                return Err(ApplicationError::Config {
                    message: format!("{} must not contain \"--\" or end with \"-\"", key),
                });
            }
        }
        for kind in PassKind::STANDARD {
            if self.sections.locator(kind).trim().trim_matches('/').is_empty() {
                return Err(ApplicationError::Config {
                    message: format!("sections locator for {} is empty", kind),
                });
            }
        }
        Ok(())
    }

    pub fn property_rules(&self) -> PropertyRules {
        let p = &self.properties;
        PropertyRules {
            version_suffix: p.version_suffix.clone(),
            excluded: p.excluded.clone(),
            plugin_prefixes: p.plugin_prefixes.clone(),
            plugin_suffixes: p.plugin_suffixes.clone(),
            plugin_banner: p.plugin_banner.clone(),
            dependency_banner: p.dependency_banner.clone(),
        }
    }

    /// Rule table for one pass with the configured locator and property rules.
    pub fn pass_config(&self, kind: PassKind) -> PassConfig {
        PassConfig::build(
            kind,
            ParentLocator::parse(self.sections.locator(kind)),
            &self.property_rules(),
        )
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            indent: self.output.indent,
            wrap: self.output.wrap_attributes.then(|| AttributeWrap {
                element: self.output.wrap_element.clone(),
                threshold: self.output.wrap_threshold,
                indent: self.output.wrap_indent,
            }),
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        format!(
            r#"# pomsort configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/pomsort/pomsort.toml  (defines your baseline)
#   Local:  <project_dir>/.pomsort.toml     (project-specific additions)
#   Env:    POMSORT_* environment variables (explicit overrides,
#           e.g. POMSORT_OUTPUT__INDENT=2, POMSORT_SKIP_DIRS=target,node_modules)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global.
#   Use "!item" in local config to REMOVE an inherited item:
#     excluded = ["scala.version", "!kotlin.version"]

# Directory names skipped by `--recursive`
# skip_dirs = ["target", "node_modules", ".git"]

[output]
# indent = 4
# wrap_attributes = true
# wrap_element = "project"
# wrap_threshold = 2
# wrap_indent = 8

[sections]
# "a/b/c" walks direct children from the root, a bare tag finds the first match.
# When the root is not "a", "a/b/c" falls back to the first <c>.
# dependencies = "project/dependencies"
# dependency_management = "project/dependencyManagement/dependencies"
# plugins = "project/build/plugins"
# plugin_management = "project/build/pluginManagement/plugins"
# properties = "project/properties"

[properties]
# version_suffix = ".version"
# excluded = ["java.version", "kotlin.version"]
# plugin_prefixes = ["maven-"]
# plugin_suffixes = ["-maven-plugin.version"]
# plugin_banner = "{}"
# dependency_banner = "{}"
"#,
            MAVEN_PLUGIN_VERSION_BANNER, DEPENDENCY_VERSION_BANNER
        )
    }
}

impl SectionsConfig {
    fn locator_mut(&mut self, kind: PassKind) -> &mut String {
        match kind {
            PassKind::Dependencies => &mut self.dependencies,
            PassKind::DependencyManagement => &mut self.dependency_management,
            PassKind::Plugins => &mut self.plugins,
            PassKind::PluginManagement => &mut self.plugin_management,
            PassKind::Properties | PassKind::PropertiesVersion => &mut self.properties,
        }
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env() -> Environment {
        env_source().source(Some(HashMap::new()))
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        env_source().source(Some(map))
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn given_no_files_when_loading_then_uses_defaults() {
        let settings = Settings::load_layers(None, None, no_env()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.output.indent, 4);
        assert_eq!(
            settings.pass_config(PassKind::Properties),
            PassConfig::defaults(PassKind::Properties)
        );
    }

    #[test]
    fn given_global_array_when_loading_then_replaces_default() {
        let dir = TempDir::new().unwrap();
        let global = write(
            &dir,
            "pomsort.toml",
            "[properties]\nexcluded = [\"scala.version\"]\n",
        );

        let settings = Settings::load_layers(Some(&global), None, no_env()).unwrap();

        assert_eq!(settings.properties.excluded, vec!["scala.version".to_string()]);
    }

    #[test]
    fn given_local_array_with_negation_when_loading_then_unions() {
        let dir = TempDir::new().unwrap();
        let local = write(
            &dir,
            ".pomsort.toml",
            "[properties]\nexcluded = [\"scala.version\", \"!kotlin.version\"]\n[output]\nindent = 2\n",
        );

        let settings = Settings::load_layers(None, Some(&local), no_env()).unwrap();

        assert_eq!(
            settings.properties.excluded,
            vec!["java.version".to_string(), "scala.version".to_string()]
        );
        assert_eq!(settings.output.indent, 2);
        assert_eq!(settings.output.wrap_indent, 8);
    }

    #[test]
    fn given_env_vars_when_loading_then_they_replace_file_values() {
        let dir = TempDir::new().unwrap();
        let local = write(&dir, ".pomsort.toml", "[output]\nindent = 2\n");

        let settings = Settings::load_layers(
            None,
            Some(&local),
            env(&[
                ("POMSORT_OUTPUT__INDENT", "3"),
                ("POMSORT_SKIP_DIRS", "target,build"),
                ("POMSORT_SECTIONS__PLUGINS", "plugins"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.output.indent, 3);
        assert_eq!(settings.skip_dirs, vec!["target".to_string(), "build".to_string()]);
        assert_eq!(settings.sections.plugins, "plugins");
    }

    #[test]
    fn given_banner_with_double_dash_when_loading_then_rejected() {
        let dir = TempDir::new().unwrap();
        let local = write(
            &dir,
            ".pomsort.toml",
            "[properties]\nplugin_banner = \"-- plugins --\"\n",
        );

        let err = Settings::load_layers(None, Some(&local), no_env()).unwrap_err();
        assert!(err.to_string().contains("plugin_banner"), "{}", err);
    }

    #[test]
    fn given_zero_indent_when_validating_then_rejected() {
        let mut settings = Settings::default();
        settings.output.indent = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn given_invalid_toml_when_loading_then_config_error() {
        let dir = TempDir::new().unwrap();
        let local = write(&dir, ".pomsort.toml", "[output\nindent = ");

        let err = Settings::load_layers(None, Some(&local), no_env()).unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
    }

    #[test]
    fn given_wrap_disabled_when_building_writer_options_then_no_wrap() {
        let mut settings = Settings::default();
        settings.output.wrap_attributes = false;
        assert_eq!(settings.writer_options().wrap, None);
        assert_eq!(Settings::default().writer_options(), WriterOptions::default());
    }

    #[test]
    fn given_template_when_parsing_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.skip_dirs.is_none());
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_merge_array_union_and_negation() {
        let base = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            merge_array(&base, &["c".to_string()]),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert_eq!(
            merge_array(&base, &["!a".to_string(), "c".to_string(), "!x".to_string()]),
            vec!["b".to_string(), "c".to_string()]
        );
    }
}
