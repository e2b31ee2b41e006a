//! Pass tables: each pass is data driving the same section rebuilder.

use std::fmt;

use crate::domain::classify::{Classifier, Matcher, Placement, Rule};
use crate::domain::document::ParentLocator;
use crate::domain::key::KeyStrategy;

pub const MAVEN_PLUGIN_VERSION_BANNER: &str =
    "==================== maven plugin versions ====================";
pub const DEPENDENCY_VERSION_BANNER: &str =
    "==================== dependency versions ======================";

/// The sorting passes a document can go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    Dependencies,
    DependencyManagement,
    Plugins,
    PluginManagement,
    Properties,
    PropertiesVersion,
}

impl PassKind {
    /// Passes run by `all`. The flat properties pass would undo the grouped one.
    pub const STANDARD: [PassKind; 5] = [
        PassKind::Dependencies,
        PassKind::DependencyManagement,
        PassKind::Plugins,
        PassKind::PluginManagement,
        PassKind::Properties,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PassKind::Dependencies => "dependencies",
            PassKind::DependencyManagement => "dependency-management",
            PassKind::Plugins => "plugins",
            PassKind::PluginManagement => "plugin-management",
            PassKind::Properties => "properties",
            PassKind::PropertiesVersion => "properties-version",
        }
    }

    pub fn default_parent(&self) -> &'static str {
        match self {
            PassKind::Dependencies => "project/dependencies",
            PassKind::DependencyManagement => "project/dependencyManagement/dependencies",
            PassKind::Plugins => "project/build/plugins",
            PassKind::PluginManagement => "project/build/pluginManagement/plugins",
            PassKind::Properties | PassKind::PropertiesVersion => "project/properties",
        }
    }

    fn item_tag(&self) -> Option<&'static str> {
        match self {
            PassKind::Dependencies | PassKind::DependencyManagement => Some("dependency"),
            PassKind::Plugins | PassKind::PluginManagement => Some("plugin"),
            PassKind::Properties | PassKind::PropertiesVersion => None,
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Naming convention that splits `<properties>` into groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRules {
    /// Only names ending with this are sorted
    pub version_suffix: String,
    /// Always left in place, even when they match the suffix
    pub excluded: Vec<String>,
    pub plugin_prefixes: Vec<String>,
    pub plugin_suffixes: Vec<String>,
    pub plugin_banner: String,
    pub dependency_banner: String,
}

impl Default for PropertyRules {
    fn default() -> Self {
        Self {
            version_suffix: ".version".into(),
            excluded: vec!["java.version".into(), "kotlin.version".into()],
            plugin_prefixes: vec!["maven-".into()],
            plugin_suffixes: vec!["-maven-plugin.version".into()],
            plugin_banner: MAVEN_PLUGIN_VERSION_BANNER.into(),
            dependency_banner: DEPENDENCY_VERSION_BANNER.into(),
        }
    }
}

impl PropertyRules {
    fn exclusions(&self) -> Vec<Matcher> {
        if self.excluded.is_empty() {
            Vec::new()
        } else {
            vec![Matcher::exact_any(self.excluded.iter().cloned())]
        }
    }

    fn plugin_matcher(&self) -> Matcher {
        let prefixes = self.plugin_prefixes.iter().cloned().map(Matcher::Prefix);
        let suffixes = self.plugin_suffixes.iter().cloned().map(Matcher::Suffix);
        Matcher::AnyOf(prefixes.chain(suffixes).collect())
    }
}

/// A sorted group and the banner announcing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub name: String,
    pub banner: Option<String>,
}

impl GroupSpec {
    fn plain(name: &str) -> Self {
        Self {
            name: name.into(),
            banner: None,
        }
    }

    fn bannered(name: &str, banner: &str) -> Self {
        Self {
            name: name.into(),
            banner: Some(banner.into()),
        }
    }
}

/// Everything the rebuilder needs to know about one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassConfig {
    pub kind: PassKind,
    pub parent: ParentLocator,
    /// Items must include at least one child with this tag, otherwise the pass is a no-op
    pub item_tag: Option<String>,
    pub key: KeyStrategy,
    pub classifier: Classifier,
    pub groups: Vec<GroupSpec>,
}

impl PassConfig {
    pub fn build(kind: PassKind, parent: ParentLocator, rules: &PropertyRules) -> Self {
        let item_tag = kind.item_tag().map(str::to_string);
        match kind {
            PassKind::Dependencies
            | PassKind::DependencyManagement
            | PassKind::Plugins
            | PassKind::PluginManagement => Self {
                kind,
                parent,
                item_tag,
                key: KeyStrategy::maven_coordinate(),
                classifier: Classifier::single_group(),
                groups: vec![GroupSpec::plain(kind.name())],
            },
            PassKind::Properties => Self {
                kind,
                parent,
                item_tag,
                key: KeyStrategy::Identity,
                classifier: Classifier {
                    exclusions: rules.exclusions(),
                    base: Matcher::Suffix(rules.version_suffix.clone()),
                    rules: vec![Rule {
                        matcher: rules.plugin_matcher(),
                        placement: Placement::Group(0),
                    }],
                    fallback: Placement::Group(1),
                },
                groups: vec![
                    GroupSpec::bannered("maven plugin versions", &rules.plugin_banner),
                    GroupSpec::bannered("dependency versions", &rules.dependency_banner),
                ],
            },
            PassKind::PropertiesVersion => Self {
                kind,
                parent,
                item_tag,
                key: KeyStrategy::Identity,
                classifier: Classifier {
                    exclusions: rules.exclusions(),
                    base: Matcher::Suffix(rules.version_suffix.clone()),
                    rules: Vec::new(),
                    fallback: Placement::Group(0),
                },
                groups: vec![GroupSpec::plain("versions")],
            },
        }
    }

    /// Built-in table for `kind` with its default parent.
    pub fn defaults(kind: PassKind) -> Self {
        Self::build(
            kind,
            ParentLocator::parse(kind.default_parent()),
            &PropertyRules::default(),
        )
    }

    pub fn banner(&self, group: usize) -> Option<&str> {
        self.groups.get(group).and_then(|g| g.banner.as_deref())
    }

    /// What an item is called in log lines.
    pub fn item_label(&self) -> &str {
        self.item_tag.as_deref().unwrap_or("property")
    }
}
