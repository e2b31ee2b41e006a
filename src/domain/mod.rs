//! Domain layer: document tree and the section reordering logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod binder;
pub mod classify;
pub mod document;
pub mod error;
pub mod key;
pub mod pass;
pub mod rebuild;

pub use binder::bind;
pub use classify::{Classifier, Matcher, Placement, Rule};
pub use document::{Attribute, Document, Element, NodeId, NodeKind, ParentLocator};
pub use error::{DomainError, DomainResult};
pub use key::KeyStrategy;
pub use pass::{
    GroupSpec, PassConfig, PassKind, PropertyRules, DEPENDENCY_VERSION_BANNER,
    MAVEN_PLUGIN_VERSION_BANNER,
};
pub use rebuild::{rebuild, rebuild_pass, AbsentReason, DecoratedItem, SectionOutcome};
