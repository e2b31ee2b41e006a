//! pomsort: canonical ordering for Maven POM sections
//!
//! Layers, innermost first: `domain` (document tree and section rebuilder),
//! `application` (sort service), `infrastructure` (filesystem, XML codec,
//! wiring) and `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
