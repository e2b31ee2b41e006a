//! Declarative group classification.

/// Where an item ends up in the rebuilt section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Placement {
    /// Kept in original document order, before every sorted group, no banner.
    LeaveInPlace,
    /// Index into the pass's ordered group list.
    Group(usize),
}

/// Predicate over an item's tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Any,
    Exact(String),
    Prefix(String),
    Suffix(String),
    AnyOf(Vec<Matcher>),
}

impl Matcher {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Exact(s) => name == s,
            Matcher::Prefix(s) => name.starts_with(s.as_str()),
            Matcher::Suffix(s) => name.ends_with(s.as_str()),
            Matcher::AnyOf(all) => all.iter().any(|m| m.matches(name)),
        }
    }

    pub fn exact_any<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Matcher::AnyOf(names.into_iter().map(|n| Matcher::Exact(n.into())).collect())
    }
}

/// One row of the rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub matcher: Matcher,
    pub placement: Placement,
}

/// Ordered rule table; first match wins.
///
/// Evaluation order: exclusions, base filter, rules, fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    /// Names always left in place
    pub exclusions: Vec<Matcher>,
    /// Items failing this are left in place
    pub base: Matcher,
    pub rules: Vec<Rule>,
    pub fallback: Placement,
}

impl Classifier {
    /// Everything goes to group 0.
    pub fn single_group() -> Self {
        Self {
            exclusions: Vec::new(),
            base: Matcher::Any,
            rules: Vec::new(),
            fallback: Placement::Group(0),
        }
    }

    pub fn classify(&self, name: &str) -> Placement {
        if self.exclusions.iter().any(|m| m.matches(name)) {
            return Placement::LeaveInPlace;
        }
        if !self.base.matches(name) {
            return Placement::LeaveInPlace;
        }
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(name))
            .map(|rule| rule.placement)
            .unwrap_or(self.fallback)
    }
}
