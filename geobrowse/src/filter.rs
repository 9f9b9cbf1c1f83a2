//! Name filtering for browse tree leaves.
//!
//! Containers always pass the filter so that matching leaves stay
//! reachable; only layer nodes are tested against the pattern.

use regex::{Regex, RegexBuilder};

use crate::tree::{BrowseTree, ItemKind, NodeId};

/// How a filter pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSyntax {
    /// Shell-style wildcards (`*`, `?`), with `|` separating alternatives.
    Wildcard,
    /// A regular expression matched anywhere in the name.
    Regex,
}

/// A compiled, case-insensitive name filter.
///
/// An empty pattern accepts every name.
#[derive(Debug)]
pub struct SublayerFilter {
    patterns: Vec<Regex>,
}

impl SublayerFilter {
    /// Compile a filter from a user-supplied pattern.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`regex::Error`] when the pattern (or, for
    /// wildcard syntax, one of its `|`-separated alternatives) does not
    /// compile.
    pub fn new(pattern: &str, syntax: PatternSyntax) -> Result<Self, regex::Error> {
        let mut patterns = Vec::new();
        match syntax {
            PatternSyntax::Wildcard => {
                for part in pattern.split('|') {
                    let part = part.trim();
                    if part.is_empty() {
                        continue;
                    }
                    patterns.push(compile_wildcard(part)?);
                }
            }
            PatternSyntax::Regex => {
                if !pattern.trim().is_empty() {
                    patterns.push(
                        RegexBuilder::new(pattern.trim())
                            .case_insensitive(true)
                            .build()?,
                    );
                }
            }
        }
        Ok(Self { patterns })
    }

    /// Returns true if no pattern is active.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Test a bare name against the filter.
    pub fn accepts_name(&self, name: &str) -> bool {
        self.is_empty() || self.patterns.iter().any(|p| p.is_match(name))
    }

    /// Test a tree node against the filter.
    ///
    /// Non-layer nodes are always accepted. A layer directly under a
    /// directory is matched by its file name, so extension patterns like
    /// `*.shp` behave as expected; layers inside collections or archives
    /// are matched by their display name.
    pub fn accepts(&self, tree: &BrowseTree<'_>, id: NodeId) -> bool {
        let Some(node) = tree.item(id) else {
            return false;
        };
        if node.kind() != ItemKind::Layer {
            return true;
        }
        self.accepts_name(node.name())
    }
}

/// Translate one wildcard alternative into an anchored regex.
fn compile_wildcard(pattern: &str) -> Result<Regex, regex::Error> {
    let mut translated = String::with_capacity(pattern.len() + 8);
    translated.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => translated.push_str(".*"),
            '?' => translated.push('.'),
            _ => translated.push_str(&regex::escape(&ch.to_string())),
        }
    }
    translated.push('$');
    RegexBuilder::new(&translated).case_insensitive(true).build()
}
