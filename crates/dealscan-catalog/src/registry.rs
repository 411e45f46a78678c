//! Identifier deduplication for one input source.

use std::collections::HashMap;

use crate::identifier::extract_identifier;

/// First-seen listing reference for an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub reference: String,
    /// 1-based line number in the input source.
    pub line: usize,
}

/// A repeated identifier: where it was first registered and where it
/// appeared again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRecord {
    pub identifier: String,
    pub first_line: usize,
    pub duplicate_line: usize,
}

/// A reference from which no identifier could be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub line: usize,
    pub reference: String,
}

/// Unique identifiers of one input source in first-seen order, plus the
/// duplicates and unresolved references found while building it.
///
/// Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct IdentifierRegistry {
    entries: HashMap<String, RegistryEntry>,
    order: Vec<String>,
    duplicates: Vec<DuplicateRecord>,
    unresolved: Vec<UnresolvedReference>,
}

impl IdentifierRegistry {
    /// Builds a registry from the text of an input file: one reference per
    /// line, surrounding whitespace trimmed, blank lines skipped. Line
    /// numbers are physical (blank lines still count).
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_references(
            text.lines()
                .enumerate()
                .map(|(idx, line)| (idx + 1, line.trim()))
                .filter(|(_, line)| !line.is_empty()),
        )
    }

    /// Builds a registry from `(line number, reference)` pairs in input order.
    pub fn from_references<I, S>(references: I) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        let mut registry = Self::default();

        for (line, reference) in references {
            let reference = reference.into();
            let Some(identifier) = extract_identifier(&reference) else {
                registry
                    .unresolved
                    .push(UnresolvedReference { line, reference });
                continue;
            };

            if let Some(existing) = registry.entries.get(&identifier) {
                registry.duplicates.push(DuplicateRecord {
                    identifier,
                    first_line: existing.line,
                    duplicate_line: line,
                });
                continue;
            }

            registry.order.push(identifier.clone());
            registry
                .entries
                .insert(identifier, RegistryEntry { reference, line });
        }

        registry
    }

    /// Unique identifiers in first-seen order.
    #[must_use]
    pub fn identifiers(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn entry(&self, identifier: &str) -> Option<&RegistryEntry> {
        self.entries.get(identifier)
    }

    /// The listing reference an identifier was first registered from.
    #[must_use]
    pub fn reference_for(&self, identifier: &str) -> Option<&str> {
        self.entries.get(identifier).map(|e| e.reference.as_str())
    }

    #[must_use]
    pub fn duplicates(&self) -> &[DuplicateRecord] {
        &self.duplicates
    }

    #[must_use]
    pub fn unresolved(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
