//! Delimiter wrapped substring substitution of identifiers
//!
//! Each identifier is wrapped as `<id><delimiter>` and every occurrence of
//! `<original><delimiter>` is replaced by `<novel><delimiter>`. The trailing delimiter is then
//! removed again. Matching is on substrings, so `10` would also match inside `110`. A match
//! which does not start the wrapped identifier is reported as ambiguous.
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use log::{debug, warn};

use crate::curation::{CurationError, TranslationRow};

/// A translation target matched somewhere other than the start of an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousSubstitution {
    pub original: String,
    pub novel: String,
    /// Identifier the target matched within
    pub identifier: String,
    /// Identifier after the substitution was applied
    pub rewritten: String,
}

impl Display for AmbiguousSubstitution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} matched inside {}, rewritten to {}",
            self.original, self.novel, self.identifier, self.rewritten
        )
    }
}

/// Outcome of applying a translation table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationReport {
    /// Every identifier that changed, with its final form
    pub rewritten: Vec<(String, String)>,
    /// Entities folded into another entity sharing their new identifier, with the survivor
    pub merged: Vec<(String, String)>,
    pub ambiguous: Vec<AmbiguousSubstitution>,
    /// Rows whose original identifier matched nothing
    pub unmatched: Vec<TranslationRow>,
}

/// One row of a translation table, ready to apply
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    original: String,
    novel: String,
    original_target: String,
    novel_target: String,
    delimiter: String,
}

/// Identifier produced by a matching [`Substitution`]
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub identifier: String,
    pub ambiguous: bool,
}

impl Substitution {
    pub fn new(row: &TranslationRow, delimiter: &str) -> Substitution {
        Substitution {
            original: row.identifier_original.clone(),
            novel: row.identifier_novel.clone(),
            original_target: format!("{}{}", row.identifier_original, delimiter),
            novel_target: format!("{}{}", row.identifier_novel, delimiter),
            delimiter: delimiter.to_string(),
        }
    }

    /// Apply the substitution, None if the target does not occur in `identifier`
    pub fn apply(&self, identifier: &str) -> Option<Rewrite> {
        let wrapped = format!("{}{}", identifier, self.delimiter);
        let mut positions = wrapped
            .match_indices(&self.original_target)
            .map(|(position, _)| position)
            .peekable();
        positions.peek()?;
        let ambiguous = positions.any(|position| position != 0);
        let replaced = wrapped.replace(&self.original_target, &self.novel_target);
        let identifier = match replaced.strip_suffix(&self.delimiter) {
            Some(stripped) => stripped.to_string(),
            None => replaced,
        };
        Some(Rewrite {
            identifier,
            ambiguous,
        })
    }
}

/// Applies a whole translation table to identifiers, in table order
///
/// Results are cached per identifier, so an id is translated and reported once no matter how
/// many entities carry it.
pub(crate) struct Translator<'a> {
    rows: &'a [TranslationRow],
    substitutions: Vec<Substitution>,
    matched: Vec<bool>,
    cache: IndexMap<String, String>,
    report: TranslationReport,
}

impl<'a> Translator<'a> {
    pub(crate) fn new(rows: &'a [TranslationRow], delimiter: &str) -> Translator<'a> {
        Translator {
            rows,
            substitutions: rows.iter().map(|r| Substitution::new(r, delimiter)).collect(),
            matched: vec![false; rows.len()],
            cache: IndexMap::new(),
            report: TranslationReport::default(),
        }
    }

    pub(crate) fn translate(&mut self, identifier: &str) -> String {
        if let Some(translated) = self.cache.get(identifier) {
            return translated.clone();
        }
        let mut current = identifier.to_string();
        for (index, substitution) in self.substitutions.iter().enumerate() {
            let Some(rewrite) = substitution.apply(&current) else {
                continue;
            };
            self.matched[index] = true;
            if rewrite.ambiguous {
                self.report.ambiguous.push(AmbiguousSubstitution {
                    original: substitution.original.clone(),
                    novel: substitution.novel.clone(),
                    identifier: current.clone(),
                    rewritten: rewrite.identifier.clone(),
                });
            }
            current = rewrite.identifier;
        }
        if current != identifier {
            debug!("Translated {} to {}", identifier, current);
            self.report
                .rewritten
                .push((identifier.to_string(), current.clone()));
        }
        self.cache.insert(identifier.to_string(), current.clone());
        current
    }

    pub(crate) fn record_merge(&mut self, merged: &str, survivor: &str) {
        debug!("Merged {} into {}", merged, survivor);
        self.report
            .merged
            .push((merged.to_string(), survivor.to_string()));
    }

    /// Collect unmatched rows and settle ambiguities
    pub(crate) fn finish(self, reject_ambiguous: bool) -> Result<TranslationReport, CurationError> {
        let mut report = self.report;
        report.unmatched = self
            .rows
            .iter()
            .zip(self.matched.iter())
            .filter(|(_, matched)| !**matched)
            .map(|(row, _)| row.clone())
            .collect();
        for row in &report.unmatched {
            warn!(
                "Translation {} -> {} matched no identifier",
                row.identifier_original, row.identifier_novel
            );
        }
        for ambiguous in &report.ambiguous {
            warn!("Ambiguous substitution: {}", ambiguous);
        }
        if reject_ambiguous {
            if let Some(first) = report.ambiguous.first() {
                return Err(CurationError::AmbiguousSubstitution(first.clone()));
            }
        }
        Ok(report)
    }
}
