//! Level sets of categorical factors.

use super::error::DesignError;
use crate::terms::Interaction;
use std::collections::{BTreeMap, HashSet};

/// Synthetic level collecting data values outside a declared level set.
pub const OTHER_LEVEL: &str = "~other~";

/// Identity of a categorical factor: its column and declared levels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactorId {
    pub column: String,
    pub declared: Option<Vec<String>>,
}

/// Ordered levels of a fitted factor.
///
/// When `has_other` is set the last level is [`OTHER_LEVEL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorLevels {
    pub levels: Vec<String>,
    pub has_other: bool,
}

impl FactorLevels {
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Position of `label`, falling back to the other level.
    pub fn encode(&self, variable: &str, label: &str) -> Result<usize, DesignError> {
        let named = if self.has_other {
            &self.levels[..self.levels.len() - 1]
        } else {
            &self.levels[..]
        };
        match named.iter().position(|level| level == label) {
            Some(index) => Ok(index),
            None if self.has_other => Ok(self.levels.len() - 1),
            None => Err(DesignError::UnknownLevel {
                variable: variable.to_string(),
                level: label.to_string(),
            }),
        }
    }
}

/// Resolve the levels of a factor from its data labels.
///
/// Inferred levels are the sorted distinct labels, numerically when every
/// label parses as a number. Declared levels keep their order, lose entries
/// absent from the data, and gain [`OTHER_LEVEL`] when the data holds labels
/// outside the declaration.
pub fn resolve_levels(labels: &[String], declared: Option<&[String]>) -> FactorLevels {
    let mut distinct: Vec<&String> = Vec::new();
    for label in labels {
        if !distinct.contains(&label) {
            distinct.push(label);
        }
    }

    match declared {
        None => {
            let numeric: Option<Vec<f64>> = distinct.iter().map(|l| l.parse::<f64>().ok()).collect();
            let mut levels: Vec<String> = distinct.into_iter().cloned().collect();
            match numeric {
                Some(values) => {
                    let mut paired: Vec<(f64, String)> = values.into_iter().zip(levels).collect();
                    paired.sort_by(|a, b| a.0.total_cmp(&b.0));
                    levels = paired.into_iter().map(|(_, l)| l).collect();
                }
                None => levels.sort(),
            }
            FactorLevels {
                levels,
                has_other: false,
            }
        }
        Some(declared) => {
            let mut levels: Vec<String> = Vec::new();
            for level in declared {
                if distinct.contains(&level) && !levels.contains(level) {
                    levels.push(level.clone());
                }
            }
            let has_other = distinct.iter().any(|l| !declared.contains(*l));
            if has_other {
                levels.push(OTHER_LEVEL.to_string());
            }
            FactorLevels { levels, has_other }
        }
    }
}

/// Encoding decisions recorded at fit time and replayed at predict time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodingCache {
    levels: BTreeMap<FactorId, FactorLevels>,
    collapsed_interactions: HashSet<Interaction>,
}

impl EncodingCache {
    /// Fitted levels of a factor.
    pub fn levels(&self, id: &FactorId) -> Option<&FactorLevels> {
        self.levels.get(id)
    }

    /// Fitted levels of the first factor drawn from `column`.
    pub fn levels_for_column(&self, column: &str) -> Option<&FactorLevels> {
        self.levels
            .iter()
            .find(|(id, _)| id.column == column)
            .map(|(_, levels)| levels)
    }

    /// All fitted factors.
    pub fn factors(&self) -> impl Iterator<Item = (&FactorId, &FactorLevels)> {
        self.levels.iter()
    }

    pub(crate) fn insert_levels(&mut self, id: FactorId, levels: FactorLevels) {
        self.levels.insert(id, levels);
    }

    /// Whether fitting kept a single product column for this interaction.
    pub fn is_collapsed(&self, interaction: &Interaction) -> bool {
        self.collapsed_interactions.contains(interaction)
    }

    pub(crate) fn mark_collapsed(&mut self, interaction: Interaction) {
        self.collapsed_interactions.insert(interaction);
    }
}
