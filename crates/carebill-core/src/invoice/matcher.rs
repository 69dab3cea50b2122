//! Matching an extracted child identity against the caller's roster.

use serde::{Deserialize, Serialize};

use crate::models::record::{ChildId, ExtractionWarning, KnownChild, WarningKind};

/// Which rule selected the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    ExactReference,
    PartialReference,
    NameContains,
    OnlyChild,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::ExactReference => "exact_reference",
            MatchStrategy::PartialReference => "partial_reference",
            MatchStrategy::NameContains => "name_contains",
            MatchStrategy::OnlyChild => "only_child",
        }
    }

    /// Confidence reported in the record trace.
    pub fn confidence(&self) -> f32 {
        match self {
            MatchStrategy::ExactReference => 1.0,
            MatchStrategy::PartialReference => 0.7,
            MatchStrategy::NameContains => 0.6,
            MatchStrategy::OnlyChild => 0.3,
        }
    }
}

/// Outcome of [`match_child`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildMatch {
    pub child_id: Option<ChildId>,
    pub strategy: Option<MatchStrategy>,
    pub warning: Option<ExtractionWarning>,
}

impl ChildMatch {
    fn found(child: &KnownChild, strategy: MatchStrategy) -> Self {
        Self {
            child_id: Some(child.id),
            strategy: Some(strategy),
            warning: None,
        }
    }
}

/// Match by exact reference, partial reference, then name; with a single
/// known child and `auto_select_only_child`, fall back to that child with a
/// warning. Blank inputs count as absent.
pub fn match_child(
    reference: Option<&str>,
    name: Option<&str>,
    children: &[KnownChild],
    auto_select_only_child: bool,
) -> ChildMatch {
    let reference = reference
        .map(|r| r.trim().to_uppercase())
        .filter(|r| !r.is_empty());
    let name = name.map(|n| n.trim().to_lowercase()).filter(|n| !n.is_empty());

    if let Some(reference) = reference.as_deref() {
        let known_reference = |child: &KnownChild| child.reference_number.trim().to_uppercase();

        if let Some(child) = children.iter().find(|c| known_reference(*c) == reference) {
            return ChildMatch::found(child, MatchStrategy::ExactReference);
        }

        let partial = children.iter().find(|c| {
            let known = known_reference(*c);
            !known.is_empty() && (known.contains(reference) || reference.contains(known.as_str()))
        });
        if let Some(child) = partial {
            return ChildMatch::found(child, MatchStrategy::PartialReference);
        }
    }

    if let Some(name) = name.as_deref() {
        if let Some(child) = children.iter().find(|c| c.name.to_lowercase().contains(name)) {
            return ChildMatch::found(child, MatchStrategy::NameContains);
        }
    }

    if let [only] = children {
        if auto_select_only_child {
            return ChildMatch {
                child_id: Some(only.id),
                strategy: Some(MatchStrategy::OnlyChild),
                warning: Some(ExtractionWarning::new(
                    WarningKind::ChildAutoSelected,
                    format!("Auto-selected only child {} ({})", only.name, only.id),
                )),
            };
        }
    }

    ChildMatch {
        warning: Some(ExtractionWarning::new(
            WarningKind::ChildNotMatched,
            "Could not match child from statement",
        )),
        ..Default::default()
    }
}
