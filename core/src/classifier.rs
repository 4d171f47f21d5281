//! Chipset (architecture) classification from the model name.
//!
//! The rule table is data: rules are evaluated top to bottom and the
//! first marker contained in the model name wins. Newest generation
//! goes first. Anything unmatched falls through to the residual class.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chipset {
    #[serde(rename = "M3 Series")]
    M3Series,
    #[serde(rename = "M2 Series")]
    M2Series,
    #[serde(rename = "A-Series")]
    ASeries,
}

impl Chipset {
    pub const ALL: [Chipset; 3] = [Chipset::M3Series, Chipset::M2Series, Chipset::ASeries];

    pub fn label(&self) -> &'static str {
        match self {
            Self::M3Series => "M3 Series",
            Self::M2Series => "M2 Series",
            Self::ASeries  => "A-Series",
        }
    }
}

impl fmt::Display for Chipset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One (marker, class) rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipRule {
    pub marker: &'static str,
    pub class: Chipset,
}

/// Ordered, first-match-wins.
pub const CHIP_RULES: &[ChipRule] = &[
    ChipRule { marker: "M3", class: Chipset::M3Series },
    ChipRule { marker: "M2", class: Chipset::M2Series },
];

pub const RESIDUAL_CHIPSET: Chipset = Chipset::ASeries;

/// Classify a model name using the default rule table.
pub fn classify_chipset(model_name: &str) -> Chipset {
    classify_with(CHIP_RULES, RESIDUAL_CHIPSET, model_name)
}

/// Classify against an explicit rule table.
pub fn classify_with(rules: &[ChipRule], residual: Chipset, model_name: &str) -> Chipset {
    rules
        .iter()
        .find(|rule| model_name.contains(rule.marker))
        .map(|rule| rule.class)
        .unwrap_or(residual)
}
