//! Panel validator
//!
//! Checks that every declared widget id fits its wire field, that ids are
//! unique within a class, and that slider ranges make sense.

use crate::config::PanelConfig;
use crate::data::{WidgetClass, WidgetId};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    IdOutOfRange {
        class: WidgetClass,
        id: WidgetId,
    },
    DuplicateId {
        class: WidgetClass,
        id: WidgetId,
    },
    InvertedRange {
        id: WidgetId,
        min: i32,
        max: i32,
    },
    ZeroStep {
        id: WidgetId,
    },
    DefaultOutOfRange {
        id: WidgetId,
        default: i32,
        min: i32,
        max: i32,
    },
    EmptyLabel {
        class: WidgetClass,
        id: WidgetId,
    },
}

impl ValidationIssue {
    pub fn severity(&self) -> ValidationSeverity {
        match self {
            ValidationIssue::IdOutOfRange { .. }
            | ValidationIssue::DuplicateId { .. }
            | ValidationIssue::InvertedRange { .. }
            | ValidationIssue::ZeroStep { .. } => ValidationSeverity::Error,
            ValidationIssue::DefaultOutOfRange { .. } | ValidationIssue::EmptyLabel { .. } => {
                ValidationSeverity::Warning
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            ValidationIssue::IdOutOfRange { class, id } => format!(
                "{} id {} does not fit the wire format (allowed 0-{})",
                class,
                id,
                class.max_id()
            ),
            ValidationIssue::DuplicateId { class, id } => {
                format!("{} id {} is declared more than once", class, id)
            }
            ValidationIssue::InvertedRange { id, min, max } => {
                format!("slider {} has min {} greater than max {}", id, min, max)
            }
            ValidationIssue::ZeroStep { id } => format!("slider {} has a step of zero", id),
            ValidationIssue::DefaultOutOfRange {
                id,
                default,
                min,
                max,
            } => format!(
                "slider {} default {} is outside {}..={}, clamping",
                id, default, min, max
            ),
            ValidationIssue::EmptyLabel { class, id } => {
                format!("{} {} has no label", class, id)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    Error,
    Warning,
}

pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i.severity(), ValidationSeverity::Error))
    }

    pub fn has_warnings(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i.severity(), ValidationSeverity::Warning))
    }

    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| matches!(i.severity(), ValidationSeverity::Error))
            .collect()
    }

    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| matches!(i.severity(), ValidationSeverity::Warning))
            .collect()
    }
}

/// Validate the declared panel
pub fn validate_panel(panel: &PanelConfig) -> ValidationResult {
    let mut issues = Vec::new();

    check_ids(
        &mut issues,
        WidgetClass::Button,
        panel.buttons.iter().map(|b| (b.id, b.label.as_str())),
    );
    check_ids(
        &mut issues,
        WidgetClass::Toggle,
        panel.toggles.iter().map(|t| (t.id, t.label.as_str())),
    );
    check_ids(
        &mut issues,
        WidgetClass::Slider,
        panel.sliders.iter().map(|s| (s.id, s.label.as_str())),
    );

    for slider in &panel.sliders {
        if slider.min > slider.max {
            issues.push(ValidationIssue::InvertedRange {
                id: slider.id,
                min: slider.min,
                max: slider.max,
            });
        } else if slider.default < slider.min || slider.default > slider.max {
            issues.push(ValidationIssue::DefaultOutOfRange {
                id: slider.id,
                default: slider.default,
                min: slider.min,
                max: slider.max,
            });
        }
        if slider.step == 0 {
            issues.push(ValidationIssue::ZeroStep { id: slider.id });
        }
    }

    ValidationResult { issues }
}

fn check_ids<'a>(
    issues: &mut Vec<ValidationIssue>,
    class: WidgetClass,
    widgets: impl Iterator<Item = (WidgetId, &'a str)>,
) {
    let mut seen = HashSet::new();
    for (id, label) in widgets {
        if !class.accepts(id) {
            issues.push(ValidationIssue::IdOutOfRange { class, id });
        }
        if !seen.insert(id) {
            issues.push(ValidationIssue::DuplicateId { class, id });
        }
        if label.trim().is_empty() {
            issues.push(ValidationIssue::EmptyLabel { class, id });
        }
    }
}

/// Auto-fix warnings. Returns the number of issues fixed.
pub fn auto_fix_panel(panel: &mut PanelConfig, issues: &[ValidationIssue]) -> usize {
    let mut fixed = 0;

    for issue in issues {
        match issue {
            ValidationIssue::DefaultOutOfRange { id, min, max, .. } => {
                if let Some(slider) = panel.sliders.iter_mut().find(|s| s.id == *id) {
                    slider.default = slider.default.clamp(*min, *max);
                    fixed += 1;
                }
            }
            ValidationIssue::EmptyLabel { class, id } => {
                let label = format!("{} {}", class, id);
                let slot = match class {
                    WidgetClass::Button => panel
                        .buttons
                        .iter_mut()
                        .find(|b| b.id == *id)
                        .map(|b| &mut b.label),
                    WidgetClass::Toggle => panel
                        .toggles
                        .iter_mut()
                        .find(|t| t.id == *id)
                        .map(|t| &mut t.label),
                    WidgetClass::Slider => panel
                        .sliders
                        .iter_mut()
                        .find(|s| s.id == *id)
                        .map(|s| &mut s.label),
                };
                if let Some(slot) = slot {
                    *slot = label;
                    fixed += 1;
                }
            }
            _ => {}
        }
    }

    fixed
}
