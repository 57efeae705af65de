//! Building a form model from page markup.
//!
//! The browser host reads each step panel's controls and hands their
//! attributes here; everything that decides keys, labels and step order
//! lives in this module so it can be checked without a DOM.

use crate::domain::{FieldKind, FormDefinition, FormField, ServiceOption, StepPanel};

/// Attributes of one required control in a step panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupControl {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Parses a panel's `data-step` attribute.
pub fn step_ordinal(attribute: Option<&str>) -> Option<usize> {
    attribute?.trim().parse().ok()
}

/// Model key of the `index`-th required control of `step`.
///
/// Keys are positional: controls sharing an id or name (a radio group)
/// still get one field each.
pub fn control_key(step: usize, index: usize) -> String {
    format!("step{}-field{}", step, index)
}

/// Builds the model of one step panel.
pub fn markup_panel(step: usize, controls: &[MarkupControl], services: &[String]) -> StepPanel {
    let fields = controls
        .iter()
        .enumerate()
        .map(|(index, control)| {
            let key = control_key(step, index);
            let label = control
                .id
                .as_deref()
                .or(control.name.as_deref())
                .unwrap_or(&key)
                .to_string();
            FormField::new(&key, &label, FieldKind::Text, true)
        })
        .collect();

    StepPanel {
        step,
        title: format!("Step {}", step),
        fields,
        services: services.iter().map(|v| ServiceOption::new(v, v)).collect(),
    }
}

/// Orders per-panel items by their step ordinal, keeping document order
/// among equal ordinals.
pub fn in_step_order<T>(mut items: Vec<(usize, T)>) -> Vec<T> {
    items.sort_by_key(|(step, _)| *step);
    items.into_iter().map(|(_, item)| item).collect()
}

/// Assembles the definition the wizard is built from.
pub fn markup_definition(
    title: &str,
    panels: Vec<StepPanel>,
    terms: bool,
    signature: bool,
    uploads: bool,
) -> FormDefinition {
    FormDefinition {
        title: title.to_string(),
        steps: panels,
        terms,
        signature,
        uploads,
    }
}
