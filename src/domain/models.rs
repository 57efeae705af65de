use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DefinitionError, DefinitionResult};
use crate::domain::services::format_file_size;

/// Group name shared by the step-1 service checkboxes.
pub const SERVICES_GROUP: &str = "services";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Phone,
    Date,
    TextArea,
    Select,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Set by a failed validation, cleared by the next input on the field.
    #[serde(skip)]
    pub error: bool,
}

impl FormField {
    pub fn new(name: &str, label: &str, kind: FieldKind, required: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required,
            value: String::new(),
            options: Vec::new(),
            error: false,
        }
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    /// A required field is satisfied by any non-blank value.
    pub fn is_satisfied(&self) -> bool {
        !self.required || !self.value.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub checked: bool,
}

impl ServiceOption {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            checked: false,
        }
    }

    /// Cards mirror their checkbox.
    pub fn selected(&self) -> bool {
        self.checked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepPanel {
    /// 1-based position in the wizard.
    pub step: usize,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub services: Vec<ServiceOption>,
}

impl StepPanel {
    pub fn required_fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn checked_services(&self) -> usize {
        self.services.iter().filter(|s| s.checked).count()
    }
}

/// Layout of the service request form: its panels plus the optional
/// terms checkbox, signature surface and document picker, all of which
/// sit on the last step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub title: String,
    pub steps: Vec<StepPanel>,
    #[serde(default)]
    pub terms: bool,
    #[serde(default)]
    pub signature: bool,
    #[serde(default)]
    pub uploads: bool,
}

impl FormDefinition {
    /// Orders panels by ordinal and checks they run 1..=n.
    pub fn normalized(mut self) -> DefinitionResult<Self> {
        if self.steps.is_empty() {
            return Err(DefinitionError::NoSteps);
        }
        self.steps.sort_by_key(|p| p.step);
        for (index, panel) in self.steps.iter().enumerate() {
            let expected = index + 1;
            if index > 0 && self.steps[index - 1].step == panel.step {
                return Err(DefinitionError::DuplicateStep(panel.step));
            }
            if panel.step != expected {
                return Err(DefinitionError::StepGap {
                    expected,
                    found: panel.step,
                });
            }
        }
        Ok(self)
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }
}

impl Default for FormDefinition {
    fn default() -> Self {
        let services = [
            ("residential", "Residential Appraisal"),
            ("commercial", "Commercial Appraisal"),
            ("estate", "Estate & Probate"),
            ("divorce", "Divorce Settlement"),
            ("pre-listing", "Pre-Listing Appraisal"),
            ("tax-appeal", "Property Tax Appeal"),
        ];

        Self {
            title: "Service Request".to_string(),
            steps: vec![
                StepPanel {
                    step: 1,
                    title: "Services & Contact".to_string(),
                    fields: vec![
                        FormField::new("fullName", "Full Name", FieldKind::Text, true),
                        FormField::new("email", "Email Address", FieldKind::Email, true),
                        FormField::new("phone", "Phone Number", FieldKind::Phone, true),
                        FormField::new("company", "Company", FieldKind::Text, false),
                    ],
                    services: services
                        .iter()
                        .map(|(value, label)| ServiceOption::new(value, label))
                        .collect(),
                },
                StepPanel {
                    step: 2,
                    title: "Property Details".to_string(),
                    fields: vec![
                        FormField::new("propertyAddress", "Property Address", FieldKind::Text, true),
                        FormField::new("city", "City", FieldKind::Text, true),
                        FormField::new("state", "State", FieldKind::Text, true),
                        FormField::new("zip", "ZIP Code", FieldKind::Text, true),
                        FormField::new("propertyType", "Property Type", FieldKind::Select, true)
                            .with_options(&["Single Family", "Condo", "Multi-Family", "Land", "Commercial"]),
                        FormField::new("notes", "Additional Notes", FieldKind::TextArea, false),
                    ],
                    services: Vec::new(),
                },
                StepPanel {
                    step: 3,
                    title: "Documents & Authorization".to_string(),
                    fields: vec![
                        FormField::new("instructionDate", "Instruction Date", FieldKind::Date, false),
                        FormField::new("signerName", "Signer Name", FieldKind::Text, true),
                        FormField::new("signatureDate", "Signature Date", FieldKind::Date, true),
                    ],
                    services: Vec::new(),
                },
            ],
            terms: true,
            signature: true,
            uploads: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFileEntry {
    pub name: String,
    pub size_bytes: u64,
}

impl UploadedFileEntry {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
        }
    }

    pub fn display_size(&self) -> String {
        format_file_size(self.size_bytes)
    }
}

/// Snapshot of an accepted service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub services: Vec<String>,
    pub fields: BTreeMap<String, String>,
    pub files: Vec<UploadedFileEntry>,
}
