//! Field setting files
//!
//! A field setting file is a YAML document describing one expense report.
//! Its layout follows the sections of the report rather than the template's
//! field names:
//!
//! ```yaml
//! Nom: Tremblay
//! RaisonDépenses: voyage
//! Chèque ou dépôt: dépôt
//! RaisonVoyage:
//!   Conférence:
//!     Cochée: true
//!     Nom: RustConf
//! Dépenses:
//!   - Description: Train
//!     Montant: 120.50
//! ```
//!
//! [`FieldSetting::to_field_values`] translates it into template field names.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::form::{FieldValue, FieldValues};
use crate::paths::check_input_path;

/// Appearance state of a checked checkbox in the report template
pub const CHECKBOX_YES: &str = "Oui";

/// Extensions accepted for field setting files
pub const SETTING_EXTENSIONS: &[&str] = &[".yaml", ".yml"];

/// Content of a field setting file
#[derive(Debug, Default, Deserialize)]
pub struct FieldSetting {
    #[serde(rename = "RaisonVoyage")]
    pub travel_reasons: Option<TravelReasons>,

    #[serde(rename = "Dépenses")]
    pub expenses: Option<Vec<Expense>>,

    #[serde(rename = "Codes comptables")]
    pub accounting_codes: Option<Vec<AccountingCode>>,

    /// `voyage` or `autre`
    #[serde(rename = "RaisonDépenses")]
    pub expense_reason: Option<String>,

    /// `employé(e)` or `étudiant(e)`
    #[serde(rename = "Étudiant(e) ou employé(e)")]
    pub claimant_status: Option<String>,

    /// `dépôt` or `chèque`
    #[serde(rename = "Chèque ou dépôt")]
    pub payment_method: Option<String>,

    #[serde(rename = "Distance")]
    pub distance: Option<Value>,

    /// Keys copied as they are into the field of the same name
    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

/// Reasons for a trip
#[derive(Debug, Default, Deserialize)]
pub struct TravelReasons {
    #[serde(rename = "Présentation")]
    pub presentation: Option<Presentation>,

    #[serde(rename = "Conférence")]
    pub conference: Option<Conference>,

    #[serde(rename = "Sabbatique")]
    pub sabbatical: Option<bool>,

    #[serde(rename = "Autres")]
    pub others: Option<OtherReason>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Presentation {
    #[serde(rename = "Cochée")]
    pub checked: Option<bool>,

    #[serde(rename = "Sujet")]
    pub subject: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Conference {
    #[serde(rename = "Cochée")]
    pub checked: Option<bool>,

    #[serde(rename = "Nom")]
    pub name: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OtherReason {
    #[serde(rename = "Cochée")]
    pub checked: Option<bool>,

    #[serde(rename = "Précision")]
    pub details: Option<Value>,
}

/// One line of the expense table
#[derive(Debug, Default, Deserialize)]
pub struct Expense {
    #[serde(rename = "Description")]
    pub description: Option<Value>,

    #[serde(rename = "Montant")]
    pub amount: Option<Value>,
}

/// One line of the accounting code table
#[derive(Debug, Default, Deserialize)]
pub struct AccountingCode {
    #[serde(rename = "UBR")]
    pub ubr: Option<Value>,

    #[serde(rename = "Compte")]
    pub account: Option<Value>,

    #[serde(rename = "DemFin")]
    pub funding_request: Option<Value>,

    #[serde(rename = "CBS")]
    pub cbs: Option<Value>,

    #[serde(rename = "Montant")]
    pub amount: Option<Value>,
}

/// Read a field setting file
pub fn read_field_setting(path: &Path) -> Result<FieldSetting> {
    check_input_path(path, SETTING_EXTENSIONS)?;
    let content = std::fs::read_to_string(path)?;
    parse_field_setting(&content)
}

/// Parse the YAML content of a field setting file
pub fn parse_field_setting(content: &str) -> Result<FieldSetting> {
    // An empty document sets no field
    if content.trim().is_empty() {
        return Ok(FieldSetting::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

impl FieldSetting {
    /// Translate the setting into values keyed by template field name
    ///
    /// Radio button choices become option indices. Null values are dropped.
    pub fn to_field_values(&self) -> Result<FieldValues> {
        let mut values = FieldValues::new();

        for (key, value) in &self.other {
            insert_scalar(&mut values, key, key, value)?;
        }

        if let Some(reasons) = &self.travel_reasons {
            reasons.add_field_values(&mut values)?;
        }

        if let Some(expenses) = &self.expenses {
            for (i, expense) in expenses.iter().enumerate() {
                let n = i + 1;
                insert_optional(&mut values, &format!("Détails{}", n), "Description", &expense.description)?;
                insert_optional(&mut values, &format!("Montant${}", n), "Montant", &expense.amount)?;
            }
        }

        if let Some(codes) = &self.accounting_codes {
            for (i, code) in codes.iter().enumerate() {
                let n = i + 1;
                insert_optional(&mut values, &format!("UBR{}", n), "UBR", &code.ubr)?;
                insert_optional(&mut values, &format!("CC{}", n), "Compte", &code.account)?;
                insert_optional(&mut values, &format!("DF{}", n), "DemFin", &code.funding_request)?;
                insert_optional(&mut values, &format!("CBS{}", n), "CBS", &code.cbs)?;
                insert_optional(&mut values, &format!("ccMontant${}", n), "Montant", &code.amount)?;
            }
        }

        if let Some(reason) = &self.expense_reason {
            let index = choice_index("RaisonDépenses", reason, &["voyage", "autre"])?;
            values.insert("Group1".to_string(), FieldValue::Integer(index));
        }

        if let Some(status) = &self.claimant_status {
            let index = choice_index("Étudiant(e) ou employé(e)", status, &["employé(e)", "étudiant(e)"])?;
            values.insert("Group2".to_string(), FieldValue::Integer(index));
        }

        if let Some(method) = &self.payment_method {
            let index = choice_index("Chèque ou dépôt", method, &["dépôt", "chèque"])?;
            values.insert("Group4".to_string(), FieldValue::Integer(index));
        }

        insert_optional(&mut values, "KM", "Distance", &self.distance)?;

        Ok(values)
    }
}

impl TravelReasons {
    fn add_field_values(&self, values: &mut FieldValues) -> Result<()> {
        if let Some(presentation) = &self.presentation {
            if presentation.checked == Some(true) {
                values.insert("Boite1".to_string(), FieldValue::name(CHECKBOX_YES));
            }
            insert_optional(values, "Présentation", "Sujet", &presentation.subject)?;
        }

        if let Some(conference) = &self.conference {
            if conference.checked == Some(true) {
                values.insert("Boite2".to_string(), FieldValue::name(CHECKBOX_YES));
            }
            insert_optional(values, "Conférence", "Nom", &conference.name)?;
        }

        if self.sabbatical == Some(true) {
            values.insert("Boite3".to_string(), FieldValue::name(CHECKBOX_YES));
        }

        if let Some(others) = &self.others {
            if others.checked == Some(true) {
                values.insert("Boite4".to_string(), FieldValue::name(CHECKBOX_YES));
            }
            insert_optional(values, "Autres", "Précision", &others.details)?;
        }

        Ok(())
    }
}

/// Position of `value` among `choices`, ignoring case
fn choice_index(key: &str, value: &str, choices: &[&str]) -> Result<i64> {
    let value_lower = value.to_lowercase();

    choices
        .iter()
        .position(|choice| *choice == value_lower)
        .map(|position| position as i64)
        .ok_or_else(|| Error::UnexpectedSettingValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn insert_optional(values: &mut FieldValues, field: &str, key: &str, value: &Option<Value>) -> Result<()> {
    match value {
        Some(value) => insert_scalar(values, field, key, value),
        None => Ok(()),
    }
}

/// Insert a YAML scalar under `field`; `key` names it in error messages
fn insert_scalar(values: &mut FieldValues, field: &str, key: &str, value: &Value) -> Result<()> {
    let value = match value {
        Value::Null => return Ok(()),
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Integer(i),
            None => FieldValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Tagged(tagged) => return insert_scalar(values, field, key, &tagged.value),
        other => {
            return Err(Error::UnexpectedSettingValue {
                key: key.to_string(),
                value: format!("{:?}", other),
            })
        }
    };

    values.insert(field.to_string(), value);
    Ok(())
}

/// Render field values as `name: value` lines, optionally with their type
pub fn format_field_values(values: &FieldValues, with_types: bool) -> Vec<String> {
    values
        .iter()
        .map(|(name, value)| {
            if with_types {
                format!("{}: {} <{}>", name, value, value.type_name())
            } else {
                format!("{}: {}", name, value)
            }
        })
        .collect()
}
