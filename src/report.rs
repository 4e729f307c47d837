//! The ÉTS club expense report
//!
//! Knows the report template's radio button groups and the totals the report
//! computes from the amounts of a field setting, and ties the pieces together
//! into a single fill operation.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::form::{update_page_fields, FieldValue, FieldValues, RadioGroupRegistry};
use crate::paths::check_input_path;
use crate::pdf::document::{load_document, page_ids, save_document, set_fields_read_only, set_need_appearances};
use crate::setting::read_field_setting;

/// Template used when none is given
pub const DEFAULT_TEMPLATE: &str = "rapport_depenses.pdf";

const ADVANCE_FIELD: &str = "Avance";
const CLAIM_FIELD: &str = "Réclamation$";
const AMOUNT_FIELD: &str = "Montant$";
const AMOUNT_TOTAL_FIELD: &str = "TotalMontant";
const CC_AMOUNT_FIELD: &str = "ccMontant$";
const CC_AMOUNT_TOTAL_FIELD: &str = "TotalccMontant$";

/// Lines in the expense table
const EXPENSE_LINES: usize = 8;
/// Lines in the accounting code table
const ACCOUNTING_LINES: usize = 5;

/// Radio button groups of the report template
///
/// - `Group1`: reason for the expenses (trip, other)
/// - `Group2`: claimant (employee, student)
/// - `Group4`: payment method (deposit, cheque)
pub fn expense_report_groups() -> Result<Vec<RadioGroupRegistry>> {
    Ok(vec![
        RadioGroupRegistry::new("Group1", ["Choix1", "Choix2"])?,
        RadioGroupRegistry::new("Group2", ["Choix1", "Choix2"])?,
        RadioGroupRegistry::new("Group4", ["Dépôt", "Chèque"])?,
    ])
}

/// Running sum that stays a whole number until a decimal amount shows up
#[derive(Debug, Clone, Copy, Default)]
struct Amount {
    cents: i64,
    decimal: bool,
}

impl Amount {
    fn of(field: &str, value: Option<&FieldValue>) -> Result<Self> {
        let value = match value {
            Some(value) => value,
            None => return Ok(Self::default()),
        };
        let unexpected = || Error::UnexpectedSettingValue {
            key: field.to_string(),
            value: value.to_string(),
        };

        match value {
            FieldValue::Integer(n) => n
                .checked_mul(100)
                .map(|cents| Self { cents, decimal: false })
                .ok_or_else(unexpected),
            FieldValue::Real(x) => {
                let cents = (x * 100.0).round();
                // `as` saturates, so out of range amounts are rejected first
                if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
                    return Err(unexpected());
                }
                Ok(Self { cents: cents as i64, decimal: true })
            }
            _ => Err(unexpected()),
        }
    }

    fn add(self, other: Self, field: &str) -> Result<Self> {
        let cents = self.cents.checked_add(other.cents).ok_or_else(|| overflow(field))?;
        Ok(Self { cents, decimal: self.decimal || other.decimal })
    }

    fn sub(self, other: Self, field: &str) -> Result<Self> {
        let cents = self.cents.checked_sub(other.cents).ok_or_else(|| overflow(field))?;
        Ok(Self { cents, decimal: self.decimal || other.decimal })
    }

    fn to_value(self) -> FieldValue {
        if self.decimal {
            FieldValue::Real(self.cents as f64 / 100.0)
        } else {
            FieldValue::Integer(self.cents / 100)
        }
    }
}

fn overflow(field: &str) -> Error {
    Error::General(format!("{} is too large to compute", field))
}

/// Sum of `<prefix>1` to `<prefix><lines>`
fn sum_lines(values: &FieldValues, prefix: &str, lines: usize) -> Result<Amount> {
    let mut total = Amount::default();
    for i in 1..=lines {
        let field = format!("{}{}", prefix, i);
        total = total.add(Amount::of(&field, values.get(&field))?, prefix)?;
    }
    Ok(total)
}

/// Add the values the report derives from the amounts
///
/// - `TotalMontant`: sum of the expense amounts, when positive
/// - `Réclamation$`: `TotalMontant` minus `Avance`
/// - `TotalccMontant$`: sum of the accounting code amounts, when positive
pub fn set_automatic_values(values: &mut FieldValues) -> Result<()> {
    let total = sum_lines(values, AMOUNT_FIELD, EXPENSE_LINES)?;
    if total.cents > 0 {
        values.insert(AMOUNT_TOTAL_FIELD.to_string(), total.to_value());
    }

    let total = Amount::of(AMOUNT_TOTAL_FIELD, values.get(AMOUNT_TOTAL_FIELD))?;
    let advance = Amount::of(ADVANCE_FIELD, values.get(ADVANCE_FIELD))?;
    values.insert(CLAIM_FIELD.to_string(), total.sub(advance, CLAIM_FIELD)?.to_value());

    let cc_total = sum_lines(values, CC_AMOUNT_FIELD, ACCOUNTING_LINES)?;
    if cc_total.cents > 0 {
        values.insert(CC_AMOUNT_TOTAL_FIELD.to_string(), cc_total.to_value());
    }

    Ok(())
}

/// Options for filling an expense report
#[derive(Debug, Clone)]
pub struct FillOptions {
    /// Report template, left unmodified
    pub template: PathBuf,
    /// YAML field setting file
    pub setting: PathBuf,
    /// Filled report to create
    pub output: PathBuf,
    /// Keep the filled fields editable
    pub editable: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            template: PathBuf::from(DEFAULT_TEMPLATE),
            setting: PathBuf::new(),
            output: PathBuf::new(),
            editable: false,
        }
    }
}

/// Fill a copy of the report template with the values of a field setting
///
/// # Example
///
/// ```no_run
/// use expense_report_filler::report::{fill_report, FillOptions};
/// use std::path::PathBuf;
///
/// let options = FillOptions {
///     setting: PathBuf::from("voyage.yml"),
///     output: PathBuf::from("rapport_rempli.pdf"),
///     ..Default::default()
/// };
///
/// fill_report(&options).expect("Failed to fill the report");
/// ```
pub fn fill_report(options: &FillOptions) -> Result<FieldValues> {
    check_input_path(&options.template, &[".pdf"])?;

    let setting = read_field_setting(&options.setting)?;
    let mut values = setting.to_field_values()?;
    set_automatic_values(&mut values)?;

    let groups = expense_report_groups()?;
    let mut doc = load_document(&options.template)?;

    for page_id in page_ids(&doc) {
        update_page_fields(&mut doc, page_id, &values, &groups)?;
    }

    if !options.editable {
        set_fields_read_only(&mut doc)?;
    }

    // Field values stay invisible in most viewers without this
    set_need_appearances(&mut doc, true)?;
    save_document(&mut doc, &options.output)?;
    log::info!("Filled {} with {} values", options.output.display(), values.len());

    Ok(values)
}
