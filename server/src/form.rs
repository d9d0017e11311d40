//! Submission form lifecycle.
//!
//! `Closed -> Open -> Submitting`, then back to `Open` on failure with the
//! fields kept for retry, or to `Closed` on success and on cancel with the
//! fields reset. Validation runs before anything goes upstream.

use serde::{Deserialize, Serialize};
use store::NewPlace;

use crate::error::AppError;

/// Selectable categories for a submission. A superset of the colored
/// categories on purpose; uncolored ones render gray.
pub const CATEGORY_OPTIONS: [&str; 8] = [
    "餐廳",
    "咖啡廳",
    "狗狗公園",
    "室外空間",
    "寵物旅館",
    "寵物醫院",
    "寵物美容",
    "其他",
];

pub const DEFAULT_CATEGORY: &str = "餐廳";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionFields {
    pub name: String,
    pub category: String,
    pub address: String,
}

impl Default for SubmissionFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            address: String::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SubmissionForm {
    state: FormState,
    fields: SubmissionFields,
}

impl SubmissionForm {
    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn fields(&self) -> &SubmissionFields {
        &self.fields
    }

    pub fn open(&mut self) {
        if self.state == FormState::Closed {
            self.state = FormState::Open;
        }
    }

    pub fn cancel(&mut self) {
        if self.state == FormState::Open {
            self.state = FormState::Closed;
            self.fields = SubmissionFields::default();
        }
    }

    pub fn fill(&mut self, fields: SubmissionFields) {
        if self.state == FormState::Open {
            self.fields = fields;
        }
    }

    /// Validates the current fields and moves to `Submitting`. Nothing goes
    /// upstream unless this succeeds.
    pub fn begin_submit(&mut self, signed_in: bool) -> Result<NewPlace, AppError> {
        if self.state != FormState::Open {
            return Err(AppError::Validation("form is not open".to_string()));
        }
        if !signed_in {
            return Err(AppError::Validation("sign in before submitting".to_string()));
        }

        let name = self.fields.name.trim();
        let address = self.fields.address.trim();
        if name.is_empty() || address.is_empty() {
            return Err(AppError::Validation("name and address are required".to_string()));
        }
        if !CATEGORY_OPTIONS.contains(&self.fields.category.as_str()) {
            return Err(AppError::Validation(format!(
                "unknown category: {}",
                self.fields.category
            )));
        }

        self.state = FormState::Submitting;

        Ok(NewPlace {
            name: name.to_string(),
            category: self.fields.category.clone(),
            address: address.to_string(),
        })
    }

    /// Resolves the in-flight submission: reset and close on success, back
    /// to `Open` with the fields kept on failure.
    pub fn complete(&mut self, success: bool) {
        if self.state != FormState::Submitting {
            return;
        }

        if success {
            self.state = FormState::Closed;
            self.fields = SubmissionFields::default();
        } else {
            self.state = FormState::Open;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> SubmissionForm {
        let mut form = SubmissionForm::default();
        form.open();
        form.fill(SubmissionFields {
            name: "路易莎咖啡".to_string(),
            category: "咖啡廳".to_string(),
            address: "台北市".to_string(),
        });
        form
    }

    #[test]
    fn starts_closed_with_default_fields() {
        let form = SubmissionForm::default();

        assert_eq!(form.state(), FormState::Closed);
        assert_eq!(form.fields().name, "");
        assert_eq!(form.fields().category, "餐廳");
        assert_eq!(form.fields().address, "");
    }

    #[test]
    fn submitting_without_a_session_is_rejected() {
        let mut form = filled_form();

        let err = form.begin_submit(false).unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(form.state(), FormState::Open);
    }

    #[test]
    fn empty_required_fields_are_rejected() {
        let mut form = SubmissionForm::default();
        form.open();
        form.fill(SubmissionFields {
            name: "   ".to_string(),
            category: "餐廳".to_string(),
            address: "台北市".to_string(),
        });

        assert!(form.begin_submit(true).is_err());
        assert_eq!(form.state(), FormState::Open);
    }

    #[test]
    fn categories_outside_the_option_list_are_rejected() {
        let mut form = SubmissionForm::default();
        form.open();
        form.fill(SubmissionFields {
            name: "somewhere".to_string(),
            category: "水族館".to_string(),
            address: "台北市".to_string(),
        });

        assert!(form.begin_submit(true).is_err());
    }

    #[test]
    fn successful_submission_resets_and_closes() {
        let mut form = filled_form();

        let submission = form.begin_submit(true).unwrap();
        assert_eq!(form.state(), FormState::Submitting);
        assert_eq!(submission.name, "路易莎咖啡");

        form.complete(true);

        assert_eq!(form.state(), FormState::Closed);
        assert_eq!(form.fields(), &SubmissionFields::default());
    }

    #[test]
    fn failed_submission_reopens_with_fields_kept() {
        let mut form = filled_form();
        form.begin_submit(true).unwrap();

        form.complete(false);

        assert_eq!(form.state(), FormState::Open);
        assert_eq!(form.fields().name, "路易莎咖啡");
    }

    #[test]
    fn cancel_closes_and_resets() {
        let mut form = filled_form();

        form.cancel();

        assert_eq!(form.state(), FormState::Closed);
        assert_eq!(form.fields(), &SubmissionFields::default());
    }
}
