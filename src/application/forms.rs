//! Lead-capture form handling.
//!
//! Validates and normalizes a book-a-call submission, then persists it
//! through the submission sink. Error surfaces are translation keys; the
//! translation-string provider lives outside this crate.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;
use uuid::Uuid;

use crate::application::repos::{NewSubmission, RepoError, SubmissionSink};

const SUBMISSION_KIND: &str = "book-call";

/// Raw form values as submitted by the client.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BookCallForm {
    pub full_name: String,
    pub email: String,
    pub company_name: String,
    pub phone_country_code: String,
    pub phone_number: String,
    pub preferred_date: String,
    pub privacy_consent: bool,
}

/// A per-field validation failure, as a translation key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    Accepted { id: Uuid },
    Invalid { field_errors: Vec<FieldError> },
}

pub struct BookCallService {
    sink: Arc<dyn SubmissionSink>,
}

impl BookCallService {
    pub fn new(sink: Arc<dyn SubmissionSink>) -> Self {
        Self { sink }
    }

    /// Validate and persist a submission. Rate limiting happens at the
    /// handler, before this is called.
    pub async fn submit(&self, form: &BookCallForm) -> Result<SubmissionOutcome, RepoError> {
        let submission = match validate(form) {
            Ok(submission) => submission,
            Err(field_errors) => return Ok(SubmissionOutcome::Invalid { field_errors }),
        };

        let id = self.sink.create_submission(submission).await?;
        Ok(SubmissionOutcome::Accepted { id })
    }
}

fn validate(form: &BookCallForm) -> Result<NewSubmission, Vec<FieldError>> {
    let mut errors = Vec::new();

    let full_name = form.full_name.trim();
    if full_name.len() < 2 {
        errors.push(FieldError::new("fullName", "errors.fullNameRequired"));
    }

    let email = form.email.trim().to_lowercase();
    if !is_plausible_email(&email) {
        errors.push(FieldError::new("email", "errors.invalidEmail"));
    }

    let company_name = form.company_name.trim();
    if company_name.is_empty() {
        errors.push(FieldError::new("companyName", "errors.companyNameRequired"));
    }

    let phone_country_code = form.phone_country_code.trim();
    if !is_country_code(phone_country_code) {
        errors.push(FieldError::new(
            "phoneCountryCode",
            "errors.invalidPhoneCountryCode",
        ));
    }

    let phone_number = form.phone_number.trim();
    if !is_phone_number(phone_number) {
        errors.push(FieldError::new("phoneNumber", "errors.invalidPhoneNumber"));
    }

    let date_format = format_description!("[year]-[month]-[day]");
    let preferred_date = Date::parse(form.preferred_date.trim(), &date_format).ok();
    if preferred_date.is_none() {
        errors.push(FieldError::new(
            "preferredDate",
            "errors.invalidPreferredDate",
        ));
    }

    if !form.privacy_consent {
        errors.push(FieldError::new(
            "privacyConsent",
            "errors.privacyConsentRequired",
        ));
    }

    match preferred_date {
        Some(preferred_date) if errors.is_empty() => Ok(NewSubmission {
            kind: SUBMISSION_KIND,
            full_name: full_name.to_string(),
            email,
            company_name: company_name.to_string(),
            phone_country_code: phone_country_code.to_string(),
            phone_number: phone_number.to_string(),
            preferred_date,
            privacy_consent: form.privacy_consent,
        }),
        _ => Err(errors),
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn is_country_code(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('+') else {
        return false;
    };
    !digits.is_empty() && digits.len() <= 3 && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_phone_number(value: &str) -> bool {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    digits >= 5
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
}
