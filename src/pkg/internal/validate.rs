//! Server-side re-validation of the registration form fields.
//!
//! All violations are collected and returned in one go rather than
//! failing on the first, so the client can fix the whole form at once.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use validator::ValidateEmail;

use crate::{errors::Error, prelude::Result};

/// Canonical age window. Source versions disagreed; the stricter
/// 16..=100 rule wins.
const MIN_AGE: i32 = 16;
const MAX_AGE: i32 = 100;

const MAX_OJT_HOURS: i32 = 2000;

/// Raw field values as they arrive in the multipart body, before any
/// validation. Missing fields stay empty.
#[derive(Debug, Default)]
pub struct RawSubmission {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub birthday: String,
    pub address: String,
    pub school: String,
    pub program: String,
    pub school_address: String,
    pub ojt_hours: String,
    pub days: Vec<String>,
    pub terms: Option<String>,
}

/// Sanitized, parsed form ready for persistence.
#[derive(Debug)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub birthday: NaiveDate,
    pub address: String,
    pub school: String,
    pub program: String,
    pub school_address: String,
    pub ojt_hours: i32,
    pub days: Vec<Weekday>,
    pub terms_accepted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monday" => Ok(Weekday::Monday),
            "tuesday" => Ok(Weekday::Tuesday),
            "wednesday" => Ok(Weekday::Wednesday),
            "thursday" => Ok(Weekday::Thursday),
            "friday" => Ok(Weekday::Friday),
            _ => Err(()),
        }
    }
}

pub fn validate_and_sanitize(raw: RawSubmission) -> Result<RegistrationForm> {
    let mut errors = Vec::new();

    let name = sanitize(&raw.name);
    if name.is_empty() {
        errors.push("Full Name is required".to_string());
    } else if name.chars().count() < 2 {
        errors.push("Full Name must be at least 2 characters long".to_string());
    }

    let email = raw.email.trim().to_lowercase();
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !email.validate_email() {
        errors.push("Invalid email format".to_string());
    }

    let contact = sanitize(&raw.contact);
    if contact.is_empty() {
        errors.push("Contact Number is required".to_string());
    } else if !is_valid_phone(&contact) {
        errors.push("Invalid contact number format".to_string());
    }

    let birthday = validate_birthday(&raw.birthday, &mut errors);

    let address = sanitize(&raw.address);
    if address.is_empty() {
        errors.push("Address is required".to_string());
    }

    let school = sanitize(&raw.school);
    if school.is_empty() {
        errors.push("School/University is required".to_string());
    }

    let program = sanitize(&raw.program);
    if program.is_empty() {
        errors.push("College Program is required".to_string());
    }

    let school_address = sanitize(&raw.school_address);
    if school_address.is_empty() {
        errors.push("University Address is required".to_string());
    }

    let ojt_hours = validate_ojt_hours(&raw.ojt_hours, &mut errors);
    let days = validate_days(&raw.days, &mut errors);

    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    Ok(RegistrationForm {
        name,
        email,
        contact,
        // errors is empty here, so both parses succeeded
        birthday: birthday.ok_or_else(|| Error::Validation(vec!["Birthday is required".into()]))?,
        address,
        school,
        program,
        school_address,
        ojt_hours: ojt_hours
            .ok_or_else(|| Error::Validation(vec!["OJT Hours must be greater than 0".into()]))?,
        days,
        terms_accepted: terms_accepted(raw.terms.as_deref()),
    })
}

/// Trim and HTML-escape, mirroring what the browser-facing site does to
/// user input before it is echoed back anywhere.
fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Same shape the form enforces client-side: `[0-9+\-\s()]{7,}`.
fn is_valid_phone(phone: &str) -> bool {
    phone.chars().count() >= 7
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')') || c.is_whitespace())
}

fn validate_birthday(input: &str, errors: &mut Vec<String>) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        errors.push("Birthday is required".to_string());
        return None;
    }
    match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Ok(birthday) => {
            let age = age_on(birthday, Utc::now().date_naive());
            if !(MIN_AGE..=MAX_AGE).contains(&age) {
                errors.push(format!("Age must be between {} and {} years", MIN_AGE, MAX_AGE));
                None
            } else {
                Some(birthday)
            }
        }
        Err(_) => {
            errors.push("Please enter a valid birthday".to_string());
            None
        }
    }
}

fn age_on(birthday: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birthday.year();
    if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
        age -= 1;
    }
    age
}

fn validate_ojt_hours(input: &str, errors: &mut Vec<String>) -> Option<i32> {
    let input = input.trim();
    if input.is_empty() {
        errors.push("Total OJT hours is required".to_string());
        return None;
    }
    match input.parse::<i32>() {
        Ok(hours) if hours <= 0 => {
            errors.push("OJT Hours must be greater than 0".to_string());
            None
        }
        Ok(hours) if hours > MAX_OJT_HOURS => {
            errors.push("OJT hours seems too high. Please verify.".to_string());
            None
        }
        Ok(hours) => Some(hours),
        Err(_) => {
            errors.push("OJT hours must be a valid number".to_string());
            None
        }
    }
}

fn validate_days(input: &[String], errors: &mut Vec<String>) -> Vec<Weekday> {
    if input.is_empty() {
        errors.push("At least one available day is required".to_string());
        return Vec::new();
    }
    let mut days: Vec<Weekday> = Vec::new();
    let mut invalid = false;
    for value in input {
        match value.parse::<Weekday>() {
            Ok(day) => {
                if !days.contains(&day) {
                    days.push(day);
                }
            }
            Err(_) => invalid = true,
        }
    }
    if invalid || days.is_empty() {
        errors.push("Please select valid available days".to_string());
    }
    days
}

fn terms_accepted(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("on" | "true" | "1" | "yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_raw() -> RawSubmission {
        RawSubmission {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            contact: "09171234567".into(),
            birthday: "2000-01-01".into(),
            address: "123 Sample St, Quezon City".into(),
            school: "Sample University".into(),
            program: "Computer Engineering".into(),
            school_address: "456 Campus Ave, Manila".into(),
            ojt_hours: "500".into(),
            days: vec!["monday".into(), "wednesday".into()],
            terms: Some("on".into()),
        }
    }

    #[test]
    fn accepts_a_complete_submission() {
        let form = validate_and_sanitize(valid_raw()).unwrap();
        assert_eq!(form.email, "jane@example.com");
        assert_eq!(form.ojt_hours, 500);
        assert_eq!(form.days, vec![Weekday::Monday, Weekday::Wednesday]);
        assert!(form.terms_accepted);
    }

    #[test]
    fn collects_every_violation() {
        let raw = RawSubmission {
            email: "not-an-email".into(),
            ojt_hours: "0".into(),
            ..Default::default()
        };
        let err = validate_and_sanitize(raw).unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert!(errors.contains(&"Full Name is required".to_string()));
                assert!(errors.contains(&"Invalid email format".to_string()));
                assert!(errors.contains(&"Contact Number is required".to_string()));
                assert!(errors.contains(&"Birthday is required".to_string()));
                assert!(errors.contains(&"OJT Hours must be greater than 0".to_string()));
                assert!(errors.contains(&"At least one available day is required".to_string()));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_underage_applicants() {
        let today = Utc::now().date_naive();
        let mut raw = valid_raw();
        raw.birthday = format!("{}-01-01", today.year() - 10);
        let err = validate_and_sanitize(raw).unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert!(errors.iter().any(|e| e.contains("Age must be between")));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_ojt_hours_above_cap() {
        let mut raw = valid_raw();
        raw.ojt_hours = "2500".into();
        assert!(validate_and_sanitize(raw).is_err());
    }

    #[test]
    fn rejects_weekend_days() {
        let mut raw = valid_raw();
        raw.days = vec!["saturday".into()];
        let err = validate_and_sanitize(raw).unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert!(errors.contains(&"Please select valid available days".to_string()));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn drops_duplicate_days() {
        let mut raw = valid_raw();
        raw.days = vec!["friday".into(), "Friday".into(), "monday".into()];
        let form = validate_and_sanitize(raw).unwrap();
        assert_eq!(form.days, vec![Weekday::Friday, Weekday::Monday]);
    }

    #[test]
    fn escapes_markup_in_fields() {
        let mut raw = valid_raw();
        raw.name = "  <b>Jane</b> ".into();
        let form = validate_and_sanitize(raw).unwrap();
        assert_eq!(form.name, "&lt;b&gt;Jane&lt;/b&gt;");
    }

    #[test]
    fn phone_shape_check() {
        assert!(is_valid_phone("+63 (917) 123-4567"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("0917abc4567"));
    }

    #[test]
    fn age_counts_birthdays_not_years() {
        let birthday = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        assert_eq!(age_on(birthday, NaiveDate::from_ymd_opt(2016, 6, 14).unwrap()), 15);
        assert_eq!(age_on(birthday, NaiveDate::from_ymd_opt(2016, 6, 15).unwrap()), 16);
    }
}
