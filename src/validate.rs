//! Field rules and normalization for registration requests.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{NewStudent, RegistrationPayload};
use crate::Error;

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

/// Characters stripped from both ends of a field: ASCII whitespace, NUL and
/// vertical tab. Other Unicode spacing such as U+00A0 is kept.
const TRIMMED: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

fn trim(value: &str) -> &str {
    value.trim_matches(TRIMMED)
}

lazy_static! {
    static ref EMAIL: Regex = Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$"
    )
    .expect("email pattern compiles");
    static ref ENTITY: Regex =
        Regex::new(r"^&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);")
            .expect("entity pattern compiles");
}

pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN {
        return false;
    }
    match email.split_once('@') {
        Some((local, _)) if local.len() <= MAX_LOCAL_PART_LEN => EMAIL.is_match(email),
        _ => false,
    }
}

/// Escapes `& < > " '` for HTML. An `&` that already starts a character
/// reference is left alone, so escaping twice equals escaping once.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (idx, ch) in input.char_indices() {
        match ch {
            '&' if ENTITY.is_match(&input[idx..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, |value| trim(value).is_empty())
}

/// Evaluates every rule and reports all failures at once.
pub fn validate(payload: &RegistrationPayload) -> Result<(), Error> {
    let mut errors = Vec::new();

    if is_blank(&payload.student_name) {
        errors.push("Student name is required".to_string());
    }

    match payload.email.as_deref().map(trim) {
        None | Some("") => errors.push("Email address is required".to_string()),
        Some(email) if !is_valid_email(email) => {
            errors.push("Invalid email address format".to_string())
        }
        Some(_) => {}
    }

    if is_blank(&payload.course) {
        errors.push("Course selection is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::ValidationFailed {
            message: "Missing or Invalid Data".to_string(),
            errors,
        })
    }
}

/// Trims all fields, escapes the free-text ones and lower-cases the email.
pub fn sanitize(payload: RegistrationPayload) -> NewStudent {
    let RegistrationPayload {
        student_name,
        email,
        course,
    } = payload;
    NewStudent {
        student_name: escape_html(trim(&student_name.unwrap_or_default())),
        email: trim(&email.unwrap_or_default()).to_lowercase(),
        course: escape_html(trim(&course.unwrap_or_default())),
    }
}

pub fn validated(payload: RegistrationPayload) -> Result<NewStudent, Error> {
    validate(&payload)?;
    Ok(sanitize(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: Option<&str>, email: Option<&str>, course: Option<&str>) -> RegistrationPayload {
        RegistrationPayload {
            student_name: name.map(String::from),
            email: email.map(String::from),
            course: course.map(String::from),
        }
    }

    fn errors_of(payload: &RegistrationPayload) -> Vec<String> {
        match validate(payload) {
            Err(Error::ValidationFailed { errors, .. }) => errors,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn accepts_common_addresses() {
        for email in [
            "jane@ex.com",
            "JANE@EX.com",
            "first.last+tag@sub.example.org",
            "o'neil@example.ie",
        ] {
            assert!(is_valid_email(email), "{}", email);
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "plainaddress",
            "@example.com",
            "jane@",
            "jane@localhost",
            "jane..doe@example.com",
            ".jane@example.com",
            "jane@-example.com",
            "jane doe@example.com",
            "jane@@example.com",
        ] {
            assert!(!is_valid_email(email), "{}", email);
        }
        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(!is_valid_email(&long_local));
    }

    #[test]
    fn reports_every_failing_field() {
        let errors = errors_of(&payload(None, Some("not-an-email"), Some("   ")));
        assert_eq!(
            errors,
            vec![
                "Student name is required",
                "Invalid email address format",
                "Course selection is required",
            ]
        );

        let errors = errors_of(&RegistrationPayload::default());
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[1], "Email address is required");
    }

    #[test]
    fn email_is_checked_after_trimming() {
        assert!(validate(&payload(Some("Jane"), Some("  jane@ex.com "), Some("CS101"))).is_ok());
    }

    #[test]
    fn sanitize_trims_escapes_and_lowercases() {
        let clean = sanitize(payload(
            Some("  <b>Jane</b> O'Neil "),
            Some(" JANE@EX.com "),
            Some(" R&D \"101\" "),
        ));
        assert_eq!(clean.student_name, "&lt;b&gt;Jane&lt;/b&gt; O&#039;Neil");
        assert_eq!(clean.email, "jane@ex.com");
        assert_eq!(clean.course, "R&amp;D &quot;101&quot;");
    }

    #[test]
    fn only_ascii_whitespace_and_nul_are_trimmed() {
        let nbsp = "\u{a0}\u{a0}";
        assert!(validate(&payload(Some(nbsp), Some("\0jane@ex.com\x0B"), Some("\tCS101\r\n"))).is_ok());

        let clean = sanitize(payload(Some(nbsp), Some(" \0Jane@Ex.com\x0B"), Some("\tCS101\r\n")));
        assert_eq!(clean.student_name, nbsp);
        assert_eq!(clean.email, "jane@ex.com");
        assert_eq!(clean.course, "CS101");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize(payload(
            Some(" Tom & <Jerry> "),
            Some(" Tom@Example.COM"),
            Some("AT&T's \"Networks\" "),
        ));
        let twice = sanitize(payload(
            Some(&once.student_name),
            Some(&once.email),
            Some(&once.course),
        ));
        assert_eq!(once, twice);
    }

    #[test]
    fn escape_keeps_existing_references() {
        assert_eq!(escape_html("&amp; &#039; &#x41; &copy;"), "&amp; &#039; &#x41; &copy;");
        assert_eq!(escape_html("fish & chips; &"), "fish &amp; chips; &amp;");
    }
}
