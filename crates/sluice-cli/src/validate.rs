//! Intake checks run on a submission before anything is stored.
//!
//! Fields are checked in the order the intake form shows them, and only the
//! first problem is reported.

use crate::output::CliError;
use sluice_core::model::ComplaintInput;
use std::fmt;

pub const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Location,
    Name,
    Email,
    Phone,
}

impl Field {
    const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Location => "location",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    const fn flag(self) -> &'static str {
        match self {
            Self::Title => "--title",
            Self::Description => "--description",
            Self::Location => "--address",
            Self::Name => "--name",
            Self::Email => "--email",
            Self::Phone => "--phone",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    Blank,
    TooLong { max: usize },
    ControlCharacters,
    NotAnEmail,
    NoLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: Field,
    pub problem: Problem,
}

impl ValidationError {
    const fn new(field: Field, problem: Problem) -> Self {
        Self { field, problem }
    }

    /// Stable code for scripts, e.g. `invalid_email` or `missing_location`.
    pub const fn code(&self) -> &'static str {
        match (&self.problem, self.field) {
            (Problem::NoLocation, _) => "missing_location",
            (_, Field::Title) => "invalid_title",
            (_, Field::Description) => "invalid_description",
            (_, Field::Location) => "invalid_location",
            (_, Field::Name) => "invalid_name",
            (_, Field::Email) => "invalid_email",
            (_, Field::Phone) => "invalid_phone",
        }
    }

    fn suggestion(&self) -> String {
        match &self.problem {
            Problem::Blank => format!("provide a non-empty {}", self.field.flag()),
            Problem::TooLong { .. } => format!("shorten the {}", self.field.name()),
            Problem::ControlCharacters => {
                format!("remove control characters from the {}", self.field.name())
            }
            Problem::NotAnEmail => "use an address like name@example.org".to_string(),
            Problem::NoLocation => "pass --address, or both --lat and --lon".to_string(),
        }
    }

    pub fn to_cli_error(&self) -> CliError {
        CliError::new(self.to_string())
            .with_suggestion(self.suggestion())
            .with_code(self.code())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field.name();
        match &self.problem {
            Problem::Blank => write!(f, "{field} must not be empty"),
            Problem::TooLong { max } => write!(f, "{field} must be at most {max} characters"),
            Problem::ControlCharacters => write!(f, "{field} must not contain control characters"),
            Problem::NotAnEmail => write!(f, "{field} is not a valid email address"),
            Problem::NoLocation => f.write_str("an address or coordinates are required"),
        }
    }
}

/// Check a submission, returning the first problem found.
pub fn validate_submission(input: &ComplaintInput) -> Result<(), ValidationError> {
    validate_title(&input.title)?;
    non_blank(Field::Description, &input.description)?;
    if input.location.is_empty() {
        return Err(ValidationError::new(Field::Location, Problem::NoLocation));
    }
    let contact = &input.contact_details;
    non_blank(Field::Name, &contact.name)?;
    validate_email(&contact.email)?;
    non_blank(Field::Phone, &contact.phone)
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    non_blank(Field::Title, title)?;
    let problem = if title.chars().count() > MAX_TITLE_LEN {
        Problem::TooLong { max: MAX_TITLE_LEN }
    } else if title.chars().any(char::is_control) {
        Problem::ControlCharacters
    } else {
        return Ok(());
    };
    Err(ValidationError::new(Field::Title, problem))
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    non_blank(Field::Email, email)?;
    if looks_like_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new(Field::Email, Problem::NotAnEmail))
    }
}

fn non_blank(field: Field, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(field, Problem::Blank))
    } else {
        Ok(())
    }
}

/// Some run of non-space characters shaped like `a@b.c`.
fn looks_like_email(s: &str) -> bool {
    s.split_whitespace().any(|token| {
        token.char_indices().any(|(at, c)| {
            if c != '@' || at == 0 {
                return false;
            }
            let domain = &token[at + 1..];
            domain
                .char_indices()
                .any(|(dot, d)| d == '.' && dot > 0 && dot + 1 < domain.len())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::model::{Category, ContactDetails, Coordinates, Location, Severity};

    fn input() -> ComplaintInput {
        ComplaintInput {
            title: "Leaking hydrant".to_string(),
            description: "Hydrant on the corner has been dripping for days".to_string(),
            category: Category::Leak,
            severity: Severity::Medium,
            location: Location::new(Some("Corner of 3rd and Vine".to_string()), None),
            images: Vec::new(),
            contact_details: ContactDetails {
                name: "Sam Okafor".to_string(),
                email: "sam@example.org".to_string(),
                phone: "+15550123".to_string(),
            },
        }
    }

    #[test]
    fn valid_submission_passes() {
        assert!(validate_submission(&input()).is_ok());
    }

    #[test]
    fn coordinates_alone_satisfy_location() {
        let mut input = input();
        input.location = Location::new(
            None,
            Some(Coordinates {
                latitude: 51.5,
                longitude: -0.12,
            }),
        );
        assert!(validate_submission(&input).is_ok());
    }

    #[test]
    fn missing_location_is_rejected() {
        let mut input = input();
        input.location = Location::new(Some("   ".to_string()), None);
        let err = validate_submission(&input).unwrap_err();
        assert_eq!(err.code(), "missing_location");
    }

    #[test]
    fn blank_fields_are_rejected_in_form_order() {
        let mut input = input();
        input.description = " ".to_string();
        input.contact_details.phone = String::new();
        let err = validate_submission(&input).unwrap_err();
        assert_eq!(err.field, Field::Description);
        assert_eq!(err.problem, Problem::Blank);
    }

    #[test]
    fn long_title_is_rejected() {
        let err = validate_title(&"x".repeat(MAX_TITLE_LEN + 1)).unwrap_err();
        assert_eq!(err.problem, Problem::TooLong { max: MAX_TITLE_LEN });
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN)).is_ok());
    }

    #[test]
    fn title_with_newline_is_rejected() {
        let err = validate_title("Leak\non Main St").unwrap_err();
        assert_eq!(err.problem, Problem::ControlCharacters);
    }

    #[test]
    fn email_shape() {
        for ok in ["a@b.co", "first.last@sub.example.org", "x y@z.io"] {
            assert!(looks_like_email(ok), "{ok} should pass");
        }
        for bad in ["plain", "@b.co", "a@.co", "a@b.", "a@b", "a @b.co"] {
            assert!(!looks_like_email(bad), "{bad} should fail");
        }
    }

    #[test]
    fn cli_error_carries_code_and_suggestion() {
        let err = validate_email("nope").unwrap_err().to_cli_error();
        assert_eq!(err.message, "email is not a valid email address");
        assert_eq!(err.error_code.as_deref(), Some("invalid_email"));
        assert_eq!(
            err.suggestion.as_deref(),
            Some("use an address like name@example.org")
        );
    }
}
