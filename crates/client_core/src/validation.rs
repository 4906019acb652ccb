use std::{collections::HashSet, fmt};

use validator::{Validate, ValidateEmail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    Phone,
    Message,
}

impl ContactField {
    pub fn as_str(self) -> &'static str {
        match self {
            ContactField::FirstName => "first_name",
            ContactField::LastName => "last_name",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Message => "message",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ContactDetails {
    #[validate(length(min = 2))]
    pub first_name: String,
    #[validate(length(min = 2))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 10))]
    pub phone: String,
    pub message: String,
}

impl ContactDetails {
    pub fn set(&mut self, field: ContactField, value: String) {
        match field {
            ContactField::FirstName => self.first_name = value,
            ContactField::LastName => self.last_name = value,
            ContactField::Email => self.email = value,
            ContactField::Phone => self.phone = value,
            ContactField::Message => self.message = value,
        }
    }

    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::FirstName => &self.first_name,
            ContactField::LastName => &self.last_name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Message => &self.message,
        }
    }

    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    /// Trimmed message, `None` when blank.
    pub fn notes(&self) -> Option<String> {
        let message = self.message.trim();
        (!message.is_empty()).then(|| message.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: ContactField,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl FieldError {
    fn for_field(field: ContactField) -> Self {
        let message = match field {
            ContactField::FirstName | ContactField::LastName => "must be at least 2 characters",
            ContactField::Email => "must be a valid email address",
            ContactField::Phone => "must be at least 10 characters",
            ContactField::Message => "is invalid",
        };
        Self { field, message }
    }
}

const REQUIRED_FIELDS: [ContactField; 4] = [
    ContactField::FirstName,
    ContactField::LastName,
    ContactField::Email,
    ContactField::Phone,
];

/// Checks every required field on the trimmed values and reports all failures at once.
pub fn validate_contact(contact: &ContactDetails) -> Result<(), Vec<FieldError>> {
    let contact = contact.trimmed();
    let failed: HashSet<String> = match contact.validate() {
        Ok(()) => HashSet::new(),
        Err(failures) => failures
            .field_errors()
            .into_keys()
            .map(|field| field.to_string())
            .collect(),
    };

    let errors: Vec<FieldError> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| {
            failed.contains(field.as_str())
                || (*field == ContactField::Email && !has_domain_suffix(&contact.email))
        })
        .map(FieldError::for_field)
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Email syntax check, additionally requiring a dotted domain (`a@b` is rejected).
pub fn is_valid_email(email: &str) -> bool {
    email.to_owned().validate_email() && has_domain_suffix(email)
}

fn has_domain_suffix(email: &str) -> bool {
    email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_contact() -> ContactDetails {
        ContactDetails {
            first_name: "Anna".into(),
            last_name: "Peeters".into(),
            email: "anna@example.be".into(),
            phone: "0470123456".into(),
            message: String::new(),
        }
    }

    #[test]
    fn accepts_complete_contact() {
        assert_eq!(validate_contact(&valid_contact()), Ok(()));
    }

    #[test]
    fn reports_every_failing_field() {
        let contact = ContactDetails {
            first_name: "A".into(),
            last_name: " ".into(),
            email: "anna.example.be".into(),
            phone: "04701".into(),
            message: "hi".into(),
        };
        let errors = validate_contact(&contact).expect_err("invalid contact");
        let fields: Vec<_> = errors.iter().map(|err| err.field).collect();
        assert_eq!(
            fields,
            vec![
                ContactField::FirstName,
                ContactField::LastName,
                ContactField::Email,
                ContactField::Phone
            ]
        );
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@salon.example.nl"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@.com"));
    }

    #[test]
    fn malformed_domains_are_rejected() {
        for email in ["a@b..c.com", "a@b_c.com", "a@<x>.com", "a@b,c.com", ".@-.co"] {
            assert!(!is_valid_email(email), "{email}");
        }

        let mut contact = valid_contact();
        contact.email = "anna@salon..be".into();
        let errors = validate_contact(&contact).expect_err("invalid email");
        assert_eq!(errors, vec![FieldError::for_field(ContactField::Email)]);
    }

    #[test]
    fn lengths_are_checked_after_trimming() {
        let mut contact = valid_contact();
        contact.first_name = "  Al  ".into();
        contact.phone = " 0470 123 ".into();
        let errors = validate_contact(&contact).expect_err("short phone");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, ContactField::Phone);
        assert_eq!(errors[0].message, "must be at least 10 characters");
    }

    #[test]
    fn blank_message_is_no_notes() {
        let mut contact = valid_contact();
        contact.message = "   ".into();
        assert_eq!(contact.notes(), None);
        contact.set(ContactField::Message, " short fringe please ".into());
        assert_eq!(contact.notes().as_deref(), Some("short fringe please"));
    }
}
