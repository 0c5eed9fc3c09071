//! Form models and client-side validation
//!
//! Every form collects all field errors at once so a page can show them
//! together. Validation never touches the network.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::TransactionMethod;

const DEFAULT_COUNTRY_CODE: &str = "+1";

/// Special characters counted by the password checklist
const PASSWORD_SPECIALS: &[char] = &['!', '@', '#', '$', '%', '^', '&', '*'];

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{7,15}$").expect("valid phone regex"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn country_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+[0-9]{1,4}$").expect("valid country code regex"))
}

fn full_phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+[0-9]{1,4}-[0-9]{5,15}$").expect("valid phone regex"))
}

/// Form field identifiers, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    CountryCode,
    Phone,
    Email,
    Password,
    Receiver,
    Amount,
    Method,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::CountryCode => "countryCode",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::Password => "password",
            Field::Receiver => "receiver",
            Field::Amount => "amount",
            Field::Method => "method",
        }
    }
}

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first message for a field wins
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, msg)| format!("{}: {}", field.as_str(), msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn validate_country_code(code: &str, errors: &mut FieldErrors) {
    if !country_code_re().is_match(code) {
        errors.insert(Field::CountryCode, "Invalid country code (e.g. +1, +91)");
    }
}

/// Account creation form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub country_code: String,
    pub phone_number: String,
    pub password: String,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            phone_number: String::new(),
            password: String::new(),
        }
    }
}

impl RegistrationForm {
    /// Validate all fields, reporting every failing field
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert(Field::Name, "Name is required");
        } else if self.name.chars().count() < 3 {
            errors.insert(Field::Name, "Name must be at least 3 characters");
        }

        validate_country_code(&self.country_code, &mut errors);

        if self.phone_number.trim().is_empty() {
            errors.insert(Field::Phone, "Phone number is required");
        } else if !phone_re().is_match(&self.phone_number) {
            errors.insert(Field::Phone, "Invalid phone number (7-15 digits)");
        }

        if self.email.trim().is_empty() {
            errors.insert(Field::Email, "Email is required");
        } else if !email_re().is_match(&self.email) {
            errors.insert(Field::Email, "Invalid email address");
        }

        if self.password.is_empty() {
            errors.insert(Field::Password, "Password is required");
        } else if self.password.chars().count() < 6 {
            errors.insert(Field::Password, "Password must be at least 6 characters");
        }

        errors.into_result()
    }

    /// Phone number as the backend stores it: `<country code>-<digits>`
    pub fn full_phone(&self) -> String {
        format!("{}-{}", self.country_code, self.phone_number)
    }
}

/// Login form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub country_code: String,
    pub phone: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(
        country_code: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            phone: phone.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        validate_country_code(&self.country_code, &mut errors);

        if self.phone.trim().is_empty() {
            errors.insert(Field::Phone, "Phone number is required");
        } else if !self.phone.chars().all(|c| c.is_ascii_digit()) {
            errors.insert(Field::Phone, "Phone number must contain only digits");
        } else if self.phone.len() < 5 {
            errors.insert(Field::Phone, "Phone number must be at least 5 digits");
        }

        if self.password.is_empty() {
            errors.insert(Field::Password, "Password is required");
        } else if self.password.chars().count() < 5 {
            errors.insert(Field::Password, "Password must be at least 5 characters");
        }

        errors.into_result()
    }

    /// Login username: `<country code>-<digits>`
    pub fn username(&self) -> String {
        format!("{}-{}", self.country_code, self.phone)
    }
}

/// A transfer request that passed validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub receiver: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub transaction_method: TransactionMethod,
}

/// Transfer form, as typed by the user
#[derive(Debug, Clone, Default)]
pub struct TransferForm {
    pub receiver: String,
    pub amount: String,
    pub method: Option<TransactionMethod>,
}

impl TransferForm {
    /// Validate and parse into a request
    pub fn validate(&self) -> Result<TransferRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let receiver = self.receiver.trim();
        if receiver.is_empty() {
            errors.insert(Field::Receiver, "Receiver is required");
        } else if !full_phone_re().is_match(receiver) {
            errors.insert(
                Field::Receiver,
                "Receiver must be a phone number like +91-9876543210",
            );
        }

        let amount = match parse_amount(&self.amount) {
            Ok(a) => Some(a),
            Err(msg) => {
                errors.insert(Field::Amount, msg);
                None
            }
        };

        if self.method.is_none() {
            errors.insert(Field::Method, "Transaction method is required");
        }

        match (amount, self.method) {
            (Some(amount), Some(method)) if errors.is_empty() => Ok(TransferRequest {
                receiver: receiver.to_string(),
                amount,
                transaction_method: method,
            }),
            _ => Err(errors),
        }
    }
}

/// Parse a user-typed amount; must be a positive number
pub fn parse_amount(raw: &str) -> Result<Decimal, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Amount is required");
    }
    match Decimal::from_str(raw) {
        Ok(amount) if amount > Decimal::ZERO => Ok(amount),
        Ok(_) => Err("Amount must be greater than zero"),
        Err(_) => Err("Amount must be a number"),
    }
}

/// One line of the password strength checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordRequirement {
    pub label: &'static str,
    pub fulfilled: bool,
}

/// Password strength checklist shown while creating an account
///
/// Only the length rule is enforced by `RegistrationForm::validate`.
pub fn password_checklist(password: &str) -> Vec<PasswordRequirement> {
    vec![
        PasswordRequirement {
            label: "At least 6 characters",
            fulfilled: password.chars().count() >= 6,
        },
        PasswordRequirement {
            label: "Contains a number",
            fulfilled: password.chars().any(|c| c.is_ascii_digit()),
        },
        PasswordRequirement {
            label: "Contains a special character",
            fulfilled: password.chars().any(|c| PASSWORD_SPECIALS.contains(&c)),
        },
    ]
}
