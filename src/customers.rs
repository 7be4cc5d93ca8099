//! Customers
//!
//! Contact and payment details submitted with a checkout, validated before
//! the catalog or storage is touched.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a customer name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a delivery address.
pub const MAX_ADDRESS_LEN: usize = 500;

/// Maximum length of a payment transaction id.
pub const MAX_TRANSACTION_ID_LEN: usize = 50;

/// A single failing input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Request path of the field, e.g. `customer.phone`.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

/// Every input field that failed validation.
#[derive(Debug, Error, Clone, Default, PartialEq, Eq, Serialize)]
#[error("invalid input: {}", self.summary())]
pub struct ValidationErrors {
    /// Failures in the order they were found.
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// No failures yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failing field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Whether nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether `field` has been recorded.
    pub fn contains(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Why a phone number was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("must be a Bangladeshi mobile number like 01712345678")]
pub struct InvalidPhoneNumber;

/// A Bangladeshi mobile number in its 11-digit local form (`01XXXXXXXXX`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse and normalise a phone number. Spaces and dashes are ignored and a
    /// `+880` or `880` country prefix is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPhoneNumber`] unless the result is `01[3-9]` followed
    /// by eight digits.
    pub fn parse(raw: &str) -> Result<Self, InvalidPhoneNumber> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        let digits = compact.strip_prefix('+').unwrap_or(&compact);
        let local = match digits.strip_prefix("880") {
            Some(rest) => format!("0{rest}"),
            None => digits.to_string(),
        };

        let bytes = local.as_bytes();

        let valid = bytes.len() == 11
            && bytes.iter().all(u8::is_ascii_digit)
            && bytes.starts_with(b"01")
            && bytes.get(2).is_some_and(|operator| (b'3'..=b'9').contains(operator));

        if valid {
            Ok(Self(local))
        } else {
            Err(InvalidPhoneNumber)
        }
    }

    /// The 11-digit local form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = InvalidPhoneNumber;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

/// Contact details as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustomerInfo {
    /// Recipient name.
    pub name: String,
    /// Mobile number in any accepted format.
    pub phone: String,
    /// Delivery address.
    pub address: String,
    /// Optional email for receipts.
    pub email: Option<String>,
}

/// Contact details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    /// Trimmed recipient name.
    pub name: String,
    /// Normalised mobile number.
    pub phone: PhoneNumber,
    /// Trimmed delivery address.
    pub address: String,
    /// Trimmed email, if given.
    pub email: Option<String>,
}

impl CustomerInfo {
    /// Validate into a [`Customer`], recording every failing field in
    /// `errors`.
    pub fn validate(&self, errors: &mut ValidationErrors) -> Option<Customer> {
        let name = required_text(errors, "customer.name", &self.name, MAX_NAME_LEN);
        let address = required_text(errors, "customer.address", &self.address, MAX_ADDRESS_LEN);

        let phone = PhoneNumber::parse(&self.phone)
            .inspect_err(|err| errors.push("customer.phone", err.to_string()))
            .ok();

        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => Some(None),
            Some(email) if is_plausible_email(email) => Some(Some(email.to_string())),
            Some(_) => {
                errors.push("customer.email", "must be a valid email address");
                None
            }
        };

        Some(Customer {
            name: name?,
            phone: phone?,
            address: address?,
            email: email?,
        })
    }
}

/// How the customer pays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Payment {
    /// Paid to the courier on delivery.
    CashOnDelivery,

    /// Paid up front through bKash. The reference is stored, never verified.
    Bkash {
        /// Paying bKash account.
        account_number: PhoneNumber,
        /// bKash transaction id.
        transaction_id: String,
    },
}

impl Payment {
    /// Declared method for this payment.
    pub const fn method(&self) -> PaymentMethod {
        match self {
            Self::CashOnDelivery => PaymentMethod::Cod,
            Self::Bkash { .. } => PaymentMethod::Bkash,
        }
    }
}

/// Declared payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    /// bKash mobile payment.
    Bkash,
}

impl PaymentMethod {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Bkash => "bkash",
        }
    }

    /// Parse the storage representation.
    pub fn from_storage(value: &str) -> Option<Self> {
        match value {
            "cod" => Some(Self::Cod),
            "bkash" => Some(Self::Bkash),
            _ => None,
        }
    }
}

/// Payment details as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    /// Chosen method.
    pub method: PaymentMethod,
    /// Paying account, required for bKash.
    pub bkash_number: Option<String>,
    /// Transaction id, required for bKash.
    pub bkash_transaction_id: Option<String>,
}

impl PaymentInfo {
    /// Cash on delivery.
    #[must_use]
    pub const fn cash_on_delivery() -> Self {
        Self {
            method: PaymentMethod::Cod,
            bkash_number: None,
            bkash_transaction_id: None,
        }
    }

    /// Validate into a [`Payment`], recording every failing field in
    /// `errors`.
    pub fn validate(&self, errors: &mut ValidationErrors) -> Option<Payment> {
        match self.method {
            PaymentMethod::Cod => Some(Payment::CashOnDelivery),
            PaymentMethod::Bkash => {
                let account_number = match self.bkash_number.as_deref() {
                    Some(number) => PhoneNumber::parse(number)
                        .inspect_err(|err| errors.push("payment.bkashNumber", err.to_string()))
                        .ok(),
                    None => {
                        errors.push("payment.bkashNumber", "is required for bKash payments");
                        None
                    }
                };

                let transaction_id = required_text(
                    errors,
                    "payment.bkashTransactionId",
                    self.bkash_transaction_id.as_deref().unwrap_or_default(),
                    MAX_TRANSACTION_ID_LEN,
                );

                Some(Payment::Bkash {
                    account_number: account_number?,
                    transaction_id: transaction_id?,
                })
            }
        }
    }
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    max_len: usize,
) -> Option<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        errors.push(field, "is required");
        return None;
    }

    if trimmed.chars().count() > max_len {
        errors.push(field, format!("must be at most {max_len} characters"));
        return None;
    }

    Some(trimmed.to_string())
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');

    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None)
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    )
}
