//! Customer contact details attached to a bin order.

use serde::{Deserialize, Serialize};

use crate::errors::{LayoutError, LayoutResult};

/// Name and phone number of the person ordering the bin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    /// Stored as `000-000-0000`
    pub phone: String,
}

impl Customer {
    /// Validate and normalize contact details.
    ///
    /// The name may contain only letters and spaces. The phone must contain
    /// exactly ten digits; any separators are stripped and the number is
    /// re-formatted as `000-000-0000`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bolt_core::customer::Customer;
    ///
    /// let customer = Customer::new("Pat Smith", "(555) 123 4567").unwrap();
    /// assert_eq!(customer.phone, "555-123-4567");
    /// assert!(Customer::new("R2D2", "5551234567").is_err());
    /// ```
    pub fn new(name: &str, phone: &str) -> LayoutResult<Self> {
        let name = validate_name(name)?;
        let digits = digits_of(phone);
        if digits.len() != 10 {
            return Err(LayoutError::invalid_input("phone", phone, "Phone must be 10 digits"));
        }
        Ok(Customer {
            name,
            phone: format_phone(&digits),
        })
    }
}

/// Trimmed name if it is non-empty and only letters and spaces.
pub fn validate_name(name: &str) -> LayoutResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        return Err(LayoutError::invalid_input(
            "name",
            name,
            "Name must contain only letters and spaces",
        ));
    }
    Ok(trimmed.to_string())
}

fn digits_of(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Format as `000-000-0000` once ten digits are present; digits past the
/// tenth are dropped. Shorter input comes back as bare digits.
pub fn format_phone(raw: &str) -> String {
    let digits = digits_of(raw);
    if digits.len() < 10 {
        return digits;
    }
    format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..10])
}
