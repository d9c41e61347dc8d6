//! Mobile number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MobileNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MobileError {
    /// The input string is empty.
    #[error("mobile number cannot be empty")]
    Empty,
    /// The input does not start with the `+91` country code.
    #[error("mobile number must start with {0}")]
    MissingCountryCode(&'static str),
    /// The subscriber part has the wrong number of digits.
    #[error("mobile number must have {expected} digits after the country code (got {actual})")]
    InvalidLength {
        /// Required digit count.
        expected: usize,
        /// Digit count found.
        actual: usize,
    },
    /// The subscriber part contains a non-digit character.
    #[error("mobile number may only contain digits after the country code")]
    NonDigit,
}

/// An Indian mobile number in the form `+91XXXXXXXXXX`.
///
/// ## Constraints
///
/// - Starts with the `+91` country code
/// - Followed by exactly 10 ASCII digits
/// - No spaces or separators
///
/// ## Examples
///
/// ```
/// use stampcard_core::MobileNumber;
///
/// assert!(MobileNumber::parse("+919876543210").is_ok());
///
/// assert!(MobileNumber::parse("9876543210").is_err());     // missing +91
/// assert!(MobileNumber::parse("+91 98765 43210").is_err()); // separators
/// assert!(MobileNumber::parse("+91987654321").is_err());   // 9 digits
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Country code every number must carry.
    pub const COUNTRY_CODE: &'static str = "+91";
    /// Digits required after the country code.
    pub const SUBSCRIBER_DIGITS: usize = 10;

    /// Parse a `MobileNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, lacks the `+91` prefix, or is
    /// not followed by exactly ten digits.
    pub fn parse(s: &str) -> Result<Self, MobileError> {
        if s.is_empty() {
            return Err(MobileError::Empty);
        }

        let subscriber = s
            .strip_prefix(Self::COUNTRY_CODE)
            .ok_or(MobileError::MissingCountryCode(Self::COUNTRY_CODE))?;

        if !subscriber.chars().all(|c| c.is_ascii_digit()) {
            return Err(MobileError::NonDigit);
        }

        if subscriber.len() != Self::SUBSCRIBER_DIGITS {
            return Err(MobileError::InvalidLength {
                expected: Self::SUBSCRIBER_DIGITS,
                actual: subscriber.len(),
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MobileNumber {
    type Err = MobileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MobileNumber {
    type Error = MobileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MobileNumber> for String {
    fn from(mobile: MobileNumber) -> Self {
        mobile.0
    }
}

impl AsRef<str> for MobileNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for MobileNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for MobileNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for MobileNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
