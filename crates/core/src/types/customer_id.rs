//! Customer identifier type.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CustomerId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerIdError {
    /// The input string is empty.
    #[error("customer id cannot be empty")]
    Empty,
    /// The input does not start with the `RK` prefix.
    #[error("customer id must start with \"{prefix}\"")]
    MissingPrefix {
        /// Expected prefix.
        prefix: &'static str,
    },
    /// The numeric part is not exactly four ASCII digits.
    #[error("customer id must be \"{prefix}\" followed by 4 digits")]
    InvalidDigits {
        /// Expected prefix.
        prefix: &'static str,
    },
    /// The numeric part is outside 1000..=9999.
    #[error("customer id number {0} is out of range 1000-9999")]
    OutOfRange(u16),
}

/// A loyalty customer identifier such as `RK4821`.
///
/// The identifier is the `RK` prefix followed by a number in `1000..=9999`,
/// which gives a space of only 9000 values. Generated identifiers are
/// candidates: uniqueness is established by the caller checking the store
/// and regenerating on collision.
///
/// ## Examples
///
/// ```
/// use stampcard_core::CustomerId;
///
/// assert!(CustomerId::parse("RK1234").is_ok());
///
/// assert!(CustomerId::parse("RK0999").is_err()); // below range
/// assert!(CustomerId::parse("RK12345").is_err()); // too many digits
/// assert!(CustomerId::parse("AB1234").is_err()); // wrong prefix
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerId(String);

impl CustomerId {
    /// Prefix shared by every customer identifier.
    pub const PREFIX: &'static str = "RK";
    /// Smallest numeric part.
    pub const MIN_NUMBER: u16 = 1000;
    /// Largest numeric part.
    pub const MAX_NUMBER: u16 = 9999;

    /// Parse a `CustomerId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, lacks the `RK` prefix, is not
    /// followed by exactly four digits, or the number is below 1000.
    pub fn parse(s: &str) -> Result<Self, CustomerIdError> {
        if s.is_empty() {
            return Err(CustomerIdError::Empty);
        }

        let digits = s
            .strip_prefix(Self::PREFIX)
            .ok_or(CustomerIdError::MissingPrefix {
                prefix: Self::PREFIX,
            })?;

        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CustomerIdError::InvalidDigits {
                prefix: Self::PREFIX,
            });
        }

        let number = digits
            .parse::<u16>()
            .map_err(|_| CustomerIdError::InvalidDigits {
                prefix: Self::PREFIX,
            })?;

        Self::from_number(number)
    }

    /// Build an identifier from its numeric part.
    ///
    /// # Errors
    ///
    /// Returns [`CustomerIdError::OutOfRange`] if `number` is not in `1000..=9999`.
    pub fn from_number(number: u16) -> Result<Self, CustomerIdError> {
        if !(Self::MIN_NUMBER..=Self::MAX_NUMBER).contains(&number) {
            return Err(CustomerIdError::OutOfRange(number));
        }
        Ok(Self(format!("{}{number}", Self::PREFIX)))
    }

    /// Generate a random candidate identifier.
    #[must_use]
    pub fn random() -> Self {
        Self::random_with(&mut rand::rng())
    }

    /// Generate a random candidate identifier from the given RNG.
    #[must_use]
    pub fn random_with<R: Rng>(rng: &mut R) -> Self {
        let number = rng.random_range(Self::MIN_NUMBER..=Self::MAX_NUMBER);
        Self(format!("{}{number}", Self::PREFIX))
    }

    /// Whether a search term should be treated as an identifier lookup.
    ///
    /// Only the prefix is inspected; `RKabc` is identifier-shaped but will
    /// never parse.
    #[must_use]
    pub fn is_identifier_shaped(term: &str) -> bool {
        term.starts_with(Self::PREFIX)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `CustomerId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CustomerId {
    type Err = CustomerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CustomerId {
    type Error = CustomerIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CustomerId> for String {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CustomerId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CustomerId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CustomerId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
