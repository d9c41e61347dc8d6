//! The six-day stamp card and its completion rule.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors that can occur when building or mutating a [`StampCard`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StampError {
    /// The input sequence does not have exactly six entries.
    #[error("stamp card must have exactly {expected} entries (got {actual})")]
    WrongLength {
        /// Required entry count.
        expected: usize,
        /// Entry count found.
        actual: usize,
    },
    /// A day index outside `0..6`.
    #[error("day {0} is out of range (valid days are 0-5)")]
    DayOutOfRange(usize),
}

/// A loyalty card of six daily stamps.
///
/// Index `i` is day `i`. A card is completed when every day is stamped,
/// which entitles the customer to a free reward.
///
/// The card is always replaced whole: toggling a day or resetting produces a
/// new card, and [`StampUpdate::compute`] derives `completed` and
/// `total_visits` from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StampCard([bool; StampCard::DAYS]);

impl StampCard {
    /// Number of stamps on a card.
    pub const DAYS: usize = 6;

    /// A card with no stamps.
    #[must_use]
    pub const fn empty() -> Self {
        Self([false; Self::DAYS])
    }

    /// A fully stamped card.
    #[must_use]
    pub const fn full() -> Self {
        Self([true; Self::DAYS])
    }

    /// Build a card from the low six bits of `mask` (bit `i` is day `i`).
    #[must_use]
    pub fn from_bits(mask: u8) -> Self {
        let mut stamps = [false; Self::DAYS];
        for (day, stamp) in stamps.iter_mut().enumerate() {
            *stamp = mask & (1 << day) != 0;
        }
        Self(stamps)
    }

    /// Number of stamped days.
    #[must_use]
    pub fn count(&self) -> u8 {
        // At most six entries, so the narrowing is lossless.
        #[allow(clippy::cast_possible_truncation)]
        let count = self.0.iter().filter(|&&stamped| stamped).count() as u8;
        count
    }

    /// Whether every day is stamped.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        usize::from(self.count()) == Self::DAYS
    }

    /// Whether the given day is stamped.
    ///
    /// # Errors
    ///
    /// Returns [`StampError::DayOutOfRange`] if `day >= 6`.
    pub fn is_stamped(&self, day: usize) -> Result<bool, StampError> {
        self.0
            .get(day)
            .copied()
            .ok_or(StampError::DayOutOfRange(day))
    }

    /// Returns a copy with `day` flipped.
    ///
    /// # Errors
    ///
    /// Returns [`StampError::DayOutOfRange`] if `day >= 6`.
    pub fn toggled(&self, day: usize) -> Result<Self, StampError> {
        let current = self.is_stamped(day)?;
        self.with_day(day, !current)
    }

    /// Returns a copy with `day` set to `stamped`.
    ///
    /// # Errors
    ///
    /// Returns [`StampError::DayOutOfRange`] if `day >= 6`.
    pub fn with_day(&self, day: usize, stamped: bool) -> Result<Self, StampError> {
        let mut stamps = self.0;
        let slot = stamps
            .get_mut(day)
            .ok_or(StampError::DayOutOfRange(day))?;
        *slot = stamped;
        Ok(Self(stamps))
    }

    /// Returns the stamps as an owned vector (for array columns).
    #[must_use]
    pub fn to_vec(&self) -> Vec<bool> {
        self.0.to_vec()
    }

    /// Iterate over the days in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }
}

impl TryFrom<&[bool]> for StampCard {
    type Error = StampError;

    fn try_from(value: &[bool]) -> Result<Self, Self::Error> {
        let stamps: [bool; Self::DAYS] =
            value.try_into().map_err(|_| StampError::WrongLength {
                expected: Self::DAYS,
                actual: value.len(),
            })?;
        Ok(Self(stamps))
    }
}

impl TryFrom<Vec<bool>> for StampCard {
    type Error = StampError;

    fn try_from(value: Vec<bool>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

/// Renders the card as six `0`/`1` digits, day 0 first.
impl fmt::Display for StampCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stamped in self.iter() {
            f.write_str(if stamped { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Fields recomputed by a stamp mutation.
///
/// Every mutation goes through [`StampUpdate::compute`], so `completed` and
/// `total_visits` can never disagree with the card that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampUpdate {
    /// The card as written.
    pub stamps: StampCard,
    /// Whether all six days are stamped.
    pub completed: bool,
    /// Count of stamped days.
    pub total_visits: u8,
    /// Instant of the mutation.
    pub last_stamp_date: DateTime<Utc>,
}

impl StampUpdate {
    /// Derive the persisted fields from a replacement card.
    #[must_use]
    pub fn compute(stamps: StampCard, at: DateTime<Utc>) -> Self {
        let total_visits = stamps.count();
        Self {
            stamps,
            completed: usize::from(total_visits) == StampCard::DAYS,
            total_visits,
            last_stamp_date: at,
        }
    }

    /// Whether this update moved the card from incomplete to complete.
    ///
    /// `was_completed` is the state the caller observed before the update.
    #[must_use]
    pub const fn newly_completed(&self, was_completed: bool) -> bool {
        self.completed && !was_completed
    }
}
