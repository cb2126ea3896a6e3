//! Compact mat number lists such as `1-6,9,12-15`.
//!
//! Items are separated by commas and are either a single positive number or
//! an inclusive `from-to` range. Every item has to start above everything
//! listed before it, so a list is always strictly ascending without
//! duplicates.

use core::fmt;
use core::ops::RangeInclusive;
use core::str::FromStr;

use serde::{Serialize, Serializer};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MatsListError {
    #[error("'{0}' must contain at least one item")]
    NoItems(String),
    #[error("'{0}' must not contain an empty item")]
    EmptyItem(String),
    #[error("'{0}' must not contain more than one dash")]
    TooManyDashes(String),
    #[error("'{0}' cannot be blank")]
    Blank(String),
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("'{0}' must be positive")]
    NotPositive(String),
    #[error("'{0}' must have lower number first")]
    Descending(String),
    #[error("'{0}' is out of ascending order")]
    OutOfOrder(String),
}

/// A validated, ascending set of mat numbers.
///
/// Adjacent items are merged, so `1-3,4-6` and `1-6` compare equal and both
/// display as `1-6`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatsList {
    ranges: Vec<RangeInclusive<i32>>,
}

impl MatsList {
    pub fn new(list: &str) -> Result<Self, MatsListError> {
        if list.trim().is_empty() && !list.contains(',') {
            return Err(MatsListError::NoItems(list.to_owned()));
        }

        let mut ranges: Vec<RangeInclusive<i32>> = Vec::new();
        let mut highest = 0;
        for item in list.split(',') {
            let item = item.trim();
            if item.is_empty() {
                return Err(MatsListError::EmptyItem(list.to_owned()));
            }
            let (from, to) = if item.contains('-') {
                let mut subitems = item.split('-');
                let (Some(from), Some(to), None) =
                    (subitems.next(), subitems.next(), subitems.next())
                else {
                    return Err(MatsListError::TooManyDashes(item.to_owned()));
                };
                let from = validated(from, item)?;
                let to = validated(to, item)?;
                if from > to {
                    return Err(MatsListError::Descending(item.to_owned()));
                }
                (from, to)
            } else {
                let only = validated(item, item)?;
                (only, only)
            };
            if from <= highest {
                return Err(MatsListError::OutOfOrder(item.to_owned()));
            }
            match ranges.last_mut() {
                Some(last) if *last.end() + 1 == from => *last = *last.start()..=to,
                _ => ranges.push(from..=to),
            }
            highest = to;
        }
        Ok(Self { ranges })
    }

    /// All mat numbers in ascending order.
    pub fn exploded(&self) -> impl Iterator<Item = i32> + '_ {
        self.ranges.iter().flat_map(Clone::clone)
    }

    #[must_use]
    pub fn is_member_of(&self, mat_number: i32) -> bool {
        self.ranges
            .binary_search_by(|range| {
                if *range.end() < mat_number {
                    core::cmp::Ordering::Less
                } else if *range.start() > mat_number {
                    core::cmp::Ordering::Greater
                } else {
                    core::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// True when every mat of this list is also in `other`. A list is a
    /// subset of itself.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.ranges.iter().all(|range| {
            other
                .ranges
                .iter()
                .any(|outer| outer.start() <= range.start() && range.end() <= outer.end())
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges
            .iter()
            .map(|range| {
                usize::try_from(i64::from(*range.end()) - i64::from(*range.start()) + 1)
                    .unwrap_or(usize::MAX)
            })
            .sum()
    }

    /// Always false for a constructed list, kept for the `len` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Parses one side of `item`; errors quote the whole item.
fn validated(number: &str, item: &str) -> Result<i32, MatsListError> {
    let trimmed = number.trim();
    if trimmed.is_empty() {
        return Err(MatsListError::Blank(item.to_owned()));
    }
    let parsed: i32 = trimmed
        .parse()
        .map_err(|_| MatsListError::NotANumber(item.to_owned()))?;
    if parsed < 1 {
        return Err(MatsListError::NotPositive(item.to_owned()));
    }
    Ok(parsed)
}

impl FromStr for MatsList {
    type Err = MatsListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for MatsList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, range) in self.ranges.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            if range.start() == range.end() {
                write!(f, "{}", range.start())?;
            } else {
                write!(f, "{}-{}", range.start(), range.end())?;
            }
        }
        Ok(())
    }
}

impl Serialize for MatsList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
