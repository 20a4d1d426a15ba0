// ABOUTME: Holds the agreed training cutoff for one service instance.
// ABOUTME: Shared between the consensus coordinator and the HTTP surface.

use std::convert::Infallible;
use std::str::FromStr;

use parking_lot::RwLock;

use crate::error::TimeError;
use crate::time;

/// Wire value meaning "no cutoff", for peers that cannot express absence.
pub const UNSET_SENTINEL: i64 = i64::MAX;

/// An operator-supplied cutoff, pinned before consensus runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CutoffOverride {
    /// Epoch milliseconds.
    Millis(i64),
    /// A local date-time string, parsed like order times.
    Timestamp(String),
}

impl CutoffOverride {
    /// Resolve the override to epoch milliseconds.
    pub fn resolve(&self) -> Result<i64, TimeError> {
        match self {
            CutoffOverride::Millis(millis) => Ok(*millis),
            CutoffOverride::Timestamp(text) => time::parse(text),
        }
    }
}

impl FromStr for CutoffOverride {
    type Err = Infallible;

    /// Integer text is taken as milliseconds, anything else as a timestamp.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(millis) => CutoffOverride::Millis(millis),
            Err(_) => CutoffOverride::Timestamp(trimmed.to_string()),
        })
    }
}

/// The cutoff this instance currently trains with.
///
/// `None` means unset: no peer has told us a cutoff and none was computed,
/// so filtering passes everything through.
#[derive(Debug, Default)]
pub struct CutoffState {
    value: RwLock<Option<i64>>,
}

impl CutoffState {
    /// Create an unset state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state already holding a cutoff.
    pub fn with_value(millis: i64) -> Self {
        Self {
            value: RwLock::new(Some(millis)),
        }
    }

    /// The current cutoff, if any.
    pub fn get(&self) -> Option<i64> {
        *self.value.read()
    }

    /// Overwrite the cutoff. Last writer wins.
    pub fn set(&self, value: Option<i64>) {
        *self.value.write() = value;
    }

    /// Forget the cutoff.
    pub fn clear(&self) {
        self.set(None);
    }

    /// Pin the cutoff to an operator-supplied value.
    ///
    /// On a parse failure the previous value is kept.
    pub fn pin(&self, value: &CutoffOverride) -> Result<i64, TimeError> {
        let millis = value.resolve()?;
        self.set(Some(millis));
        Ok(millis)
    }

    /// The cutoff as served to peers, with [`UNSET_SENTINEL`] for unset.
    pub fn wire_value(&self) -> i64 {
        self.get().unwrap_or(UNSET_SENTINEL)
    }
}
