//! Two-valued site state.

use std::fmt;

/// The state of a site at one instant of imaginary time.
///
/// Encoded as a single bit in snapshots (`0` = susceptible,
/// `1` = infected). A cluster flip inverts it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SiteState {
    /// Healthy, can be infected.
    #[default]
    Susceptible = 0,
    /// Infected, can recover.
    Infected = 1,
}

impl SiteState {
    /// The opposite state.
    #[inline]
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Susceptible => Self::Infected,
            Self::Infected => Self::Susceptible,
        }
    }

    /// Decode from a bit. Any non-zero value is `Infected`.
    #[inline]
    pub fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            Self::Susceptible
        } else {
            Self::Infected
        }
    }

    /// Encode as a bit.
    #[inline]
    pub fn bit(self) -> u8 {
        self as u8
    }

    /// Whether the state is [`SiteState::Infected`].
    #[inline]
    pub fn is_infected(self) -> bool {
        self == Self::Infected
    }

    /// Parse the snapshot digit (`'0'` or `'1'`).
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Susceptible),
            '1' => Some(Self::Infected),
            _ => None,
        }
    }
}

impl fmt::Display for SiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bit())
    }
}
