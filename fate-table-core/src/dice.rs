//! Fate dice mechanics: four-sided Fate dice, skill ratings and the ladder.
//!
//! Rolling is a pure function of the random source passed in, so results are
//! fully deterministic (and testable) given a seeded RNG.

use std::fmt;

use rand::Rng;

/// A single face of a four-sided Fate die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Roll {
    /// The `-` face.
    Minus,
    /// The blank face.
    Blank,
    /// The `+` face.
    Plus,
}

impl Roll {
    /// Numeric contribution of this face to the total.
    pub fn value(self) -> i8 {
        match self {
            Roll::Minus => -1,
            Roll::Blank => 0,
            Roll::Plus => 1,
        }
    }

    fn random(rng: &mut impl Rng) -> Self {
        // The draw domain divides evenly by three, so each face is equally
        // likely without a reject/retry loop.
        match rng.random_range(0..3u8) {
            0 => Roll::Minus,
            1 => Roll::Blank,
            _ => Roll::Plus,
        }
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Roll::Minus => write!(f, "-"),
            Roll::Blank => write!(f, "0"),
            Roll::Plus => write!(f, "+"),
        }
    }
}

/// A character's skill rating added on top of the dice, bounded 0..=5.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

/// Error returned when constructing a [`Rating`] outside the valid range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidRating(pub u8);

impl fmt::Display for InvalidRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rating {} is out of range 0..={}", self.0, Rating::MAX)
    }
}

impl std::error::Error for InvalidRating {}

impl Rating {
    /// Largest valid rating.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values above [`Rating::MAX`].
    pub fn new(value: u8) -> Result<Self, InvalidRating> {
        if value > Self::MAX {
            return Err(InvalidRating(value));
        }
        Ok(Self(value))
    }

    /// Numeric value of the rating.
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Overall result of a skill check on "the ladder".
///
/// Totals at or below -3 fall off the bottom of the ladder, totals at or
/// above 9 exceed the top. Everything in between is a literal ladder
/// position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Total {
    /// Total ≤ -3.
    Below,
    /// A literal ladder position in -2..=8.
    Ladder(i8),
    /// Total ≥ 9.
    Above,
}

impl fmt::Display for Total {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Total::Below => write!(f, "below"),
            Total::Ladder(value) => write!(f, "{value}"),
            Total::Above => write!(f, "above"),
        }
    }
}

/// The outcome of rolling four Fate dice against a rating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollResult {
    /// The four individual die faces, in roll order.
    pub rolls: [Roll; 4],
    /// The rating the dice were rolled against.
    pub rating: Rating,
}

impl RollResult {
    /// Sum of the four die faces, in -4..=4.
    pub fn dice_sum(&self) -> i8 {
        self.rolls.iter().map(|r| r.value()).sum()
    }

    /// Map rating + dice onto the ladder.
    pub fn total(&self) -> Total {
        let value = self.rating.value() as i8 + self.dice_sum();
        if value <= -3 {
            Total::Below
        } else if value >= 9 {
            Total::Above
        } else {
            Total::Ladder(value)
        }
    }
}

/// Roll four Fate dice against `rating`, drawing from `rng`.
pub fn roll(rating: Rating, rng: &mut impl Rng) -> RollResult {
    RollResult {
        rolls: [
            Roll::random(rng),
            Roll::random(rng),
            Roll::random(rng),
            Roll::random(rng),
        ],
        rating,
    }
}
