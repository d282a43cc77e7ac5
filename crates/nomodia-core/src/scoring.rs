//! Interpretation of recorded answers.
//!
//! All functions here are pure: they read answer slices and produce
//! readings, so calling them repeatedly yields identical results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Answers;

/// Spiral dynamics colour levels, in pool order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpiralLevel {
    Beige,
    Purple,
    Red,
    Blue,
    Orange,
    Green,
    Yellow,
    Turquoise,
}

impl SpiralLevel {
    pub const ALL: [SpiralLevel; 8] = [
        SpiralLevel::Beige,
        SpiralLevel::Purple,
        SpiralLevel::Red,
        SpiralLevel::Blue,
        SpiralLevel::Orange,
        SpiralLevel::Green,
        SpiralLevel::Yellow,
        SpiralLevel::Turquoise,
    ];

    /// Level bound to a spiral pool index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            SpiralLevel::Beige => "Beige",
            SpiralLevel::Purple => "Purple",
            SpiralLevel::Red => "Red",
            SpiralLevel::Blue => "Blue",
            SpiralLevel::Orange => "Orange",
            SpiralLevel::Green => "Green",
            SpiralLevel::Yellow => "Yellow",
            SpiralLevel::Turquoise => "Turquoise",
        }
    }
}

impl fmt::Display for SpiralLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every spiral level answered "yes", in index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiralReading {
    pub levels: Vec<SpiralLevel>,
}

impl SpiralReading {
    pub fn is_clear(&self) -> bool {
        !self.levels.is_empty()
    }
}

impl fmt::Display for SpiralReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.levels.is_empty() {
            return write!(f, "No clear spiral level identified");
        }
        let labels: Vec<&str> = self.levels.iter().map(|l| l.label()).collect();
        write!(f, "Your dominant spiral level(s): {}", labels.join(", "))
    }
}

/// Band of the averaged emotional level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalBand {
    /// Levels 1-7.
    Lower,
    /// Levels 8-14.
    Transitional,
    /// Levels 15-22.
    Higher,
}

impl EmotionalBand {
    pub fn from_level(level: u32) -> Self {
        match level {
            0..=7 => EmotionalBand::Lower,
            8..=14 => EmotionalBand::Transitional,
            _ => EmotionalBand::Higher,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EmotionalBand::Lower => "Lower emotional states (negative feelings)",
            EmotionalBand::Transitional => "Transitional emotional states",
            EmotionalBand::Higher => "Higher emotional states (positive feelings)",
        }
    }
}

/// Averaged emotional scale level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmotionalReading {
    NoClearLevel,
    Level {
        average: u32,
        scale_max: u32,
        band: EmotionalBand,
    },
}

impl fmt::Display for EmotionalReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmotionalReading::NoClearLevel => write!(f, "No clear emotional level identified"),
            EmotionalReading::Level {
                average,
                scale_max,
                band,
            } => write!(
                f,
                "Your emotional scale level: {average}/{scale_max} - {}",
                band.label()
            ),
        }
    }
}

/// Band of the general positivity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneralBand {
    /// Score of 70 or more.
    Positive,
    /// Score from 40 to 69.
    Balanced,
    /// Score below 40.
    Challenged,
}

impl GeneralBand {
    pub fn from_score(score: u32) -> Self {
        if score >= 70 {
            GeneralBand::Positive
        } else if score >= 40 {
            GeneralBand::Balanced
        } else {
            GeneralBand::Challenged
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GeneralBand::Positive => {
                "Your responses indicate a generally positive outlook and higher emotional states."
            }
            GeneralBand::Balanced => {
                "Your responses indicate a balanced perspective with mixed emotional states."
            }
            GeneralBand::Challenged => {
                "Your responses indicate potential challenges with lower emotional states."
            }
        }
    }
}

/// Share of general statements answered "yes", as a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralReading {
    pub positivity_score: u32,
    pub band: GeneralBand,
}

impl fmt::Display for GeneralReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Positivity score: {}%)",
            self.band.label(),
            self.positivity_score
        )
    }
}

/// All three readings for one set of answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    pub spiral: SpiralReading,
    pub emotional: EmotionalReading,
    pub general: GeneralReading,
}

impl Interpretation {
    pub fn from_answers(answers: &Answers) -> Self {
        Self {
            spiral: interpret_spiral(&answers.spiral),
            emotional: interpret_emotional(&answers.emotional),
            general: interpret_general(&answers.general),
        }
    }
}

/// `numerator / denominator` rounded half up, in integer arithmetic.
///
/// Returns 0 when the denominator is 0.
pub fn div_round_half_up(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    (2 * numerator + denominator) / (2 * denominator)
}

/// Report every spiral level answered "yes".
///
/// Indices past the eighth level have no colour and are ignored.
pub fn interpret_spiral(answers: &[bool]) -> SpiralReading {
    let levels = answers
        .iter()
        .enumerate()
        .filter(|(_, yes)| **yes)
        .filter_map(|(index, _)| SpiralLevel::from_index(index))
        .collect();
    SpiralReading { levels }
}

/// Average the 1-based levels answered "yes" and band the result.
pub fn interpret_emotional(answers: &[bool]) -> EmotionalReading {
    let levels: Vec<u64> = answers
        .iter()
        .enumerate()
        .filter(|(_, yes)| **yes)
        .map(|(index, _)| index as u64 + 1)
        .collect();

    if levels.is_empty() {
        return EmotionalReading::NoClearLevel;
    }

    let sum: u64 = levels.iter().sum();
    let average = div_round_half_up(sum, levels.len() as u64) as u32;
    EmotionalReading::Level {
        average,
        scale_max: answers.len() as u32,
        band: EmotionalBand::from_level(average),
    }
}

/// Percentage of general statements answered "yes", rounded half up.
pub fn interpret_general(answers: &[bool]) -> GeneralReading {
    let yes = answers.iter().filter(|&&a| a).count() as u64;
    let positivity_score = div_round_half_up(100 * yes, answers.len() as u64) as u32;
    GeneralReading {
        positivity_score,
        band: GeneralBand::from_score(positivity_score),
    }
}
