//! G-Code words

use super::errors::SyntaxError;
use serde::Serialize;
use std::fmt;
use strum::FromRepr;

/// Command class letters: seeing one of these starts a new statement
pub const COMMAND_LETTERS: [char; 3] = ['G', 'M', 'T'];

/// All supported G codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRepr)]
pub enum GWord {
    /// Rapid positioning
    G0 = 0,
    /// Linear feed
    G1 = 1,
    /// Clockwise circular feed
    G2 = 2,
    /// Counter-clockwise circular feed
    G3 = 3,
    /// Dwell
    G4 = 4,
    /// Inch units
    G20 = 20,
    /// Metric units
    G21 = 21,
    /// Return to home position
    G28 = 28,
    /// Thread cutting
    G32 = 32,
    /// Variable lead thread cutting
    G33 = 33,
    /// Cancel nose radius compensation
    G40 = 40,
    /// Nose radius compensation left
    G41 = 41,
    /// Nose radius compensation right
    G42 = 42,
    /// Tool length offset, positive
    G43 = 43,
    /// Tool length offset, negative
    G44 = 44,
    /// Cancel tool length offset
    G49 = 49,
    /// Maximum spindle speed clamp
    G50 = 50,
    /// Finishing cycle
    G70 = 70,
    /// Stock removal in turning
    G71 = 71,
    /// Stock removal in facing
    G72 = 72,
    /// Pattern repeating
    G73 = 73,
    /// Face peck drilling
    G74 = 74,
    /// Grooving cycle
    G75 = 75,
    /// Multiple threading cycle
    G76 = 76,
    /// Absolute positioning
    G90 = 90,
    /// Incremental positioning
    G91 = 91,
    /// Constant surface speed
    G96 = 96,
    /// Direct spindle speed
    G97 = 97,
    /// Feed per minute
    G98 = 98,
    /// Feed per revolution
    G99 = 99,
}

impl GWord {
    /// Convert G code number to a supported word
    pub fn from_number(n: u32) -> Option<Self> {
        GWord::from_repr(n as usize)
    }

    /// Convert the number as written after `G`
    pub fn from_text(code: Option<u32>, text: &str) -> Result<Self, SyntaxError> {
        code.and_then(Self::from_number)
            .ok_or_else(|| SyntaxError::UnsupportedGCode(text.into()))
    }

    /// Moves that remove material
    pub fn is_cut(self) -> bool {
        use GWord::*;
        matches!(self, G1 | G2 | G3 | G32 | G33 | G71 | G72 | G74 | G75 | G76)
    }

    /// Moves that commit a point to the tool path
    pub fn draws_path(self) -> bool {
        use GWord::*;
        matches!(self, G0 | G1 | G2 | G3 | G32 | G33)
    }

    /// Canned cycles only do modal bookkeeping
    pub fn is_canned_cycle(self) -> bool {
        (GWord::G70 as u8..=GWord::G76 as u8).contains(&(self as u8))
    }
}

impl fmt::Display for GWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "G{}", *self as u8)
    }
}

/// Known M codes. Anything else is accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
pub enum MWord {
    /// Program stop
    M0 = 0,
    /// Optional stop
    M1 = 1,
    /// Program end
    M2 = 2,
    /// Start spindle CW
    M3 = 3,
    /// Start spindle CCW
    M4 = 4,
    /// Stop spindle
    M5 = 5,
    /// Mist coolant on
    M7 = 7,
    /// Flood coolant on
    M8 = 8,
    /// Coolant off
    M9 = 9,
    /// Program end and rewind
    M30 = 30,
    /// Reset wear of the active tool
    M100 = 100,
}

impl MWord {
    /// Convert integer designator to M code number
    pub fn from_number(n: u32) -> Option<Self> {
        MWord::from_repr(n as usize)
    }
}

impl fmt::Display for MWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "M{}", *self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::{GWord, MWord};
    use crate::gcode::errors::SyntaxError;

    #[test]
    fn supported_set() {
        let supported = [
            0, 1, 2, 3, 4, 20, 21, 28, 32, 33, 40, 41, 42, 43, 44, 49, 50, 70, 71, 72, 73, 74, 75,
            76, 90, 91, 96, 97, 98, 99,
        ];
        for n in 0..200 {
            assert_eq!(
                GWord::from_number(n).is_some(),
                supported.contains(&n),
                "G{n}"
            );
        }
    }

    #[test]
    fn unsupported_names_code_as_written() {
        assert_eq!(
            GWord::from_text(None, "1.5"),
            Err(SyntaxError::UnsupportedGCode("1.5".into()))
        );
        assert_eq!(GWord::from_text(Some(1), "01"), Ok(GWord::G1));
    }

    #[test]
    fn classification() {
        assert!(GWord::G71.is_cut());
        assert!(!GWord::G71.draws_path());
        assert!(GWord::G71.is_canned_cycle());
        assert!(!GWord::G0.is_cut());
        assert!(GWord::G0.draws_path());
        assert!(!GWord::G73.is_cut());
        assert!(!GWord::G90.is_canned_cycle());
    }

    #[test]
    fn display() {
        assert_eq!(GWord::G42.to_string(), "G42");
        assert_eq!(MWord::M100.to_string(), "M100");
    }
}
