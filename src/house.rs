//! Hogwarts houses
//!
//! The house is the category tag for story generation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum House {
    #[default]
    Gryffindor,
    Slytherin,
    Ravenclaw,
    Hufflepuff,
}

impl House {
    pub const ALL: [House; 4] = [
        House::Gryffindor,
        House::Slytherin,
        House::Ravenclaw,
        House::Hufflepuff,
    ];

    pub fn name(self) -> &'static str {
        match self {
            House::Gryffindor => "Gryffindor",
            House::Slytherin => "Slytherin",
            House::Ravenclaw => "Ravenclaw",
            House::Hufflepuff => "Hufflepuff",
        }
    }

    /// The trait a story should lean towards for this house
    pub fn temperament(self) -> &'static str {
        match self {
            House::Gryffindor => "brave",
            House::Slytherin => "ambitious",
            House::Ravenclaw => "wise",
            House::Hufflepuff => "loyal",
        }
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown house: {0}")]
pub struct UnknownHouse(String);

impl FromStr for House {
    type Err = UnknownHouse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        House::ALL
            .into_iter()
            .find(|house| house.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownHouse(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("gryffindor".parse::<House>().unwrap(), House::Gryffindor);
        assert_eq!(" SLYTHERIN ".parse::<House>().unwrap(), House::Slytherin);
        assert!("Durmstrang".parse::<House>().is_err());
    }

    #[test]
    fn test_serde_uses_house_names() {
        assert_eq!(serde_json::to_string(&House::Ravenclaw).unwrap(), "\"Ravenclaw\"");
        let house: House = serde_json::from_str("\"Hufflepuff\"").unwrap();
        assert_eq!(house, House::Hufflepuff);
    }
}
