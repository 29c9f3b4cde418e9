//! Competition data consumed by the document strategies.
//!
//! Items arrive fully computed (scores, places and race assignments are
//! decided upstream); nothing here mutates them.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Some(Self::Male),
            "female" | "f" | "w" => Some(Self::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwimmingStyle {
    Breaststroke,
    Freestyle,
    Backstroke,
    Butterfly,
    Medley,
    WaterFlea,
}

impl SwimmingStyle {
    pub fn all() -> &'static [SwimmingStyle] {
        &[
            SwimmingStyle::Breaststroke,
            SwimmingStyle::Freestyle,
            SwimmingStyle::Backstroke,
            SwimmingStyle::Butterfly,
            SwimmingStyle::Medley,
            SwimmingStyle::WaterFlea,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breaststroke => "breaststroke",
            Self::Freestyle => "freestyle",
            Self::Backstroke => "backstroke",
            Self::Butterfly => "butterfly",
            Self::Medley => "medley",
            Self::WaterFlea => "water-flea",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.to_lowercase().replace(['_', ' '], "-");
        Self::all()
            .iter()
            .copied()
            .find(|style| style.as_str() == normalized || style.as_str().replace('-', "") == normalized)
    }

    /// Name printed into documents.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Breaststroke => "Breaststroke",
            Self::Freestyle => "Freestyle",
            Self::Backstroke => "Backstroke",
            Self::Butterfly => "Butterfly",
            Self::Medley => "Medley",
            Self::WaterFlea => "Water flea",
        }
    }
}

impl fmt::Display for SwimmingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One person swimming one competition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonStart {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    #[serde(default)]
    pub birth_year: Option<u16>,
    #[serde(default)]
    pub club: Option<String>,
    pub style: SwimmingStyle,
    /// Distance in meters
    pub distance: u32,
    #[serde(default)]
    pub competition_id: Option<u32>,
    /// Swum time in milliseconds
    #[serde(default)]
    pub time_ms: Option<u64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub race_number: Option<u32>,
    #[serde(default)]
    pub lane: Option<u32>,
}

impl PersonStart {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// A participant with all of their starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    #[serde(default)]
    pub birth_year: Option<u16>,
    #[serde(default)]
    pub club: Option<String>,
    /// Overall score
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub result_place: Option<u32>,
    #[serde(default)]
    pub starts: Vec<PersonStart>,
}

impl Person {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// One heat and its starts in lane order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub number: u32,
    #[serde(default)]
    pub starts: Vec<PersonStart>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionInfo {
    pub name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
}

impl CompetitionInfo {
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }
}

/// Everything a render needs, as exported by the data layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionData {
    pub competition: CompetitionInfo,
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub races: Vec<Race>,
}

impl CompetitionData {
    /// Load a data file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path)?;
        let data: Self = serde_json::from_str(&content)?;
        info!(
            "Loaded {} person(s) and {} race(s) from {:?}",
            data.persons.len(),
            data.races.len(),
            path
        );
        Ok(data)
    }

    /// Write a data file.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Every start of every person, in person order.
    pub fn all_starts(&self) -> Vec<PersonStart> {
        self.persons
            .iter()
            .flat_map(|p| p.starts.iter().cloned())
            .collect()
    }

    /// A small, complete competition used for sample output.
    pub fn sample() -> Self {
        let start = |first: &str,
                     last: &str,
                     gender: Gender,
                     year: u16,
                     club: &str,
                     style: SwimmingStyle,
                     time: u64,
                     race: u32,
                     lane: u32| PersonStart {
            first_name: first.to_string(),
            last_name: last.to_string(),
            gender,
            birth_year: Some(year),
            club: Some(club.to_string()),
            style,
            distance: 50,
            competition_id: Some(if style == SwimmingStyle::Freestyle { 1 } else { 2 }),
            time_ms: Some(time),
            score: Some(time as f64 / 100.0),
            race_number: Some(race),
            lane: Some(lane),
        };

        let anna = start("Anna", "Berg", Gender::Female, 2012, "SC Nord", SwimmingStyle::Freestyle, 38_420, 1, 1);
        let ben = start("Ben", "Cole", Gender::Male, 2011, "SV Delphin", SwimmingStyle::Freestyle, 41_050, 1, 2);
        let cleo = start("Cleo", "Dorn", Gender::Female, 2012, "SC Nord", SwimmingStyle::Breaststroke, 52_870, 2, 1);

        let person = |s: &PersonStart, place: u32| Person {
            first_name: s.first_name.clone(),
            last_name: s.last_name.clone(),
            gender: s.gender,
            birth_year: s.birth_year,
            club: s.club.clone(),
            score: s.score,
            result_place: Some(place),
            starts: vec![s.clone()],
        };

        Self {
            competition: CompetitionInfo {
                name: "Spring Cup".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 4, 20),
                location: Some("Hallenbad Nord".to_string()),
            },
            persons: vec![person(&anna, 2), person(&ben, 3), person(&cleo, 1)],
            races: vec![
                Race {
                    number: 1,
                    starts: vec![anna.clone(), ben.clone()],
                },
                Race {
                    number: 2,
                    starts: vec![cleo.clone()],
                },
            ],
        }
    }
}

fn full_name(first: &str, last: &str) -> String {
    match (first.trim(), last.trim()) {
        ("", last) => last.to_string(),
        (first, "") => first.to_string(),
        (first, last) => format!("{} {}", first, last),
    }
}
