use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown category: {0}")]
pub struct CategoryError(pub String);

/// The fixed set of topics a post can be filed under.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "Mental Health")]
    MentalHealth,
    #[serde(rename = "Relationships")]
    Relationships,
    #[serde(rename = "Work Stress")]
    WorkStress,
    #[serde(rename = "Life Advice")]
    LifeAdvice,
    #[serde(rename = "Faith")]
    Faith,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::MentalHealth,
        Category::Relationships,
        Category::WorkStress,
        Category::LifeAdvice,
        Category::Faith,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::MentalHealth => "Mental Health",
            Category::Relationships => "Relationships",
            Category::WorkStress => "Work Stress",
            Category::LifeAdvice => "Life Advice",
            Category::Faith => "Faith",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| CategoryError(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
