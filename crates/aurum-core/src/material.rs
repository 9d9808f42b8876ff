//! Materials, grades and item categories

use crate::classify::Restriction;
use crate::table::EffectSpec;
use crate::{Error, MaterialKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality tier of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Low,
    Standard,
    High,
}

impl Grade {
    /// All grades, lowest first
    pub const ALL: [Grade; 3] = [Grade::Low, Grade::Standard, Grade::High];

    /// Host name of the grade
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Low => "low",
            Grade::Standard => "standard",
            Grade::High => "high",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Grade::Low),
            "standard" => Ok(Grade::Standard),
            "high" => Ok(Grade::High),
            other => Err(Error::UnknownGrade(other.to_string())),
        }
    }
}

/// Equippable item category an effect applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Weapon,
    Armor,
    Shield,
}

impl Category {
    /// Host name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Weapon => "weapon",
            Category::Armor => "armor",
            Category::Shield => "shield",
        }
    }

    /// Capitalized name, used in generated labels
    pub fn title(&self) -> &'static str {
        match self {
            Category::Weapon => "Weapon",
            Category::Armor => "Armor",
            Category::Shield => "Shield",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weapon" => Ok(Category::Weapon),
            "armor" => Ok(Category::Armor),
            "shield" => Ok(Category::Shield),
            other => Err(Error::UnknownCategory(other.to_string())),
        }
    }
}

/// A user-chosen value some materials depend on (e.g. a dragon element)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Module flag on the item that stores the chosen value
    pub flag: String,
    /// Allowed values; the first one is the default
    pub choices: Vec<String>,
}

impl ParameterSpec {
    /// The value used when the user has not chosen one
    pub fn default_choice(&self) -> Option<&str> {
        self.choices.first().map(String::as_str)
    }

    /// Check whether a value is one of the declared choices
    pub fn accepts(&self, value: &str) -> bool {
        self.choices.iter().any(|c| c == value)
    }

    /// Resolve a stored or pending value, falling back to the default
    pub fn resolve<'a>(&'a self, value: Option<&'a str>) -> Option<&'a str> {
        match value {
            Some(v) if self.accepts(v) => Some(v),
            _ => self.default_choice(),
        }
    }
}

/// Effects of one grade, per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryTable {
    pub weapon: Option<EffectSpec>,
    pub armor: Option<EffectSpec>,
    pub shield: Option<EffectSpec>,
}

impl CategoryTable {
    /// Get the effects for a category
    pub fn get(&self, category: Category) -> Option<&EffectSpec> {
        match category {
            Category::Weapon => self.weapon.as_ref(),
            Category::Armor => self.armor.as_ref(),
            Category::Shield => self.shield.as_ref(),
        }
    }

    /// Iterate over the categories that have effects
    pub fn iter(&self) -> impl Iterator<Item = (Category, &EffectSpec)> {
        [
            (Category::Weapon, self.weapon.as_ref()),
            (Category::Armor, self.armor.as_ref()),
            (Category::Shield, self.shield.as_ref()),
        ]
        .into_iter()
        .filter_map(|(c, spec)| spec.map(|s| (c, s)))
    }
}

/// Effects of a material, per grade
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeTable {
    pub low: Option<CategoryTable>,
    pub standard: Option<CategoryTable>,
    pub high: Option<CategoryTable>,
}

impl GradeTable {
    /// Get the category table for a grade
    pub fn get(&self, grade: Grade) -> Option<&CategoryTable> {
        match grade {
            Grade::Low => self.low.as_ref(),
            Grade::Standard => self.standard.as_ref(),
            Grade::High => self.high.as_ref(),
        }
    }

    /// Iterate over every (grade, category, effects) entry
    pub fn iter(&self) -> impl Iterator<Item = (Grade, Category, &EffectSpec)> {
        Grade::ALL.into_iter().flat_map(move |grade| {
            self.get(grade)
                .into_iter()
                .flat_map(move |table| table.iter().map(move |(c, spec)| (grade, c, spec)))
        })
    }
}

/// A material definition loaded from data files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    pub key: MaterialKey,
    /// Display name (e.g. "Cold Iron")
    pub name: String,
    /// Not native to the host; must be registered for display
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub parameter: Option<ParameterSpec>,
    /// Advisory shape restrictions
    #[serde(default)]
    pub restrictions: Vec<Restriction>,
    #[serde(default)]
    pub grades: GradeTable,
}

impl MaterialDef {
    /// Create a material with no effects
    pub fn new(key: impl Into<MaterialKey>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            custom: false,
            parameter: None,
            restrictions: Vec::new(),
            grades: GradeTable::default(),
        }
    }

    /// Look up the effects for a grade and category
    pub fn effects(&self, grade: Grade, category: Category) -> Option<&EffectSpec> {
        self.grades.get(grade)?.get(category)
    }
}
