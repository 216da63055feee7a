use std::fmt;
use std::str::FromStr;

use crate::domain::SightingsError;

/// The filterable categories, one per control in the category bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Date,
    City,
    State,
    Country,
    Shape,
}

/// What a category filters on and how its input form is dressed.
#[derive(Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub data_key: &'static str,
    pub placeholder: &'static str,
    pub label: &'static str,
}

/// How a filter value is compared against a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Date,
    Text,
}

const CATALOG: [CatalogEntry; 5] = [
    CatalogEntry {
        data_key: "datetime",
        placeholder: "1/11/2011",
        label: "Enter a date (mm/dd/yyyy)",
    },
    CatalogEntry {
        data_key: "city",
        placeholder: "San Diego",
        label: "Enter a city name ...",
    },
    CatalogEntry {
        data_key: "state",
        placeholder: "CA",
        label: "Enter a state name ...",
    },
    CatalogEntry {
        data_key: "country",
        placeholder: "US",
        label: "Enter a country name ...",
    },
    CatalogEntry {
        data_key: "shape",
        placeholder: "Circle",
        label: "Enter a shape ...",
    },
];

impl Category {
    /// All categories in the order their controls are displayed.
    pub const ALL: [Category; 5] = [
        Category::Date,
        Category::City,
        Category::State,
        Category::Country,
        Category::Shape,
    ];

    pub fn entry(self) -> &'static CatalogEntry {
        &CATALOG[self.index()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Date => "Date",
            Category::City => "City",
            Category::State => "State",
            Category::Country => "Country",
            Category::Shape => "Shape",
        }
    }

    pub fn comparison(self) -> Comparison {
        match self {
            Category::Date => Comparison::Date,
            Category::City | Category::State | Category::Country | Category::Shape => {
                Comparison::Text
            }
        }
    }

    /// Position of the control in the category bar.
    pub fn index(self) -> usize {
        match self {
            Category::Date => 0,
            Category::City => 1,
            Category::State => 2,
            Category::Country => 3,
            Category::Shape => 4,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Control names are matched exactly, they are fixed by the category bar.
impl FromStr for Category {
    type Err = SightingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| SightingsError::UnknownCategory(s.to_string()))
    }
}
