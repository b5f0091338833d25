use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::FinanceError;

/// Business classification attached to transactions, payments, and budgets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Salary,
    Office,
    Marketing,
    Travel,
    Software,
    Equipment,
    Rent,
    Utilities,
    Insurance,
    Tax,
    Sales,
    Services,
    Consulting,
    Other,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::Salary,
        Category::Office,
        Category::Marketing,
        Category::Travel,
        Category::Software,
        Category::Equipment,
        Category::Rent,
        Category::Utilities,
        Category::Insurance,
        Category::Tax,
        Category::Sales,
        Category::Services,
        Category::Consulting,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Salary => "salary",
            Category::Office => "office",
            Category::Marketing => "marketing",
            Category::Travel => "travel",
            Category::Software => "software",
            Category::Equipment => "equipment",
            Category::Rent => "rent",
            Category::Utilities => "utilities",
            Category::Insurance => "insurance",
            Category::Tax => "tax",
            Category::Sales => "sales",
            Category::Services => "services",
            Category::Consulting => "consulting",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == needle)
            .ok_or_else(|| FinanceError::validation(format!("unknown category `{}`", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_lowercase_names() {
        let json = serde_json::to_string(&Category::Consulting).unwrap();
        assert_eq!(json, "\"consulting\"");
        assert_eq!("Marketing".parse::<Category>().unwrap(), Category::Marketing);
        assert!("groceries".parse::<Category>().is_err());
    }
}
