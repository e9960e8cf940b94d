//! Transaction records and the category catalogue

use crate::core::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    FoodAndDrink,
    Transport,
    Shopping,
    Entertainment,
    HealthAndFitness,
    Utilities,
    Subscriptions,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::FoodAndDrink,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::HealthAndFitness,
        Category::Utilities,
        Category::Subscriptions,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::FoodAndDrink => "Food & Drink",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::HealthAndFitness => "Health & Fitness",
            Category::Utilities => "Utilities",
            Category::Subscriptions => "Subscriptions",
            Category::Other => "Other",
        }
    }

    /// Glyph used when a transaction does not carry its own.
    pub fn emoji(&self) -> &'static str {
        match self {
            Category::FoodAndDrink => "🍔",
            Category::Transport => "🚗",
            Category::Shopping => "🛍️",
            Category::Entertainment => "🎬",
            Category::HealthAndFitness => "💪",
            Category::Utilities => "💡",
            Category::Subscriptions => "🎯",
            Category::Other => "📌",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    /// Accepts the display label or a loose short form ("food", "health").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| {
                let label = c.label().to_lowercase();
                label == wanted || label.split([' ', '&']).next() == Some(wanted.as_str())
            })
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

// Stored records may carry labels this build does not know about.
impl From<String> for Category {
    fn from(label: String) -> Self {
        label.parse().unwrap_or_else(|_| {
            warn!("Unknown category label '{}', filing under Other", label);
            Category::Other
        })
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

/// A single recorded expense. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub date: NaiveDate,
    pub emoji: String,
}

/// User-submitted fields for a transaction that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub date: NaiveDate,
    pub emoji: Option<String>,
}

impl NewTransaction {
    pub fn new(description: &str, amount: f64, category: Category, date: NaiveDate) -> Self {
        Self {
            description: description.to_string(),
            amount,
            category,
            date,
            emoji: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ValidationError::InvalidAmount(self.amount));
        }
        Ok(())
    }

    /// Validates the fields and stamps them with `id`.
    pub fn into_transaction(self, id: String) -> Result<Transaction, ValidationError> {
        self.validate()?;
        let emoji = self
            .emoji
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| self.category.emoji().to_string());
        Ok(Transaction {
            id,
            description: self.description.trim().to_string(),
            amount: self.amount,
            category: self.category,
            date: self.date,
            emoji,
        })
    }
}

/// Parses an ISO-8601 calendar date (`YYYY-MM-DD`).
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Food & Drink".parse::<Category>(), Ok(Category::FoodAndDrink));
        assert_eq!("food".parse::<Category>(), Ok(Category::FoodAndDrink));
        assert_eq!("HEALTH".parse::<Category>(), Ok(Category::HealthAndFitness));
        assert_eq!("transport".parse::<Category>(), Ok(Category::Transport));
        assert_eq!(
            "Groceries".parse::<Category>(),
            Err(ValidationError::UnknownCategory("Groceries".to_string()))
        );
    }

    #[test]
    fn test_unknown_stored_label_maps_to_other() {
        let json = r#"{"id":"1","description":"x","amount":1.0,"category":"Pets","date":"2025-09-01","emoji":"🐶"}"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.category, Category::Other);
        assert_eq!(txn.emoji, "🐶");
    }

    #[test]
    fn test_transaction_wire_format() {
        let txn = Transaction {
            id: "1727000000000".to_string(),
            description: "Coffee".to_string(),
            amount: 3.5,
            category: Category::FoodAndDrink,
            date: date(2025, 9, 6),
            emoji: "🍔".to_string(),
        };
        let value = serde_json::to_value(&txn).unwrap();
        assert_eq!(value["category"], "Food & Drink");
        assert_eq!(value["date"], "2025-09-06");
        assert_eq!(value["amount"], 3.5);
    }

    #[test]
    fn test_validation_rejects_bad_input() {
        let today = date(2025, 9, 1);
        let blank = NewTransaction::new("   ", 5.0, Category::Other, today);
        assert_eq!(blank.validate(), Err(ValidationError::EmptyDescription));

        let negative = NewTransaction::new("Taxi", -1.0, Category::Transport, today);
        assert_eq!(negative.validate(), Err(ValidationError::InvalidAmount(-1.0)));

        let nan = NewTransaction::new("Taxi", f64::NAN, Category::Transport, today);
        assert!(matches!(
            nan.validate(),
            Err(ValidationError::InvalidAmount(_))
        ));

        let free = NewTransaction::new("Sample", 0.0, Category::Other, today);
        assert!(free.validate().is_ok());
    }

    #[test]
    fn test_emoji_defaults_to_category() {
        let fields = NewTransaction::new(" Bus ticket ", 2.0, Category::Transport, date(2025, 9, 1));
        let txn = fields.into_transaction("42".to_string()).unwrap();
        assert_eq!(txn.emoji, "🚗");
        assert_eq!(txn.description, "Bus ticket");

        let mut custom = NewTransaction::new("Gym", 30.0, Category::HealthAndFitness, date(2025, 9, 1));
        custom.emoji = Some("🏋️".to_string());
        assert_eq!(custom.into_transaction("43".to_string()).unwrap().emoji, "🏋️");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-02-29"), Ok(date(2024, 2, 29)));
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("29/02/2024").is_err());
    }
}
