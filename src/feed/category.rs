use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::CategoryRule;

/// Spending category guessed from a transaction description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Taxi,
    Transport,
    Internet,
    Lodging,
    Food,
    Shopping,
    Services,
    Maintenance,
    Entertainment,
    Fuel,
    Gifts,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Taxi => "taxi",
            Self::Transport => "transport",
            Self::Internet => "internet",
            Self::Lodging => "lodging",
            Self::Food => "food",
            Self::Shopping => "shopping",
            Self::Services => "services",
            Self::Maintenance => "maintenance",
            Self::Entertainment => "entertainment",
            Self::Fuel => "fuel",
            Self::Gifts => "gifts",
            Self::Other => "other",
        }
    }
}

/// Keyword rules in priority order; first match wins.
const BUILTIN_RULES: &[(&str, Category)] = &[
    ("taxi", Category::Taxi),
    ("transporte", Category::Transport),
    ("internet", Category::Internet),
    ("hospedaje", Category::Lodging),
    ("alimentos|cena", Category::Food),
    ("compras|super", Category::Shopping),
    ("servicios", Category::Services),
    ("mantenimiento", Category::Maintenance),
    ("tour|eventos", Category::Entertainment),
    ("gasolina", Category::Fuel),
    ("souvenirs|propinas", Category::Gifts),
];

#[derive(Debug, Clone)]
struct CompiledRule {
    pattern: Regex,
    category: Category,
}

/// Matches descriptions against user rules first, then the built-in keywords.
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<CompiledRule>,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Categorizer {
    /// Built-in keywords only.
    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .filter_map(|(pattern, category)| {
                Regex::new(&format!("(?i){pattern}"))
                    .ok()
                    .map(|pattern| CompiledRule {
                        pattern,
                        category: *category,
                    })
            })
            .collect();
        Self { rules }
    }

    /// Configured rules ahead of the built-in keywords.
    pub fn from_rules(custom: &[CategoryRule]) -> Result<Self> {
        let mut rules = Vec::with_capacity(custom.len() + BUILTIN_RULES.len());
        for (idx, rule) in custom.iter().enumerate() {
            let trimmed = rule.pattern.trim();
            if trimmed.is_empty() {
                anyhow::bail!("categories[{idx}].pattern must not be empty");
            }
            let pattern = Regex::new(trimmed)
                .with_context(|| format!("Invalid categories[{idx}].pattern regex: {trimmed}"))?;
            rules.push(CompiledRule {
                pattern,
                category: rule.category,
            });
        }
        rules.extend(Self::builtin().rules);
        Ok(Self { rules })
    }

    pub fn categorize(&self, description: &str) -> Category {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(description))
            .map(|rule| rule.category)
            .unwrap_or(Category::Other)
    }
}
