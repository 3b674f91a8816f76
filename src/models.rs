// Core data structures for gemtrend

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of keywords the provider accepts inside one group
pub const MAX_ALIASES_PER_GROUP: usize = 20;

/// Canonical key of the watched brand entity
pub const BRAND_ENTITY: &str = "리코맨즈";

/// Un-validated observation as delivered by a trend source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub entity: String,
    pub date: String, // YYYY-MM-DD
    pub ratio: f64,
}

impl RawObservation {
    pub fn new(entity: impl Into<String>, date: impl Into<String>, ratio: f64) -> Self {
        Self {
            entity: entity.into(),
            date: date.into(),
            ratio,
        }
    }
}

/// One validated (date, ratio) point in an entity's series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub ratio: f64,
}

/// A single keyword group sent to the provider: canonical name plus aliases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    #[serde(rename = "groupName")]
    pub name: String,
    pub keywords: Vec<String>,
}

/// Mapping from canonical entity key to the alias set used when querying
/// the provider. Owned by the ingestion side; the analytics core only ever
/// sees canonical keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRegistry {
    entries: BTreeMap<String, Vec<String>>,
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Default registry: 16 gemstones plus the watched brand
    pub fn gemstones() -> Self {
        let table: &[(&str, &[&str])] = &[
            ("호안석", &["호안석", "호랑이눈", "tiger eye"]),
            ("자수정", &["자수정", "amethyst"]),
            ("오닉스", &["오닉스", "흑수정", "onyx"]),
            ("가넷", &["가넷", "garnet"]),
            ("터키석", &["터키석", "turquoise"]),
            ("크리스탈", &["크리스탈", "수정", "rock crystal"]),
            ("장미수정", &["장미수정", "로즈쿼츠", "rose quartz"]),
            ("진주", &["진주", "pearl"]),
            ("라피스라줄리", &["라피스라줄리", "lapis lazuli", "청금석"]),
            ("시트린", &["시트린", "citrine"]),
            ("루비", &["루비", "ruby"]),
            ("투어마린", &["투어마린", "tourmaline"]),
            ("페리도트", &["페리도트", "peridot"]),
            ("아벤츄린", &["아벤츄린", "aventurine"]),
            ("카넬리안", &["카넬리안", "carnelian"]),
            ("아쿠아마린", &["아쿠아마린", "aquamarine"]),
            (BRAND_ENTITY, &[BRAND_ENTITY]),
        ];

        let mut registry = Self::new();
        for (key, aliases) in table {
            registry.insert(*key, aliases.iter().map(|a| a.to_string()).collect());
        }
        registry
    }

    /// Register (or replace) an entity with its aliases
    pub fn insert(&mut self, entity: impl Into<String>, aliases: Vec<String>) {
        self.entries.insert(entity.into(), aliases);
    }

    /// Aliases for an entity
    pub fn aliases(&self, entity: &str) -> Option<&[String]> {
        self.entries.get(entity).map(Vec::as_slice)
    }

    /// Check whether an entity is registered
    pub fn contains(&self, entity: &str) -> bool {
        self.entries.contains_key(entity)
    }

    /// Canonical entity keys in sorted order
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split the registry into provider batches of at most `max_group_size`
    /// keyword groups each. A `max_group_size` of 0 is treated as 1.
    pub fn groups(&self, max_group_size: usize) -> Vec<Vec<KeywordGroup>> {
        let groups: Vec<KeywordGroup> = self
            .entries
            .iter()
            .map(|(name, keywords)| KeywordGroup {
                name: name.clone(),
                keywords: keywords.clone(),
            })
            .collect();

        groups
            .chunks(max_group_size.max(1))
            .map(<[KeywordGroup]>::to_vec)
            .collect()
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::gemstones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemstones_registry() {
        let registry = EntityRegistry::gemstones();
        assert_eq!(registry.len(), 17);
        assert!(registry.contains(BRAND_ENTITY));
        assert_eq!(
            registry.aliases("자수정").unwrap(),
            &["자수정".to_string(), "amethyst".to_string()]
        );
    }

    #[test]
    fn test_groups_respect_max_size() {
        let registry = EntityRegistry::gemstones();
        let batches = registry.groups(5);

        assert_eq!(batches.len(), 4);
        assert!(batches.iter().all(|b| b.len() <= 5));
        assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 17);
    }

    #[test]
    fn test_groups_zero_size() {
        let mut registry = EntityRegistry::new();
        registry.insert("a", vec!["a".to_string()]);
        registry.insert("b", vec!["b".to_string()]);

        assert_eq!(registry.groups(0).len(), 2);
    }

    #[test]
    fn test_keyword_group_serializes_provider_field_names() {
        let group = KeywordGroup {
            name: "진주".to_string(),
            keywords: vec!["진주".to_string(), "pearl".to_string()],
        };
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["groupName"], "진주");
        assert_eq!(json["keywords"][1], "pearl");
    }
}
