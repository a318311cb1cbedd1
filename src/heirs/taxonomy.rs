//! Heir Taxonomy
//!
//! The eight heir classes the engines reason about, and the per-person
//! instances derived from them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest supported count for children and siblings
pub const MAX_GROUP_SIZE: u32 = 32;

/// Canonical heir categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeirClass {
    Son,
    Daughter,
    Husband,
    Wife,
    Father,
    Mother,
    Brother,
    Sister,
}

impl HeirClass {
    pub const ALL: [HeirClass; 8] = [
        HeirClass::Son,
        HeirClass::Daughter,
        HeirClass::Husband,
        HeirClass::Wife,
        HeirClass::Father,
        HeirClass::Mother,
        HeirClass::Brother,
        HeirClass::Sister,
    ];

    /// Key used in fact sets and configuration files
    pub fn key(&self) -> &'static str {
        match self {
            HeirClass::Son => "son",
            HeirClass::Daughter => "daughter",
            HeirClass::Husband => "husband",
            HeirClass::Wife => "wife",
            HeirClass::Father => "father",
            HeirClass::Mother => "mother",
            HeirClass::Brother => "brother",
            HeirClass::Sister => "sister",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HeirClass::Son => "Son",
            HeirClass::Daughter => "Daughter",
            HeirClass::Husband => "Husband",
            HeirClass::Wife => "Wife",
            HeirClass::Father => "Father",
            HeirClass::Mother => "Mother",
            HeirClass::Brother => "Brother",
            HeirClass::Sister => "Sister",
        }
    }

    /// Upper bound on how many heirs of this class one estate can have.
    /// Children and siblings are capped at `MAX_GROUP_SIZE` so shares stay
    /// within `Rational64` and combination stays small.
    pub fn max_count(&self) -> u32 {
        match self {
            HeirClass::Husband | HeirClass::Father | HeirClass::Mother => 1,
            HeirClass::Wife => 4,
            HeirClass::Son | HeirClass::Daughter | HeirClass::Brother | HeirClass::Sister => MAX_GROUP_SIZE,
        }
    }

    pub fn is_spouse(&self) -> bool {
        matches!(self, HeirClass::Husband | HeirClass::Wife)
    }
}

impl fmt::Display for HeirClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for HeirClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        HeirClass::ALL
            .iter()
            .copied()
            .find(|class| class.key() == key || class.label().to_lowercase() == key)
            .ok_or_else(|| format!("Unsupported heir class: {}", s.trim()))
    }
}

/// One concrete heir: a class plus an ordinal when the class has several members.
///
/// Naming is stable: the class label alone when the class count is 1,
/// `"<label> <n>"` (1-based) otherwise. The instance orders by class first,
/// so frames and share tables list heirs in taxonomy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeirInstance {
    pub class: HeirClass,
    pub ordinal: Option<u32>,
}

impl HeirInstance {
    pub fn single(class: HeirClass) -> Self {
        Self { class, ordinal: None }
    }

    pub fn nth(class: HeirClass, ordinal: u32) -> Self {
        Self { class, ordinal: Some(ordinal) }
    }

    /// Expand a class with `count` members into its instances
    pub fn expand(class: HeirClass, count: u32) -> Vec<HeirInstance> {
        match count {
            0 => Vec::new(),
            1 => vec![HeirInstance::single(class)],
            n => (1..=n).map(|i| HeirInstance::nth(class, i)).collect(),
        }
    }

    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HeirInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ordinal {
            Some(n) => write!(f, "{} {}", self.class.label(), n),
            None => write!(f, "{}", self.class.label()),
        }
    }
}

impl FromStr for HeirInstance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some((label, ordinal)) = trimmed.rsplit_once(' ') {
            if let Ok(n) = ordinal.parse::<u32>() {
                if n == 0 {
                    return Err(format!("Heir ordinals start at 1: {}", trimmed));
                }
                return Ok(HeirInstance::nth(label.parse()?, n));
            }
        }
        Ok(HeirInstance::single(trimmed.parse()?))
    }
}

// Instances key JSON maps, so they travel as their display name.
impl Serialize for HeirInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HeirInstance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_parsing_accepts_keys_and_labels() {
        assert_eq!("son".parse::<HeirClass>().unwrap(), HeirClass::Son);
        assert_eq!(" Mother ".parse::<HeirClass>().unwrap(), HeirClass::Mother);
        assert!("grandson".parse::<HeirClass>().is_err());
    }

    #[test]
    fn test_instance_naming() {
        assert_eq!(HeirInstance::single(HeirClass::Wife).to_string(), "Wife");
        assert_eq!(HeirInstance::nth(HeirClass::Wife, 2).to_string(), "Wife 2");

        let sons = HeirInstance::expand(HeirClass::Son, 3);
        let names: Vec<String> = sons.iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["Son 1", "Son 2", "Son 3"]);
        assert!(HeirInstance::expand(HeirClass::Son, 0).is_empty());
    }

    #[test]
    fn test_instance_name_round_trips_through_json() {
        let heir = HeirInstance::nth(HeirClass::Sister, 4);
        let json = serde_json::to_string(&heir).unwrap();
        assert_eq!(json, "\"Sister 4\"");
        let back: HeirInstance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, heir);
    }

    #[test]
    fn test_instances_order_by_class_then_ordinal() {
        let mut heirs = vec![
            HeirInstance::single(HeirClass::Mother),
            HeirInstance::nth(HeirClass::Son, 2),
            HeirInstance::nth(HeirClass::Son, 1),
        ];
        heirs.sort();
        assert_eq!(heirs[0], HeirInstance::nth(HeirClass::Son, 1));
        assert_eq!(heirs[2], HeirInstance::single(HeirClass::Mother));
    }
}
