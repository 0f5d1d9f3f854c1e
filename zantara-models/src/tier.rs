//! Tiered access control.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Chunk visibility tier, from most (`S`) to least (`D`) restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
    D,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
            Tier::D => "D",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Tier> {
        match s {
            "S" => Some(Tier::S),
            "A" => Some(Tier::A),
            "B" => Some(Tier::B),
            "C" => Some(Tier::C),
            "D" => Some(Tier::D),
            _ => None,
        }
    }
}

/// Per-collection mapping of user level → allowed tiers.
///
/// Tier gating is per collection rather than a single fixed global
/// formula, so this is kept configurable with a cumulative default (see
/// DESIGN.md's Open Question note): level N allows every tier from `D` up
/// through the N-th most restrictive tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierPolicy {
    levels: HashMap<u8, HashSet<Tier>>,
}

impl Default for TierPolicy {
    fn default() -> Self {
        let mut levels = HashMap::new();
        levels.insert(1, HashSet::from([Tier::D]));
        levels.insert(2, HashSet::from([Tier::D, Tier::C]));
        levels.insert(3, HashSet::from([Tier::D, Tier::C, Tier::B]));
        levels.insert(4, HashSet::from([Tier::D, Tier::C, Tier::B, Tier::A]));
        levels.insert(5, HashSet::from([Tier::D, Tier::C, Tier::B, Tier::A, Tier::S]));
        Self { levels }
    }
}

impl TierPolicy {
    pub fn new(levels: HashMap<u8, HashSet<Tier>>) -> Self {
        Self { levels }
    }

    /// Whether a user at `user_level` may see a chunk tagged `tier`.
    pub fn allows(&self, tier: Tier, user_level: u8) -> bool {
        self.levels
            .get(&user_level)
            .map(|allowed| allowed.contains(&tier))
            .unwrap_or(false)
    }

    /// The full set of tiers visible at `user_level`, for building a
    /// retrieval-time `tier ⊆ allowed` filter.
    pub fn allowed_tiers(&self, user_level: u8) -> Vec<Tier> {
        self.levels.get(&user_level).map(|set| set.iter().copied().collect()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_cumulative_from_d() {
        let policy = TierPolicy::default();
        assert!(policy.allows(Tier::D, 2));
        assert!(policy.allows(Tier::C, 2));
        assert!(policy.allows(Tier::B, 2) == false);
        assert!(policy.allows(Tier::S, 2) == false);
    }

    /// A collection-specific policy, as seeded by the tier-enforcement
    /// scenario: level 2 sees {C, B, A} but not D or S.
    #[test]
    fn custom_policy_matches_seeded_scenario() {
        let mut levels = HashMap::new();
        levels.insert(2, HashSet::from([Tier::C, Tier::B, Tier::A]));
        let policy = TierPolicy::new(levels);
        assert!(policy.allows(Tier::A, 2));
        assert!(!policy.allows(Tier::S, 2));
        assert!(!policy.allows(Tier::D, 2));
    }

    #[test]
    fn level_five_sees_everything() {
        let policy = TierPolicy::default();
        for t in [Tier::S, Tier::A, Tier::B, Tier::C, Tier::D] {
            assert!(policy.allows(t, 5));
        }
    }
}
