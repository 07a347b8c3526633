//! Narrative profile record
//!
//! The profile accumulates everything the scoring engine learns from a
//! sequence of answer transcripts: three fixed-shape score maps, a hesitation
//! counter, detected contradictions/metaphors and per-domain coverage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Big Five personality traits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl Trait {
    /// All traits in declared order (also the tie-break order)
    pub const ALL: [Trait; 5] = [
        Trait::Openness,
        Trait::Conscientiousness,
        Trait::Extraversion,
        Trait::Agreeableness,
        Trait::Neuroticism,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Trait::Openness => "openness",
            Trait::Conscientiousness => "conscientiousness",
            Trait::Extraversion => "extraversion",
            Trait::Agreeableness => "agreeableness",
            Trait::Neuroticism => "neuroticism",
        }
    }
}

/// Schwartz basic values tracked by the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreValue {
    SelfDirection,
    Benevolence,
    Achievement,
}

impl CoreValue {
    pub const ALL: [CoreValue; 3] = [
        CoreValue::SelfDirection,
        CoreValue::Benevolence,
        CoreValue::Achievement,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CoreValue::SelfDirection => "self-direction",
            CoreValue::Benevolence => "benevolence",
            CoreValue::Achievement => "achievement",
        }
    }
}

/// Intrinsic motivators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motivator {
    Mastery,
    Connection,
    Purpose,
}

impl Motivator {
    pub const ALL: [Motivator; 3] = [Motivator::Mastery, Motivator::Connection, Motivator::Purpose];

    pub fn label(self) -> &'static str {
        match self {
            Motivator::Mastery => "mastery",
            Motivator::Connection => "connection",
            Motivator::Purpose => "purpose",
        }
    }
}

/// Life domain a question explores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Childhood,
    Relationships,
    Work,
    Adversity,
    Identity,
    Future,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Childhood,
        Domain::Relationships,
        Domain::Work,
        Domain::Adversity,
        Domain::Identity,
        Domain::Future,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Domain::Childhood => "childhood",
            Domain::Relationships => "relationships",
            Domain::Work => "work",
            Domain::Adversity => "adversity",
            Domain::Identity => "identity",
            Domain::Future => "future",
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for CoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Motivator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pick the key with the highest score; earlier keys win ties.
fn max_by_declared_order<K: Copy>(entries: impl IntoIterator<Item = (K, f64)>) -> Option<K> {
    let mut best: Option<(K, f64)> = None;
    for (key, score) in entries {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((key, score)),
        }
    }
    best.map(|(key, _)| key)
}

/// Generates a fixed-shape score record keyed by one of the enums above
macro_rules! score_map {
    ($(#[$meta:meta])* $name:ident, $key:ident { $($field:ident => $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(pub $field: f64,)+
        }

        impl $name {
            pub fn get(&self, key: $key) -> f64 {
                match key {
                    $($key::$variant => self.$field,)+
                }
            }

            pub fn add(&mut self, key: $key, amount: f64) {
                match key {
                    $($key::$variant => self.$field += amount,)+
                }
            }

            /// Scores in declared key order
            pub fn entries(&self) -> Vec<($key, f64)> {
                $key::ALL.iter().map(|k| (*k, self.get(*k))).collect()
            }

            /// Highest-scoring key (first declared key on ties, including all-zero)
            pub fn dominant(&self) -> $key {
                max_by_declared_order(self.entries()).unwrap_or($key::ALL[0])
            }
        }
    };
}

score_map!(
    /// Big Five trait scores
    TraitScores, Trait {
        openness => Openness,
        conscientiousness => Conscientiousness,
        extraversion => Extraversion,
        agreeableness => Agreeableness,
        neuroticism => Neuroticism,
    }
);

score_map!(
    /// Schwartz value scores
    ValueScores, CoreValue {
        self_direction => SelfDirection,
        benevolence => Benevolence,
        achievement => Achievement,
    }
);

score_map!(
    /// Motivator scores
    MotivatorScores, Motivator {
        mastery => Mastery,
        connection => Connection,
        purpose => Purpose,
    }
);

/// Accumulated narrative profile for one interview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeProfile {
    pub traits: TraitScores,
    pub values: ValueScores,
    pub motivators: MotivatorScores,
    pub hesitations: u32,
    pub contradictions: Vec<String>,
    pub metaphors: Vec<String>,
    pub domain_coverage: BTreeMap<Domain, u32>,
}

impl Default for NarrativeProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrativeProfile {
    /// Empty profile: zero scores, zero coverage for every domain
    pub fn new() -> Self {
        Self {
            traits: TraitScores::default(),
            values: ValueScores::default(),
            motivators: MotivatorScores::default(),
            hesitations: 0,
            contradictions: Vec::new(),
            metaphors: Vec::new(),
            domain_coverage: Domain::ALL.iter().map(|d| (*d, 0)).collect(),
        }
    }

    pub fn record_coverage(&mut self, domain: Domain) {
        *self.domain_coverage.entry(domain).or_insert(0) += 1;
    }

    pub fn coverage(&self, domain: Domain) -> u32 {
        self.domain_coverage.get(&domain).copied().unwrap_or(0)
    }

    /// Domains answered at least once, in declared order
    pub fn covered_domains(&self) -> Vec<Domain> {
        Domain::ALL
            .iter()
            .copied()
            .filter(|d| self.coverage(*d) > 0)
            .collect()
    }
}
