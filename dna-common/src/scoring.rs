//! Keyword scoring engine
//!
//! Turns one answer transcript into increments on a [`NarrativeProfile`].
//! Every rule is an independent membership check: a rule fires at most once
//! per transcript and adds the fixed increment for its category. Keywords
//! match whole words (or whole word sequences for phrases), never substrings.

use serde::{Deserialize, Serialize};

use crate::profile::{CoreValue, Motivator, NarrativeProfile, Trait};
use crate::{Error, Result};

/// Fixed increments applied when a rule fires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_increment")]
    pub trait_increment: f64,
    #[serde(default = "default_increment")]
    pub value_increment: f64,
    #[serde(default = "default_increment")]
    pub motivator_increment: f64,
    #[serde(default = "default_hesitation_increment")]
    pub hesitation_increment: u32,
}

fn default_increment() -> f64 {
    0.1
}

fn default_hesitation_increment() -> u32 {
    1
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            trait_increment: default_increment(),
            value_increment: default_increment(),
            motivator_increment: default_increment(),
            hesitation_increment: default_hesitation_increment(),
        }
    }
}

impl ScoringWeights {
    /// Increments must be finite and non-negative
    pub fn validate(&self) -> Result<()> {
        let increments = [
            ("trait_increment", self.trait_increment),
            ("value_increment", self.value_increment),
            ("motivator_increment", self.motivator_increment),
        ];
        for (name, value) in increments {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "scoring.{} must be a finite, non-negative number (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Score field a rule increments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", content = "key", rename_all = "snake_case")]
pub enum Target {
    Trait(Trait),
    Value(CoreValue),
    Motivator(Motivator),
}

/// One keyword-membership rule
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub target: Target,
    pub keywords: &'static [&'static str],
}

/// Standard rule table, one rule per scored key
pub const STANDARD_RULES: &[KeywordRule] = &[
    KeywordRule {
        target: Target::Trait(Trait::Openness),
        keywords: &[
            "curious", "curiosity", "creative", "create", "imagine", "imagination", "explore",
            "exploring", "art", "new", "novel", "idea", "ideas", "travel", "wonder",
        ],
    },
    KeywordRule {
        target: Target::Trait(Trait::Conscientiousness),
        keywords: &[
            "plan", "planned", "planning", "organized", "organize", "schedule", "discipline",
            "disciplined", "responsible", "responsibility", "goal", "goals", "careful", "deadline",
        ],
    },
    KeywordRule {
        target: Target::Trait(Trait::Extraversion),
        keywords: &[
            "party", "parties", "friends", "crowd", "social", "outgoing", "talk", "talking",
            "energized", "people", "team", "loud",
        ],
    },
    KeywordRule {
        target: Target::Trait(Trait::Agreeableness),
        keywords: &[
            "kind", "kindness", "trust", "forgive", "forgave", "cooperate", "compassion",
            "empathy", "gentle", "patient", "generous",
        ],
    },
    KeywordRule {
        target: Target::Trait(Trait::Neuroticism),
        keywords: &[
            "worry", "worried", "worries", "anxious", "anxiety", "stress", "stressed", "afraid",
            "fear", "scared", "nervous", "panic", "overwhelmed",
        ],
    },
    KeywordRule {
        target: Target::Value(CoreValue::SelfDirection),
        keywords: &[
            "freedom", "free", "independent", "independence", "my own way", "choose", "choice",
            "decide for myself", "autonomy",
        ],
    },
    KeywordRule {
        target: Target::Value(CoreValue::Benevolence),
        keywords: &[
            "family", "help", "helping", "care", "caring", "support", "loyal", "loyalty",
            "give back", "protect",
        ],
    },
    KeywordRule {
        target: Target::Value(CoreValue::Achievement),
        keywords: &[
            "success", "successful", "achieve", "achievement", "win", "won", "ambition",
            "ambitious", "recognition", "best", "compete", "competition",
        ],
    },
    KeywordRule {
        target: Target::Motivator(Motivator::Mastery),
        keywords: &[
            "learn", "learned", "learning", "skill", "skills", "improve", "practice", "master",
            "expert", "better at", "craft",
        ],
    },
    KeywordRule {
        target: Target::Motivator(Motivator::Connection),
        keywords: &[
            "belong", "belonging", "together", "love", "loved", "connection", "connected",
            "close", "community", "friendship",
        ],
    },
    KeywordRule {
        target: Target::Motivator(Motivator::Purpose),
        keywords: &[
            "purpose", "meaning", "meaningful", "mission", "calling", "matter", "legacy",
            "difference", "impact", "why",
        ],
    },
];

/// Filler terms counted (every occurrence) as hesitation
pub const HESITATION_MARKERS: &[&str] = &[
    "um", "uh", "er", "erm", "hmm", "i mean", "you know", "i guess", "i don't know",
];

/// Markers that flag a sentence as holding a contradiction
pub const CONTRAST_MARKERS: &[&str] = &[
    "but", "however", "although", "though", "yet", "whereas", "on the other hand",
];

/// Markers that flag a sentence as figurative
pub const METAPHOR_MARKERS: &[&str] = &["like a", "like an", "as if", "as though", "feels like", "felt like"];

/// Lowercased word-token view of a piece of text
#[derive(Debug, Clone)]
pub struct Transcript {
    tokens: Vec<String>,
}

impl Transcript {
    pub fn new(text: &str) -> Self {
        let normalized = text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
        let tokens = normalized
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|t| t.trim_matches('\''))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of (possibly overlapping) occurrences of `phrase` as a whole-word sequence
    pub fn count(&self, phrase: &str) -> usize {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.is_empty() || words.len() > self.tokens.len() {
            return 0;
        }
        self.tokens
            .windows(words.len())
            .filter(|window| window.iter().zip(&words).all(|(t, w)| t == w))
            .count()
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.count(phrase) > 0
    }

    /// First of `candidates` present in the transcript
    pub fn first_match(&self, candidates: &'static [&'static str]) -> Option<&'static str> {
        candidates.iter().copied().find(|kw| self.contains(kw))
    }
}

/// A rule that fired, with the keyword that triggered it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMatch {
    pub target: Target,
    pub keyword: String,
}

/// What one transcript contributed to a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptAnalysis {
    pub matches: Vec<RuleMatch>,
    pub hesitations: u32,
    pub contradictions: Vec<String>,
    pub metaphors: Vec<String>,
}

impl TranscriptAnalysis {
    /// True when the transcript changed nothing
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
            && self.hesitations == 0
            && self.contradictions.is_empty()
            && self.metaphors.is_empty()
    }
}

/// Applies the rule table to transcripts
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: ScoringWeights,
    rules: &'static [KeywordRule],
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            rules: STANDARD_RULES,
        }
    }

    /// Score one transcript into `profile`
    ///
    /// Rules are independent: each fires at most once and adds its category
    /// increment. A transcript with no matches leaves the profile untouched.
    pub fn analyze(&self, profile: &mut NarrativeProfile, transcript: &str) -> TranscriptAnalysis {
        let words = Transcript::new(transcript);
        let mut analysis = TranscriptAnalysis::default();

        for rule in self.rules {
            if let Some(keyword) = words.first_match(rule.keywords) {
                match rule.target {
                    Target::Trait(t) => profile.traits.add(t, self.weights.trait_increment),
                    Target::Value(v) => profile.values.add(v, self.weights.value_increment),
                    Target::Motivator(m) => {
                        profile.motivators.add(m, self.weights.motivator_increment)
                    }
                }
                analysis.matches.push(RuleMatch {
                    target: rule.target,
                    keyword: keyword.to_string(),
                });
            }
        }

        let fillers: usize = HESITATION_MARKERS.iter().map(|m| words.count(m)).sum();
        let fillers = u32::try_from(fillers).unwrap_or(u32::MAX);
        let hesitation_delta = fillers.saturating_mul(self.weights.hesitation_increment);
        profile.hesitations = profile.hesitations.saturating_add(hesitation_delta);
        analysis.hesitations = hesitation_delta;

        for sentence in sentences(transcript) {
            let sentence_words = Transcript::new(sentence);
            if sentence_words.first_match(CONTRAST_MARKERS).is_some()
                && push_unique(&mut profile.contradictions, sentence)
            {
                analysis.contradictions.push(sentence.to_string());
            }
            if sentence_words.first_match(METAPHOR_MARKERS).is_some()
                && push_unique(&mut profile.metaphors, sentence)
            {
                analysis.metaphors.push(sentence.to_string());
            }
        }

        if analysis.is_empty() {
            tracing::debug!("Transcript matched no scoring rules");
        } else {
            tracing::debug!(
                matches = analysis.matches.len(),
                hesitations = analysis.hesitations,
                contradictions = analysis.contradictions.len(),
                metaphors = analysis.metaphors.len(),
                "Transcript scored"
            );
        }

        analysis
    }

    /// Analyze against a fresh profile without touching any session
    pub fn preview(&self, transcript: &str) -> (NarrativeProfile, TranscriptAnalysis) {
        let mut profile = NarrativeProfile::new();
        let analysis = self.analyze(&mut profile, transcript);
        (profile, analysis)
    }
}

/// Split on sentence punctuation, dropping blank pieces
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn push_unique(list: &mut Vec<String>, sentence: &str) -> bool {
    if list.iter().any(|existing| existing == sentence) {
        return false;
    }
    list.push(sentence.to_string());
    true
}
