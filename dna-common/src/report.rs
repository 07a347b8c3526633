//! Narrative report rendering
//!
//! Picks the dominant key of each score map and substitutes the results
//! into two fixed templates: a one-line headline and a longer narrative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tera::{Context, Tera};

use crate::profile::{CoreValue, Domain, Motivator, NarrativeProfile, Trait};
use crate::Result;

const HEADLINE_TEMPLATE: &str =
    "Your story is led by {{ dominant_trait }} and anchored in {{ dominant_value }}.";

const NARRATIVE_TEMPLATE: &str = "\
Across your answers, {{ dominant_trait }} surfaced more than any other trait. \
What you return to most is {{ dominant_value }}, and what moves you forward is {{ dominant_motivator }}. \
{% if hesitations == 0 %}You spoke without hesitating. \
{% elif hesitations == 1 %}You hesitated once. \
{% else %}You hesitated {{ hesitations }} times. {% endif %}\
{% if contradictions > 0 %}We noticed {{ contradictions }} moment{% if contradictions != 1 %}s{% endif %} of inner tension. {% endif %}\
{% if metaphor %}One image stood out: \"{{ metaphor }}\". {% endif %}\
Your story touched {{ domains_covered }} of {{ domains_total }} life domains.";

/// Finished report for one profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeReport {
    pub dominant_trait: Trait,
    pub dominant_value: CoreValue,
    pub dominant_motivator: Motivator,
    pub headline: String,
    pub narrative: String,
    pub hesitations: u32,
    pub contradictions: Vec<String>,
    pub metaphors: Vec<String>,
    pub domain_coverage: BTreeMap<Domain, u32>,
    pub profile: NarrativeProfile,
    pub generated_at: DateTime<Utc>,
}

/// Renders reports from the two fixed templates
pub struct ReportRenderer {
    tera: Tera,
}

impl ReportRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(vec![
            ("headline", HEADLINE_TEMPLATE),
            ("narrative", NARRATIVE_TEMPLATE),
        ])?;
        Ok(Self { tera })
    }

    pub fn render(&self, profile: &NarrativeProfile) -> Result<NarrativeReport> {
        let dominant_trait = profile.traits.dominant();
        let dominant_value = profile.values.dominant();
        let dominant_motivator = profile.motivators.dominant();

        let mut context = Context::new();
        context.insert("dominant_trait", dominant_trait.label());
        context.insert("dominant_value", dominant_value.label());
        context.insert("dominant_motivator", dominant_motivator.label());
        context.insert("hesitations", &profile.hesitations);
        context.insert("contradictions", &profile.contradictions.len());
        context.insert("metaphor", &profile.metaphors.first());
        context.insert("domains_covered", &profile.covered_domains().len());
        context.insert("domains_total", &Domain::ALL.len());

        let headline = self.tera.render("headline", &context)?;
        let narrative = self.tera.render("narrative", &context)?;

        tracing::debug!(
            trait_ = %dominant_trait,
            value = %dominant_value,
            motivator = %dominant_motivator,
            "Rendered narrative report"
        );

        Ok(NarrativeReport {
            dominant_trait,
            dominant_value,
            dominant_motivator,
            headline,
            narrative,
            hesitations: profile.hesitations,
            contradictions: profile.contradictions.clone(),
            metaphors: profile.metaphors.clone(),
            domain_coverage: profile.domain_coverage.clone(),
            profile: profile.clone(),
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringEngine;

    #[test]
    fn test_templates_compile() {
        assert!(ReportRenderer::new().is_ok());
    }

    #[test]
    fn test_empty_profile_uses_first_keys() {
        let renderer = ReportRenderer::new().unwrap();
        let report = renderer.render(&NarrativeProfile::new()).unwrap();

        assert_eq!(report.dominant_trait, Trait::Openness);
        assert_eq!(report.dominant_value, CoreValue::SelfDirection);
        assert_eq!(report.dominant_motivator, Motivator::Mastery);
        assert_eq!(
            report.headline,
            "Your story is led by openness and anchored in self-direction."
        );
        assert!(report.narrative.contains("You spoke without hesitating."));
        assert!(report.narrative.ends_with("Your story touched 0 of 6 life domains."));
        assert!(!report.narrative.contains("inner tension"));
        assert!(!report.narrative.contains("One image stood out"));
    }

    #[test]
    fn test_report_reflects_scored_profile() {
        let engine = ScoringEngine::default();
        let mut profile = NarrativeProfile::new();
        engine.analyze(&mut profile, "Um, I worry about my family, but I want them close.");
        engine.analyze(&mut profile, "Honestly I worry. Grief felt like a flood.");
        profile.record_coverage(Domain::Relationships);

        let report = ReportRenderer::new().unwrap().render(&profile).unwrap();

        assert_eq!(report.dominant_trait, Trait::Neuroticism);
        assert_eq!(report.dominant_value, CoreValue::Benevolence);
        assert_eq!(report.dominant_motivator, Motivator::Connection);
        assert_eq!(
            report.headline,
            "Your story is led by neuroticism and anchored in benevolence."
        );
        assert!(report.narrative.contains("what moves you forward is connection"));
        assert!(report.narrative.contains("You hesitated once."));
        assert!(report.narrative.contains("We noticed 1 moment of inner tension."));
        assert!(report.narrative.contains("One image stood out: \"Grief felt like a flood\"."));
        assert!(report.narrative.contains("touched 1 of 6 life domains"));
        assert_eq!(report.hesitations, 1);
    }

    #[test]
    fn test_plural_hesitations_and_tensions() {
        let mut profile = NarrativeProfile::new();
        profile.hesitations = 3;
        profile.contradictions = vec!["a but b".into(), "c yet d".into()];

        let report = ReportRenderer::new().unwrap().render(&profile).unwrap();
        assert!(report.narrative.contains("You hesitated 3 times."));
        assert!(report.narrative.contains("We noticed 2 moments of inner tension."));
    }
}
