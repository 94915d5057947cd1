//! Choosing what to spawn.
//!
//! Selection is two-level: first a tag, uniformly from the spawner's list,
//! then a template, uniformly from that tag's pool. Tags therefore carry equal
//! weight regardless of how many templates they match; a spawner listing
//! `["rare", "common"]` gets rare things half the time even if `common` has
//! ninety templates.

use std::sync::Arc;

use crate::error::SkipReason;
use crate::host::{DayNightClock, RandomSource};
use crate::tag_index::TagSnapshot;
use crate::template::{ALWAYS, Template};

/// A drawn template and the tag it was drawn through.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub tag: String,
    pub template: Arc<Template>,
}

#[derive(Debug, Clone, Copy)]
pub struct CandidateSelector {
    honor_probability: bool,
}

impl CandidateSelector {
    #[must_use]
    pub fn new(honor_probability: bool) -> Self {
        Self { honor_probability }
    }

    /// Draw a template for a spawner accepting `accepted_tags`.
    ///
    /// # Errors
    ///
    /// [`SkipReason::NoTags`], [`SkipReason::EmptyPool`], or any rejection
    /// from [`CandidateSelector::admit`].
    pub fn select(
        &self,
        accepted_tags: &[String],
        index: &TagSnapshot,
        clock: &dyn DayNightClock,
        rng: &mut dyn RandomSource,
    ) -> Result<Candidate, SkipReason> {
        if accepted_tags.is_empty() {
            return Err(SkipReason::NoTags);
        }

        let tag = &accepted_tags[rng.next_int(accepted_tags.len())];
        let pool = index.get(tag);
        if pool.is_empty() {
            return Err(SkipReason::EmptyPool { tag: tag.clone() });
        }

        let template = &pool[rng.next_int(pool.len())];
        self.admit(template, clock, rng)?;

        Ok(Candidate {
            tag: tag.clone(),
            template: Arc::clone(template),
        })
    }

    /// Apply the time-of-day gate, then the probability roll.
    ///
    /// The roll only consumes randomness for weights strictly between `0`
    /// and `255`.
    ///
    /// # Errors
    ///
    /// [`SkipReason::WrongPeriod`] or [`SkipReason::ProbabilityRejected`].
    pub fn admit(
        &self,
        template: &Template,
        clock: &dyn DayNightClock,
        rng: &mut dyn RandomSource,
    ) -> Result<(), SkipReason> {
        if !template.period_restriction.admits(clock.is_night()) {
            return Err(SkipReason::WrongPeriod {
                template: template.id.clone(),
            });
        }

        if self.honor_probability && template.probability != ALWAYS {
            let passes = template.probability > 0
                && rng.next_int(usize::from(ALWAYS)) < usize::from(template.probability);
            if !passes {
                return Err(SkipReason::ProbabilityRejected {
                    template: template.id.clone(),
                    probability: template.probability,
                });
            }
        }

        Ok(())
    }
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::template::Period;
    use crate::testing::FixedClock;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(1234)
    }

    #[test]
    fn test_no_tags() {
        let index = TagSnapshot::build(vec![Template::new("core:cow").tag("cow")]);
        let result = CandidateSelector::default().select(&[], &index, &FixedClock::DAY, &mut rng());
        assert!(matches!(result, Err(SkipReason::NoTags)));
    }

    #[test]
    fn test_empty_pool() {
        let index = TagSnapshot::build(vec![Template::new("core:cow").tag("cow")]);
        let result =
            CandidateSelector::default().select(&tags(&["ogre"]), &index, &FixedClock::DAY, &mut rng());
        assert!(matches!(result, Err(SkipReason::EmptyPool { tag }) if tag == "ogre"));
    }

    #[test]
    fn test_chosen_template_shares_a_tag_with_spawner() {
        let index = TagSnapshot::build(vec![
            Template::new("core:goblin").tag("goblin"),
            Template::new("core:spearman").tag("goblin").tag("spearman"),
            Template::new("core:cow").tag("cow"),
        ]);
        let accepted = tags(&["goblin", "spearman"]);
        let selector = CandidateSelector::default();
        let mut rng = rng();
        for _ in 0..500 {
            let candidate = selector
                .select(&accepted, &index, &FixedClock::DAY, &mut rng)
                .unwrap();
            assert!(candidate.template.tags.contains(&candidate.tag));
            assert!(accepted.iter().any(|t| candidate.template.tags.contains(t)));
        }
    }

    #[test]
    fn test_tag_level_odds_are_uniform() {
        let mut templates = vec![Template::new("a:0").tag("A")];
        templates.extend((0..9).map(|i| Template::new(format!("b:{i}")).tag("B")));
        let index = TagSnapshot::build(templates);
        let accepted = tags(&["A", "B"]);
        let selector = CandidateSelector::default();
        let mut rng = rng();

        let draws = 10_000;
        let mut from_a = 0;
        for _ in 0..draws {
            let candidate = selector
                .select(&accepted, &index, &FixedClock::DAY, &mut rng)
                .unwrap();
            if candidate.tag == "A" {
                from_a += 1;
            }
        }
        let share = f64::from(from_a) / f64::from(draws);
        assert!((0.45..0.55).contains(&share), "tag A share was {share}");
    }

    #[test]
    fn test_day_template_rejected_at_night() {
        let index = TagSnapshot::build(vec![Template::new("core:cow").tag("cow").period(Period::Day)]);
        let selector = CandidateSelector::default();
        let accepted = tags(&["cow"]);
        assert!(matches!(
            selector.select(&accepted, &index, &FixedClock::NIGHT, &mut rng()),
            Err(SkipReason::WrongPeriod { .. })
        ));
        assert!(selector.select(&accepted, &index, &FixedClock::DAY, &mut rng()).is_ok());
    }

    #[test]
    fn test_night_template_rejected_by_day() {
        let template = Template::new("core:bat").period(Period::Night);
        let selector = CandidateSelector::default();
        assert!(selector.admit(&template, &FixedClock::DAY, &mut rng()).is_err());
        assert!(selector.admit(&template, &FixedClock::NIGHT, &mut rng()).is_ok());
    }

    #[test]
    fn test_zero_probability_is_suppressed() {
        let template = Template::new("core:ghost").probability(0);
        let mut rng = rng();
        for _ in 0..100 {
            assert!(matches!(
                CandidateSelector::new(true).admit(&template, &FixedClock::DAY, &mut rng),
                Err(SkipReason::ProbabilityRejected { probability: 0, .. })
            ));
        }
        assert!(CandidateSelector::new(false).admit(&template, &FixedClock::DAY, &mut rng).is_ok());
    }

    #[test]
    fn test_partial_probability_rejects_some_draws() {
        let template = Template::new("core:deer").probability(64);
        let selector = CandidateSelector::new(true);
        let mut rng = rng();
        let accepted = (0..2_000)
            .filter(|_| selector.admit(&template, &FixedClock::DAY, &mut rng).is_ok())
            .count();
        // Expected share is 64/255, about 25%.
        assert!((300..700).contains(&accepted), "accepted {accepted}");
    }
}
