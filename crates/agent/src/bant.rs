//! BANT qualifier
//!
//! Folds signal tags into a [`BantStatus`] and derives the verdict.
//! `disqualified` is sticky: only an explicit override moves a criterion out
//! of it. Generic text never changes anything.

use sales_agent_config::QualificationConfig;
use sales_agent_core::{BantCriterion, BantSignal, BantState, BantStatus, Recommendation};

/// Apply one signal and return the new status
pub fn update(status: &BantStatus, signal: BantSignal) -> BantStatus {
    let mut next = *status;
    match signal {
        BantSignal::Confirmed(criterion) => {
            if status.get(criterion) != BantState::Disqualified {
                next.set(criterion, BantState::Qualified);
            }
        }
        BantSignal::Rejected(criterion) => next.set(criterion, BantState::Disqualified),
        BantSignal::Override(criterion, state) => next.set(criterion, state),
        BantSignal::GenericText => {}
    }
    next
}

/// Apply signals in order
pub fn apply_all<'a, I>(status: &BantStatus, signals: I) -> BantStatus
where
    I: IntoIterator<Item = &'a BantSignal>,
{
    signals
        .into_iter()
        .fold(*status, |acc, signal| update(&acc, *signal))
}

/// Any disqualified criterion wins over everything else
pub fn recommend(status: &BantStatus) -> Recommendation {
    if status.any_disqualified() {
        Recommendation::Disqualify
    } else if status.all_qualified() {
        Recommendation::BookMeeting
    } else {
        Recommendation::Nurture
    }
}

/// Qualifier with the discovery questions for each criterion
#[derive(Debug, Clone, Default)]
pub struct BantQualifier {
    config: QualificationConfig,
}

impl BantQualifier {
    pub fn new(config: QualificationConfig) -> Self {
        Self { config }
    }

    pub fn update(&self, status: &BantStatus, signal: BantSignal) -> BantStatus {
        update(status, signal)
    }

    pub fn recommend(&self, status: &BantStatus) -> Recommendation {
        recommend(status)
    }

    /// Question targeting the first unknown criterion, B-A-N-T order
    pub fn next_question(&self, status: &BantStatus) -> Option<(BantCriterion, &str)> {
        status
            .next_focus()
            .map(|criterion| (criterion, self.config.question(criterion)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BantCriterion::*;

    #[test]
    fn test_confirmation_is_idempotent() {
        let once = update(&BantStatus::default(), BantSignal::Confirmed(Budget));
        let twice = update(&once, BantSignal::Confirmed(Budget));
        assert_eq!(once, twice);
        assert_eq!(twice.budget, BantState::Qualified);
    }

    #[test]
    fn test_disqualified_is_sticky() {
        let status = update(&BantStatus::default(), BantSignal::Rejected(Authority));
        let status = update(&status, BantSignal::Confirmed(Authority));
        assert_eq!(status.authority, BantState::Disqualified);

        let status = update(&status, BantSignal::Override(Authority, BantState::Qualified));
        assert_eq!(status.authority, BantState::Qualified);
    }

    #[test]
    fn test_rejection_overrides_qualified() {
        let status = update(&BantStatus::default(), BantSignal::Confirmed(Need));
        let status = update(&status, BantSignal::Rejected(Need));
        assert_eq!(status.need, BantState::Disqualified);
    }

    #[test]
    fn test_generic_text_changes_nothing() {
        let status = apply_all(
            &BantStatus::default(),
            &[BantSignal::Confirmed(Timeline), BantSignal::Rejected(Budget)],
        );
        assert_eq!(update(&status, BantSignal::GenericText), status);
    }

    #[test]
    fn test_recommendation_rules() {
        let mut status = BantStatus::default();
        assert_eq!(recommend(&status), Recommendation::Nurture);

        status = apply_all(
            &status,
            &[
                BantSignal::Confirmed(Budget),
                BantSignal::Confirmed(Authority),
                BantSignal::Confirmed(Need),
            ],
        );
        assert_eq!(recommend(&status), Recommendation::Nurture);

        let all = update(&status, BantSignal::Confirmed(Timeline));
        assert_eq!(recommend(&all), Recommendation::BookMeeting);

        let lost = update(&all, BantSignal::Rejected(Timeline));
        assert_eq!(recommend(&lost), Recommendation::Disqualify);
    }

    #[test]
    fn test_next_question_targets_first_unknown() {
        let qualifier = BantQualifier::default();
        let status = update(&BantStatus::default(), BantSignal::Confirmed(Budget));
        let (criterion, question) = qualifier.next_question(&status).unwrap();
        assert_eq!(criterion, Authority);
        assert!(question.contains("approving"));

        let done = apply_all(
            &status,
            &[
                BantSignal::Confirmed(Authority),
                BantSignal::Confirmed(Need),
                BantSignal::Confirmed(Timeline),
            ],
        );
        assert!(qualifier.next_question(&done).is_none());
    }
}
