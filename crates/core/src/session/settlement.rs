use crate::model::{Outcome, SessionResult};

/// Money paid out for a given termination reason.
///
/// Only a win pays the accumulated amount; losing or walking away pays what the
/// last checkpoint banked.
#[must_use]
pub fn settle_money(outcome: Outcome, accumulated: u64, guaranteed: u64) -> u64 {
    match outcome {
        Outcome::Won => accumulated,
        Outcome::LostWrongAnswer | Outcome::Quit => guaranteed,
        Outcome::NoQuestionsAvailable => 0,
    }
}

pub(crate) fn settle(
    outcome: Outcome,
    accumulated: u64,
    guaranteed: u64,
    questions_answered: u32,
    final_question_index: usize,
) -> SessionResult {
    SessionResult {
        outcome,
        money_awarded: settle_money(outcome, accumulated, guaranteed),
        questions_answered,
        final_question_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_a_win_pays_accumulated_money() {
        assert_eq!(settle_money(Outcome::Won, 50_000, 10_000), 50_000);
        assert_eq!(settle_money(Outcome::LostWrongAnswer, 50_000, 10_000), 10_000);
        assert_eq!(settle_money(Outcome::Quit, 50_000, 10_000), 10_000);
        assert_eq!(settle_money(Outcome::NoQuestionsAvailable, 50_000, 10_000), 0);
    }
}
