//! Built-in question bank used by the terminal app and by tests.

use quiz_core::model::{QuestionError, QuestionId, QuestionRecord, Tier};
use thiserror::Error;

use crate::repository::{InMemoryRepository, StorageError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub const SAMPLE_SUBJECT: &str = "math";
pub const SAMPLE_GRADE: u8 = 5;

/// Subject with too few questions for a full session.
pub const SPARSE_SUBJECT: &str = "science";

type Row = (Tier, &'static str, [&'static str; 4], usize, &'static str);

const MATH: [Row; 15] = [
    (Tier::Easy, "What is 7 + 5?", ["10", "11", "12", "13"], 2, "Count up five from seven."),
    (Tier::Easy, "What is 9 x 3?", ["27", "24", "21", "30"], 0, "Three nines."),
    (Tier::Easy, "How many sides does a hexagon have?", ["5", "6", "7", "8"], 1, "Think of a honeycomb cell."),
    (Tier::Easy, "What is half of 50?", ["20", "30", "25", "35"], 2, "Split fifty into two equal parts."),
    (Tier::Easy, "Which number is even?", ["13", "21", "35", "48"], 3, "Even numbers end in 0, 2, 4, 6 or 8."),
    (Tier::Medium, "What is 144 / 12?", ["11", "12", "13", "14"], 1, "A dozen dozens is 144."),
    (Tier::Medium, "What is 3/4 written as a decimal?", ["0.34", "0.75", "0.43", "0.7"], 1, "Three quarters of a dollar."),
    (Tier::Medium, "What is the perimeter of a 4 by 6 rectangle?", ["10", "24", "20", "16"], 2, "Add all four sides."),
    (Tier::Medium, "Which is a prime number?", ["21", "27", "29", "33"], 2, "It has no divisors except 1 and itself."),
    (Tier::Medium, "What is 15% of 200?", ["15", "30", "20", "45"], 1, "10% is 20, 5% is 10."),
    (Tier::Hard, "What is the area of a triangle with base 10 and height 7?", ["70", "35", "17", "49"], 1, "Half of base times height."),
    (Tier::Hard, "What is 2 to the power of 10?", ["512", "1000", "1024", "2048"], 2, "Double 512."),
    (Tier::Hard, "What is the least common multiple of 6 and 8?", ["24", "48", "12", "16"], 0, "The smallest number both divide."),
    (Tier::Hard, "How many degrees are in the interior angles of a pentagon?", ["360", "540", "720", "450"], 1, "(n - 2) x 180."),
    (Tier::Hard, "What is 0.2 x 0.3?", ["0.6", "0.06", "0.006", "6"], 1, "Multiply 2 x 3, then count decimal places."),
];

const SCIENCE: [Row; 3] = [
    (Tier::Easy, "Which planet is closest to the Sun?", ["Venus", "Earth", "Mercury", "Mars"], 2, "It is named after a messenger god."),
    (Tier::Medium, "What gas do plants absorb from the air?", ["Oxygen", "Carbon dioxide", "Nitrogen", "Helium"], 1, "We breathe it out."),
    (Tier::Hard, "What is the boiling point of water at sea level in Celsius?", ["90", "100", "110", "120"], 1, "A round number."),
];

fn build(first_id: u64, rows: &[Row]) -> Result<Vec<QuestionRecord>, QuestionError> {
    rows.iter()
        .zip(first_id..)
        .map(|(&(tier, statement, options, correct, hint), id)| {
            QuestionRecord::new(
                QuestionId::new(id),
                statement,
                options.map(String::from),
                correct,
                hint,
            )
            .map(|q| q.with_difficulty_tier(tier))
        })
        .collect()
}

/// Drill questions per tier on top of the handcrafted math rows.
const DRILLS_PER_TIER: u64 = 10;

/// Generated arithmetic drills so every fixed tier can fill a whole session.
/// The answer sits at a rotating position among four distinct candidates.
fn drills(first_id: u64) -> Result<Vec<QuestionRecord>, QuestionError> {
    let mut out = Vec::new();
    let mut id = first_id;
    for tier in Tier::ALL {
        for n in 0..DRILLS_PER_TIER {
            let a = n + 3;
            let (statement, answer, hint) = match tier {
                Tier::Easy => (format!("What is {a} + {}?", a + 4), 2 * a + 4, "Add the tens, then the ones."),
                Tier::Medium => (format!("What is {a} x 7?"), a * 7, "Count up in sevens."),
                Tier::Hard => (format!("What is {a} squared?"), a * a, "Multiply the number by itself."),
            };
            let candidates = [answer, answer + 1, answer + 2, answer + 10];
            let correct = (n % 4) as usize;
            let options: [String; 4] =
                std::array::from_fn(|k| candidates[(k + 4 - correct) % 4].to_string());
            out.push(
                QuestionRecord::new(QuestionId::new(id), statement, options, correct, hint)?
                    .with_difficulty_tier(tier),
            );
            id += 1;
        }
    }
    Ok(out)
}

/// Fill `repo` with the sample subjects.
///
/// # Errors
///
/// Returns `SeedError` if a sample question is malformed or the bank is unavailable.
pub fn seed(repo: &InMemoryRepository) -> Result<(), SeedError> {
    let mut math = build(1, &MATH)?;
    math.extend(drills(1 + MATH.len() as u64)?);
    repo.insert_questions(SAMPLE_SUBJECT, SAMPLE_GRADE, math)?;
    repo.insert_questions(SPARSE_SUBJECT, SAMPLE_GRADE, build(101, &SCIENCE)?)?;
    Ok(())
}

/// A fresh repository holding the sample bank.
///
/// # Errors
///
/// Same as [`seed`].
pub fn sample_repository() -> Result<InMemoryRepository, SeedError> {
    let repo = InMemoryRepository::new();
    seed(&repo)?;
    Ok(repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{QuestionQuery, QuestionSource};
    use quiz_core::model::DifficultyMode;

    #[tokio::test]
    async fn sample_math_bank_has_full_automatic_set() {
        let repo = sample_repository().unwrap();
        let query = QuestionQuery::new(SAMPLE_SUBJECT, SAMPLE_GRADE, DifficultyMode::Automatic, 15);
        let questions = repo.fetch_questions(&query).await.unwrap();
        assert_eq!(questions.len(), 15);
        assert_eq!(questions[0].difficulty_tier(), Some(Tier::Easy));
        assert_eq!(questions[14].difficulty_tier(), Some(Tier::Hard));
    }

    #[tokio::test]
    async fn every_math_tier_fills_a_fixed_session() {
        let repo = sample_repository().unwrap();
        for tier in Tier::ALL {
            let query = QuestionQuery::new(SAMPLE_SUBJECT, SAMPLE_GRADE, DifficultyMode::Fixed(tier), 15);
            let questions = repo.fetch_questions(&query).await.unwrap();
            assert_eq!(questions.len(), 15, "{tier:?}");
            assert!(questions.iter().all(|q| q.difficulty_tier() == Some(tier)));
        }
    }

    #[tokio::test]
    async fn automatic_set_keeps_handcrafted_questions_first() {
        let repo = sample_repository().unwrap();
        let query = QuestionQuery::new(SAMPLE_SUBJECT, SAMPLE_GRADE, DifficultyMode::Automatic, 15);
        let ids: Vec<u64> = repo
            .fetch_questions(&query)
            .await
            .unwrap()
            .iter()
            .map(|q| q.id().value())
            .collect();
        assert_eq!(ids, (1..=15).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn sparse_subject_is_short() {
        let repo = sample_repository().unwrap();
        let query = QuestionQuery::new(SPARSE_SUBJECT, SAMPLE_GRADE, DifficultyMode::Automatic, 15);
        assert_eq!(repo.fetch_questions(&query).await.unwrap().len(), 3);
    }
}
