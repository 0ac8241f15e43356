//! Prosody quiz: question rounds, answer resolution and the stdin loop.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use clap::ValueEnum;
use rand::Rng;
use rust_i18n::t;
use tracing::warn;

use crate::engine::stats::StatsAggregator;
use crate::oracle::prosody::{ProsodyLab, QuizKind, QuizLevel};
use crate::oracle::schema::QuizQuestion;
use crate::store::schema::SessionStat;
use crate::text::normalize_input;

/// Which kind of question to ask next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum KindChoice {
    Knowledge,
    Skill,
    #[default]
    Mixed,
}

impl KindChoice {
    pub fn pick<R: Rng>(self, rng: &mut R) -> QuizKind {
        match self {
            KindChoice::Knowledge => QuizKind::Knowledge,
            KindChoice::Skill => QuizKind::Skill,
            KindChoice::Mixed => {
                if rng.gen_bool(0.5) {
                    QuizKind::Knowledge
                } else {
                    QuizKind::Skill
                }
            }
        }
    }
}

pub struct QuizRound {
    pub question: QuizQuestion,
    pub kind: QuizKind,
    started: Instant,
}

impl QuizRound {
    pub fn start(question: QuizQuestion, kind: QuizKind) -> Self {
        Self::started_at(question, kind, Instant::now())
    }

    pub fn started_at(question: QuizQuestion, kind: QuizKind, started: Instant) -> Self {
        Self {
            question,
            kind,
            started,
        }
    }

    /// Map a typed answer to the text graded by the oracle.
    ///
    /// For multiple-choice questions `"2"` selects the second option; any
    /// other input is taken as a free-text answer.
    pub fn resolve_answer(&self, input: &str) -> String {
        let input = normalize_input(input);
        let options = &self.question.options;
        match input.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => options[n - 1].clone(),
            _ => input,
        }
    }

    /// Elapsed time measured up to `now`.
    pub fn elapsed_ms_at(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.started).as_millis() as u64
    }

    pub fn category(&self) -> &'static str {
        self.kind.as_str()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct QuizPlan {
    pub choice: KindChoice,
    pub level: QuizLevel,
    pub questions: u32,
}

enum Reply {
    Answer(String),
    Quit,
}

/// Interactive quiz over `input`/`output`.
///
/// Each graded answer is recorded in `stats`; the session is flushed and
/// reset at the end, also on `q` or end of input. A question that fails to
/// load ends the quiz; a feedback failure skips recording that answer.
pub fn run_quiz<R: BufRead, W: Write, G: Rng>(
    lab: &ProsodyLab,
    stats: &mut StatsAggregator,
    plan: QuizPlan,
    rng: &mut G,
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<SessionStat>> {
    for number in 1..=plan.questions.max(1) {
        let kind = plan.choice.pick(rng);
        let question = match lab.generate_quiz_question(kind, plan.level) {
            Ok(q) => q,
            Err(e) => {
                warn!(error = %e, kind = kind.as_str(), "could not load quiz question");
                writeln!(output, "{}", e.user_message())?;
                break;
            }
        };
        let round = QuizRound::start(question, kind);
        print_question(&round, number, plan.questions, output)?;

        let answer = match read_reply(&round, input, output)? {
            Reply::Answer(answer) => answer,
            Reply::Quit => break,
        };
        let duration_ms = round.elapsed_ms_at(Instant::now());

        let q = &round.question;
        match lab.get_feedback(&q.question, &answer, &q.correct_answer) {
            Ok(feedback) => {
                stats.record_outcome(round.category(), feedback.is_correct, duration_ms);
                let verdict = if feedback.is_correct {
                    t!("quiz.correct")
                } else {
                    t!("quiz.incorrect", answer = q.correct_answer.as_str())
                };
                writeln!(output, "\n{verdict}  ({:.1}/10)", feedback.score)?;
                writeln!(output, "{}", feedback.message)?;
                writeln!(output, "{}", feedback.guidance)?;
                writeln!(output, "{}: {}\n", t!("quiz.explanation"), q.explanation)?;
            }
            Err(e) => {
                warn!(error = %e, "feedback request failed, answer not recorded");
                writeln!(output, "{}\n", e.user_message())?;
            }
        }
    }

    let summary = stats.flush();
    stats.reset_session();
    Ok(summary)
}

fn print_question<W: Write>(round: &QuizRound, number: u32, total: u32, output: &mut W) -> io::Result<()> {
    writeln!(output, "[{number}/{total}] {}", round.kind.label())?;
    writeln!(output, "{}", round.question.question)?;
    for (i, option) in round.question.options.iter().enumerate() {
        writeln!(output, "  {}. {option}", i + 1)?;
    }
    Ok(())
}

fn read_reply<R: BufRead, W: Write>(round: &QuizRound, input: &mut R, output: &mut W) -> io::Result<Reply> {
    loop {
        write!(output, "{} ", t!("quiz.prompt"))?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Reply::Quit);
        }
        match line.trim() {
            "" => continue,
            "q" => return Ok(Reply::Quit),
            "h" => writeln!(output, "{}: {}", t!("quiz.hint"), round.question.hint)?,
            answer => return Ok(Reply::Answer(round.resolve_answer(answer))),
        }
    }
}
