use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_i18n::t;

use basira::config::Config;
use basira::engine::quiz::{KindChoice, QuizPlan, run_quiz};
use basira::engine::stats::StatsAggregator;
use basira::error::AppError;
use basira::logging;
use basira::meters;
use basira::oracle::gemini::GeminiClient;
use basira::oracle::prosody::{MAX_POEM_VERSES, ProsodyLab, QuizLevel};
use basira::store::json_store::JsonStore;
use basira::store::schema::AggregateStats;

rust_i18n::i18n!("locales", fallback = "en");

#[derive(Parser)]
#[command(name = "arudi", version, about = "Arabic prosody lab: scansion, poems and quizzes")]
struct Cli {
    #[arg(short, long, global = true, help = "Output language (ar, en)")]
    locale: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a verse: meter, feet, and metrical faults
    Analyze {
        verse: String,
    },
    /// Compose verses on a topic in a given meter
    Generate {
        #[arg(long)]
        topic: String,
        #[arg(long, help = "One of the sixteen meters, see `arudi meters`")]
        meter: String,
        #[arg(long, default_value_t = 4, help = "Number of verses (1-10)")]
        count: u32,
    },
    /// Short creative prompts for a topic
    Suggest {
        #[arg(long)]
        topic: String,
    },
    /// Interactive quiz; answers are read from stdin
    Quiz {
        #[arg(long, value_enum, default_value_t = KindChoice::Mixed)]
        kind: KindChoice,
        #[arg(long, value_enum)]
        level: Option<QuizLevel>,
        #[arg(long, default_value_t = 5)]
        questions: u32,
    },
    /// Suggested lessons for a level
    Lessons {
        #[arg(long, value_enum)]
        level: Option<QuizLevel>,
    },
    /// The sixteen meters accepted by `generate --meter`
    Meters,
    /// Lifetime quiz statistics
    Stats {
        #[arg(long, help = "Erase all saved statistics")]
        reset: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_stderr_logging();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("ignoring config file: {e:#}");
        Config::default()
    });
    if let Some(locale) = cli.locale {
        config.locale = locale;
        config.validate();
    }
    rust_i18n::set_locale(&config.locale);

    match cli.command {
        Command::Stats { reset } => {
            let mut stats = open_stats(&config)?;
            if reset {
                stats.reset_all();
                println!("{}", t!("cli.stats_reset"));
            }
            print_aggregate(stats.aggregate());
            Ok(())
        }
        Command::Lessons { level } => {
            print_lessons(level.unwrap_or_else(|| config.quiz_level()));
            Ok(())
        }
        Command::Meters => {
            print_meters();
            Ok(())
        }
        command => {
            let client = GeminiClient::from_config(&config).map_err(user_error)?;
            let lab = ProsodyLab::new(&client, config.prosody_models());
            run_lab_command(&config, &lab, command)
        }
    }
}

fn user_error(e: AppError) -> anyhow::Error {
    anyhow::anyhow!(e.user_message())
}

fn open_stats(config: &Config) -> Result<StatsAggregator> {
    let store = JsonStore::with_base_dir(config.data_path())
        .with_context(|| format!("opening data directory {}", config.data_dir))?;
    Ok(StatsAggregator::load(Box::new(store)))
}

fn run_lab_command(config: &Config, lab: &ProsodyLab, command: Command) -> Result<()> {
    match command {
        Command::Analyze { verse } => {
            let analysis = lab.analyze_verse(&verse).map_err(user_error)?;
            println!("{}", analysis.diacritized_verse);
            println!("{}: {}", t!("cli.meter"), analysis.meter);
            println!("{}: {}", t!("cli.scanning"), analysis.scanning);
            println!("{}: {}", t!("cli.feet"), analysis.feet.join(" | "));
            if !analysis.syllables.is_empty() {
                println!("{}: {}", t!("cli.syllables"), analysis.syllables.join(" "));
            }
            let verdict = if analysis.is_correct {
                t!("cli.meter_sound")
            } else {
                t!("cli.meter_broken")
            };
            println!("{verdict}");
            for error in &analysis.errors {
                println!("  - {error}");
            }
            println!("\n{}", analysis.explanation);
        }
        Command::Generate { topic, meter, count } => {
            if count == 0 || count > MAX_POEM_VERSES {
                eprintln!("{}", t!("cli.count_clamped", max = MAX_POEM_VERSES));
            }
            let verses = lab.generate_poem(&topic, &meter, count).map_err(user_error)?;
            for verse in verses {
                println!("{verse}");
            }
        }
        Command::Suggest { topic } => {
            let ideas = lab.get_suggestions(&topic).map_err(user_error)?;
            println!("{}: {}", t!("cli.themes"), ideas.themes.join("، "));
            println!("{}: {}", t!("cli.imagery"), ideas.imagery.join("، "));
            println!("{}: {}", t!("cli.emotions"), ideas.emotions.join("، "));
        }
        Command::Quiz {
            kind,
            level,
            questions,
        } => {
            let mut stats = open_stats(config)?;
            let plan = QuizPlan {
                choice: kind,
                level: level.unwrap_or_else(|| config.quiz_level()),
                questions,
            };
            println!("{}", t!("cli.quiz_intro"));
            let mut rng = SmallRng::from_entropy();
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stdout();
            let summary = run_quiz(lab, &mut stats, plan, &mut rng, &mut input, &mut output)?;
            output.flush()?;

            match summary {
                Some(session) => println!(
                    "{}",
                    t!(
                        "cli.session_summary",
                        correct = session.correct_count,
                        total = session.total_count,
                        accuracy = session.accuracy_percent(),
                        seconds = format!("{:.1}", session.average_duration_seconds)
                    )
                ),
                None => println!("{}", t!("cli.no_answers")),
            }
            print_aggregate(stats.aggregate());
        }
        Command::Lessons { .. } | Command::Meters | Command::Stats { .. } => {}
    }
    Ok(())
}

fn print_lessons(level: QuizLevel) {
    println!("{}", t!("cli.lessons_title", level = level.label()));
    for lesson in meters::lessons_for(level) {
        println!("  {}. {}", lesson.id, lesson.title);
        println!("     {}", lesson.summary);
    }
}

fn print_meters() {
    println!("{}", t!("cli.meters_title"));
    println!("{}\n", t!("cli.meters_note"));
    for (i, meter) in meters::METERS.iter().enumerate() {
        println!("  {:>2}. {meter}", i + 1);
    }
}

fn print_aggregate(stats: &AggregateStats) {
    println!("\n{}", t!("cli.lifetime_title"));
    println!(
        "  {}",
        t!(
            "cli.lifetime_accuracy",
            accuracy = stats.accuracy_percent(),
            correct = stats.total_correct,
            total = stats.total_questions
        )
    );
    println!(
        "  {}",
        t!("cli.lifetime_time", seconds = format!("{:.1}", stats.average_time_seconds()))
    );
    for (category, missed) in &stats.missed_by_category {
        println!("  {}", t!("cli.missed", category = category, count = missed));
    }
    if !stats.session_history.is_empty() {
        println!("  {}", t!("cli.recent_sessions"));
        for session in &stats.session_history {
            println!(
                "    {}  {}/{}  {}%",
                session.taken_at.format("%Y-%m-%d %H:%M"),
                session.correct_count,
                session.total_count,
                session.accuracy_percent()
            );
        }
    }
}
