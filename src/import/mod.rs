//! CSV question importer.
//!
//! Files dropped into an inbox directory are parsed and validated in full
//! before anything touches the database; a file either applies as one
//! transaction and moves to `processed/`, or moves to `failed/` together
//! with a `<stem>_errors.txt` log and leaves no trace in the database.

use std::fs;
use std::path::{Path, PathBuf};

mod correct;
pub use correct::resolve_correct_set;

mod error;
pub use error::{ImportError, ImportResult, RowError, RowErrorKind};

pub mod fields;

mod row;
pub use row::{RowPlan, TopicPlan, parse_rows};

use crate::model::entity::{Category, Choice, Exam, Question, QuestionUpsert, Topic};
use crate::model::{DatabaseResult, ModelManager};
use sqlx::PgConnection;

/// What happened to a single inbox file.
#[derive(Debug)]
pub struct FileOutcome {
    pub file_name: String,
    pub questions_created: u64,
    pub questions_updated: u64,
    pub choices_written: u64,
    pub row_errors: Vec<RowError>,
    pub database_error: Option<String>,
}

impl FileOutcome {
    fn clean(file_name: String, stats: ApplyStats) -> Self {
        Self {
            file_name,
            questions_created: stats.questions_created,
            questions_updated: stats.questions_updated,
            choices_written: stats.choices_written,
            row_errors: Vec::new(),
            database_error: None,
        }
    }

    fn rejected(file_name: String, row_errors: Vec<RowError>) -> Self {
        Self {
            file_name,
            questions_created: 0,
            questions_updated: 0,
            choices_written: 0,
            row_errors,
            database_error: None,
        }
    }

    fn rolled_back(file_name: String, error: String) -> Self {
        Self {
            file_name,
            questions_created: 0,
            questions_updated: 0,
            choices_written: 0,
            row_errors: Vec::new(),
            database_error: Some(error),
        }
    }

    pub fn failed(&self) -> bool {
        !self.row_errors.is_empty() || self.database_error.is_some()
    }
}

#[derive(Debug)]
pub struct ImportReport {
    pub outcomes: Vec<FileOutcome>,
}

impl ImportReport {
    pub fn files_processed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.failed()).count()
    }

    pub fn files_failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.failed()).count()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ApplyStats {
    questions_created: u64,
    questions_updated: u64,
    choices_written: u64,
}

/// Processes every `*.csv` in the inbox, one file at a time. `processed/`
/// and `failed/` are created next to the inbox directory.
pub async fn run_inbox(mm: &ModelManager, inbox: &Path) -> ImportResult<ImportReport> {
    if inbox.exists() && !inbox.is_dir() {
        return Err(ImportError::InboxNotADirectory(inbox.to_path_buf()));
    }
    fs::create_dir_all(inbox)?;

    let parent = match inbox.parent() {
        Some(parent) if parent != Path::new("") => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let processed_dir = parent.join("processed");
    let failed_dir = parent.join("failed");
    fs::create_dir_all(&processed_dir)?;
    fs::create_dir_all(&failed_dir)?;

    let mut csv_files: Vec<PathBuf> = fs::read_dir(inbox)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    csv_files.sort();

    tracing::info!(
        "found {} csv file(s) in {}",
        csv_files.len(),
        inbox.display()
    );

    let mut outcomes = Vec::with_capacity(csv_files.len());
    for file in &csv_files {
        let outcome = process_file(mm, file, &processed_dir, &failed_dir).await?;
        if outcome.failed() {
            tracing::warn!(
                "{}: failed with {} row error(s)",
                outcome.file_name,
                outcome.row_errors.len()
            );
        } else {
            tracing::info!(
                "{}: created {}, updated {}, choices {}",
                outcome.file_name,
                outcome.questions_created,
                outcome.questions_updated,
                outcome.choices_written
            );
        }
        outcomes.push(outcome);
    }

    Ok(ImportReport { outcomes })
}

/// Imports one file with all-or-nothing semantics and moves it to its final
/// location.
pub async fn process_file(
    mm: &ModelManager,
    path: &Path,
    processed_dir: &Path,
    failed_dir: &Path,
) -> ImportResult<FileOutcome> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let bytes = fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);

    let plans = match parse_rows(&content) {
        Ok(plans) => plans,
        Err(row_errors) => {
            let outcome = FileOutcome::rejected(file_name, row_errors);
            write_error_log(failed_dir, path, &outcome)?;
            move_into(path, failed_dir)?;
            return Ok(outcome);
        }
    };

    match apply_all(mm, &plans).await {
        Ok(stats) => {
            move_into(path, processed_dir)?;
            Ok(FileOutcome::clean(file_name, stats))
        }
        Err(e) => {
            // rolled back by the dropped transaction; file the input as failed
            let outcome = FileOutcome::rolled_back(file_name, e.to_string());
            write_error_log(failed_dir, path, &outcome)?;
            move_into(path, failed_dir)?;
            Ok(outcome)
        }
    }
}

async fn apply_all(mm: &ModelManager, plans: &[RowPlan]) -> DatabaseResult<ApplyStats> {
    let mut stats = ApplyStats::default();
    let mut tx = mm.executor().begin().await?;

    for plan in plans {
        apply_row(&mut tx, plan, &mut stats).await?;
    }

    tx.commit().await?;
    Ok(stats)
}

async fn apply_row(
    conn: &mut PgConnection,
    plan: &RowPlan,
    stats: &mut ApplyStats,
) -> DatabaseResult<()> {
    let category =
        Category::find_or_create(conn, &plan.category, &plan.category_description).await?;
    let exam =
        Exam::find_or_create(conn, category.id(), &plan.exam, &plan.exam_defaults).await?;

    let topic = match &plan.topic {
        Some(topic) => Some(
            Topic::find_or_create(conn, exam.id(), &topic.name, &topic.description, topic.order_index)
                .await?,
        ),
        None => None,
    };

    let upsert = QuestionUpsert {
        topic_id: topic.as_ref().map(Topic::id),
        question_type: plan.question_type,
        difficulty: plan.difficulty,
        explanation: plan.explanation.clone(),
        points: plan.points,
        order_index: plan.order_index,
        is_active: plan.is_active,
    };

    let question =
        match Question::find_by_exam_and_text(conn, exam.id(), &plan.question_text).await? {
            Some(mut question) => {
                question.update_in_place(conn, &upsert).await?;
                stats.questions_updated += 1;
                question
            }
            None => {
                stats.questions_created += 1;
                Question::create(conn, exam.id(), &plan.question_text, &upsert).await?
            }
        };

    stats.choices_written += Choice::replace_for_question(conn, question.id(), &plan.choices).await?;
    Ok(())
}

fn move_into(path: &Path, dir: &Path) -> std::io::Result<PathBuf> {
    let dest = dir.join(path.file_name().unwrap_or_default());
    if dest.exists() {
        fs::remove_file(&dest)?;
    }
    fs::rename(path, &dest)?;
    Ok(dest)
}

fn write_error_log(
    failed_dir: &Path,
    path: &Path,
    outcome: &FileOutcome,
) -> std::io::Result<()> {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let log_path = failed_dir.join(format!("{stem}_errors.txt"));

    let mut body = format!("Errors processing {}:\n\n", outcome.file_name);
    for error in &outcome.row_errors {
        body.push_str(&format!("{error}\n"));
    }
    if let Some(database_error) = &outcome.database_error {
        body.push_str(&format!("{database_error}\n"));
    }

    fs::write(log_path, body)
}
