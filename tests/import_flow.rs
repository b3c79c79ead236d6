mod common;

use std::fs;

use common::{count_rows, detached_mm, inbox_with_file, setup_test_db};
use prepdeck::import;

const HEADER: &str = "category,exam,question_text,choices,correct_choices,question_type";

#[tokio::test]
#[ignore = "requires postgres (TEST_DATABASE_ADMIN_URL)"]
async fn example_row_imports_end_to_end() {
    let db = setup_test_db().await;
    let mm = db.mm();
    let root = tempfile::tempdir().unwrap();
    let inbox = inbox_with_file(
        root.path(),
        "math.csv",
        &format!("{HEADER}\nMath,SAT,What is 2+2?,2|3|4|5,3,single\n"),
    );

    let report = import::run_inbox(&mm, &inbox).await.unwrap();
    assert_eq!(report.files_processed(), 1);
    assert_eq!(report.files_failed(), 0);

    // the input moved to the processed folder
    assert!(root.path().join("processed").join("math.csv").exists());
    assert!(!inbox.join("math.csv").exists());

    let category: String = sqlx::query_scalar("SELECT name FROM categories")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(category, "Math");

    let exam: String = sqlx::query_scalar("SELECT name FROM exams")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(exam, "SAT");

    let question: String = sqlx::query_scalar("SELECT question_text FROM questions")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(question, "What is 2+2?");

    assert_eq!(count_rows(db.pool(), "choices").await, 4);
    let correct: Vec<String> =
        sqlx::query_scalar("SELECT choice_text FROM choices WHERE is_correct ORDER BY order_index")
            .fetch_all(db.pool())
            .await
            .unwrap();
    assert_eq!(correct, vec!["4"]);
}

#[tokio::test]
#[ignore = "requires postgres (TEST_DATABASE_ADMIN_URL)"]
async fn both_correct_choice_forms_mark_the_right_rows() {
    let db = setup_test_db().await;
    let mm = db.mm();
    let root = tempfile::tempdir().unwrap();
    let inbox = inbox_with_file(
        root.path(),
        "forms.csv",
        &format!(
            "{HEADER}\nMath,SAT,Pick odds,A|B|C|D,\"1,3\",multiple\nMath,SAT,Pick evens,A|B|C|D,B|D,multiple\n"
        ),
    );

    let report = import::run_inbox(&mm, &inbox).await.unwrap();
    assert_eq!(report.files_processed(), 1);

    let odds: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT c.choice_text FROM choices c
        JOIN questions q ON q.id = c.question_id
        WHERE q.question_text = 'Pick odds' AND c.is_correct
        ORDER BY c.order_index
        "#,
    )
    .fetch_all(db.pool())
    .await
    .unwrap();
    assert_eq!(odds, vec!["A", "C"]);

    let evens: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT c.choice_text FROM choices c
        JOIN questions q ON q.id = c.question_id
        WHERE q.question_text = 'Pick evens' AND c.is_correct
        ORDER BY c.order_index
        "#,
    )
    .fetch_all(db.pool())
    .await
    .unwrap();
    assert_eq!(evens, vec!["B", "D"]);
}

#[tokio::test]
#[ignore = "requires postgres (TEST_DATABASE_ADMIN_URL)"]
async fn bracketed_fields_persist_without_brackets() {
    let db = setup_test_db().await;
    let mm = db.mm();
    let root = tempfile::tempdir().unwrap();
    let inbox = inbox_with_file(
        root.path(),
        "brackets.csv",
        &format!(
            "{HEADER}\n[History, Modern],WW2,[When did it end, roughly?],[1944, spring]|[1945, autumn],2,single\n"
        ),
    );

    let report = import::run_inbox(&mm, &inbox).await.unwrap();
    assert_eq!(report.files_processed(), 1);

    let category: String = sqlx::query_scalar("SELECT name FROM categories")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(category, "History, Modern");

    let question: String = sqlx::query_scalar("SELECT question_text FROM questions")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(question, "When did it end, roughly?");

    let choices: Vec<String> =
        sqlx::query_scalar("SELECT choice_text FROM choices ORDER BY order_index")
            .fetch_all(db.pool())
            .await
            .unwrap();
    assert_eq!(choices, vec!["1944, spring", "1945, autumn"]);
    for choice in &choices {
        assert!(!choice.contains('[') && !choice.contains(']'));
    }
}

#[tokio::test]
#[ignore = "requires postgres (TEST_DATABASE_ADMIN_URL)"]
async fn reimport_is_idempotent_and_replaces_choices() {
    let db = setup_test_db().await;
    let mm = db.mm();
    let root = tempfile::tempdir().unwrap();

    let file = format!("{HEADER}\nMath,SAT,What is 2+2?,2|3|4|5,3,single\n");
    let inbox = inbox_with_file(root.path(), "repeat.csv", &file);
    import::run_inbox(&mm, &inbox).await.unwrap();

    let questions_before = count_rows(db.pool(), "questions").await;
    let choices_before = count_rows(db.pool(), "choices").await;

    // same file again; the first run moved the original away
    fs::write(inbox.join("repeat.csv"), &file).unwrap();
    let report = import::run_inbox(&mm, &inbox).await.unwrap();
    assert_eq!(report.files_processed(), 1);
    assert_eq!(report.outcomes[0].questions_updated, 1);
    assert_eq!(report.outcomes[0].questions_created, 0);

    assert_eq!(count_rows(db.pool(), "questions").await, questions_before);
    assert_eq!(count_rows(db.pool(), "choices").await, choices_before);

    // a changed choice set fully replaces the old one
    let changed = format!("{HEADER}\nMath,SAT,What is 2+2?,4|5,1,single\n");
    fs::write(inbox.join("repeat.csv"), &changed).unwrap();
    import::run_inbox(&mm, &inbox).await.unwrap();

    assert_eq!(count_rows(db.pool(), "questions").await, 1);
    let choices: Vec<String> =
        sqlx::query_scalar("SELECT choice_text FROM choices ORDER BY order_index")
            .fetch_all(db.pool())
            .await
            .unwrap();
    assert_eq!(choices, vec!["4", "5"]);
}

#[tokio::test]
#[ignore = "requires postgres (TEST_DATABASE_ADMIN_URL)"]
async fn one_bad_row_rolls_back_the_whole_file() {
    let db = setup_test_db().await;
    let mm = db.mm();
    let root = tempfile::tempdir().unwrap();
    let inbox = inbox_with_file(
        root.path(),
        "mixed.csv",
        &format!("{HEADER}\nMath,SAT,Good?,A|B,1,single\nMath,SAT,Bad?,A|B,9,single\n"),
    );

    let report = import::run_inbox(&mm, &inbox).await.unwrap();
    assert_eq!(report.files_failed(), 1);

    assert_eq!(count_rows(db.pool(), "questions").await, 0);
    assert_eq!(count_rows(db.pool(), "choices").await, 0);
    assert_eq!(count_rows(db.pool(), "categories").await, 0);

    assert!(root.path().join("failed").join("mixed.csv").exists());
    let log = fs::read_to_string(root.path().join("failed").join("mixed_errors.txt")).unwrap();
    assert!(log.contains("row 3"));
    assert!(log.contains("UnresolvableCorrectChoice"));
}

// The rejection path never touches the database, so it runs without one.
#[tokio::test]
async fn rejected_file_is_filed_with_an_error_log() {
    let mm = detached_mm();
    let root = tempfile::tempdir().unwrap();
    let inbox = inbox_with_file(
        root.path(),
        "broken.csv",
        &format!("{HEADER}\nMath,SAT,Q?,A|B,7,single\n"),
    );

    let report = import::run_inbox(&mm, &inbox).await.unwrap();
    assert_eq!(report.files_processed(), 0);
    assert_eq!(report.files_failed(), 1);
    assert_eq!(report.outcomes[0].row_errors.len(), 1);

    assert!(!inbox.join("broken.csv").exists());
    assert!(root.path().join("failed").join("broken.csv").exists());

    let log = fs::read_to_string(root.path().join("failed").join("broken_errors.txt")).unwrap();
    assert!(log.contains("Errors processing broken.csv"));
    assert!(log.contains("row 2: UnresolvableCorrectChoice"));
}

#[tokio::test]
async fn missing_header_column_fails_without_database() {
    let mm = detached_mm();
    let root = tempfile::tempdir().unwrap();
    let inbox = inbox_with_file(root.path(), "noheader.csv", "category,exam\nMath,SAT\n");

    let report = import::run_inbox(&mm, &inbox).await.unwrap();
    assert_eq!(report.files_failed(), 1);

    let errors = &report.outcomes[0].row_errors;
    assert_eq!(errors[0].row, 1);
    assert!(errors[0].message.contains("question_text"));
    assert!(errors[0].message.contains("choices"));
}

#[tokio::test]
async fn empty_inbox_is_a_clean_noop() {
    let mm = detached_mm();
    let root = tempfile::tempdir().unwrap();
    let inbox = root.path().join("inbox");

    let report = import::run_inbox(&mm, &inbox).await.unwrap();
    assert!(report.outcomes.is_empty());
    assert!(root.path().join("processed").is_dir());
    assert!(root.path().join("failed").is_dir());
}
