//! Per-row parsing: turns one CSV record into a validated [`RowPlan`] ready
//! to be applied against the database. Everything here is pure; the
//! transactional side lives in the module root.

use std::collections::HashMap;

use csv::StringRecord;

use crate::import::correct::resolve_correct_set;
use crate::import::error::{RowError, RowErrorKind};
use crate::import::fields::{
    clean_field, mask_bracketed_commas, normalize_header, parse_bool_flag, split_choices,
};
use crate::model::entity::{Difficulty, ExamDefaults, NewChoice, QuestionType};

const REQUIRED_COLUMNS: [&str; 3] = ["exam", "question_text", "choices"];

#[derive(Debug, Clone)]
pub struct TopicPlan {
    pub name: String,
    pub description: String,
    pub order_index: i32,
}

/// Fully validated content of one CSV row.
#[derive(Debug, Clone)]
pub struct RowPlan {
    pub category: String,
    pub category_description: String,
    pub exam: String,
    pub exam_defaults: ExamDefaults,
    pub topic: Option<TopicPlan>,
    pub question_text: String,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub explanation: String,
    pub points: i32,
    pub order_index: i32,
    pub is_active: bool,
    pub choices: Vec<NewChoice>,
}

struct HeaderMap {
    columns: HashMap<String, usize>,
}

impl HeaderMap {
    fn new(headers: &StringRecord) -> Self {
        let mut columns = HashMap::new();
        for (index, name) in headers.iter().enumerate() {
            columns.entry(normalize_header(name)).or_insert(index);
        }
        Self { columns }
    }

    fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|column| !self.columns.contains_key(**column))
            .copied()
            .collect()
    }

    fn value(&self, record: &StringRecord, column: &str) -> String {
        self.columns
            .get(column)
            .and_then(|&index| record.get(index))
            .map(clean_field)
            .unwrap_or_default()
    }
}

fn int_or(value: &str, default: i32) -> i32 {
    if value.is_empty() {
        return default;
    }
    value.parse().unwrap_or(default)
}

fn parse_row(map: &HeaderMap, record: &StringRecord, row: usize) -> Result<RowPlan, RowError> {
    let exam = map.value(record, "exam");
    if exam.is_empty() {
        return Err(RowError::new(
            row,
            RowErrorKind::MissingRequiredColumn,
            "exam value is empty",
        ));
    }

    let question_text = map.value(record, "question_text");
    if question_text.is_empty() {
        return Err(RowError::new(
            row,
            RowErrorKind::MissingRequiredColumn,
            "question_text value is empty",
        ));
    }

    let mut category = map.value(record, "category");
    if category.is_empty() {
        category = "General".to_string();
    }
    let category_description = format!("Category for {category} exams");

    let exam_defaults = ExamDefaults {
        description: map.value(record, "exam_description"),
        duration_minutes: int_or(&map.value(record, "duration_minutes"), 60),
        total_questions: int_or(&map.value(record, "total_questions"), 10),
        passing_score: int_or(&map.value(record, "passing_score"), 60),
    };

    let topic_name = map.value(record, "topic");
    let topic = (!topic_name.is_empty()).then(|| TopicPlan {
        name: topic_name,
        description: map.value(record, "topic_description"),
        order_index: int_or(&map.value(record, "topic_order"), 0),
    });

    let question_type = match map.value(record, "question_type") {
        raw if raw.is_empty() => QuestionType::Single,
        raw => QuestionType::parse(&raw.to_lowercase()).ok_or_else(|| {
            RowError::new(
                row,
                RowErrorKind::InvalidEnumValue,
                format!("unknown question_type \"{raw}\" (single, multiple, true_false)"),
            )
        })?,
    };

    let difficulty = match map.value(record, "difficulty") {
        raw if raw.is_empty() => Difficulty::Medium,
        raw => Difficulty::parse(&raw.to_lowercase()).ok_or_else(|| {
            RowError::new(
                row,
                RowErrorKind::InvalidEnumValue,
                format!("unknown difficulty \"{raw}\" (easy, medium, hard)"),
            )
        })?,
    };

    let is_active = match map.value(record, "is_active") {
        raw if raw.is_empty() => true,
        raw => parse_bool_flag(&raw).ok_or_else(|| {
            RowError::new(
                row,
                RowErrorKind::InvalidEnumValue,
                format!("unknown is_active value \"{raw}\""),
            )
        })?,
    };

    let choices_raw = map.value(record, "choices");
    if choices_raw.is_empty() {
        return Err(RowError::new(
            row,
            RowErrorKind::MalformedChoiceList,
            "choices value is empty",
        ));
    }

    let choice_texts = split_choices(&choices_raw);
    if choice_texts.len() < 2 {
        return Err(RowError::new(
            row,
            RowErrorKind::MalformedChoiceList,
            format!(
                "choices must contain at least two options, got {}",
                choice_texts.len()
            ),
        ));
    }

    let correct_raw = map.value(record, "correct_choices");
    let correct_set = resolve_correct_set(&correct_raw, &choice_texts)
        .map_err(|message| RowError::new(row, RowErrorKind::UnresolvableCorrectChoice, message))?;

    if question_type.single_answer() && correct_set.len() != 1 {
        return Err(RowError::new(
            row,
            RowErrorKind::UnresolvableCorrectChoice,
            format!(
                "{question_type} questions need exactly one correct choice, got {}",
                correct_set.len()
            ),
        ));
    }

    let choices = choice_texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| NewChoice {
            text,
            is_correct: correct_set.contains(&index),
        })
        .collect();

    Ok(RowPlan {
        category,
        category_description,
        exam,
        exam_defaults,
        topic,
        question_text,
        question_type,
        difficulty,
        explanation: map.value(record, "explanation"),
        points: int_or(&map.value(record, "points"), 1),
        order_index: int_or(&map.value(record, "order"), 0),
        is_active,
        choices,
    })
}

/// Parses a whole CSV file into row plans. Either every row is valid, or the
/// full list of failing rows comes back and nothing may be applied.
pub fn parse_rows(content: &str) -> Result<Vec<RowPlan>, Vec<RowError>> {
    let masked = mask_bracketed_commas(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(masked.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            return Err(vec![RowError::new(
                1,
                RowErrorKind::MissingRequiredColumn,
                format!("unreadable header row: {e}"),
            )]);
        }
    };

    let map = HeaderMap::new(&headers);
    let missing = map.missing_required();
    if !missing.is_empty() {
        return Err(vec![RowError::new(
            1,
            RowErrorKind::MissingRequiredColumn,
            format!("missing required column(s): {}", missing.join(", ")),
        )]);
    }

    let mut plans = Vec::new();
    let mut errors = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let row = index + 2; // 1-based, header is row 1

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                errors.push(RowError::new(
                    row,
                    RowErrorKind::MissingRequiredColumn,
                    format!("unreadable record: {e}"),
                ));
                continue;
            }
        };

        // blank rows are allowed and skipped
        if record.iter().all(|field| clean_field(field).is_empty()) {
            continue;
        }

        match parse_row(&map, &record, row) {
            Ok(plan) => plans.push(plan),
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() { Ok(plans) } else { Err(errors) }
}

#[cfg(test)]
mod test {
    use super::*;

    const HEADER: &str = "category,exam,question_text,choices,correct_choices,question_type";

    fn parse_one(row: &str) -> RowPlan {
        let content = format!("{HEADER}\n{row}\n");
        let mut plans = parse_rows(&content).expect("row should parse");
        assert_eq!(plans.len(), 1);
        plans.remove(0)
    }

    fn parse_err(row: &str) -> Vec<RowError> {
        let content = format!("{HEADER}\n{row}\n");
        parse_rows(&content).expect_err("row should fail")
    }

    #[test]
    fn the_documented_example_row() {
        let plan = parse_one("Math,SAT,What is 2+2?,2|3|4|5,3,single");

        assert_eq!(plan.category, "Math");
        assert_eq!(plan.exam, "SAT");
        assert_eq!(plan.question_text, "What is 2+2?");
        assert_eq!(plan.question_type, QuestionType::Single);
        assert_eq!(plan.difficulty, Difficulty::Medium);
        assert_eq!(plan.points, 1);
        assert!(plan.is_active);

        let flags: Vec<(&str, bool)> = plan
            .choices
            .iter()
            .map(|c| (c.text.as_str(), c.is_correct))
            .collect();
        assert_eq!(
            flags,
            vec![("2", false), ("3", false), ("4", true), ("5", false)]
        );
    }

    #[test]
    fn index_list_form_marks_first_and_third() {
        let plan = parse_one("Math,SAT,Pick odds,A|B|C|D,\"1,3\",multiple");
        let correct: Vec<&str> = plan
            .choices
            .iter()
            .filter(|c| c.is_correct)
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(correct, vec!["A", "C"]);
    }

    #[test]
    fn text_list_form_marks_b_and_d() {
        let plan = parse_one("Math,SAT,Pick evens,A|B|C|D,B|D,multiple");
        let correct: Vec<&str> = plan
            .choices
            .iter()
            .filter(|c| c.is_correct)
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(correct, vec!["B", "D"]);
    }

    #[test]
    fn bracketed_fields_lose_their_wrapper() {
        let plan = parse_one("[History, Modern],WW2,[When did it end, roughly?],1944|1945,2,single");
        assert_eq!(plan.category, "History, Modern");
        assert_eq!(plan.question_text, "When did it end, roughly?");
        assert!(!plan.question_text.contains('['));
    }

    #[test]
    fn missing_category_defaults_to_general() {
        let plan = parse_one(",SAT,Q?,A|B,1,single");
        assert_eq!(plan.category, "General");
        assert_eq!(plan.category_description, "Category for General exams");
    }

    #[test]
    fn header_names_are_case_and_space_insensitive() {
        let content = "Category,Exam,Question Text,Choices,Correct Choices\nMath,SAT,Q?,A|B,2\n";
        let plans = parse_rows(content).unwrap();
        assert_eq!(plans[0].choices[1].text, "B");
        assert!(plans[0].choices[1].is_correct);
    }

    #[test]
    fn missing_required_header_fails_at_row_one() {
        let errors = parse_rows("category,question_text\nMath,Q?\n").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, 1);
        assert_eq!(errors[0].kind, RowErrorKind::MissingRequiredColumn);
        assert!(errors[0].message.contains("exam"));
        assert!(errors[0].message.contains("choices"));
    }

    #[test]
    fn empty_exam_value_fails_the_row() {
        let errors = parse_err("Math,,Q?,A|B,1,single");
        assert_eq!(errors[0].kind, RowErrorKind::MissingRequiredColumn);
        assert_eq!(errors[0].row, 2);
    }

    #[test]
    fn single_choice_list_is_malformed() {
        let errors = parse_err("Math,SAT,Q?,OnlyOne,1,single");
        assert_eq!(errors[0].kind, RowErrorKind::MalformedChoiceList);
    }

    #[test]
    fn out_of_range_index_is_unresolvable() {
        let errors = parse_err("Math,SAT,Q?,A|B,7,single");
        assert_eq!(errors[0].kind, RowErrorKind::UnresolvableCorrectChoice);
    }

    #[test]
    fn single_type_rejects_two_correct_choices() {
        let errors = parse_err("Math,SAT,Q?,A|B|C,1|2,single");
        assert_eq!(errors[0].kind, RowErrorKind::UnresolvableCorrectChoice);
        assert!(errors[0].message.contains("exactly one"));
    }

    #[test]
    fn multiple_type_accepts_two_correct_choices() {
        let plan = parse_one("Math,SAT,Q?,A|B|C,1|2,multiple");
        assert_eq!(plan.choices.iter().filter(|c| c.is_correct).count(), 2);
    }

    #[test]
    fn bad_enums_are_rejected_not_defaulted() {
        let errors = parse_err("Math,SAT,Q?,A|B,1,guess");
        assert_eq!(errors[0].kind, RowErrorKind::InvalidEnumValue);

        let content =
            format!("{HEADER},difficulty\nMath,SAT,Q?,A|B,1,single,brutal\n");
        let errors = parse_rows(&content).unwrap_err();
        assert_eq!(errors[0].kind, RowErrorKind::InvalidEnumValue);

        let content =
            format!("{HEADER},is_active\nMath,SAT,Q?,A|B,1,single,perhaps\n");
        let errors = parse_rows(&content).unwrap_err();
        assert_eq!(errors[0].kind, RowErrorKind::InvalidEnumValue);
    }

    #[test]
    fn unparsable_points_fall_back_to_default() {
        let content = format!("{HEADER},points\nMath,SAT,Q?,A|B,1,single,many\n");
        let plans = parse_rows(&content).unwrap();
        assert_eq!(plans[0].points, 1);
    }

    #[test]
    fn blank_rows_are_skipped() {
        let content = format!("{HEADER}\n,,,,,\nMath,SAT,Q?,A|B,1,single\n");
        let plans = parse_rows(&content).unwrap();
        assert_eq!(plans.len(), 1);
    }

    #[test]
    fn all_failing_rows_are_reported() {
        let content = format!(
            "{HEADER}\nMath,SAT,Q1?,A|B,9,single\nMath,SAT,Q2?,A|B,1,single\nMath,SAT,Q3?,Solo,1,single\n"
        );
        let errors = parse_rows(&content).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].row, 2);
        assert_eq!(errors[1].row, 4);
    }

    #[test]
    fn topic_metadata_is_carried() {
        let content = "exam,question_text,choices,correct_choices,topic,topic_description,topic_order\n\
                       SAT,Q?,A|B,1,Algebra,Linear things,3\n";
        let plans = parse_rows(content).unwrap();
        let topic = plans[0].topic.as_ref().unwrap();
        assert_eq!(topic.name, "Algebra");
        assert_eq!(topic.description, "Linear things");
        assert_eq!(topic.order_index, 3);
    }
}
