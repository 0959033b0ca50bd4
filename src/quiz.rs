use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context as _;
use regex::Regex;

use crate::sql::quote;

static QUESTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"### Question (\d+)[ \t]*\r?\n").expect("valid question heading regex")
});
static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-D])\)\s*(.+)$").expect("valid option line regex"));
static EXPLANATION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*Explanation[^*\n]*:\*\*").expect("valid explanation marker regex")
});
static LEADING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+").expect("valid leading digits regex"));

const QUESTION_TEXT: &str = "**Question Text:**";
const OPTIONS: &str = "**Options:**";
const CORRECT_ANSWER: &str = "**Correct Answer:**";
const PLACEHOLDER: &str = "[Your question here]";

const DEFAULT_PASSING_SCORE: u32 = 70;
const DEFAULT_DIFFICULTY: &str = "intermediate";

/// A question block that was left out of the generated SQL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizWarning {
    #[error("question {number}: missing question text, options or correct answer")]
    Malformed { number: u32 },
    #[error("question {number}: still holds the template placeholder")]
    Placeholder { number: u32 },
    #[error("question {number}: no options found")]
    NoOptions { number: u32 },
    #[error("question {number}: correct answer '{answer}' is not among the options")]
    AnswerNotInOptions { number: u32, answer: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub text: String,
    /// Option letter (`A`..`D`) to option text.
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
}

/// A filled-in quiz template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub topic_code: String,
    pub topic_title: String,
    pub product: String,
    pub difficulty: String,
    pub title: String,
    pub description: String,
    pub passing_score: u32,
    pub time_limit_minutes: Option<u32>,
    pub questions: Vec<QuizQuestion>,
    pub warnings: Vec<QuizWarning>,
}

/// Reads a quiz template; fails when it names no topic or has no usable question.
pub fn load(path: &Path) -> anyhow::Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read quiz template: {}", path.display()))?;
    let quiz = parse(&content);

    if quiz.topic_code.is_empty() {
        anyhow::bail!("quiz template has no topic code: {}", path.display());
    }
    if quiz.questions.is_empty() {
        anyhow::bail!("no valid questions found in quiz template: {}", path.display());
    }
    Ok(quiz)
}

/// Parses the markdown quiz template.
///
/// Questions that are placeholders, have no options, or whose answer is not one
/// of the options are skipped with a warning.
pub fn parse(content: &str) -> Quiz {
    let topic_code = field(content, "Topic Code").unwrap_or_default().to_owned();
    let topic_title = field(content, "Topic Title").unwrap_or_default().to_owned();

    let title = match field(content, "Quiz Title") {
        Some(title) => title.to_owned(),
        None => format!("{topic_title} - Quiz"),
    };
    let description = match description_field(content) {
        Some(description) => description.to_owned(),
        None => format!("Knowledge check for {topic_title}"),
    };

    let mut questions = Vec::new();
    let mut warnings = Vec::new();
    for (number, block) in question_blocks(content) {
        match parse_question(number, block) {
            Ok(question) => questions.push(question),
            Err(warning) => {
                tracing::warn!(%warning, "skip quiz question");
                warnings.push(warning);
            }
        }
    }

    Quiz {
        product: field(content, "Product").unwrap_or_default().to_owned(),
        difficulty: field(content, "Difficulty Level")
            .map(str::to_lowercase)
            .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_owned()),
        passing_score: number_field(content, "Passing Score").unwrap_or(DEFAULT_PASSING_SCORE),
        time_limit_minutes: number_field(content, "Time Limit"),
        topic_code,
        topic_title,
        title,
        description,
        questions,
        warnings,
    }
}

/// First non-empty line after `**{label}:**`.
fn field<'a>(content: &'a str, label: &str) -> Option<&'a str> {
    let marker = format!("**{label}:**");
    let start = content.find(&marker)? + marker.len();
    content[start..]
        .trim_start()
        .lines()
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn number_field(content: &str, label: &str) -> Option<u32> {
    let value = field(content, label)?;
    LEADING_DIGITS.find(value)?.as_str().parse().ok()
}

/// Everything after `**Description:**` up to the next heading.
fn description_field(content: &str) -> Option<&str> {
    let marker = "**Description:**";
    let start = content.find(marker)? + marker.len();
    let rest = &content[start..];
    let end = rest.find("\n##").unwrap_or(rest.len());
    Some(rest[..end].trim()).filter(|value| !value.is_empty())
}

/// `(heading number, body)` for every `### Question N` section.
///
/// A body ends at the next `---` rule or heading.
fn question_blocks(content: &str) -> Vec<(u32, &str)> {
    QUESTION_HEADING
        .captures_iter(content)
        .filter_map(|caps| {
            let heading = caps.get(0)?;
            let number: u32 = caps[1].parse().unwrap_or_default();
            let rest = &content[heading.end()..];
            let end = [rest.find("\n---"), rest.find("\n##")]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(rest.len());
            Some((number, &rest[..end]))
        })
        .collect()
}

fn parse_question(number: u32, block: &str) -> Result<QuizQuestion, QuizWarning> {
    let malformed = QuizWarning::Malformed { number };

    let after_text = split_after(block, QUESTION_TEXT).ok_or(malformed.clone())?;
    let (text, after_options) = split_at_marker(after_text, OPTIONS).ok_or(malformed.clone())?;
    let text = text.trim();
    if text.is_empty() || text.contains(PLACEHOLDER) {
        return Err(QuizWarning::Placeholder { number });
    }

    let (options_text, tail) = split_at_marker(after_options, CORRECT_ANSWER).ok_or(malformed)?;
    let options = options_text
        .lines()
        .filter_map(|line| {
            let caps = OPTION_LINE.captures(line.trim())?;
            Some((caps[1].to_owned(), caps[2].trim().to_owned()))
        })
        .collect::<BTreeMap<_, _>>();
    if options.is_empty() {
        return Err(QuizWarning::NoOptions { number });
    }

    let (answer, explanation) = match EXPLANATION_MARKER.find(tail) {
        Some(marker) => (&tail[..marker.start()], Some(tail[marker.end()..].trim())),
        None => (tail, None),
    };
    let answer = answer.trim().to_uppercase();
    if !options.contains_key(&answer) {
        return Err(QuizWarning::AnswerNotInOptions { number, answer });
    }

    Ok(QuizQuestion {
        text: text.to_owned(),
        options,
        correct_answer: answer,
        explanation: explanation
            .filter(|value| !value.is_empty())
            .map(str::to_owned),
    })
}

fn split_after<'a>(haystack: &'a str, marker: &str) -> Option<&'a str> {
    let at = haystack.find(marker)?;
    Some(&haystack[at + marker.len()..])
}

fn split_at_marker<'a>(haystack: &'a str, marker: &str) -> Option<(&'a str, &'a str)> {
    let at = haystack.find(marker)?;
    Some((&haystack[..at], &haystack[at + marker.len()..]))
}

/// Default output file for a quiz: `database/INSERT-QUIZ-{topic_code}.sql`.
pub fn default_output_path(quiz: &Quiz) -> PathBuf {
    Path::new("database").join(format!("INSERT-QUIZ-{}.sql", quiz.topic_code))
}

/// Renders one script that creates the quiz and all of its questions.
///
/// The questions are inserted in the same statement as the quiz, keyed on the
/// returned quiz id, and are numbered 1.. in template order.
pub fn render(quiz: &Quiz) -> anyhow::Result<String> {
    let mut sql = String::new();
    sql.push_str("-- Auto-generated quiz import script\n");
    sql.push_str(&format!("-- Topic: {} ({})\n", quiz.topic_title, quiz.topic_code));
    sql.push_str(&format!(
        "-- Product: {}, difficulty: {}\n",
        quiz.product, quiz.difficulty
    ));

    sql.push_str("\nWITH quiz AS (\n");
    sql.push_str("  INSERT INTO quizzes (\n");
    sql.push_str("    id,\n    topic_id,\n    title,\n    description,\n");
    sql.push_str("    passing_score,\n    time_limit_minutes,\n    published\n");
    sql.push_str("  ) VALUES (\n");
    sql.push_str("    gen_random_uuid(),\n");
    sql.push_str(&format!(
        "    (SELECT id FROM topics WHERE code = {}),\n",
        quote(&quiz.topic_code)
    ));
    sql.push_str(&format!("    {},\n", quote(&quiz.title)));
    sql.push_str(&format!("    {},\n", quote(&quiz.description)));
    sql.push_str(&format!("    {},\n", quiz.passing_score));
    match quiz.time_limit_minutes {
        Some(minutes) => sql.push_str(&format!("    {minutes},\n")),
        None => sql.push_str("    NULL,\n"),
    }
    sql.push_str("    true\n");
    sql.push_str("  )\n");
    sql.push_str("  RETURNING id\n");
    sql.push_str(")\n");

    sql.push_str("INSERT INTO quiz_questions (\n");
    sql.push_str("  id,\n  quiz_id,\n  position,\n  question,\n  options,\n");
    sql.push_str("  correct_answer,\n  explanation,\n  points\n");
    sql.push_str(")\n");
    sql.push_str("SELECT gen_random_uuid(), quiz.id, q.position, q.question, q.options::jsonb,\n");
    sql.push_str("  q.correct_answer, q.explanation, 1\n");
    sql.push_str("FROM quiz, (VALUES\n");
    let rows = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(idx, question)| {
            let options =
                serde_json::to_string(&question.options).context("serialize quiz options")?;
            let explanation = match &question.explanation {
                Some(explanation) => quote(explanation),
                None => "NULL".to_owned(),
            };
            Ok(format!(
                "  ({}, {}, {}, {}, {})",
                idx + 1,
                quote(&question.text),
                quote(&options),
                quote(&question.correct_answer),
                explanation
            ))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    sql.push_str(&rows.join(",\n"));
    sql.push_str("\n) AS q(position, question, options, correct_answer, explanation);\n");

    sql.push_str("\n-- Verify the quiz was created\n");
    sql.push_str("SELECT q.id, q.title, t.title AS topic_title, COUNT(qq.id) AS question_count\n");
    sql.push_str("FROM quizzes q\n");
    sql.push_str("JOIN topics t ON q.topic_id = t.id\n");
    sql.push_str("LEFT JOIN quiz_questions qq ON qq.quiz_id = q.id\n");
    sql.push_str(&format!("WHERE t.code = {}\n", quote(&quiz.topic_code)));
    sql.push_str("GROUP BY q.id, q.title, t.title;\n");

    Ok(sql)
}

pub fn write(quiz: &Quiz, out_path: &Path) -> anyhow::Result<()> {
    let sql = render(quiz).context("render quiz sql")?;
    crate::sql::write_script(out_path, &sql)?;
    tracing::info!(
        out = %out_path.display(),
        questions = quiz.questions.len(),
        skipped = quiz.warnings.len(),
        "quiz sql written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "\
# Quiz Template

## Topic Information
**Topic Code:** pc-01-002
**Topic Title:** Accounts and Policies
**Product:** PolicyCenter
**Difficulty Level:** Beginner

## Quiz Details
**Quiz Title:** Accounts Check
**Passing Score:** 80
**Time Limit:** 15 minutes
**Description:** Covers account basics
and policy lifecycles.

## Questions

### Question 1
**Question Text:**
What does an account hold?

**Options:**
A) Policies
B) Invoices only
C) Nothing

**Correct Answer:** a

**Explanation (optional):**
Accounts group the insured's policies.

---

### Question 2
**Question Text:**
[Your question here]

**Options:**
A) Option A
B) Option B

**Correct Answer:** A

---

### Question 3
**Question Text:**
Which one is a job?

**Options:**
(none yet)

**Correct Answer:** B

---

### Question 4
**Question Text:**
Which job renews a policy?

**Options:**
A) Submission
B) Renewal

**Correct Answer:** E

---

### Question 5
**Question Text:**
Who's the account holder?

**Options:**
A) The insured's agent
B) The named insured

**Correct Answer:** B
";

    #[test]
    fn parses_header_fields() {
        let quiz = parse(TEMPLATE);
        assert_eq!(quiz.topic_code, "pc-01-002");
        assert_eq!(quiz.topic_title, "Accounts and Policies");
        assert_eq!(quiz.product, "PolicyCenter");
        assert_eq!(quiz.difficulty, "beginner");
        assert_eq!(quiz.title, "Accounts Check");
        assert_eq!(quiz.passing_score, 80);
        assert_eq!(quiz.time_limit_minutes, Some(15));
        assert_eq!(quiz.description, "Covers account basics\nand policy lifecycles.");
    }

    #[test]
    fn missing_header_fields_fall_back_to_defaults() {
        let quiz = parse("**Topic Code:** cc-01-001\n**Topic Title:** FNOL\n");
        assert_eq!(quiz.title, "FNOL - Quiz");
        assert_eq!(quiz.description, "Knowledge check for FNOL");
        assert_eq!(quiz.passing_score, 70);
        assert_eq!(quiz.time_limit_minutes, None);
        assert_eq!(quiz.difficulty, "intermediate");
        assert!(quiz.questions.is_empty());
    }

    #[test]
    fn keeps_valid_questions_with_uppercased_answer() {
        let quiz = parse(TEMPLATE);
        assert_eq!(quiz.questions.len(), 2);

        let first = &quiz.questions[0];
        assert_eq!(first.text, "What does an account hold?");
        assert_eq!(first.correct_answer, "A");
        assert_eq!(
            first.options.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
        assert_eq!(
            first.explanation.as_deref(),
            Some("Accounts group the insured's policies.")
        );
        assert_eq!(quiz.questions[1].explanation, None);
    }

    #[test]
    fn skips_placeholder_optionless_and_unknown_answer_questions() {
        let quiz = parse(TEMPLATE);
        assert_eq!(
            quiz.warnings,
            vec![
                QuizWarning::Placeholder { number: 2 },
                QuizWarning::NoOptions { number: 3 },
                QuizWarning::AnswerNotInOptions {
                    number: 4,
                    answer: "E".to_owned()
                },
            ]
        );
    }

    #[test]
    fn question_without_answer_marker_is_malformed() {
        let quiz = parse(
            "### Question 1\n**Question Text:**\nWhat?\n\n**Options:**\nA) Yes\n",
        );
        assert!(quiz.questions.is_empty());
        assert_eq!(quiz.warnings, vec![QuizWarning::Malformed { number: 1 }]);
    }

    #[test]
    fn renders_quiz_and_numbered_questions() -> anyhow::Result<()> {
        let sql = render(&parse(TEMPLATE))?;
        assert!(sql.contains("(SELECT id FROM topics WHERE code = 'pc-01-002'),\n"));
        assert!(sql.contains("    'Accounts Check',\n"));
        assert!(sql.contains("    80,\n    15,\n    true\n"));
        assert!(sql.contains(
            r#"  (1, 'What does an account hold?', '{"A":"Policies","B":"Invoices only","C":"Nothing"}', 'A', 'Accounts group the insured''s policies.'),"#
        ));
        assert!(sql.contains(
            r#"  (2, 'Who''s the account holder?', '{"A":"The insured''s agent","B":"The named insured"}', 'B', NULL)"#
        ));
        assert!(!sql.contains("Which job renews"));
        assert!(sql.contains("WHERE t.code = 'pc-01-002'\n"));
        Ok(())
    }

    #[test]
    fn default_output_is_keyed_by_topic_code() {
        let quiz = parse(TEMPLATE);
        assert_eq!(
            default_output_path(&quiz),
            Path::new("database/INSERT-QUIZ-pc-01-002.sql")
        );
    }
}
