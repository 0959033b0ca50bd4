use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static LESSON_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(In_policy_|In_Claim_|BillingCenter_|Ra_Intro_|Ra_Conf_|CC_)")
        .expect("valid lesson prefix regex")
});
static SLIDE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(PC_Intro_|CC_|BC_|Ra_)").expect("valid slide prefix regex"));
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[\s\-_]*").expect("valid leading number regex"));
static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

const EMPTY_CLEAN_NAME: &str = "lesson";

/// Kebab-case path segment for a lesson folder name.
pub fn clean_topic_name(folder_name: &str) -> String {
    let name = LESSON_PREFIX.replace(folder_name, "");
    let name = LEADING_NUMBER.replace(&name, "");
    let name = name.to_lowercase();
    let name = NON_SLUG.replace_all(&name, "-");
    let name = name.trim_matches('-');
    if name.is_empty() {
        EMPTY_CLEAN_NAME.to_owned()
    } else {
        name.to_owned()
    }
}

/// Human title derived from a slide deck's file stem.
pub fn title_from_slide(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = SLIDE_PREFIX.replace(&stem, "");
    let name = LEADING_NUMBER.replace(&name, "");
    let name = name.replace(['_', '-'], " ");
    title_case(&name)
}

/// Upper-cases the first letter of every run of letters and lower-cases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

/// Leading numeric token of a module name, e.g. `02` for `02-configuration`.
pub fn module_number(module: &str) -> &str {
    module.split('-').next().unwrap_or(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_name_strips_prefixes_and_numbers() {
        assert_eq!(clean_topic_name("In_policy_03_Job Wizard"), "job-wizard");
        assert_eq!(clean_topic_name("CC_12 - FNOL Intake"), "fnol-intake");
        assert_eq!(clean_topic_name("01 Getting Started"), "getting-started");
        assert_eq!(clean_topic_name("Ra_Conf_Rate Books & Tables"), "rate-books-tables");
        assert_eq!(clean_topic_name("__Odd__Name__"), "odd-name");
    }

    #[test]
    fn clean_name_never_empty() {
        assert_eq!(clean_topic_name("007"), "lesson");
        assert_eq!(clean_topic_name("---"), "lesson");
    }

    #[test]
    fn slide_titles() {
        assert_eq!(
            title_from_slide(Path::new("/x/PC_Intro_02_policy_TRANSACTIONS.pptx")),
            "Policy Transactions"
        );
        assert_eq!(title_from_slide(Path::new("lecture.pptx")), "Lecture");
        assert_eq!(
            title_from_slide(Path::new("05 - claim-center basics.pdf")),
            "Claim Center Basics"
        );
    }

    #[test]
    fn title_case_treats_non_letters_as_boundaries() {
        assert_eq!(title_case("gosu 101 intro"), "Gosu 101 Intro");
        assert_eq!(title_case("3rd party"), "3Rd Party");
        assert_eq!(title_case("ÉTÉ plan"), "Été Plan");
    }

    #[test]
    fn module_numbers() {
        assert_eq!(module_number("02-configuration"), "02");
        assert_eq!(module_number("04-apd"), "04");
        assert_eq!(module_number("plain"), "plain");
    }
}
