/// Splits a job ad into paragraphs and merges fragments that belong together.
pub trait ParagraphSplitter: std::fmt::Debug + Send + Sync {
    /// Splits raw content into whitespace-cleaned paragraphs.
    fn get_paragraphs(&self, content: &str) -> Vec<String>;

    /// Merges list items and continuation fragments into their paragraph.
    fn clean_paragraphs(&self, paragraphs: Vec<String>) -> Vec<String>;
}

/// Line based splitter: every non-blank line is a paragraph candidate.
///
/// Consecutive list items are merged, as are items following a line that
/// ends with a colon. A line starting with a lowercase letter continues
/// the previous paragraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineParagraphSplitter;

const BULLETS: [char; 6] = ['-', '*', '•', '–', '·', '>'];

impl LineParagraphSplitter {
    pub fn new() -> Self {
        Self
    }

    fn is_list_item(paragraph: &str) -> bool {
        let mut chars = paragraph.chars();
        match chars.next() {
            Some(c) if BULLETS.contains(&c) => chars.next().map_or(true, char::is_whitespace),
            Some(c) if c.is_ascii_digit() => {
                let rest = paragraph.trim_start_matches(|c: char| c.is_ascii_digit());
                rest.starts_with(". ") || rest.starts_with(") ")
            }
            _ => false,
        }
    }

    fn is_continuation(paragraph: &str) -> bool {
        paragraph.chars().next().map_or(false, char::is_lowercase)
    }
}

impl ParagraphSplitter for LineParagraphSplitter {
    fn get_paragraphs(&self, content: &str) -> Vec<String> {
        content
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect()
    }

    fn clean_paragraphs(&self, paragraphs: Vec<String>) -> Vec<String> {
        let mut merged: Vec<String> = Vec::with_capacity(paragraphs.len());
        // set once a raw line opened or continued a list
        let mut in_list = false;
        for para in paragraphs {
            let is_item = Self::is_list_item(&para);
            let opens_list = is_item || para.ends_with(':');
            match merged.last_mut() {
                Some(prev) if (is_item && in_list) || Self::is_continuation(&para) => {
                    prev.push(' ');
                    prev.push_str(&para);
                    in_list |= opens_list;
                }
                _ => {
                    merged.push(para);
                    in_list = opens_list;
                }
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(content: &str) -> Vec<String> {
        let splitter = LineParagraphSplitter::new();
        splitter.clean_paragraphs(splitter.get_paragraphs(content))
    }

    #[test]
    fn test_blank_lines_and_whitespace() {
        let result = split("  Wir suchen   Verstärkung \r\n\n\t\nAb sofort  ");
        assert_eq!(result, vec!["Wir suchen Verstärkung", "Ab sofort"]);
    }

    #[test]
    fn test_list_items_merge_with_heading() {
        let result = split("Deine Aufgaben:\n- Entwicklung\n- Tests\nWir bieten");
        assert_eq!(result, vec!["Deine Aufgaben: - Entwicklung - Tests", "Wir bieten"]);
    }

    #[test]
    fn test_long_list_stays_one_paragraph() {
        let result = split("Ihr Profil:\n- Studium\n- Java\n- SQL\n- Teamgeist\nKontakt");
        assert_eq!(result, vec!["Ihr Profil: - Studium - Java - SQL - Teamgeist", "Kontakt"]);
    }

    #[test]
    fn test_list_continues_after_wrapped_item() {
        let result = split("- Entwicklung von\nneuen Features\n- Tests");
        assert_eq!(result, vec!["- Entwicklung von neuen Features - Tests"]);
    }

    #[test]
    fn test_plain_line_ends_list() {
        let result = split("- Java\nWir bieten\n- Obstkorb");
        assert_eq!(result, vec!["- Java", "Wir bieten", "- Obstkorb"]);
    }

    #[test]
    fn test_numbered_items_merge() {
        let result = split("Profil\n1. Studium\n2) Erfahrung");
        assert_eq!(result, vec!["Profil", "1. Studium 2) Erfahrung"]);
    }

    #[test]
    fn test_lowercase_line_continues_paragraph() {
        let result = split("Wir bieten ein Team, das\nzusammenhält.");
        assert_eq!(result, vec!["Wir bieten ein Team, das zusammenhält."]);
    }

    #[test]
    fn test_negative_number_is_not_a_bullet() {
        assert!(!LineParagraphSplitter::is_list_item("-5 Grad"));
        assert!(LineParagraphSplitter::is_list_item("• Homeoffice"));
    }
}
