use crate::ai_client::prompts::KOREAN_OUTPUT;
use crate::diary_ai::style::FontFamily;

pub const KEYWORD_MAX_TOKENS: u32 = 200;
pub const DIARY_TEXT_MAX_TOKENS: u32 = 800;
pub const STYLE_MAX_TOKENS: u32 = 300;

pub fn keyword_prompt() -> String {
    format!(
        "Look at this travel or daily-life photo and list 8 to 12 short keywords. \
Mix what is visible (places, objects, food, activities) with 3 to 5 feelings \
that fit the scene, written as past-tense Korean adjectives such as 여유로웠다. \
Only use taste words for prepared food. {KOREAN_OUTPUT}\n\n\
Return: {{\"keywords\": [\"...\"], \"confidence\": 0.0-1.0}}"
    )
}

/// The answer is split on blank lines downstream, so the model is asked for one
/// paragraph per photo.
pub fn diary_text_prompt(title: &str, keywords: &[String], photo_count: usize) -> String {
    let keywords = if keywords.is_empty() {
        "(none)".to_string()
    } else {
        keywords.join(", ")
    };
    format!(
        "Write a first-person travel diary entry.\n\
Title: {title}\n\
Keywords from the photos, in order: {keywords}\n\n\
Write exactly {photo_count} paragraphs separated by a blank line, one per photo, \
in the order the keywords appear. Keep each paragraph to two or three warm, \
plain sentences. Do not add headings, numbering, or bracketed notes. {KOREAN_OUTPUT}"
    )
}

pub fn style_prompt(title: &str, keywords: &[String], diary_text: &str) -> String {
    let fonts: String = FontFamily::ALL
        .iter()
        .map(|f| format!("- \"{}\" ({})\n", f.css_name(), f.mood()))
        .collect();
    let or_none = |s: &str| if s.trim().is_empty() { "(none)".to_string() } else { s.to_string() };

    format!(
        "Recommend a page style for this diary.\n\
Title: {}\nKeywords: {}\nText: {}\n\n\
Pick a subtle background color and a readable text color as hex codes, one \
font family from this list, and a font size between 16 and 24:\n{fonts}\n\
Match the mood: warm and playful for cheerful days, soft pastels for calm \
ones, cool tones for wistful ones.\n\n\
Return: {{\"background_color\": \"#rrggbb\", \"text_color\": \"#rrggbb\", \
\"font_family\": \"...\", \"font_size\": 18, \"reasoning\": \"one Korean sentence\"}}",
        or_none(title),
        or_none(&keywords.join(", ")),
        or_none(diary_text),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diary_prompt_asks_for_one_paragraph_per_photo() {
        let prompt = diary_text_prompt("제주", &["바다".to_string()], 4);
        assert!(prompt.contains("exactly 4 paragraphs"));
        assert!(prompt.contains("바다"));
    }

    #[test]
    fn test_style_prompt_lists_every_font() {
        let prompt = style_prompt("", &[], "");
        for font in FontFamily::ALL {
            assert!(prompt.contains(font.css_name()));
        }
        assert!(prompt.contains("Title: (none)"));
    }
}
