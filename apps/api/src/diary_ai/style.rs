//! Page style recommendation: colors, font, and size for a finished diary.
//!
//! The model's answer is never trusted as-is. Every field is checked and replaced
//! by its default when it is missing, mistyped, or out of range, so the renderer always gets
//! a usable style.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::ai_client::{number_field, parse_json_object, text_field, AiError};

pub const DEFAULT_BACKGROUND: &str = "#ffffff";
pub const DEFAULT_TEXT_COLOR: &str = "#1f2937";
pub const DEFAULT_FONT_SIZE: u8 = 18;
pub const MIN_FONT_SIZE: u8 = 12;
pub const MAX_FONT_SIZE: u8 = 32;

/// The fonts bundled with the diary renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum FontFamily {
    Pretendard,
    NanumPenScript,
    #[default]
    Cafe24Shiningstar,
    Cafe24GowoonBam,
    OnglipBadabaram,
    OnglipUiyeon,
    IncheonEducationJaram,
    MemomentKkukkkuk,
    Shouting,
    CoolGuy,
    GangwonEducationHyeonok,
    InkLipquid,
    NationalMuseumClassic,
}

impl FontFamily {
    pub const ALL: [FontFamily; 13] = [
        FontFamily::Pretendard,
        FontFamily::NanumPenScript,
        FontFamily::Cafe24Shiningstar,
        FontFamily::Cafe24GowoonBam,
        FontFamily::OnglipBadabaram,
        FontFamily::OnglipUiyeon,
        FontFamily::IncheonEducationJaram,
        FontFamily::MemomentKkukkkuk,
        FontFamily::Shouting,
        FontFamily::CoolGuy,
        FontFamily::GangwonEducationHyeonok,
        FontFamily::InkLipquid,
        FontFamily::NationalMuseumClassic,
    ];

    /// CSS family name as registered by the renderer.
    pub fn css_name(self) -> &'static str {
        match self {
            FontFamily::Pretendard => "PretendardVariable",
            FontFamily::NanumPenScript => "Nanum Pen Script",
            FontFamily::Cafe24Shiningstar => "Cafe24Shiningstar",
            FontFamily::Cafe24GowoonBam => "Cafe24고운밤",
            FontFamily::OnglipBadabaram => "온글잎 바닷바람",
            FontFamily::OnglipUiyeon => "온글잎 의연체",
            FontFamily::IncheonEducationJaram => "인천교육자람",
            FontFamily::MemomentKkukkkuk => "memomentKkukkkuk",
            FontFamily::Shouting => "샤우팅체",
            FontFamily::CoolGuy => "쿨가이체",
            FontFamily::GangwonEducationHyeonok => "강원교육현옥샘",
            FontFamily::InkLipquid => "잉크립퀴드체",
            FontFamily::NationalMuseumClassic => "국립박물관문화재단클래식M",
        }
    }

    /// Mood hint shown to the model next to each font.
    pub fn mood(self) -> &'static str {
        match self {
            FontFamily::Pretendard => "modern, clean",
            FontFamily::NanumPenScript => "casual, handwritten",
            FontFamily::Cafe24Shiningstar => "elegant, dreamy",
            FontFamily::Cafe24GowoonBam => "soft, gentle",
            FontFamily::OnglipBadabaram => "refreshing, natural",
            FontFamily::OnglipUiyeon => "calm, mature",
            FontFamily::IncheonEducationJaram => "friendly, warm",
            FontFamily::MemomentKkukkkuk => "playful, cute",
            FontFamily::Shouting => "bold, energetic",
            FontFamily::CoolGuy => "cool, trendy",
            FontFamily::GangwonEducationHyeonok => "traditional, elegant",
            FontFamily::InkLipquid => "artistic, flowing",
            FontFamily::NationalMuseumClassic => "classic, refined",
        }
    }

    /// Matches a CSS family name, ignoring case and surrounding quotes.
    pub fn from_css_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_matches(|c| c == '"' || c == '\'');
        Self::ALL
            .into_iter()
            .find(|f| f.css_name().eq_ignore_ascii_case(name))
    }
}

impl TryFrom<String> for FontFamily {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_css_name(&value).ok_or_else(|| format!("unknown font family '{value}'"))
    }
}

impl Serialize for FontFamily {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.css_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRecommendation {
    pub background_color: String,
    pub text_color: String,
    pub font_family: FontFamily,
    pub font_size: u8,
}

impl Default for StyleRecommendation {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            font_family: FontFamily::default(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleResponse {
    pub recommendation: StyleRecommendation,
    /// The model's short explanation, possibly empty.
    pub reasoning: String,
}

/// Model output before sanitising. Accepts camelCase keys as well. Fields are
/// kept as loose JSON so a wrongly typed value falls back to its default instead
/// of failing the whole answer.
#[derive(Debug, Default, Deserialize)]
struct RawStyle {
    #[serde(default, alias = "backgroundColor")]
    background_color: Option<Value>,
    #[serde(default, alias = "textColor")]
    text_color: Option<Value>,
    #[serde(default, alias = "fontFamily")]
    font_family: Option<Value>,
    #[serde(default, alias = "fontSize")]
    font_size: Option<Value>,
    #[serde(default)]
    reasoning: Option<Value>,
}

pub fn parse_style_response(text: &str) -> Result<StyleResponse, AiError> {
    let raw: RawStyle = parse_json_object(text)?;
    Ok(sanitize(raw))
}

fn sanitize(raw: RawStyle) -> StyleResponse {
    let color = |value: Option<Value>, default: &str| {
        text_field(value.as_ref())
            .map(str::trim)
            .filter(|v| is_hex_color(v))
            .unwrap_or(default)
            .to_string()
    };

    let font_size = number_field(raw.font_size.as_ref())
        .map(|s| s.round().clamp(f64::from(MIN_FONT_SIZE), f64::from(MAX_FONT_SIZE)) as u8)
        .unwrap_or(DEFAULT_FONT_SIZE);

    StyleResponse {
        recommendation: StyleRecommendation {
            background_color: color(raw.background_color, DEFAULT_BACKGROUND),
            text_color: color(raw.text_color, DEFAULT_TEXT_COLOR),
            font_family: text_field(raw.font_family.as_ref())
                .and_then(FontFamily::from_css_name)
                .unwrap_or_default(),
            font_size,
        },
        reasoning: text_field(raw.reasoning.as_ref())
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}

/// `#rgb` or `#rrggbb`.
fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .map(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_response() {
        let text = r##"{"backgroundColor": "#fdf2f8", "textColor": "#831843",
            "fontFamily": "Cafe24고운밤", "fontSize": 20, "reasoning": "부드러운 분위기"}"##;
        let style = parse_style_response(text).unwrap();
        assert_eq!(style.recommendation.background_color, "#fdf2f8");
        assert_eq!(style.recommendation.text_color, "#831843");
        assert_eq!(style.recommendation.font_family, FontFamily::Cafe24GowoonBam);
        assert_eq!(style.recommendation.font_size, 20);
        assert_eq!(style.reasoning, "부드러운 분위기");
    }

    #[test]
    fn test_invalid_fields_fall_back_to_defaults() {
        let text = r##"{"background_color": "pink", "text_color": "#12", "font_family": "Comic Sans", "font_size": 99}"##;
        let style = parse_style_response(text).unwrap().recommendation;
        assert_eq!(style.background_color, DEFAULT_BACKGROUND);
        assert_eq!(style.text_color, DEFAULT_TEXT_COLOR);
        assert_eq!(style.font_family, FontFamily::Cafe24Shiningstar);
        assert_eq!(style.font_size, MAX_FONT_SIZE);
    }

    #[test]
    fn test_empty_object_is_default_style() {
        let style = parse_style_response("{}").unwrap();
        assert_eq!(style.recommendation, StyleRecommendation::default());
        assert!(style.reasoning.is_empty());
    }

    #[test]
    fn test_small_font_clamped_up() {
        let style = parse_style_response(r#"{"fontSize": 8.4}"#).unwrap();
        assert_eq!(style.recommendation.font_size, MIN_FONT_SIZE);
    }

    #[test]
    fn test_string_typed_fields_are_coerced() {
        let text = r##"{"backgroundColor": "#fef3c7", "fontSize": "20", "reasoning": "따뜻한 느낌"}"##;
        let style = parse_style_response(text).unwrap();
        assert_eq!(style.recommendation.background_color, "#fef3c7");
        assert_eq!(style.recommendation.font_size, 20);
        assert_eq!(style.reasoning, "따뜻한 느낌");
    }

    #[test]
    fn test_wrongly_typed_fields_fall_back_to_defaults() {
        let text = r#"{"backgroundColor": 16777215, "textColor": null, "fontFamily": ["Shouting"],
            "fontSize": "large", "reasoning": {"why": "?"}}"#;
        let style = parse_style_response(text).unwrap();
        assert_eq!(style.recommendation, StyleRecommendation::default());
        assert!(style.reasoning.is_empty());
    }

    #[test]
    fn test_font_family_serializes_as_css_name() {
        let json = serde_json::to_string(&FontFamily::NanumPenScript).unwrap();
        assert_eq!(json, "\"Nanum Pen Script\"");
        let back: FontFamily = serde_json::from_str("\"nanum pen script\"").unwrap();
        assert_eq!(back, FontFamily::NanumPenScript);
        assert!(serde_json::from_str::<FontFamily>("\"Arial\"").is_err());
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#1F2937"));
        assert!(!is_hex_color("1f2937"));
        assert!(!is_hex_color("#ggg"));
    }
}
