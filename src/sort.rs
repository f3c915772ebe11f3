//! Ordering of task lists.

use crate::types::Task;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Field to sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortField {
    DueDate,
    #[default]
    CreatedAt,
    Title,
    Completed,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::DueDate,
        SortField::CreatedAt,
        SortField::Title,
        SortField::Completed,
    ];

    /// Direction used when a field is first selected.
    pub fn default_order(&self) -> SortOrder {
        match self {
            SortField::Title => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::DueDate => "due-date",
            SortField::CreatedAt => "created-at",
            SortField::Title => "title",
            SortField::Completed => "completed",
        }
    }
}

impl SortOrder {
    pub fn reversed(&self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "due-date" | "due_date" | "dueDate" | "due" => Ok(SortField::DueDate),
            "created-at" | "created_at" | "createdAt" | "created" => Ok(SortField::CreatedAt),
            "title" => Ok(SortField::Title),
            "completed" | "status" => Ok(SortField::Completed),
            _ => Err(format!(
                "unknown sort field '{}' (expected due-date, created-at, title or completed)",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("unknown sort order '{}' (expected asc or desc)", s)),
        }
    }
}

/// Return a sorted copy of `tasks`. The input is not touched.
///
/// Tasks without a due date always come last under [`SortField::DueDate`],
/// whichever the direction. [`SortField::Completed`] puts open tasks first
/// and breaks ties newest-first, with the whole result flipped for `Desc`.
pub fn sort_tasks(tasks: &[Task], field: SortField, order: SortOrder) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| compare(a, b, field, order));
    sorted
}

fn compare(a: &Task, b: &Task, field: SortField, order: SortOrder) -> Ordering {
    match field {
        SortField::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => order.apply(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortField::CreatedAt => order.apply(a.created_at.cmp(&b.created_at)),
        SortField::Title => order.apply(collate(&a.title, &b.title)),
        SortField::Completed => order.apply(
            a.completed
                .cmp(&b.completed)
                .then_with(|| b.created_at.cmp(&a.created_at)),
        ),
    }
}

/// Compare two strings the way a Japanese-locale collator would, at three levels:
/// base letters, then accents and voicing marks, then case, kana type, kana
/// size and width.
///
/// Base letters group as spaces, then punctuation and symbols, then digits,
/// then letters in code point order (Latin before kana before kanji).
/// Combining accents and voicing marks attach to the letter before them, so
/// decomposed and precomposed text compare alike. Known gaps against a real
/// collator: marks outside the Latin and kana tables sort by code point,
/// kanji has no reading order, punctuation is not weighted per symbol and
/// the prolonged sound mark `ー` is an ordinary letter.
pub fn collate(a: &str, b: &str) -> Ordering {
    let ka = CollationKey::new(a);
    let kb = CollationKey::new(b);
    ka.primary
        .cmp(&kb.primary)
        .then_with(|| ka.secondary.cmp(&kb.secondary))
        .then_with(|| ka.tertiary.cmp(&kb.tertiary))
        .then_with(|| a.cmp(b))
}

const TERTIARY_UPPER: u8 = 0b0_0001;
const TERTIARY_KATAKANA: u8 = 0b0_0010;
const TERTIARY_FULLWIDTH: u8 = 0b0_0100;
const TERTIARY_HALFWIDTH: u8 = 0b0_1000;
// Set on full-size kana so that small kana sort first
const TERTIARY_LARGE_KANA: u8 = 0b1_0000;

// Primary groups
const CLASS_SPACE: u8 = 0;
const CLASS_SYMBOL: u8 = 1;
const CLASS_DIGIT: u8 = 2;
const CLASS_LETTER: u8 = 3;

struct CollationKey {
    primary: Vec<(u8, char)>,
    secondary: Vec<u8>,
    tertiary: Vec<u8>,
}

impl CollationKey {
    fn new(s: &str) -> Self {
        let mut key = CollationKey {
            primary: Vec::with_capacity(s.len()),
            secondary: Vec::with_capacity(s.len()),
            tertiary: Vec::with_capacity(s.len()),
        };

        for c in s.chars() {
            if let Some(mark) = combining_mark(c)
                && let Some(last) = key.secondary.last_mut()
            {
                *last = mark;
                continue;
            }

            let mut tertiary = 0;

            let c = match fold_width(c) {
                Some(narrow) => {
                    tertiary |= TERTIARY_FULLWIDTH;
                    narrow
                }
                None => c,
            };
            let c = match fold_halfwidth_kana(c) {
                Some(wide) => {
                    tertiary |= TERTIARY_HALFWIDTH;
                    wide
                }
                None => c,
            };
            let c = match fold_katakana(c) {
                Some(hiragana) => {
                    tertiary |= TERTIARY_KATAKANA;
                    hiragana
                }
                None => c,
            };
            let c = match fold_small_kana(c) {
                Some(large) => large,
                None if is_hiragana(c) => {
                    tertiary |= TERTIARY_LARGE_KANA;
                    c
                }
                None => c,
            };
            if c.is_uppercase() {
                tertiary |= TERTIARY_UPPER;
            }
            let lower = c.to_lowercase().next().unwrap_or(c);
            let (base, mark) = fold_mark(lower);

            key.primary.push((primary_class(base), base));
            key.secondary.push(mark);
            key.tertiary.push(tertiary);
        }

        key
    }
}

fn primary_class(c: char) -> u8 {
    if c.is_whitespace() {
        CLASS_SPACE
    } else if c.is_numeric() {
        CLASS_DIGIT
    } else if c.is_alphabetic() {
        CLASS_LETTER
    } else {
        CLASS_SYMBOL
    }
}

/// Full-width ASCII variants to their ASCII form.
fn fold_width(c: char) -> Option<char> {
    match c {
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0),
        '\u{3000}' => Some(' '),
        _ => None,
    }
}

/// Half-width katakana and CJK punctuation, U+FF61 through U+FF9D.
const HALFWIDTH_KANA: &str = "。「」、・ヲァィゥェォャュョッーアイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワン";

/// Half-width katakana to the full-width form.
fn fold_halfwidth_kana(c: char) -> Option<char> {
    match c {
        '\u{FF61}'..='\u{FF9D}' => HALFWIDTH_KANA.chars().nth((c as u32 - 0xFF61) as usize),
        _ => None,
    }
}

/// Katakana to the matching hiragana.
fn fold_katakana(c: char) -> Option<char> {
    match c {
        '\u{30A1}'..='\u{30F6}' => char::from_u32(c as u32 - 0x60),
        _ => None,
    }
}

fn is_hiragana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{3096}')
}

/// Small hiragana to the full-size form.
fn fold_small_kana(c: char) -> Option<char> {
    match c {
        'ぁ' | 'ぃ' | 'ぅ' | 'ぇ' | 'ぉ' | 'っ' | 'ゃ' | 'ゅ' | 'ょ' | 'ゎ' => char::from_u32(c as u32 + 1),
        'ゕ' => Some('か'),
        'ゖ' => Some('け'),
        _ => None,
    }
}

/// Secondary weight of a combining mark, if `c` is one.
fn combining_mark(c: char) -> Option<u8> {
    let mark = match c {
        '\u{0300}' => GRAVE,
        '\u{0301}' => ACUTE,
        '\u{0302}' => CIRCUMFLEX,
        '\u{0303}' => TILDE,
        '\u{0304}' => MACRON,
        '\u{0306}' => BREVE,
        '\u{0307}' => DOT_ABOVE,
        '\u{0308}' => DIAERESIS,
        '\u{030A}' => RING,
        '\u{030B}' => DOUBLE_ACUTE,
        '\u{030C}' => CARON,
        '\u{0327}' => CEDILLA,
        '\u{0328}' => OGONEK,
        '\u{0305}'..='\u{036F}' => OTHER_MARK,
        '\u{3099}' | '\u{FF9E}' => DAKUTEN,
        '\u{309A}' | '\u{FF9F}' => HANDAKUTEN,
        _ => return None,
    };
    Some(mark)
}

// Secondary weights; 0 means unmarked
const GRAVE: u8 = 1;
const ACUTE: u8 = 2;
const CIRCUMFLEX: u8 = 3;
const TILDE: u8 = 4;
const DIAERESIS: u8 = 5;
const RING: u8 = 6;
const CEDILLA: u8 = 7;
const STROKE: u8 = 8;
const MACRON: u8 = 9;
const BREVE: u8 = 10;
const OGONEK: u8 = 11;
const CARON: u8 = 12;
const DOUBLE_ACUTE: u8 = 13;
const DOT_ABOVE: u8 = 14;
const OTHER_MARK: u8 = 15;
const DAKUTEN: u8 = 20;
const HANDAKUTEN: u8 = 21;

/// Split a lowercase character into base letter and secondary mark.
fn fold_mark(c: char) -> (char, u8) {
    match c {
        'à' => ('a', GRAVE),
        'á' => ('a', ACUTE),
        'â' => ('a', CIRCUMFLEX),
        'ã' => ('a', TILDE),
        'ä' => ('a', DIAERESIS),
        'å' => ('a', RING),
        'ā' => ('a', MACRON),
        'ă' => ('a', BREVE),
        'ą' => ('a', OGONEK),
        'ç' => ('c', CEDILLA),
        'ć' => ('c', ACUTE),
        'č' => ('c', CARON),
        'ď' => ('d', CARON),
        'đ' => ('d', STROKE),
        'è' => ('e', GRAVE),
        'é' => ('e', ACUTE),
        'ê' => ('e', CIRCUMFLEX),
        'ë' => ('e', DIAERESIS),
        'ē' => ('e', MACRON),
        'ė' => ('e', DOT_ABOVE),
        'ę' => ('e', OGONEK),
        'ě' => ('e', CARON),
        'ğ' => ('g', BREVE),
        'ì' => ('i', GRAVE),
        'í' => ('i', ACUTE),
        'î' => ('i', CIRCUMFLEX),
        'ï' => ('i', DIAERESIS),
        'ī' => ('i', MACRON),
        'ł' => ('l', STROKE),
        'ñ' => ('n', TILDE),
        'ń' => ('n', ACUTE),
        'ň' => ('n', CARON),
        'ò' => ('o', GRAVE),
        'ó' => ('o', ACUTE),
        'ô' => ('o', CIRCUMFLEX),
        'õ' => ('o', TILDE),
        'ö' => ('o', DIAERESIS),
        'ø' => ('o', STROKE),
        'ō' => ('o', MACRON),
        'ő' => ('o', DOUBLE_ACUTE),
        'ř' => ('r', CARON),
        'ś' => ('s', ACUTE),
        'š' => ('s', CARON),
        'ş' => ('s', CEDILLA),
        'ť' => ('t', CARON),
        'ù' => ('u', GRAVE),
        'ú' => ('u', ACUTE),
        'û' => ('u', CIRCUMFLEX),
        'ü' => ('u', DIAERESIS),
        'ū' => ('u', MACRON),
        'ů' => ('u', RING),
        'ű' => ('u', DOUBLE_ACUTE),
        'ý' => ('y', ACUTE),
        'ÿ' => ('y', DIAERESIS),
        'ź' => ('z', ACUTE),
        'ż' => ('z', DOT_ABOVE),
        'ž' => ('z', CARON),
        _ => fold_voicing(c),
    }
}

/// Hiragana voicing marks: が -> か + dakuten, ぱ -> は + handakuten.
fn fold_voicing(c: char) -> (char, u8) {
    let code = c as u32;
    let voiced = |base: u32, mark: u8| (char::from_u32(base).unwrap_or(c), mark);

    match code {
        // か..ぢ alternate plain/voiced
        0x304B..=0x3062 if (code - 0x304B) % 2 == 1 => voiced(code - 1, DAKUTEN),
        // つ づ て で と ど
        0x3064..=0x3069 if (code - 0x3064) % 2 == 1 => voiced(code - 1, DAKUTEN),
        // は ば ぱ .. ほ ぼ ぽ
        0x306F..=0x307D => match (code - 0x306F) % 3 {
            1 => voiced(code - 1, DAKUTEN),
            2 => voiced(code - 2, HANDAKUTEN),
            _ => (c, 0),
        },
        // ゔ
        0x3094 => voiced(0x3046, DAKUTEN),
        _ => (c, 0),
    }
}
