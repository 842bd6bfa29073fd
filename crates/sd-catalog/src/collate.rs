//! Locale-aware string ordering for catalog symbols.
//!
//! Byte order puts `Z` before `a` and `é` after `z`; readers expect neither.
//! [`locale_cmp`] follows the root collation order used by browsers and ICU
//! for the characters that show up in exchange listings. It compares in four
//! levels, each consulted only on a tie:
//!
//! 1. primary: case and diacritics ignored. Whitespace sorts first, then
//!    punctuation and symbols in the fixed order of `PUNCT_ORDER`, then
//!    digits, then letters. `ß`, `æ` and `œ` expand to `ss`, `ae` and `oe`.
//! 2. accents: unaccented first, then acute, grave, breve, circumflex, caron,
//!    ring, diaeresis, double acute, tilde, dot, stroke, cedilla, ogonek,
//!    macron (`e` < `é` < `è` < `ê` < `ë`)
//! 3. case: lowercase before uppercase (`a` < `A`)
//! 4. code point order, so the result is a total order
//!
//! Only Latin letters are folded. Other scripts compare by code point within
//! the letter class.

use std::cmp::Ordering;

/// ASCII punctuation and symbols in root collation order.
const PUNCT_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Class {
    Space,
    Punct,
    Digit,
    Letter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Accent {
    None,
    Acute,
    Grave,
    Breve,
    Circumflex,
    Caron,
    Ring,
    Diaeresis,
    DoubleAcute,
    Tilde,
    Dot,
    Stroke,
    Cedilla,
    Ogonek,
    Macron,
}

/// One collation element: a primary weight plus its accent and case.
#[derive(Debug, Clone, Copy)]
struct Unit {
    class: Class,
    weight: u32,
    accent: Accent,
    upper: bool,
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Split a lowercase Latin letter into base letter and diacritic.
fn decompose(c: char) -> (char, Accent) {
    use Accent::*;
    match c {
        'á' => ('a', Acute),
        'à' => ('a', Grave),
        'ă' => ('a', Breve),
        'â' => ('a', Circumflex),
        'å' => ('a', Ring),
        'ä' => ('a', Diaeresis),
        'ã' => ('a', Tilde),
        'ą' => ('a', Ogonek),
        'ā' => ('a', Macron),
        'ć' => ('c', Acute),
        'ĉ' => ('c', Circumflex),
        'č' => ('c', Caron),
        'ċ' => ('c', Dot),
        'ç' => ('c', Cedilla),
        'ď' => ('d', Caron),
        'đ' => ('d', Stroke),
        'é' => ('e', Acute),
        'è' => ('e', Grave),
        'ĕ' => ('e', Breve),
        'ê' => ('e', Circumflex),
        'ě' => ('e', Caron),
        'ë' => ('e', Diaeresis),
        'ė' => ('e', Dot),
        'ę' => ('e', Ogonek),
        'ē' => ('e', Macron),
        'ğ' => ('g', Breve),
        'ĝ' => ('g', Circumflex),
        'ġ' => ('g', Dot),
        'ģ' => ('g', Cedilla),
        'í' => ('i', Acute),
        'ì' => ('i', Grave),
        'ĭ' => ('i', Breve),
        'î' => ('i', Circumflex),
        'ï' => ('i', Diaeresis),
        'ĩ' => ('i', Tilde),
        'ı' => ('i', Dot),
        'į' => ('i', Ogonek),
        'ī' => ('i', Macron),
        'ĺ' => ('l', Acute),
        'ľ' => ('l', Caron),
        'ł' => ('l', Stroke),
        'ļ' => ('l', Cedilla),
        'ń' => ('n', Acute),
        'ň' => ('n', Caron),
        'ñ' => ('n', Tilde),
        'ņ' => ('n', Cedilla),
        'ó' => ('o', Acute),
        'ò' => ('o', Grave),
        'ŏ' => ('o', Breve),
        'ô' => ('o', Circumflex),
        'ö' => ('o', Diaeresis),
        'ő' => ('o', DoubleAcute),
        'õ' => ('o', Tilde),
        'ø' => ('o', Stroke),
        'ō' => ('o', Macron),
        'ŕ' => ('r', Acute),
        'ř' => ('r', Caron),
        'ŗ' => ('r', Cedilla),
        'ś' => ('s', Acute),
        'ŝ' => ('s', Circumflex),
        'š' => ('s', Caron),
        'ş' => ('s', Cedilla),
        'ť' => ('t', Caron),
        'ţ' => ('t', Cedilla),
        'ú' => ('u', Acute),
        'ù' => ('u', Grave),
        'ŭ' => ('u', Breve),
        'û' => ('u', Circumflex),
        'ů' => ('u', Ring),
        'ü' => ('u', Diaeresis),
        'ű' => ('u', DoubleAcute),
        'ũ' => ('u', Tilde),
        'ų' => ('u', Ogonek),
        'ū' => ('u', Macron),
        'ý' => ('y', Acute),
        'ŷ' => ('y', Circumflex),
        'ÿ' => ('y', Diaeresis),
        'ź' => ('z', Acute),
        'ž' => ('z', Caron),
        'ż' => ('z', Dot),
        other => (other, Accent::None),
    }
}

fn punct_weight(c: char) -> u32 {
    match PUNCT_ORDER.chars().position(|p| p == c) {
        Some(i) => i as u32,
        // unlisted symbols follow the table, by code point
        None => PUNCT_ORDER.len() as u32 + c as u32,
    }
}

fn push_units(c: char, out: &mut Vec<Unit>) {
    let upper = c.is_uppercase();
    let letter = |base: char, accent: Accent| Unit {
        class: Class::Letter,
        weight: base as u32,
        accent,
        upper,
    };

    if c.is_whitespace() {
        out.push(Unit {
            class: Class::Space,
            weight: c as u32,
            accent: Accent::None,
            upper,
        });
    } else if c.is_numeric() {
        out.push(Unit {
            class: Class::Digit,
            weight: c.to_digit(10).unwrap_or(c as u32),
            accent: Accent::None,
            upper,
        });
    } else if c.is_alphabetic() {
        match lower(c) {
            'ß' => out.extend([letter('s', Accent::None), letter('s', Accent::None)]),
            'æ' => out.extend([letter('a', Accent::None), letter('e', Accent::None)]),
            'œ' => out.extend([letter('o', Accent::None), letter('e', Accent::None)]),
            lc => {
                let (base, accent) = decompose(lc);
                out.push(letter(base, accent));
            }
        }
    } else {
        out.push(Unit {
            class: Class::Punct,
            weight: punct_weight(c),
            accent: Accent::None,
            upper,
        });
    }
}

fn units(s: &str) -> Vec<Unit> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        push_units(c, &mut out);
    }
    out
}

/// Compare two strings in natural alphabetic order.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let (ua, ub) = (units(a), units(b));

    ua.iter()
        .map(|u| (u.class, u.weight))
        .cmp(ub.iter().map(|u| (u.class, u.weight)))
        .then_with(|| ua.iter().map(|u| u.accent).cmp(ub.iter().map(|u| u.accent)))
        .then_with(|| ua.iter().map(|u| u.upper).cmp(ub.iter().map(|u| u.upper)))
        .then_with(|| a.cmp(b))
}
