//! Key layouts for the on-screen keyboard.
//!
//! Nepali follows the traditional Nepali Unicode layout: every key of a US
//! keyboard produces a Devanagari letter, sign or conjunct, and shift gives
//! the half form or the long vowel.

use crate::passage::Language;

pub const ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl;'", "zxcvbnm,./"];
pub const SHIFTED_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL:\"", "ZXCVBNM<>?"];

const NEPALI: &[(char, &str)] = &[
    ('q', "त्र"),
    ('w', "ध"),
    ('e', "भ"),
    ('r', "च"),
    ('t', "त"),
    ('y', "थ"),
    ('u', "ग"),
    ('i', "ष"),
    ('o', "य"),
    ('p', "उ"),
    ('a', "ब"),
    ('s', "क"),
    ('d', "म"),
    ('f', "ा"),
    ('g', "न"),
    ('h', "ज"),
    ('j', "व"),
    ('k', "प"),
    ('l', "ि"),
    (';', "स"),
    ('\'', "ु"),
    ('z', "श"),
    ('x', "ह"),
    ('c', "अ"),
    ('v', "ख"),
    ('b', "द"),
    ('n', "ल"),
    ('m', "ा"),
    (',', "ो"),
    ('.', "ौ"),
    ('/', "र"),
    ('Q', "त्त"),
    ('W', "द्ध"),
    ('E', "भ्"),
    ('R', "च्"),
    ('T', "त्"),
    ('Y', "थ्"),
    ('U', "ग्"),
    ('I', "ष्"),
    ('O', "य्"),
    ('P', "ऊ"),
    ('A', "ब्"),
    ('S', "क्"),
    ('D', "म्"),
    ('F', "ँ"),
    ('G', "न्"),
    ('H', "ज्"),
    ('J', "व्"),
    ('K', "प्"),
    ('L', "ी"),
    (':', "स्"),
    ('"', "ू"),
    ('Z', "श्"),
    ('X', "ह्"),
    ('C', "आ"),
    ('V', "ख्"),
    ('B', "द्"),
    ('N', "ल्"),
    ('M', "ा"),
    ('<', "ओ"),
    ('>', "औ"),
    ('?', "र्"),
];

pub fn layout_name(language: Language) -> &'static str {
    match language {
        Language::Nepali => "Nepali Unicode",
        Language::English => "English QWERTY",
    }
}

pub fn is_shifted(key: char) -> bool {
    SHIFTED_ROWS.iter().any(|row| row.contains(key))
}

fn on_layout(key: char) -> bool {
    is_shifted(key) || ROWS.iter().any(|row| row.contains(key))
}

/// What `key` produces in `language`
pub fn label(language: Language, key: char) -> String {
    match language {
        Language::Nepali => NEPALI
            .iter()
            .find(|(k, _)| *k == key)
            .map_or_else(|| key.to_string(), |(_, out)| (*out).to_string()),
        Language::English => key.to_string(),
    }
}

/// The key that types `c`. Latin input maps to itself; Devanagari maps back
/// through the Nepali layout, taking the first key when several produce it.
pub fn key_for(language: Language, c: char) -> Option<char> {
    if on_layout(c) {
        return Some(c);
    }
    if language != Language::Nepali {
        return None;
    }
    let mut utf8 = [0u8; 4];
    let typed: &str = c.encode_utf8(&mut utf8);
    NEPALI.iter().find(|(_, out)| *out == typed).map(|(k, _)| *k)
}
