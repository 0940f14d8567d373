use unicode_segmentation::UnicodeSegmentation;

/// Segmentation locale. Only affects which script the passage is in;
/// extended grapheme cluster rules already cover Devanagari combining marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    Ne,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMode {
    /// One unit per user-perceived character (extended grapheme cluster)
    Graphemes,
    /// One unit per code point. Degraded: a Devanagari consonant followed by
    /// a vowel sign is scored as two units.
    Chars,
}

/// Splits text into the units the comparator works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenter {
    locale: Locale,
    mode: SegmentMode,
}

impl Segmenter {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            mode: SegmentMode::Graphemes,
        }
    }

    pub fn per_char(locale: Locale) -> Self {
        Self {
            locale,
            mode: SegmentMode::Chars,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    pub fn segment(&self, text: &str) -> Vec<String> {
        match self.mode {
            SegmentMode::Graphemes => text.graphemes(true).map(str::to_owned).collect(),
            SegmentMode::Chars => text.chars().map(|c| c.to_string()).collect(),
        }
    }
}

/// Grapheme-cluster segmentation of `text`; total over any input
pub fn segment(text: &str, locale: Locale) -> Vec<String> {
    Segmenter::new(locale).segment(text)
}
