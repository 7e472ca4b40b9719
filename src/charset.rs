// Copyright (c) 2026 rezky_nightky

use crate::error::SaverError;

/// Named glyph sets the bleed effects draw from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphSet {
    Binary,
    Digits,
    Hex,
    Ascii,
    Letters,
    Katakana,
    Matrix,
    Blocks,
}

impl GlyphSet {
    pub fn parse(spec: &str, default_to_ascii: bool) -> Result<GlyphSet, SaverError> {
        match spec.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(if default_to_ascii {
                GlyphSet::Ascii
            } else {
                GlyphSet::Matrix
            }),
            "bin" | "binary" | "01" => Ok(GlyphSet::Binary),
            "digits" | "dec" | "decimal" => Ok(GlyphSet::Digits),
            "hex" | "hexadecimal" => Ok(GlyphSet::Hex),
            "ascii" => Ok(GlyphSet::Ascii),
            "letters" | "english" => Ok(GlyphSet::Letters),
            "katakana" => Ok(GlyphSet::Katakana),
            "matrix" => Ok(GlyphSet::Matrix),
            "blocks" => Ok(GlyphSet::Blocks),
            _ => Err(SaverError::UnknownCharset(spec.to_string())),
        }
    }

    pub fn chars(self) -> Vec<char> {
        let mut out = Vec::new();
        match self {
            GlyphSet::Binary => push_range(&mut out, '0', '1'),
            GlyphSet::Digits => push_range(&mut out, '0', '9'),
            GlyphSet::Hex => {
                push_range(&mut out, '0', '9');
                push_range(&mut out, 'A', 'F');
            }
            GlyphSet::Ascii => push_range(&mut out, '!', '~'),
            GlyphSet::Letters => {
                push_range(&mut out, 'A', 'Z');
                push_range(&mut out, 'a', 'z');
            }
            GlyphSet::Katakana => push_range(&mut out, '\u{FF66}', '\u{FF9D}'),
            GlyphSet::Matrix => {
                push_range(&mut out, 'A', 'Z');
                push_range(&mut out, 'a', 'z');
                push_range(&mut out, '0', '9');
                push_range(&mut out, '\u{FF66}', '\u{FF9D}');
            }
            GlyphSet::Blocks => push_range(&mut out, '\u{2580}', '\u{259F}'),
        }
        out
    }
}

fn push_range(out: &mut Vec<char>, first: char, last: char) {
    out.extend((first as u32..=last as u32).filter_map(char::from_u32));
}
