//! Built-in 3x5 pixel font.
//!
//! Each glyph is five rows of three bits, most significant bit on the
//! left. Lowercase letters map to their uppercase glyphs; anything
//! without a glyph renders blank but still advances the pen.

pub const GLYPH_WIDTH: usize = 3;
pub const GLYPH_HEIGHT: usize = 5;

pub type Glyph = [u8; GLYPH_HEIGHT];

/// Look up the glyph for `ch`.
pub fn glyph(ch: char) -> Option<&'static Glyph> {
    let ch = ch.to_ascii_uppercase();
    let glyph = match ch {
        '0' => &[0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => &[0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => &[0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => &[0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => &[0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => &[0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => &[0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => &[0b111, 0b001, 0b001, 0b010, 0b010],
        '8' => &[0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => &[0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => &[0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => &[0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => &[0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => &[0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => &[0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => &[0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => &[0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => &[0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => &[0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => &[0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => &[0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => &[0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => &[0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => &[0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => &[0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => &[0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => &[0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => &[0b111, 0b101, 0b110, 0b101, 0b101],
        'S' => &[0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => &[0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => &[0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => &[0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => &[0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => &[0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => &[0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => &[0b111, 0b001, 0b010, 0b100, 0b111],
        ' ' => &[0b000, 0b000, 0b000, 0b000, 0b000],
        ':' => &[0b000, 0b010, 0b000, 0b010, 0b000],
        '.' => &[0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => &[0b000, 0b000, 0b000, 0b010, 0b100],
        '!' => &[0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => &[0b111, 0b001, 0b011, 0b000, 0b010],
        '-' => &[0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => &[0b000, 0b010, 0b111, 0b010, 0b000],
        '/' => &[0b001, 0b001, 0b010, 0b100, 0b100],
        '%' => &[0b101, 0b001, 0b010, 0b100, 0b101],
        '\'' => &[0b010, 0b010, 0b000, 0b000, 0b000],
        '°' => &[0b010, 0b101, 0b010, 0b000, 0b000],
        _ => return None,
    };
    Some(glyph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_maps_to_uppercase() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph('z'), glyph('Z'));
    }

    #[test]
    fn test_unknown_glyph_is_none() {
        assert!(glyph('\u{1F600}').is_none());
        assert!(glyph('A').is_some());
        assert!(glyph('7').is_some());
    }
}
