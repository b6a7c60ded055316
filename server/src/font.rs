use std::{collections::HashMap, fs, io, path::Path};

use log::{debug, warn};

/// Width of a character missing from the table.
pub const DEFAULT_CHAR_WIDTH: u32 = 6;

/// Width of the padding space when the table does not define one.
pub const DEFAULT_SPACE_WIDTH: u32 = 4;

/// Virtual width of a server list entry that lines are centered in.
pub const DISPLAY_WIDTH: u32 = 260;

/// Prefix of a two-character formatting code.
const FORMATTING_MARKER: char = '§';

/// Pixel widths of the client's default font, keyed by character.
#[derive(Debug, Default, Clone)]
pub struct FontWidths {
    widths: HashMap<char, u32>,
}

impl FontWidths {
    /// Loads a `char=width` table. An unreadable file yields an empty table,
    /// which makes every character [`DEFAULT_CHAR_WIDTH`] wide.
    pub fn load(path: &Path) -> FontWidths {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let widths = FontWidths::parse(&contents);
                if widths.is_empty() {
                    warn!("{} has no valid entries, using default widths", path.display());
                } else {
                    debug!("loaded {} font widths from {}", widths.len(), path.display());
                }
                widths
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("{} not found, using default widths", path.display());
                FontWidths::default()
            }
            Err(err) => {
                warn!("failed to read {}: {}", path.display(), err);
                FontWidths::default()
            }
        }
    }

    /// Parses one `char=width` entry per line. Malformed lines are skipped.
    ///
    /// Lines are trimmed first, so the space character is written as `=4`
    /// (or ` =4`) and ends up with an empty key.
    pub fn parse(contents: &str) -> FontWidths {
        let widths = contents
            .lines()
            .filter_map(|line| {
                let (key, width) = line.trim().rsplit_once('=')?;
                if width.is_empty() || !width.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let width = width.parse().ok()?;

                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => Some((' ', width)),
                    (Some(c), None) => Some((c, width)),
                    _ => None,
                }
            })
            .collect();

        FontWidths { widths }
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub fn char_width(&self, c: char) -> u32 {
        self.widths.get(&c).copied().unwrap_or(DEFAULT_CHAR_WIDTH)
    }

    fn space_width(&self) -> u32 {
        self.widths.get(&' ').copied().unwrap_or(DEFAULT_SPACE_WIDTH)
    }

    /// Rendered width of `text` in pixels.
    ///
    /// Formatting codes take no space. Bold (`§l`) adds a pixel to every
    /// following character until a colour code or `§r` clears it, and every
    /// pair of visible characters is separated by one pixel.
    pub fn text_width(&self, text: &str) -> u32 {
        let mut width: u32 = 0;
        let mut visible: u32 = 0;
        let mut bold = false;

        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == FORMATTING_MARKER {
                match chars.next().map(|code| code.to_ascii_lowercase()) {
                    Some('l') => bold = true,
                    Some('0'..='9' | 'a'..='f' | 'k' | 'r') => bold = false,
                    _ => {}
                }
                continue;
            }

            visible += 1;
            width += self.char_width(c) + u32::from(bold);
        }

        width + visible.saturating_sub(1)
    }

    /// Prepends spaces so that `text` appears centered within
    /// [`DISPLAY_WIDTH`]. Blank lines and lines that are already too wide are
    /// returned unchanged.
    pub fn center(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let width = self.text_width(text);
        if width >= DISPLAY_WIDTH {
            return text.to_string();
        }

        let padding = (DISPLAY_WIDTH - width) / 2;
        let spaces = padding.checked_div(self.space_width()).unwrap_or(0);

        let mut centered = " ".repeat(spaces as usize);
        centered.push_str(text);
        centered
    }
}
