//! Block Layout (headless soft wrapping)
//!
//! Splits one block's text into visual lines so vertical caret motion can keep a remembered
//! horizontal column. Character widths follow UAX #11; tabs advance to the next tab stop.
//!
//! The render layer owns the real layout. This module reproduces the part of it the
//! navigation engine needs: which visual line a caret is on, the cell column of a caret, and
//! the caret offset closest to a cell column on another line.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

/// Default tab width (in cells) used when a caller does not specify a tab width.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Soft wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// No soft wrapping (each hard line is a single visual line).
    None,
    /// Wrap at character boundaries.
    #[default]
    Char,
    /// Prefer wrapping at word boundaries (whitespace), falling back to character wrap.
    Word,
}

/// Which visual line a caret sitting exactly on a soft-wrap boundary belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    /// End of the earlier line.
    Upstream,
    /// Start of the later line.
    #[default]
    Downstream,
}

/// Layout parameters for block text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Wrap width in cells (`0` disables soft wrapping).
    pub wrap_width: usize,
    /// Soft wrapping mode.
    pub wrap_mode: WrapMode,
    /// Tab width in cells.
    pub tab_width: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            wrap_width: 0,
            wrap_mode: WrapMode::Char,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}

/// Calculate visual width of a character (based on UAX #11)
///
/// Return value:
/// - 1: Narrow character (ASCII, etc.)
/// - 2: Wide character (CJK, fullwidth, etc.)
/// - 0: Zero-width character (combining characters, etc.)
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Visual width (in cells) for a character at a specific cell offset within the line.
pub fn cell_width_at(ch: char, cell_offset_in_line: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        let rem = cell_offset_in_line % tab_width;
        tab_width - rem
    } else {
        char_width(ch)
    }
}

/// Calculate total visual width of a string, interpreting `'\t'` using `tab_width`.
pub fn str_width(s: &str, tab_width: usize) -> usize {
    let mut x = 0usize;
    for ch in s.chars() {
        x = x.saturating_add(cell_width_at(ch, x, tab_width));
    }
    x
}

/// Calculate the visual cell offset from the start of the line to the given character column.
pub fn visual_x_for_column(line: &str, column: usize, tab_width: usize) -> usize {
    let mut x = 0usize;
    for ch in line.chars().take(column) {
        x = x.saturating_add(cell_width_at(ch, x, tab_width));
    }
    x
}

/// Char indices (within `line`) where soft wrapping starts a new visual line.
pub fn calculate_wrap_points(line: &str, options: LayoutOptions) -> Vec<usize> {
    if options.wrap_width == 0 {
        return Vec::new();
    }
    match options.wrap_mode {
        WrapMode::None => Vec::new(),
        WrapMode::Char => wrap_points_char(line, options.wrap_width, options.tab_width),
        WrapMode::Word => wrap_points_word(line, options.wrap_width, options.tab_width),
    }
}

fn wrap_points_char(line: &str, width: usize, tab_width: usize) -> Vec<usize> {
    let mut wrap_points = Vec::new();
    let mut x_in_segment = 0usize;
    let mut x_in_line = 0usize;
    let char_count = line.chars().count();

    for (char_index, ch) in line.chars().enumerate() {
        let ch_width = cell_width_at(ch, x_in_line, tab_width);

        // Double-width characters cannot be split; they move to the next line intact.
        if x_in_segment + ch_width > width && x_in_segment > 0 {
            wrap_points.push(char_index);
            x_in_segment = 0;
        }

        x_in_segment = x_in_segment.saturating_add(ch_width);
        x_in_line = x_in_line.saturating_add(ch_width);

        if x_in_segment >= width && char_index + 1 < char_count {
            wrap_points.push(char_index + 1);
            x_in_segment = 0;
        }
    }

    wrap_points
}

fn wrap_points_word(line: &str, width: usize, tab_width: usize) -> Vec<usize> {
    let mut wrap_points = Vec::new();

    let mut segment_start_char = 0usize;
    let mut segment_start_x = 0usize;
    // (char_index, x_in_line) just after the last whitespace
    let mut last_break: Option<(usize, usize)> = None;
    let mut x_in_line = 0usize;

    for (char_index, ch) in line.chars().enumerate() {
        let ch_width = cell_width_at(ch, x_in_line, tab_width);

        loop {
            let x_in_segment = x_in_line.saturating_sub(segment_start_x);
            if x_in_segment.saturating_add(ch_width) <= width || char_index == segment_start_char
            {
                break;
            }

            if let Some((break_char, break_x)) = last_break
                && break_char > segment_start_char
            {
                wrap_points.push(break_char);
                segment_start_char = break_char;
                segment_start_x = break_x;
                last_break = None;
                continue;
            }

            wrap_points.push(char_index);
            segment_start_char = char_index;
            segment_start_x = x_in_line;
            last_break = None;
            break;
        }

        x_in_line = x_in_line.saturating_add(ch_width);

        if ch.is_whitespace() {
            last_break = Some((char_index + 1, x_in_line));
        }
    }

    wrap_points
}

/// One visual line of a block, as a half-open char range into the block text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualLine {
    /// First char offset on the line.
    pub start: usize,
    /// Char offset just past the last char on the line (excludes a hard `'\n'`).
    pub end: usize,
    /// Cell column of `start` within its hard line. Tab stops are measured from the hard line.
    pub line_x: usize,
}

/// Visual lines of one block's text.
#[derive(Debug, Clone)]
pub struct BlockLayout {
    chars: Vec<char>,
    lines: Vec<VisualLine>,
    tab_width: usize,
}

impl BlockLayout {
    /// Lay out `text` with the given options.
    pub fn new(text: &str, options: LayoutOptions) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut lines = Vec::new();

        let mut line_start = 0usize;
        for hard_line in text.split('\n') {
            let line_len = hard_line.chars().count();
            let mut points = calculate_wrap_points(hard_line, options).into_iter().peekable();
            let mut segment_start = line_start;
            let mut segment_x = 0usize;
            let mut x = 0usize;
            for (index, ch) in hard_line.chars().enumerate() {
                if points.next_if_eq(&index).is_some() {
                    lines.push(VisualLine {
                        start: segment_start,
                        end: line_start + index,
                        line_x: segment_x,
                    });
                    segment_start = line_start + index;
                    segment_x = x;
                }
                x = x.saturating_add(cell_width_at(ch, x, options.tab_width));
            }
            lines.push(VisualLine {
                start: segment_start,
                end: line_start + line_len,
                line_x: segment_x,
            });
            // Skip the '\n'.
            line_start += line_len + 1;
        }

        Self {
            chars,
            lines,
            tab_width: options.tab_width,
        }
    }

    /// All visual lines (never empty: empty text has one empty line).
    pub fn lines(&self) -> &[VisualLine] {
        &self.lines
    }

    /// Number of visual lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the last visual line.
    pub fn last_line(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    /// Text length in chars.
    pub fn char_count(&self) -> usize {
        self.chars.len()
    }

    /// Visual line holding `offset`. A caret on a soft-wrap boundary resolves through
    /// `affinity`.
    pub fn line_of(&self, offset: usize, affinity: Affinity) -> usize {
        let offset = offset.min(self.chars.len());
        for (index, line) in self.lines.iter().enumerate() {
            if offset < line.start || offset > line.end {
                continue;
            }
            let wraps_into_next = self
                .lines
                .get(index + 1)
                .is_some_and(|next| next.start == line.end);
            if offset == line.end && wraps_into_next && affinity == Affinity::Downstream {
                return index + 1;
            }
            return index;
        }
        self.last_line()
    }

    /// Cell column of `offset` measured from the start of visual line `line`.
    pub fn x_of(&self, offset: usize, line: usize) -> usize {
        let Some(visual) = self.lines.get(line) else {
            return 0;
        };
        let end = offset.clamp(visual.start, visual.end);
        let mut x = visual.line_x;
        for &ch in &self.chars[visual.start..end] {
            x = x.saturating_add(cell_width_at(ch, x, self.tab_width));
        }
        x - visual.line_x
    }

    /// Caret offset on visual line `line` closest to (not past) cell column `x`.
    pub fn offset_at_x(&self, line: usize, x: usize) -> usize {
        let Some(visual) = self.lines.get(line) else {
            return self.chars.len();
        };
        let mut cursor_x = 0usize;
        for offset in visual.start..visual.end {
            let width =
                cell_width_at(self.chars[offset], visual.line_x + cursor_x, self.tab_width);
            if cursor_x + width > x {
                return offset;
            }
            cursor_x += width;
        }
        visual.end
    }

    /// Affinity that keeps a caret placed at `offset` on visual line `line`.
    pub fn affinity_for(&self, offset: usize, line: usize) -> Affinity {
        match self.lines.get(line) {
            Some(visual) if offset == visual.end && line + 1 < self.lines.len() => {
                Affinity::Upstream
            }
            _ => Affinity::Downstream,
        }
    }
}
