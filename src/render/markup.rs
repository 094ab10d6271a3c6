//! Inline color markup used in entry text.
//!
//! Entry text may carry `<color=#rrggbb>` or `<color=#rrggbbaa>` tags closed by
//! `</color>`. Tags nest. Anything that does not parse as a tag is kept as literal text.

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

const OPEN_PREFIX: &str = "<color=#";
const CLOSE_TAG: &str = "</color>";

/// An RGBA color from a markup tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    fn from_hex(hex: &str) -> Option<Self> {
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 0xff },
        })
    }

    pub fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

/// A run of text sharing one color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub color: Option<Rgba>,
}

/// Split `text` into colored runs with all recognised tags removed
pub fn parse(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut stack: Vec<Rgba> = Vec::new();
    let mut current = String::new();
    let mut rest = text;

    while let Some(pos) = rest.find('<') {
        current.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix(CLOSE_TAG) {
            if !stack.is_empty() {
                flush(&mut segments, &mut current, stack.last().copied());
                stack.pop();
                rest = after;
                continue;
            }
        } else if let Some((color, after)) = open_tag(tail) {
            flush(&mut segments, &mut current, stack.last().copied());
            stack.push(color);
            rest = after;
            continue;
        }

        current.push('<');
        rest = &tail[1..];
    }
    current.push_str(rest);
    flush(&mut segments, &mut current, stack.last().copied());
    segments
}

/// Text with all markup removed
pub fn plain(text: &str) -> String {
    parse(text).into_iter().map(|segment| segment.text).collect()
}

/// Styled line for `text`. With `colors` off, colored runs fall back to `muted`.
pub fn to_line(text: &str, base: Style, colors: bool, muted: Color) -> Line<'static> {
    let spans: Vec<Span<'static>> = parse(text)
        .into_iter()
        .map(|segment| match segment.color {
            Some(rgba) if colors => Span::styled(segment.text, base.fg(rgba.to_color())),
            Some(_) => Span::styled(segment.text, base.fg(muted)),
            None => Span::styled(segment.text, base),
        })
        .collect();
    Line::from(spans)
}

fn open_tag(tail: &str) -> Option<(Rgba, &str)> {
    let body = tail.strip_prefix(OPEN_PREFIX)?;
    let end = body.find('>')?;
    let color = Rgba::from_hex(&body[..end])?;
    Some((color, &body[end + 1..]))
}

fn flush(segments: &mut Vec<Segment>, current: &mut String, color: Option<Rgba>) {
    if current.is_empty() {
        return;
    }
    segments.push(Segment {
        text: std::mem::take(current),
        color,
    });
}
