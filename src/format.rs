//! Typed alert arguments and the bounded message renderer
//!
//! Catalog templates use a small printf subset: `%s`, `%u`, `%x` (with an
//! optional `0` flag and width), `%p` and `%%`. Arguments are consumed
//! positionally. Output goes into a [`MessageBuffer`], which clips at
//! [`MAX_MESSAGE_LEN`] bytes and never holds anything past the clip.

use std::borrow::Cow;
use std::fmt::{self, Write};

use crate::types::MAX_MESSAGE_LEN;

/// One positional argument for a message template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventArg<'a> {
    /// Substituted for `%s`
    Str(Cow<'a, str>),
    /// Substituted for `%u` and `%x`
    Unsigned(u64),
    /// Substituted for `%p`
    Pointer(usize),
}

impl<'a> From<&'a str> for EventArg<'a> {
    fn from(s: &'a str) -> Self {
        EventArg::Str(Cow::Borrowed(s))
    }
}

impl From<String> for EventArg<'static> {
    fn from(s: String) -> Self {
        EventArg::Str(Cow::Owned(s))
    }
}

impl From<u32> for EventArg<'static> {
    fn from(v: u32) -> Self {
        EventArg::Unsigned(v as u64)
    }
}

impl From<u16> for EventArg<'static> {
    fn from(v: u16) -> Self {
        EventArg::Unsigned(v as u64)
    }
}

impl From<u8> for EventArg<'static> {
    fn from(v: u8) -> Self {
        EventArg::Unsigned(v as u64)
    }
}

/// Fixed-capacity scratch buffer for one rendered message
#[derive(Debug, Clone)]
pub struct MessageBuffer {
    buf: String,
    truncated: bool,
}

impl MessageBuffer {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(MAX_MESSAGE_LEN),
            truncated: false,
        }
    }

    /// Reset for the next message, keeping the allocation
    pub fn clear(&mut self) {
        self.buf.clear();
        self.truncated = false;
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Whether the last render was clipped
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MessageBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        let room = MAX_MESSAGE_LEN - self.buf.len();
        if s.len() <= room {
            self.buf.push_str(s);
            return Ok(());
        }

        // Clip on a char boundary
        let mut end = room;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buf.push_str(&s[..end]);
        self.truncated = true;
        Ok(())
    }
}

/// Parsed conversion spec: `%[0][width]<conv>`
struct Directive {
    zero_pad: bool,
    width: usize,
    conv: char,
}

/// Render `template` with `args` into `out`
///
/// `out` is cleared first. A directive without a matching argument (missing,
/// or of the wrong kind) is copied through verbatim.
pub fn render(template: &str, args: &[EventArg<'_>], out: &mut MessageBuffer) {
    out.clear();

    let mut args = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        let _ = out.write_str(&rest[..pos]);
        let spec = &rest[pos..];

        let Some((directive, consumed)) = parse_directive(spec) else {
            // Lone trailing '%' or unknown conversion
            let _ = out.write_char('%');
            rest = &spec[1..];
            continue;
        };
        let raw = &spec[..consumed];
        rest = &spec[consumed..];

        if directive.conv == '%' {
            let _ = out.write_char('%');
            continue;
        }

        match (directive.conv, args.next()) {
            ('s', Some(EventArg::Str(s))) => {
                let _ = pad(out, &directive, s);
            }
            ('u', Some(EventArg::Unsigned(v))) => {
                let _ = pad(out, &directive, &v.to_string());
            }
            ('x', Some(EventArg::Unsigned(v))) => {
                let _ = pad(out, &directive, &format!("{:x}", v));
            }
            ('p', Some(EventArg::Pointer(p))) => {
                let text = if *p == 0 {
                    "(nil)".to_string()
                } else {
                    format!("{:#x}", p)
                };
                let _ = pad(out, &directive, &text);
            }
            _ => {
                let _ = out.write_str(raw);
            }
        }
    }
    let _ = out.write_str(rest);
}

fn parse_directive(spec: &str) -> Option<(Directive, usize)> {
    let bytes = spec.as_bytes();
    let mut i = 1;

    let zero_pad = bytes.get(i) == Some(&b'0');
    if zero_pad {
        i += 1;
    }

    let mut width = 0usize;
    while let Some(d) = bytes.get(i).filter(|b| b.is_ascii_digit()) {
        width = width.saturating_mul(10).saturating_add((d - b'0') as usize);
        i += 1;
    }

    let conv = *bytes.get(i)? as char;
    if !matches!(conv, 's' | 'u' | 'x' | 'p' | '%') {
        return None;
    }

    Some((
        Directive {
            zero_pad,
            width,
            conv,
        },
        i + 1,
    ))
}

fn pad(out: &mut MessageBuffer, directive: &Directive, text: &str) -> fmt::Result {
    let len = text.chars().count();
    if len < directive.width {
        // printf ignores the 0 flag for strings
        let fill = if directive.zero_pad && directive.conv != 's' { '0' } else { ' ' };
        for _ in 0..directive.width - len {
            out.write_char(fill)?;
        }
    }
    out.write_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_str(template: &str, args: &[EventArg<'_>]) -> String {
        let mut out = MessageBuffer::new();
        render(template, args, &mut out);
        out.as_str().to_string()
    }

    #[test]
    fn test_basic_substitution() {
        let s = render_str(
            "SMB - %s: Bad word count: %u",
            &["Read AndX".into(), 12u32.into()],
        );
        assert_eq!(s, "SMB - Read AndX: Bad word count: 12");
    }

    #[test]
    fn test_hex_zero_pad() {
        assert_eq!(render_str("type: 0x%02x", &[5u8.into()]), "type: 0x05");
        assert_eq!(render_str("type: 0x%02x", &[0xabu8.into()]), "type: 0xab");
        assert_eq!(render_str("[%4u]", &[7u32.into()]), "[   7]");
    }

    #[test]
    fn test_pointer() {
        assert_eq!(
            render_str("%p not between %p and %p", &[
                EventArg::Pointer(0x40),
                EventArg::Pointer(0),
                EventArg::Pointer(0x20),
            ]),
            "0x40 not between (nil) and 0x20"
        );
    }

    #[test]
    fn test_percent_and_literal_escapes() {
        assert_eq!(render_str("100%%", &[]), "100%");
        assert_eq!(render_str("not \\xffSMB", &[]), "not \\xffSMB");
        assert_eq!(render_str("trailing %", &[]), "trailing %");
        assert_eq!(render_str("%d stays", &[1u32.into()]), "%d stays");
    }

    #[test]
    fn test_missing_or_mismatched_args() {
        assert_eq!(render_str("a %u b %s", &[3u32.into()]), "a 3 b %s");
        assert_eq!(render_str("%u", &["x".into()]), "%u");
    }

    #[test]
    fn test_truncation() {
        let long = "A".repeat(400);
        let mut out = MessageBuffer::new();
        render("(dcerpc2) %s", &[long.as_str().into()], &mut out);

        assert_eq!(out.len(), MAX_MESSAGE_LEN);
        assert!(out.is_truncated());
        assert!(out.as_str().starts_with("(dcerpc2) AAA"));

        // Reuse resets the flag
        render("short", &[], &mut out);
        assert_eq!(out.as_str(), "short");
        assert!(!out.is_truncated());
    }

    #[test]
    fn test_truncation_on_char_boundary() {
        let long = "é".repeat(200);
        let mut out = MessageBuffer::new();
        render("%s", &[long.into()], &mut out);
        assert!(out.len() <= MAX_MESSAGE_LEN);
        assert!(out.as_str().chars().all(|c| c == 'é'));
    }
}
