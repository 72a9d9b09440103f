//! Cleanup of the raw container log stream.
//!
//! Without a TTY the Docker daemon multiplexes stdout/stderr into frames with
//! an 8-byte header: `[stream, 0, 0, 0, len_be32]`. With a TTY the body is the
//! plain terminal output. Either way the result may carry control bytes and
//! ANSI escapes that have no place in the log view.

use crate::model::NO_LOGS;

const FRAME_HEADER_LEN: usize = 8;

/// Split a multiplexed log body into its payloads. Returns None when the
/// bytes do not follow the framing exactly.
fn demultiplex(raw: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(raw.len());
    let mut rest = raw;
    while !rest.is_empty() {
        if rest.len() < FRAME_HEADER_LEN {
            return None;
        }
        let stream = rest[0];
        if stream > 2 || rest[1..4] != [0, 0, 0] {
            return None;
        }
        let len = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        let body = rest.get(FRAME_HEADER_LEN..FRAME_HEADER_LEN + len)?;
        out.extend_from_slice(body);
        rest = &rest[FRAME_HEADER_LEN + len..];
    }
    Some(out)
}

/// Remove ANSI CSI sequences and every control character except newline and tab.
fn strip_controls(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            if chars.peek() == Some(&'[') {
                chars.next();
                // CSI ends at the first byte in 0x40..=0x7e
                for c in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&c) {
                        break;
                    }
                }
            }
            continue;
        }
        if c == '\n' || c == '\t' || !c.is_control() {
            out.push(c);
        }
    }
    out
}

/// Turn a raw log body into visible lines joined with `\n`. Blank lines are
/// dropped; order is preserved. Empty output becomes the "no logs" text.
pub fn clean_log_output(raw: &[u8]) -> String {
    let payload = demultiplex(raw).unwrap_or_else(|| raw.to_vec());
    let text = String::from_utf8_lossy(&payload);
    let visible = strip_controls(&text);

    let lines: Vec<&str> = visible
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        NO_LOGS.to_string()
    } else {
        lines.join("\n")
    }
}
