//! Minimal CSV codec for snapshot files (quotes + CRLF tolerant).
use std::io::{self, Write};
use std::mem::take;

/// One parsed cell. `quoted` is set when any part of it was inside quotes,
/// so callers can tell written-out whitespace from editor noise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    pub value: String,
    pub quoted: bool,
}

impl Field {
    fn is_blank(&self) -> bool {
        !self.quoted && self.value.is_empty()
    }
}

/// Split `text` into rows of fields. Blank lines are skipped.
pub fn parse_rows(text: &str) -> Vec<Vec<Field>> {
    let mut rows = Vec::new();
    let mut field = Field::default();
    let mut row: Vec<Field> = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // doubled quote
                        field.value.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                    field.quoted = true;
                }
            }
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_blank()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.value.push(ch),
        }
    }

    // Flush a trailing row without newline, even if quotes were unterminated.
    if !field.is_blank() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',')
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
        || field.starts_with(char::is_whitespace)
        || field.ends_with(char::is_whitespace)
}

/// Write one CRLF-terminated row.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}
