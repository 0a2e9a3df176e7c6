//! Minimal CSV field handling for the lookup and tracking files.
//!
//! Only what the two flat files need: comma separation, RFC-4180 style
//! quoting for fields that embed commas, quotes or newlines. Fields never
//! span multiple lines on the write side, so a record is always one line.

use snafu::Snafu;

/// Joins `fields` into one CSV record without a trailing newline.
#[must_use]
pub fn format_record(fields: &[&str]) -> String {
    let mut record = String::new();
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            record.push(',');
        }
        if needs_quoting(field) {
            record.push('"');
            for c in field.chars() {
                if c == '"' {
                    record.push('"');
                }
                record.push(c);
            }
            record.push('"');
        } else {
            record.push_str(field);
        }
    }
    record
}

fn needs_quoting(field: &str) -> bool {
    field.contains(['"', ',', '\n', '\r'])
}

/// Splits one record line into its fields, undoing the quoting applied by
/// [`format_record`].
pub fn split_record(line: &str) -> Result<Vec<String>, ParseRecordError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    loop {
        match chars.peek() {
            Some('"') => {
                chars.next();
                ensure_empty(&current, line)?;
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            current.push('"');
                        }
                        Some('"') => break,
                        Some(c) => current.push(c),
                        None => {
                            return UnterminatedQuoteSnafu { line }.fail();
                        }
                    }
                }
                match chars.next() {
                    Some(',') => fields.push(std::mem::take(&mut current)),
                    None => {
                        fields.push(current);
                        return Ok(fields);
                    }
                    Some(c) => {
                        return TrailingGarbageSnafu { line, found: c }.fail();
                    }
                }
            }
            Some(_) => loop {
                match chars.next() {
                    Some(',') => {
                        fields.push(std::mem::take(&mut current));
                        break;
                    }
                    Some('"') => {
                        return StrayQuoteSnafu { line }.fail();
                    }
                    Some(c) => current.push(c),
                    None => {
                        fields.push(current);
                        return Ok(fields);
                    }
                }
            },
            None => {
                fields.push(current);
                return Ok(fields);
            }
        }
    }
}

fn ensure_empty(current: &str, line: &str) -> Result<(), ParseRecordError> {
    if current.is_empty() {
        Ok(())
    } else {
        StrayQuoteSnafu { line }.fail()
    }
}

#[derive(Debug, Snafu)]
pub enum ParseRecordError {
    #[snafu(display("unterminated quoted field in record: {line}"))]
    UnterminatedQuote { line: String },
    #[snafu(display("quote inside unquoted field in record: {line}"))]
    StrayQuote { line: String },
    #[snafu(display("unexpected character {found:?} after closing quote in record: {line}"))]
    TrailingGarbage { line: String, found: char },
}
