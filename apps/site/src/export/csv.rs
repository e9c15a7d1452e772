//! Minimal RFC 4180 CSV writer.
//!
//! Fields containing a comma, double quote, CR or LF are quoted, with inner
//! quotes doubled. Rows end in CRLF. Cells that a spreadsheet would evaluate
//! as a formula get a leading apostrophe.

const FORMULA_PREFIXES: &[char] = &['=', '+', '-', '@', '\t', '\r'];
const NEEDS_QUOTES: &[char] = &[',', '"', '\r', '\n'];

pub fn escape_field(value: &str) -> String {
    let value = if value.starts_with(FORMULA_PREFIXES) {
        format!("'{value}")
    } else {
        value.to_string()
    };

    if value.contains(NEEDS_QUOTES) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value
    }
}

fn write_row<S: AsRef<str>>(out: &mut String, row: &[S]) {
    let line = row
        .iter()
        .map(|cell| escape_field(cell.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

pub fn to_csv<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> String {
    let mut out = String::new();
    write_row(&mut out, headers);
    for row in rows {
        write_row(&mut out, row);
    }
    out
}
