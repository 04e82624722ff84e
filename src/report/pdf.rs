//! Minimal PDF 1.4 writer for laid-out [`Document`]s.
//!
//! Only what reports draw is supported: text in the two standard Helvetica
//! faces, filled gray rectangles and hairline rules. Text is written in
//! WinAnsi (Windows-1252): Latin-1 letters and the common typographic
//! punctuation keep their glyphs, anything else prints as `?`.

use std::fmt::Write as _;

use super::layout::{Document, DrawOp, Font, PAGE_HEIGHT, PAGE_WIDTH, Page};

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_REGULAR_ID: usize = 3;
const FONT_BOLD_ID: usize = 4;
const FIRST_PAGE_ID: usize = 5;

pub fn encode(document: &Document) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();

    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let page_ids: Vec<usize> = (0..document.pages.len())
        .map(|idx| FIRST_PAGE_ID + idx * 2)
        .collect();

    write_object(
        &mut out,
        &mut offsets,
        CATALOG_ID,
        &format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>"),
    );

    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    write_object(
        &mut out,
        &mut offsets,
        PAGES_ID,
        &format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            page_ids.len()
        ),
    );

    write_object(
        &mut out,
        &mut offsets,
        FONT_REGULAR_ID,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    write_object(
        &mut out,
        &mut offsets,
        FONT_BOLD_ID,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );

    for (page, &page_id) in document.pages.iter().zip(&page_ids) {
        let content_id = page_id + 1;
        write_object(
            &mut out,
            &mut offsets,
            page_id,
            &format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 {FONT_REGULAR_ID} 0 R /F2 {FONT_BOLD_ID} 0 R >> >> \
                 /Contents {content_id} 0 R >>",
                num(PAGE_WIDTH),
                num(PAGE_HEIGHT)
            ),
        );

        let stream = content_stream(page);
        let body = format!(
            "<< /Length {} >>\nstream\n{stream}\nendstream",
            stream.len()
        );
        write_object(&mut out, &mut offsets, content_id, &body);
    }

    let xref_offset = out.len();
    let size = offsets.len() + 1;
    let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
    for offset in &offsets {
        let _ = writeln!(xref, "{offset:010} 00000 n ");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {size} /Root {CATALOG_ID} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
    );
    out.extend_from_slice(xref.as_bytes());
    out
}

/// Objects are written in id order, so `offsets[id - 1]` is object `id`.
fn write_object(out: &mut Vec<u8>, offsets: &mut Vec<usize>, id: usize, body: &str) {
    debug_assert_eq!(offsets.len() + 1, id);
    offsets.push(out.len());
    out.extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
}

fn content_stream(page: &Page) -> String {
    let mut stream = String::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                font,
                text,
            } => {
                let font = match font {
                    Font::Regular => "F1",
                    Font::Bold => "F2",
                };
                let _ = writeln!(
                    stream,
                    "BT /{font} {} Tf {} {} Td ({}) Tj ET",
                    num(*size),
                    num(*x),
                    num(*y),
                    escape_text(text)
                );
            }
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                gray,
            } => {
                let _ = writeln!(
                    stream,
                    "{} g {} {} {} {} re f 0 g",
                    num(*gray),
                    num(*x),
                    num(*y),
                    num(*width),
                    num(*height)
                );
            }
            DrawOp::Rule { x1, y1, x2, y2 } => {
                let _ = writeln!(
                    stream,
                    "0.5 w {} {} m {} {} l S",
                    num(*x1),
                    num(*y1),
                    num(*x2),
                    num(*y2)
                );
            }
        }
    }
    stream
}

fn num(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            ' '..='~' => escaped.push(ch),
            '\t' | '\n' | '\r' => escaped.push(' '),
            _ => match win_ansi_code(ch) {
                Some(code) => {
                    let _ = write!(escaped, "\\{code:03o}");
                }
                None => escaped.push('?'),
            },
        }
    }
    escaped
}

/// Byte for `ch` in WinAnsiEncoding, for characters outside printable ASCII.
fn win_ansi_code(ch: char) -> Option<u8> {
    match ch {
        '\u{00A0}'..='\u{00FF}' => u8::try_from(u32::from(ch)).ok(),
        '\u{20AC}' => Some(0x80),
        '\u{2026}' => Some(0x85),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201C}' => Some(0x93),
        '\u{201D}' => Some(0x94),
        '\u{2022}' => Some(0x95),
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::layout::{DocumentBuilder, TextStyle};

    /// `%PDF-1.4\n` plus the binary marker comment; everything after is ASCII.
    const HEADER_LEN: usize = 15;

    fn ascii_body(bytes: &[u8]) -> &str {
        std::str::from_utf8(&bytes[HEADER_LEN..]).expect("ascii body")
    }

    fn sample_document() -> Document {
        let (mut builder, cursor) = DocumentBuilder::new();
        let cursor = builder.line(cursor, TextStyle::TITLE, "Plan (draft)");
        builder.rule(cursor);
        let next = builder.new_page();
        builder.line(next, TextStyle::BODY, "Page two \u{2014} done");
        builder.finish()
    }

    #[test]
    fn escapes_delimiters() {
        assert_eq!(escape_text(r"a (b) \c"), r"a \(b\) \\c");
        assert_eq!(escape_text("tab\there"), "tab here");
    }

    #[test]
    fn accented_names_keep_their_glyphs() {
        assert_eq!(escape_text("Jos\u{00e9}"), r"Jos\351");
        assert_eq!(
            escape_text("Pr\u{00e9}stamo \u{00d1}and\u{00fa}"),
            r"Pr\351stamo \321and\372"
        );
        assert_eq!(escape_text("\u{00a3}5"), r"\2435");
    }

    #[test]
    fn typographic_punctuation_maps_to_win_ansi() {
        assert_eq!(
            escape_text("it\u{2019}s \u{2014} \u{201C}ok\u{201D}"),
            r"it\222s \227 \223ok\224"
        );
        assert_eq!(escape_text("\u{20AC}9\u{2026}"), r"\2009\205");
        assert_eq!(escape_text("\u{4e2d}\u{1F600}"), "??");
    }

    #[test]
    fn formats_numbers_compactly() {
        assert_eq!(num(612.0), "612");
        assert_eq!(num(10.5), "10.5");
        assert_eq!(num(0.126), "0.13");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn encodes_well_formed_document() {
        let bytes = encode(&sample_document());
        let text = ascii_body(&bytes);

        assert!(bytes.starts_with(b"%PDF-1.4\n%"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/Count 2"));
        assert!(text.contains("(Plan \\(draft\\)) Tj"));
        assert!(text.contains(r"(Page two \227 done) Tj"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = encode(&sample_document());
        let text = ascii_body(&bytes);
        let startxref = text.rfind("startxref\n").expect("startxref present");
        let xref_offset: usize = text[startxref + "startxref\n".len()..]
            .lines()
            .next()
            .and_then(|line| line.parse().ok())
            .expect("numeric offset");
        assert!(bytes[xref_offset..].starts_with(b"xref\n"));

        let table = &text[xref_offset - HEADER_LEN..startxref];
        let entries: Vec<&str> = table.lines().filter(|l| l.ends_with(" n ")).collect();
        // catalog, pages, two fonts, and a page + content pair per page
        assert_eq!(entries.len(), 8);
        for (idx, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().expect("offset");
            let header = format!("{} 0 obj\n", idx + 1);
            assert!(
                bytes[offset..].starts_with(header.as_bytes()),
                "object {}",
                idx + 1
            );
        }
    }

    #[test]
    fn stream_length_matches_content() {
        let bytes = encode(&sample_document());
        let text = ascii_body(&bytes);
        let length_at = text.find("<< /Length ").expect("stream present");
        let length: usize = text[length_at + "<< /Length ".len()..]
            .split_whitespace()
            .next()
            .and_then(|n| n.parse().ok())
            .expect("length");
        let start = text[length_at..].find("stream\n").expect("stream keyword") + length_at + 7;
        assert_eq!(&text[start + length..start + length + 1], "\n");
        assert!(text[start + length + 1..].starts_with("endstream"));
    }
}
