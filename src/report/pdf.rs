use super::{SummaryPayload, TEMPLATE_ID};
use crate::error::{ReportError, Result};

/// Turns a display payload into document bytes for a named template.
pub trait TemplateEngine {
    fn render(&self, template: &str, payload: &SummaryPayload) -> Result<Vec<u8>>;
}

/// Self-contained PDF 1.4 writer using the standard Type1 fonts, so no
/// font files or external renderer are required.
pub struct BuiltinPdf;

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 50;
const LINE_HEIGHT: u32 = 14;
const ROWS_PER_PAGE: usize = 45;

const COLUMNS: [(&str, usize); 5] = [
    ("Pool", 28),
    ("Total time", 18),
    ("Accesses", 9),
    ("Users", 7),
    ("Mean time", 16),
];

// Object ids: 1 catalog, 2 page tree, 3..=6 fonts, then (page, content) pairs.
const FIRST_PAGE_ID: usize = 7;
const FONTS: [(&str, &str); 4] = [
    ("F1", "Helvetica-Bold"),
    ("F2", "Courier"),
    ("F3", "Courier-Bold"),
    ("F4", "Helvetica"),
];

impl TemplateEngine for BuiltinPdf {
    fn render(&self, template: &str, payload: &SummaryPayload) -> Result<Vec<u8>> {
        if template != TEMPLATE_ID {
            return Err(ReportError::Render(format!("unknown template: {template}")));
        }

        let rows: Vec<String> = payload
            .data
            .iter()
            .map(|r| {
                table_line([
                    &r.name,
                    &r.time,
                    &r.count.to_string(),
                    &r.users.to_string(),
                    &r.mean,
                ])
            })
            .collect();
        let total = table_line([
            "Total",
            &payload.time,
            &payload.count.to_string(),
            &payload.users.to_string(),
            &payload.mean,
        ]);

        let chunks: Vec<&[String]> = if rows.is_empty() {
            vec![&rows[..]]
        } else {
            rows.chunks(ROWS_PER_PAGE).collect()
        };
        let page_count = chunks.len();

        let mut doc = PdfWriter::new();
        doc.object(1, "<< /Type /Catalog /Pages 2 0 R >>");

        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", FIRST_PAGE_ID + 2 * i))
            .collect();
        doc.object(
            2,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
                kids.join(" ")
            ),
        );

        for (i, (_, base)) in FONTS.iter().enumerate() {
            doc.object(
                3 + i,
                &format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>"),
            );
        }

        let font_refs: String = FONTS
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("/{name} {} 0 R", 3 + i))
            .collect::<Vec<_>>()
            .join(" ");

        for (i, chunk) in chunks.iter().enumerate() {
            let page_id = FIRST_PAGE_ID + 2 * i;
            let last = i + 1 == page_count;
            let content = page_content(payload, chunk, last.then_some(total.as_str()), i + 1, page_count);

            doc.object(
                page_id,
                &format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                     /Resources << /Font << {font_refs} >> >> /Contents {} 0 R >>",
                    page_id + 1
                ),
            );
            doc.stream(page_id + 1, &content);
        }

        Ok(doc.finish())
    }
}

fn page_content(
    payload: &SummaryPayload,
    rows: &[String],
    total: Option<&str>,
    page: usize,
    pages: usize,
) -> String {
    let mut ops = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    text(&mut ops, "F1", 14, MARGIN, y, &payload.header);
    y -= 2 * LINE_HEIGHT;

    let header = table_line(COLUMNS.map(|(title, _)| title));
    text(&mut ops, "F3", 9, MARGIN, y, &header);
    y -= LINE_HEIGHT;

    for row in rows {
        text(&mut ops, "F2", 9, MARGIN, y, row);
        y -= LINE_HEIGHT;
    }

    if let Some(total) = total {
        let rule_y = y + LINE_HEIGHT - 4;
        ops.push_str(&format!(
            "0.5 w {MARGIN} {rule_y} m {} {rule_y} l S\n",
            PAGE_WIDTH - MARGIN
        ));
        text(&mut ops, "F3", 9, MARGIN, y, total);
    }

    ops.push_str("0.6 g\n");
    text(&mut ops, "F4", 8, MARGIN, MARGIN / 2, &payload.watermark);
    text(
        &mut ops,
        "F4",
        8,
        PAGE_WIDTH - MARGIN - 40,
        MARGIN / 2,
        &format!("{page} / {pages}"),
    );
    ops.push_str("0 g\n");

    ops
}

fn text(ops: &mut String, font: &str, size: u32, x: u32, y: u32, s: &str) {
    ops.push_str(&format!(
        "BT /{font} {size} Tf {x} {y} Td ({}) Tj ET\n",
        escape(s)
    ));
}

/// Fixed-width row for the monospaced table body; the first column is
/// left-aligned and truncated, the rest are right-aligned.
fn table_line(cells: [&str; 5]) -> String {
    let mut line = String::new();
    for (i, (cell, &(_, width))) in cells.iter().zip(COLUMNS.iter()).enumerate() {
        if i == 0 {
            let clipped: String = cell.chars().take(width).collect();
            line.push_str(&format!("{clipped:<width$}"));
        } else {
            line.push_str(&format!(" {cell:>width$}"));
        }
    }
    line
}

/// WinAnsiEncoding code for a non-ASCII character, if the fonts can show it.
fn win_ansi(c: char) -> Option<u8> {
    let code = match c {
        '\u{A0}'..='\u{FF}' => return Some(c as u8),
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// PDF literal-string escaping. Non-ASCII characters are written as octal
/// WinAnsi codes; characters outside WinAnsi become `?`.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => match win_ansi(c) {
                Some(code) => out.push_str(&format!("\\{code:03o}")),
                None => out.push('?'),
            },
        }
    }
    out
}

/// Byte-level document builder. Objects must be added in ascending id order
/// starting at 1 so the cross-reference table lines up.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, id: usize, body: &str) {
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.buf.len());
        self.buf
            .extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
    }

    fn stream(&mut self, id: usize, content: &str) {
        self.object(
            id,
            &format!(
                "<< /Length {} >>\nstream\n{content}endstream",
                content.len()
            ),
        );
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_at = self.buf.len();
        let size = self.offsets.len() + 1;

        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for off in &self.offsets {
            xref.push_str(&format!("{off:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
        ));

        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}
