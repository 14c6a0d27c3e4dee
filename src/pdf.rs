// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Template PDF rendering.
//!
//! Pure apart from font loading: a template record in, a paginated
//! document out. The questionnaire layout produces a printable
//! inspection form; the table layout is a plain question listing.
//!
//! genpdf paginates on its own but only tells the page decorator the
//! current page number, so the "Page N of M" stamp takes two passes:
//! the first render counts pages through a recording header callback
//! (with a same-height placeholder so both passes break identically),
//! the second emits the real stamp.

use crate::error::AppError;
use crate::models::TemplateRecord;
use genpdf::elements::{Break, FrameCellDecorator, LinearLayout, Paragraph, TableLayout};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Document, Element};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Fixed header fields on every questionnaire form.
const FORM_FIELDS: [&str; 4] = ["Inspector Name", "Date", "Location", "Project / Site ID"];

const TITLE_SIZE: u8 = 18;
const BODY_SIZE: u8 = 10;
const STAMP_SIZE: u8 = 8;
const HELPER_COLOR: Color = Color::Rgb(110, 110, 110);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Full inspection form with input affordances
    Questionnaire,
    /// Plain tabular question listing
    Table,
}

#[derive(Debug, Clone)]
pub enum RenderTarget {
    /// Write to disk, return nothing
    File(PathBuf),
    /// Return the encoded bytes for upload
    Bytes,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub layout: Layout,
    pub target: RenderTarget,
}

/// Render a template. `File` targets write the document and return
/// `None`; `Bytes` targets return the encoded document.
pub fn render(
    fonts_dir: &Path,
    template: &TemplateRecord,
    options: RenderOptions,
) -> Result<Option<Vec<u8>>, AppError> {
    let family = load_font(fonts_dir)?;

    // Pass 1: count pages.
    let pages = Arc::new(AtomicUsize::new(0));
    let doc = build_document(
        family.clone(),
        template,
        options.layout,
        PageStamp::Count(pages.clone()),
    )?;
    doc.render(std::io::sink())
        .map_err(|e| AppError::Pdf(e.to_string()))?;
    let total = pages.load(Ordering::Relaxed).max(1);

    // Pass 2: render for real with the page total known.
    let doc = build_document(family, template, options.layout, PageStamp::Total(total))?;
    match options.target {
        RenderTarget::File(path) => {
            let mut file = std::fs::File::create(&path)
                .map_err(|e| AppError::Pdf(format!("create {}: {}", path.display(), e)))?;
            doc.render(&mut file)
                .map_err(|e| AppError::Pdf(e.to_string()))?;
            Ok(None)
        }
        RenderTarget::Bytes => {
            let mut bytes = Vec::new();
            doc.render(&mut bytes)
                .map_err(|e| AppError::Pdf(e.to_string()))?;
            Ok(Some(bytes))
        }
    }
}

enum PageStamp {
    Count(Arc<AtomicUsize>),
    Total(usize),
}

/// Load the font family. Tries the configured directory first (Arial,
/// then LiberationSans), then the distro Liberation directory.
fn load_font(
    fonts_dir: &Path,
) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, AppError> {
    if let Ok(family) = genpdf::fonts::from_files(fonts_dir, "Arial", None) {
        return Ok(family);
    }
    if let Ok(family) = genpdf::fonts::from_files(fonts_dir, "LiberationSans", None) {
        return Ok(family);
    }
    genpdf::fonts::from_files("/usr/share/fonts/truetype/liberation", "LiberationSans", None)
        .map_err(|e| AppError::Pdf(format!("failed to load fonts: {}", e)))
}

fn build_document(
    family: genpdf::fonts::FontFamily<genpdf::fonts::FontData>,
    template: &TemplateRecord,
    layout: Layout,
    stamp: PageStamp,
) -> Result<Document, AppError> {
    let mut doc = Document::new(family);
    doc.set_title(template.name.clone());
    doc.set_paper_size(genpdf::PaperSize::Letter);
    doc.set_font_size(BODY_SIZE);
    doc.set_line_spacing(1.0);

    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(15);
    match stamp {
        PageStamp::Count(counter) => {
            decorator.set_header(move |page| {
                counter.fetch_max(page, Ordering::Relaxed);
                page_stamp(page, 0)
            });
        }
        PageStamp::Total(total) => {
            decorator.set_header(move |page| page_stamp(page, total));
        }
    }
    doc.set_page_decorator(decorator);

    push_heading(&mut doc, template);
    match layout {
        Layout::Questionnaire => push_questionnaire(&mut doc, template)?,
        Layout::Table => push_question_table(&mut doc, template)?,
    }

    Ok(doc)
}

fn page_stamp(page: usize, total: usize) -> genpdf::elements::StyledElement<Paragraph> {
    Paragraph::new(format!("Page {} of {}", page, total))
        .aligned(Alignment::Right)
        .styled(Style::new().with_font_size(STAMP_SIZE))
}

/// Title, metadata line, and description.
fn push_heading(doc: &mut Document, template: &TemplateRecord) {
    doc.push(
        Paragraph::new(template.name.clone())
            .styled(Style::new().bold().with_font_size(TITLE_SIZE)),
    );

    let date = template
        .updated_at
        .split('T')
        .next()
        .unwrap_or(&template.updated_at);
    doc.push(
        Paragraph::new(format!(
            "Category: {}   Version: {}   {}",
            template.category, template.version, date
        ))
        .styled(Style::new().with_font_size(STAMP_SIZE).with_color(HELPER_COLOR)),
    );
    doc.push(Break::new(1));

    if !template.description.trim().is_empty() {
        doc.push(Paragraph::new(template.description.clone()));
        doc.push(Break::new(1));
    }
}

/// The inspection form: fixed fields, one block per question, a notes
/// box, and a signature line.
fn push_questionnaire(doc: &mut Document, template: &TemplateRecord) -> Result<(), AppError> {
    for field in FORM_FIELDS {
        doc.push(Paragraph::new(format!("{}: {}", field, "_".repeat(44))));
        doc.push(Break::new(1));
    }
    doc.push(Break::new(1));

    for (index, question) in template.questions.iter().enumerate() {
        let marker = if question.required { " *" } else { "" };
        doc.push(
            Paragraph::new(format!("{}. {}{}", index + 1, question.text, marker))
                .styled(Style::new().bold()),
        );
        if let Some(helper) = &question.helper_text {
            if !helper.trim().is_empty() {
                doc.push(
                    Paragraph::new(helper.clone())
                        .styled(Style::new().italic().with_color(HELPER_COLOR)),
                );
            }
        }

        match question.question_type.as_str() {
            "checkbox" => {
                for option in &question.options {
                    doc.push(Paragraph::new(format!("[  ]  {}", option)));
                }
            }
            "radio" | "multiple_choice" => {
                for option in &question.options {
                    doc.push(Paragraph::new(format!("(  )  {}", option)));
                }
            }
            "select" | "dropdown" => {
                let choices = if question.options.is_empty() {
                    " ".to_string()
                } else {
                    question.options.join("  /  ")
                };
                doc.push(Paragraph::new(choices).padded(1).framed());
            }
            "date" => {
                doc.push(Paragraph::new("____ / ____ / ________").padded(1).framed());
            }
            "number" => {
                doc.push(Paragraph::new(" ").padded(1).framed());
            }
            _ => {
                doc.push(blank_box(3));
            }
        }
        doc.push(Break::new(1));
    }

    doc.push(Paragraph::new("Notes:").styled(Style::new().bold()));
    doc.push(blank_box(4));
    doc.push(Break::new(2));
    doc.push(Paragraph::new(format!(
        "Signature: {}        Date: {}",
        "_".repeat(34),
        "_".repeat(16)
    )));

    Ok(())
}

/// A bordered box of blank lines.
fn blank_box(lines: u32) -> impl Element {
    let mut layout = LinearLayout::vertical();
    layout.push(Break::new(lines as f64));
    layout.padded(1).framed()
}

/// Plain listing: number, question text, answer type.
fn push_question_table(doc: &mut Document, template: &TemplateRecord) -> Result<(), AppError> {
    let mut table = TableLayout::new(vec![1, 7, 2]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let mut header = table.row();
    header.push_element(Paragraph::new("#").styled(Style::new().bold()));
    header.push_element(Paragraph::new("Question").styled(Style::new().bold()));
    header.push_element(Paragraph::new("Type").styled(Style::new().bold()));
    header
        .push()
        .map_err(|e| AppError::Pdf(e.to_string()))?;

    for (index, question) in template.questions.iter().enumerate() {
        let marker = if question.required { " *" } else { "" };
        let mut row = table.row();
        row.push_element(Paragraph::new(format!("{}", index + 1)));
        row.push_element(Paragraph::new(format!("{}{}", question.text, marker)));
        row.push_element(Paragraph::new(question.question_type.clone()));
        row.push().map_err(|e| AppError::Pdf(e.to_string()))?;
    }

    doc.push(table);
    Ok(())
}
