//! Printable rendering of a generated report.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use rust_decimal::Decimal;

use crate::entities::sea_orm_active_enums::TransactionType;

use super::{error::*, models::ReportDataModel};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 18.0;
const FOOTER_Y_MM: f32 = 10.0;
/// Lowest baseline body text may use before a page break
const BOTTOM_Y_MM: f32 = 24.0;
const DESCRIPTION_MAX_CHARS: usize = 34;

pub const REPORT_FILE_NAME: &str = "financial-report.pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Heading,
    Label,
    Body,
    Note,
}

impl TextStyle {
    fn font_size(&self) -> f32 {
        match self {
            TextStyle::Title => 20.0,
            TextStyle::Heading => 14.0,
            TextStyle::Label | TextStyle::Body => 10.0,
            TextStyle::Note => 8.0,
        }
    }

    fn line_height(&self) -> f32 {
        match self {
            TextStyle::Title => 11.0,
            TextStyle::Heading => 9.0,
            TextStyle::Label | TextStyle::Body => 6.0,
            TextStyle::Note => 5.0,
        }
    }

    fn is_bold(&self) -> bool {
        matches!(self, TextStyle::Title | TextStyle::Heading | TextStyle::Label)
    }
}

///
/// One printed row. Each cell is an x offset from the left margin, in
/// millimeters, and its text. A row without cells is vertical spacing.
/// 
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLine {
    pub style: TextStyle,
    pub cells: Vec<(f32, String)>,
}

impl PdfLine {
    fn text(style: TextStyle, text: impl Into<String>) -> Self {
        Self { style, cells: vec![(0.0, text.into())] }
    }

    fn row(style: TextStyle, cells: Vec<(f32, String)>) -> Self {
        Self { style, cells }
    }

    fn gap() -> Self {
        Self { style: TextStyle::Body, cells: vec![] }
    }
}

pub struct ReportOwner {
    pub name: String,
    pub email: String,
}

/// Lays out the report as printed rows, top to bottom
pub fn report_lines(owner: &ReportOwner, report: &ReportDataModel) -> Vec<PdfLine> {
    let mut lines = vec![
        PdfLine::text(TextStyle::Heading, "Spendee Financial"),
        PdfLine::text(TextStyle::Note, "Financial Management System"),
        PdfLine::text(TextStyle::Body, format!("{} ({})", owner.name, owner.email)),
        PdfLine::gap(),
        PdfLine::text(TextStyle::Title, "Financial Report"),
        PdfLine::text(
            TextStyle::Body,
            format!("{} - {}", report.start_date.format("%b %d, %Y"), report.end_date.format("%b %d, %Y")),
        ),
        PdfLine::gap(),
        PdfLine::text(TextStyle::Heading, "Executive Summary"),
        PdfLine::row(TextStyle::Body, vec![(0.0, String::from("Total Income")), (70.0, money(report.total_income))]),
        PdfLine::row(TextStyle::Body, vec![(0.0, String::from("Total Expenses")), (70.0, money(report.total_expense))]),
        PdfLine::row(TextStyle::Label, vec![(0.0, String::from("Net Savings")), (70.0, money(report.net_savings))]),
        PdfLine::gap(),
    ];

    if !report.time_series_data.is_empty() {
        lines.push(PdfLine::text(TextStyle::Heading, "Financial Overview"));
        lines.push(PdfLine::row(TextStyle::Label, vec![
            (0.0, String::from("Period")), 
            (70.0, String::from("Income")), 
            (120.0, String::from("Expenses")),
        ]));
        for data in report.time_series_data.iter() {
            lines.push(PdfLine::row(TextStyle::Body, vec![
                (0.0, data.period.clone()), 
                (70.0, money(data.income)), 
                (120.0, money(data.expense)),
            ]));
        }
        lines.push(PdfLine::gap());
    }

    if !report.category_breakdown.is_empty() {
        let mut categories: Vec<_> = report.category_breakdown.iter().collect();
        categories.sort_by(|a, b| b.1.cmp(a.1));

        lines.push(PdfLine::text(TextStyle::Heading, "Category Breakdown"));
        for (name, amount) in categories {
            lines.push(PdfLine::row(TextStyle::Body, vec![(0.0, name.clone()), (70.0, money(*amount))]));
        }
        lines.push(PdfLine::gap());
    }

    lines.push(PdfLine::text(TextStyle::Heading, "Transaction Details"));
    if report.transactions.is_empty() {
        lines.push(PdfLine::text(TextStyle::Body, "No transactions in this period."));
    } else {
        lines.push(PdfLine::row(TextStyle::Label, vec![
            (0.0, String::from("Date")), 
            (26.0, String::from("Description")), 
            (96.0, String::from("Category")), 
            (134.0, String::from("Type")), 
            (154.0, String::from("Amount")),
        ]));
        for tx in report.transactions.iter() {
            let (tx_type, sign) = match tx.tx_type {
                TransactionType::Income => ("Income", "+"),
                TransactionType::Expense => ("Expense", "-"),
            };
            lines.push(PdfLine::row(TextStyle::Body, vec![
                (0.0, tx.date.format("%b %d, %Y").to_string()), 
                (26.0, truncate(&tx.description, DESCRIPTION_MAX_CHARS)), 
                (96.0, tx.category.clone()), 
                (134.0, tx_type.to_string()), 
                (154.0, format!("{}{}", sign, money(tx.amount))),
            ]));
        }
    }

    lines.push(PdfLine::gap());
    lines.push(PdfLine::text(
        TextStyle::Note, 
        "This report was generated by Spendee Financial. Amounts are shown in your account currency.",
    ));

    lines
}

///
/// Splits rows into pages, pairing each with its baseline in millimeters
/// from the bottom of the page
/// 
pub fn paginate(lines: &[PdfLine]) -> Vec<Vec<(f32, &PdfLine)>> {
    let top = PAGE_HEIGHT_MM - MARGIN_MM;
    let mut pages = vec![vec![]];
    let mut y = top;

    for line in lines {
        let next_y = y - line.style.line_height();
        if next_y < BOTTOM_Y_MM {
            pages.push(vec![]);
            y = top - line.style.line_height();
        } else {
            y = next_y;
        }

        if let Some(page) = pages.last_mut() {
            page.push((y, line));
        }
    }

    pages
}

pub fn render_pdf(title: &str, lines: &[PdfLine]) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;

    for (index, page) in paginate(lines).into_iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            doc.get_page(page_idx).get_layer(layer_idx)
        };

        for (y, line) in page {
            let font: &IndirectFontRef = if line.style.is_bold() { &bold } else { &regular };
            for (x, text) in line.cells.iter() {
                layer.use_text(text.as_str(), line.style.font_size(), Mm(MARGIN_MM + x), Mm(y), font);
            }
        }
        layer.use_text(
            format!("Page {}", index + 1), 
            TextStyle::Note.font_size(), 
            Mm(PAGE_WIDTH_MM / 2.0 - 5.0), 
            Mm(FOOTER_Y_MM), 
            &regular,
        );
    }

    doc.save_to_bytes().map_err(pdf_error)
}

fn pdf_error(e: impl std::fmt::Debug) -> Error {
    Error::PdfError(format!("{:?}", e))
}

fn money(amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars - 3).collect();
    short.push_str("...");
    short
}
