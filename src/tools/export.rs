//! Label PDF export
//!
//! Draws a rendered `LabelTable` on a single page sized to the label layout.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::*;
use serde::Serialize;

use super::render::LabelTable;
use crate::nutrition::names::fold_diacritics;

const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);

const MARGIN_MM: f32 = 2.0;
const PT_PER_MM: f32 = 2.834645669;
/// Average Helvetica glyph width as a fraction of the font size
const GLYPH_WIDTH_RATIO: f32 = 0.5;

#[derive(Debug, Serialize)]
pub struct ExportLabelResponse {
    pub success: bool,
    pub file_path: String,
    pub width_mm: f32,
    pub height_mm: f32,
    pub rows: usize,
    pub message: String,
}

/// `tabela_nutricional_<product>_<timestamp>.pdf`
pub fn default_file_name(product_name: &str) -> String {
    let slug: String = fold_diacritics(&product_name.to_lowercase())
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug.trim_matches('_');
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

    if slug.is_empty() {
        format!("tabela_nutricional_{}.pdf", stamp)
    } else {
        format!("tabela_nutricional_{}_{}.pdf", slug, stamp)
    }
}

// ============================================================================
// PDF Helper Functions
// ============================================================================

fn rgb_to_printpdf(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn text_width_mm(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH_RATIO / PT_PER_MM
}

fn add_text(layer: &PdfLayerReference, font: &IndirectFontRef, text: &str, x: f32, y: f32, size: f32) {
    layer.set_fill_color(rgb_to_printpdf(COLOR_BLACK.0, COLOR_BLACK.1, COLOR_BLACK.2));
    layer.use_text(text, size, Mm(x), Mm(y), font);
}

/// Text centered horizontally in `[left, left + width]`
fn add_centered_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    left: f32,
    width: f32,
    y: f32,
    size: f32,
) {
    let x = left + ((width - text_width_mm(text, size)) / 2.0).max(0.0);
    add_text(layer, font, text, x, y, size);
}

fn add_line(layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32, width: f32) {
    layer.set_outline_color(rgb_to_printpdf(COLOR_BLACK.0, COLOR_BLACK.1, COLOR_BLACK.2));
    layer.set_outline_thickness(width);

    let line = Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y1)), false),
            (Point::new(Mm(x2), Mm(y2)), false),
        ],
        is_closed: false,
    };
    layer.add_line(line);
}

// ============================================================================
// Label Export
// ============================================================================

/// Write the label as a one-page PDF at `output_path`.
///
/// Works on an already-built table; the editor is never touched, so a failed
/// export can simply be retried.
pub fn export_pdf(table: &LabelTable, output_path: &Path) -> Result<ExportLabelResponse, String> {
    let layout = table.layout;
    let (width, height) = (layout.width_mm, layout.height_mm);

    let (doc, page1, layer1) = PdfDocument::new(
        format!("{} - {}", table.title, table.product_name),
        Mm(width),
        Mm(height),
        "Layer 1",
    );

    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| e.to_string())?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| e.to_string())?;

    let layer = doc.get_page(page1).get_layer(layer1);

    let left = MARGIN_MM;
    let right = width - MARGIN_MM;
    let inner_width = right - left;

    // Title takes two slots, then servings, serving, header, rows, footnote
    let slots = table.lines.len() as f32 + 6.0;
    let row_height = (height - 2.0 * MARGIN_MM) / slots;
    let size = (row_height * PT_PER_MM * 0.7).clamp(3.0, 10.0);
    let title_size = (size * 1.6).min(16.0);

    let columns = table.column_count();
    let name_width = inner_width * if columns == 2 { 0.6 } else { 0.4 };
    let value_width = (inner_width - name_width) / (columns - 1) as f32;
    let baseline = |y: f32| y - row_height * 0.75;

    // Frame
    let top = height - MARGIN_MM;
    let bottom = MARGIN_MM;
    add_line(&layer, left, top, right, top, 1.0);
    add_line(&layer, left, bottom, right, bottom, 1.0);
    add_line(&layer, left, top, left, bottom, 1.0);
    add_line(&layer, right, top, right, bottom, 1.0);

    let mut y = top;

    add_centered_text(&layer, &font_bold, &table.title, left, inner_width, y - row_height * 1.5, title_size);
    y -= row_height * 2.0;
    add_line(&layer, left, y, right, y, 0.5);

    add_text(&layer, &font, &table.servings_line, left + 1.0, baseline(y), size);
    y -= row_height;
    add_text(&layer, &font, &table.serving_line, left + 1.0, baseline(y), size);
    y -= row_height;
    add_line(&layer, left, y, right, y, 2.0);

    let header_top = y;
    for (i, header) in table.headers.iter().enumerate().skip(1) {
        let col_left = left + name_width + value_width * (i - 1) as f32;
        add_centered_text(&layer, &font_bold, header, col_left, value_width, baseline(y), size);
    }
    y -= row_height;
    add_line(&layer, left, y, right, y, 0.5);

    for line in &table.lines {
        let indent = line.indent as f32 * size * 0.5;
        let cells = line.cells(&layout);
        add_text(&layer, &font_bold, cells[0], left + 1.0 + indent, baseline(y), size);
        for (i, cell) in cells.iter().enumerate().skip(1) {
            let col_left = left + name_width + value_width * (i - 1) as f32;
            add_centered_text(&layer, &font, cell, col_left, value_width, baseline(y), size);
        }
        y -= row_height;
        add_line(&layer, left, y, right, y, 0.3);
    }

    // Column separators
    for i in 0..columns - 1 {
        let x = left + name_width + value_width * i as f32;
        add_line(&layer, x, header_top, x, y, 0.3);
    }

    add_text(&layer, &font_bold, &table.footnote, left + 1.0, baseline(y), size * 0.8);

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let file = File::create(output_path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).map_err(|e| e.to_string())?;

    tracing::info!(path = %output_path.display(), rows = table.lines.len(), "Label exported");

    Ok(ExportLabelResponse {
        success: true,
        file_path: output_path.display().to_string(),
        width_mm: width,
        height_mm: height,
        rows: table.lines.len(),
        message: format!(
            "Label for {} exported ({} rows, {}x{} mm)",
            table.product_name,
            table.lines.len(),
            width,
            height
        ),
    })
}
