//! Render a saved label to a text preview or a PDF
//! Usage: cargo run --bin render_label -- <label.json> [output.pdf]

use std::path::Path;

use nutri::config::LabelConfig;
use nutri::models::{Label, LabelEditor};
use nutri::tools::export::export_pdf;
use nutri::tools::render::{render_text, LabelTable};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let input = match args.get(1) {
        Some(path) => path,
        None => {
            eprintln!("Usage: render_label <label.json> [output.pdf]");
            std::process::exit(2);
        }
    };

    let config = LabelConfig::from_env()?;
    let json = std::fs::read_to_string(input)?;
    let label: Label = serde_json::from_str(&json)?;

    // Normalizes rows and fills in the kJ value
    let editor = LabelEditor::from_label(label, config)?;
    let table = LabelTable::build(editor.label(), editor.config());

    match args.get(2) {
        Some(output) => {
            let response = export_pdf(&table, Path::new(output))?;
            println!("{}", response.message);
            println!("  File: {}", response.file_path);
        }
        None => println!("{}", render_text(&table)),
    }

    Ok(())
}
