use anyhow::Result;
use console::style;
use std::path::Path;

/// Print the text extracted from a resume file
pub fn execute(file: &Path) -> Result<()> {
    let text = quickapply_core::resume::load(file)?;
    tracing::debug!("Extracted {} characters from {}", text.len(), file.display());

    if text.trim().is_empty() {
        eprintln!(
            "{}",
            style(format!("No text could be extracted from {}", file.display())).yellow()
        );
        return Ok(());
    }
    println!("{}", text);
    Ok(())
}
