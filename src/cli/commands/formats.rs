//! formats command - List supported formats

use anyhow::Result;

use crate::formats::FormatRegistry;
use crate::ui::output;
use crate::ui::table::Table;

/// List registered formats and whether metadata can be saved to them.
pub fn formats(json: bool) -> Result<()> {
    let entries = FormatRegistry::with_defaults().entries();
    if json {
        output::json(&entries)?;
        return Ok(());
    }

    let mut table = Table::new(["Format", "Extension", "Description", "Write-back"]);
    for entry in &entries {
        table.row([
            entry.format.name(),
            entry.extension,
            entry.description,
            if entry.write_back { "yes" } else { "no" },
        ]);
    }
    output::data(table);
    Ok(())
}
