use comfy_table::{ContentArrangement, Table};

use super::Source;

pub fn run(source: &Source, language: &str) -> Result<(), String> {
    let backend = source.connect()?;
    let characters = super::runtime()?
        .block_on(backend.catalog.characters(language))
        .map_err(|e| format!("failed to fetch characters: {e}"))?;

    if characters.is_empty() {
        println!("  No characters available for '{language}'.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Description"]);
    for character in &characters {
        table.add_row(vec![&character.name, &character.description]);
    }

    println!("{table}");
    println!();
    println!("  {} characters", characters.len());

    Ok(())
}
