use comfy_table::{ContentArrangement, Table};

use super::Source;

pub fn run(source: &Source) -> Result<(), String> {
    let backend = source.connect()?;
    let languages = super::runtime()?
        .block_on(backend.catalog.languages())
        .map_err(|e| format!("failed to fetch languages: {e}"))?;

    if languages.is_empty() {
        println!("  No languages available.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Code", "Language", "Native name"]);
    for language in &languages {
        table.add_row(vec![&language.code, &language.name, &language.native_name]);
    }

    println!("{table}");
    println!();
    println!("  {} languages", languages.len());

    Ok(())
}
