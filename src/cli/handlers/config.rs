use crate::cli::args::ConfigAction;
use bitglyph::AlphabetRegistry;

pub fn handle(
    action: ConfigAction,
    config: &AlphabetRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::List { json } => handle_list(json, config),
        ConfigAction::Show { name } => handle_show(&name, config),
    }
}

fn handle_list(json: bool, config: &AlphabetRegistry) -> Result<(), Box<dyn std::error::Error>> {
    let names = config.names();

    if json {
        let alphabets: Vec<_> = names
            .iter()
            .filter_map(|name| {
                config.get_alphabet(name).map(|alphabet| {
                    serde_json::json!({
                        "name": name,
                        "radix": alphabet.symbol_count(),
                        "description": alphabet.description,
                    })
                })
            })
            .collect();
        let output = serde_json::json!({
            "default": config.codec.alphabet(),
            "alphabets": alphabets,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Available alphabets:\n");
    for name in &names {
        let Some(alphabet) = config.get_alphabet(name) else {
            continue;
        };
        let marker = if name == config.codec.alphabet() { "*" } else { " " };
        println!(
            "{} {:<15} base-{:<5} {}",
            marker,
            name,
            alphabet.symbol_count(),
            alphabet.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn handle_show(name: &str, config: &AlphabetRegistry) -> Result<(), Box<dyn std::error::Error>> {
    let chars = config.alphabet_chars(name)?;
    let table = bitglyph::AlphabetTable::from_str(&chars)?;
    let geometry = bitglyph::ChunkGeometry::new(table.radix());

    println!("Alphabet: {}", name);
    if let Some(description) = config.get_alphabet(name).and_then(|a| a.description.as_deref()) {
        println!("Description: {}", description);
    }
    println!("Radix: {}", table.radix());
    println!("Bits per symbol: {:.3}", table.bits_per_char());
    println!(
        "Chunk: {} bytes -> {} symbols",
        geometry.bytes_per_chunk(),
        geometry.full_width()
    );

    let preview: String = chars.chars().take(64).collect();
    let suffix = if table.radix() > 64 { "..." } else { "" };
    println!("Symbols: {}{}", preview, suffix);
    Ok(())
}
