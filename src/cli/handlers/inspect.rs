use crate::cli::{
    args::InspectArgs,
    config::{create_codec, read_document},
    global::GlobalArgs,
};
use bitglyph::AlphabetRegistry;

pub fn handle(
    args: InspectArgs,
    global: &GlobalArgs,
    config: &AlphabetRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let codec = create_codec(config, args.alphabet.as_deref())?;
    let document = read_document(args.file.as_ref(), global)?;
    let info = codec.inspect(&document)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("kind:            {}", info.kind);
    println!("version:         {}", info.version);
    println!("radix:           {}", info.radix);
    println!("payload bytes:   {}", info.declared_length);
    println!("checksum digit:  {}", info.checksum);
    println!("symbols:         {}", info.symbols);
    println!(
        "body symbols:    {} (expected {})",
        info.body_symbols, info.expected_body_symbols
    );

    if !info.body_consistent() {
        return Err("body length does not match the declared payload length".into());
    }
    Ok(())
}
