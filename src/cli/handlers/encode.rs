use crate::cli::{
    args::EncodeArgs,
    config::{create_codec, read_input, write_output},
    global::GlobalArgs,
};
use bitglyph::AlphabetRegistry;

pub fn handle(
    args: EncodeArgs,
    global: &GlobalArgs,
    config: &AlphabetRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let codec = create_codec(config, args.alphabet.as_deref())?;
    let input_data = read_input(args.file.as_ref(), global)?;

    let outcome = codec.encode_traced(&input_data)?;
    tracing::info!(
        bytes = input_data.len(),
        path = %outcome.path,
        "encoded input"
    );

    let mut text = outcome.text;
    text.push('\n');
    write_output(args.output.as_deref(), text.as_bytes())
}
