use crate::cli::{
    args::DecodeArgs,
    config::{create_codec, read_document, write_output},
    global::GlobalArgs,
};
use bitglyph::AlphabetRegistry;

pub fn handle(
    args: DecodeArgs,
    global: &GlobalArgs,
    config: &AlphabetRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let codec = create_codec(config, args.alphabet.as_deref())?;
    let document = read_document(args.file.as_ref(), global)?;

    let decoded = codec.decode(&document)?;

    if args.hex {
        let mut line = hex::encode(&decoded);
        line.push('\n');
        write_output(args.output.as_deref(), line.as_bytes())
    } else {
        write_output(args.output.as_deref(), &decoded)
    }
}
