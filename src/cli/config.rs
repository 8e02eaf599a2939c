use crate::cli::global::GlobalArgs;
use bitglyph::{AlphabetRegistry, Codec, CodecConfig};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Builtin, user and local layers, then `--config`, then flag overrides.
pub fn load_registry(global: &GlobalArgs) -> Result<AlphabetRegistry, Box<dyn std::error::Error>> {
    let mut registry = AlphabetRegistry::load_with_overrides()?;

    if let Some(path) = global.config_path() {
        registry.merge(AlphabetRegistry::load_from_file(&path)?);
        tracing::debug!(path = %path.display(), "loaded config layer");
    }

    registry.codec.merge(CodecConfig {
        small_threshold: global.threshold,
        backend: global.backend,
        ..CodecConfig::default()
    });

    Ok(registry)
}

/// Builds the configured codec, optionally with another alphabet.
pub fn create_codec(
    registry: &AlphabetRegistry,
    alphabet: Option<&str>,
) -> Result<Codec, Box<dyn std::error::Error>> {
    match alphabet {
        Some(name) => {
            let mut registry = registry.clone();
            registry.codec.alphabet = Some(name.to_string());
            Ok(registry.build_codec()?)
        }
        None => Ok(registry.build_codec()?),
    }
}

/// Reads the whole input, enforcing `--max-size` unless `--force` is given.
pub fn read_input(
    file: Option<&PathBuf>,
    global: &GlobalArgs,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if let Some(file_path) = file {
        if global.max_size > 0 {
            let file_size = fs::metadata(file_path)?.len() as usize;

            if file_size > global.max_size {
                if global.force {
                    if !global.quiet {
                        eprintln!(
                            "Warning: Processing large file ({} bytes, limit: {} bytes)",
                            file_size, global.max_size
                        );
                    }
                } else {
                    return Err(format!(
                        "File size ({} bytes) exceeds limit ({} bytes). Use --force to process anyway.",
                        file_size, global.max_size
                    )
                    .into());
                }
            }
        }

        return Ok(fs::read(file_path)?);
    }

    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;

    if global.max_size > 0 && buffer.len() > global.max_size {
        return Err(format!(
            "Input size ({} bytes) exceeds maximum ({} bytes). Use a file with --force for large inputs.",
            buffer.len(),
            global.max_size
        )
        .into());
    }

    Ok(buffer)
}

/// Reads a text document, dropping the line ending `encode` appends.
pub fn read_document(
    file: Option<&PathBuf>,
    global: &GlobalArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let input = read_input(file, global)?;
    let mut text =
        String::from_utf8(input).map_err(|_| "Input must be valid UTF-8 for decoding")?;
    let len = strip_line_ending(&text).len();
    text.truncate(len);
    Ok(text)
}

/// Removes one trailing `\n` or `\r\n`; any other whitespace may be a symbol.
fn strip_line_ending(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

pub fn write_output(output: Option<&Path>, data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => fs::write(path, data)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
