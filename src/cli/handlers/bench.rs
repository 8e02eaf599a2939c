use crate::cli::{args::BenchArgs, global::GlobalArgs};
use bitglyph::AlphabetRegistry;
use bitglyph::bench::{PlatformInfo, compare_paths, random_payload};

pub fn handle(
    args: BenchArgs,
    global: &GlobalArgs,
    config: &AlphabetRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = args
        .alphabet
        .as_deref()
        .unwrap_or_else(|| config.codec.alphabet());
    let chars = config.alphabet_chars(name)?;

    if args.size == 0 {
        return Err("--size must be at least 1 byte".into());
    }
    if global.max_size > 0 && args.size > global.max_size && !global.force {
        return Err(format!(
            "Payload size ({} bytes) exceeds limit ({} bytes). Use --force to run anyway.",
            args.size, global.max_size
        )
        .into());
    }

    let payload = random_payload(args.size, args.seed);
    let reports = compare_paths(&chars, &payload, args.iterations).map_err(|e| e.to_string())?;

    if !global.quiet {
        println!("Platform: {}", PlatformInfo::detect().display());
        println!("Alphabet: {} ({} bytes payload)\n", name, args.size);
    }
    println!(
        "{:<15} {:<12} {:>12} {:>12}  {}",
        "path", "taken", "encode MiB/s", "decode MiB/s", "match"
    );
    for report in &reports {
        println!(
            "{:<15} {:<12} {:>12.1} {:>12.1}  {}",
            report.path.to_string(),
            report.taken.to_string(),
            report.encode_mib_per_sec(),
            report.decode_mib_per_sec(),
            if report.matches_reference { "yes" } else { "NO" }
        );
    }

    if reports.iter().any(|report| !report.matches_reference) {
        return Err("encoding paths disagree".into());
    }
    Ok(())
}
