use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use mrec_record::json::{map_from_json, value_to_json};
use mrec_record::{EngineConfig, Record, Resolved, SchemaRegistry};
use mrec_types::Cid;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let registry = load_registry(cli.config.as_deref())?;
    match cli.command {
        Command::Kinds => cmd_kinds(&registry, &cli.format),
        Command::Encode(args) => cmd_encode(&registry, args, &cli.format),
        Command::Decode(args) => cmd_decode(&registry, args),
        Command::Resolve(args) => cmd_resolve(&registry, args, &cli.format),
        Command::Tree(args) => cmd_tree(&registry, args, &cli.format),
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn load_registry(config: Option<&Path>) -> anyhow::Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::with_config(load_config(config)?);
    mrec_schemas::register_all(&mut registry)?;
    Ok(registry)
}

fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(p) if p != Path::new("-") => {
            fs::read(p).with_context(|| format!("reading {}", p.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn parse_cid(text: &str) -> anyhow::Result<Cid> {
    let text = text.strip_prefix("/ipfs/").unwrap_or(text);
    text.parse()
        .with_context(|| format!("{text:?} is not a content identifier"))
}

fn load_block(registry: &SchemaRegistry, args: &BlockArgs) -> anyhow::Result<Record> {
    let cid = parse_cid(&args.cid)?;
    let raw = read_input(Some(&args.block))?;
    Ok(registry.decode(&args.kind, &raw, &cid)?)
}

fn cmd_kinds(registry: &SchemaRegistry, format: &OutputFormat) -> anyhow::Result<()> {
    let kinds = registry.kinds();
    if let OutputFormat::Json = format {
        let list: Vec<_> = kinds
            .iter()
            .map(|k| json!({ "name": k.name, "codec": k.codec, "versions": k.versions }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }
    for kind in &kinds {
        println!(
            "{:<14} {}  {} version(s)",
            kind.name.bold(),
            format!("0x{:04x}", kind.codec).cyan(),
            kind.versions
        );
    }
    Ok(())
}

fn cmd_encode(
    registry: &SchemaRegistry,
    args: EncodeArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let input = read_input(args.input.as_deref())?;
    let document: serde_json::Value =
        serde_json::from_slice(&input).context("input is not valid JSON")?;
    let record = registry.encode(&args.kind, args.schema_version, map_from_json(&document)?)?;
    let (cid, raw) = encoded(&record)?;

    if let Some(out) = &args.out {
        fs::write(out, raw).with_context(|| format!("writing {}", out.display()))?;
    }
    match format {
        OutputFormat::Json => {
            let mut report = json!({ "cid": cid.to_string(), "size": raw.len() });
            if args.out.is_none() {
                report["bytes"] = hex::encode(raw).into();
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("{} {record} encoded", "✓".green().bold());
            println!("  CID: {}", cid.to_string().yellow());
            println!("  Size: {} bytes", raw.len());
            match &args.out {
                Some(out) => println!("  Written to {}", out.display().to_string().bold()),
                None => println!("  Bytes: {}", hex::encode(raw).dimmed()),
            }
        }
    }
    Ok(())
}

fn encoded(record: &Record) -> anyhow::Result<(&Cid, &[u8])> {
    record
        .cid()
        .zip(record.raw_data())
        .with_context(|| format!("{record} was not encoded"))
}

fn cmd_decode(registry: &SchemaRegistry, args: BlockArgs) -> anyhow::Result<()> {
    let record = load_block(registry, &args)?;
    println!("{}", serde_json::to_string_pretty(&record.to_json()?)?);
    Ok(())
}

fn cmd_resolve(
    registry: &SchemaRegistry,
    args: ResolveArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let record = load_block(registry, &args.block)?;
    let resolved = record.resolve_path(&args.path)?;
    if let (OutputFormat::Text, Some((cid, rest))) = (format, resolved.as_link()) {
        println!("{} {}", "link".cyan(), cid.to_string().yellow());
        if !rest.is_empty() {
            println!("  Remaining: {}", rest.join("/").bold());
        }
        return Ok(());
    }
    let value = match resolved {
        Resolved::Record(nested) => nested.to_json()?,
        Resolved::Link { cid, rest } => {
            json!({ "/": cid.to_string(), "remaining": rest.join("/") })
        }
        other => value_to_json(&other.into_value()),
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_tree(
    registry: &SchemaRegistry,
    args: TreeArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let record = load_block(registry, &args.block)?;
    let depth = args.depth.map_or(-1, |d| i32::try_from(d).unwrap_or(i32::MAX));
    let paths = record.tree("", depth);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&paths)?),
        OutputFormat::Text => {
            for path in &paths {
                println!("{path}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode a JSON document straight to a block file, returning its identifier.
    fn encode_to(registry: &SchemaRegistry, kind: &str, doc: serde_json::Value, out: &Path) -> Cid {
        let record = registry.encode(kind, 1, map_from_json(&doc).unwrap()).unwrap();
        let (cid, raw) = encoded(&record).unwrap();
        fs::write(out, raw).unwrap();
        cid.clone()
    }

    fn registry() -> SchemaRegistry {
        load_registry(None).unwrap()
    }

    #[test]
    fn config_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mrec.toml");
        fs::write(&path, "hash = \"blake3\"\nmax_block_size = 4096\n").unwrap();
        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.max_block_size, 4096);

        let partial = dir.path().join("partial.toml");
        fs::write(&partial, "max_block_size = 10\n").unwrap();
        let config = load_config(Some(partial.as_path())).unwrap();
        assert_eq!(config.hash, EngineConfig::default().hash);
    }

    #[test]
    fn missing_config_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/mrec.toml"))).is_err());
    }

    #[test]
    fn decode_verifies_block_file() {
        let dir = tempfile::tempdir().unwrap();
        let block = dir.path().join("entity.bin");
        let registry = registry();
        let cid = encode_to(&registry, "entity", json!({ "id": "alice" }), &block);

        let args = BlockArgs {
            kind: "entity".into(),
            cid: format!("/ipfs/{cid}"),
            block: block.clone(),
        };
        let record = load_block(&registry, &args).unwrap();
        assert_eq!(record.get_str("id").unwrap(), "alice");
        assert!(cmd_decode(&registry, args).is_ok());

        let bob = dir.path().join("bob.bin");
        let other = encode_to(&registry, "entity", json!({ "id": "bob" }), &bob);
        let args = BlockArgs {
            kind: "entity".into(),
            cid: other.to_string(),
            block,
        };
        assert!(load_block(&registry, &args).is_err());
    }

    #[test]
    fn resolve_and_tree_commands() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let a = dir.path().join("a.bin");
        let alice = encode_to(&registry, "entity", json!({ "id": "alice" }), &a);
        let block = dir.path().join("stakeholders.bin");
        let cid = encode_to(
            &registry,
            "stakeholders",
            json!({ "stakeholders": [
                { "type": "Creator", "stakeholder": { "/": alice.to_string() }, "sharing": 1 }
            ]}),
            &block,
        );
        let block_args = || BlockArgs {
            kind: "stakeholders".into(),
            cid: cid.to_string(),
            block: block.clone(),
        };

        for format in [OutputFormat::Text, OutputFormat::Json] {
            let args = ResolveArgs {
                block: block_args(),
                path: "stakeholders/0/stakeholder/id".into(),
            };
            assert!(cmd_resolve(&registry, args, &format).is_ok());
        }
        let args = ResolveArgs {
            block: block_args(),
            path: "stakeholders/5".into(),
        };
        assert!(cmd_resolve(&registry, args, &OutputFormat::Text).is_err());

        let args = TreeArgs { block: block_args(), depth: Some(1) };
        assert!(cmd_tree(&registry, args, &OutputFormat::Json).is_ok());
    }

    #[test]
    fn bad_cid_is_reported() {
        assert!(parse_cid("not-a-cid").is_err());
    }
}
