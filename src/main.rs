// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Preview CLI: runs one pipeline pass over a reply and prints the result as JSON.
//!
//! Reads the reply from `<file>` or stdin. Prints render nodes by default, or the raw
//! segments with `--segments`. With `--sources`, a JSON array of source records is grouped
//! into internal and external buckets alongside the output.

use std::error::Error;
use std::io::Read;

use advisor_content::logging::setup_logging;
use advisor_content::model::{group_sources, Source};
use advisor_content::{process_with, PipelineConfig};
use serde_json::json;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<file>] [--config <path>] [--sources <path>] [--segments] [-v...]\n\nReads markdown from <file> or stdin and prints the rendered nodes as JSON.\n--segments prints the segment list instead.\n--config loads pipeline settings from a JSON file.\n--sources groups a JSON array of {{type, name, url?, provider?}} records.\n-v raises log verbosity (repeatable); RUST_LOG overrides it. Logs go to stderr."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    input: Option<String>,
    config: Option<String>,
    sources: Option<String>,
    segments: bool,
    verbose: u8,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--segments" => {
                if options.segments {
                    return Err(());
                }
                options.segments = true;
            }
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                options.config = Some(args.next().ok_or(())?);
            }
            "--sources" => {
                if options.sources.is_some() {
                    return Err(());
                }
                options.sources = Some(args.next().ok_or(())?);
            }
            "-" => {
                if options.input.is_some() {
                    return Err(());
                }
                options.input = Some(arg);
            }
            _ if arg.starts_with("-v") && arg[1..].chars().all(|c| c == 'v') => {
                let count = u8::try_from(arg.len() - 1).map_err(|_| ())?;
                options.verbose = options.verbose.saturating_add(count);
            }
            "--verbose" => options.verbose = options.verbose.saturating_add(1),
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.input.is_some() {
                    return Err(());
                }
                options.input = Some(arg);
            }
        }
    }

    Ok(options)
}

fn read_input(input: Option<&str>) -> std::io::Result<String> {
    match input {
        Some(path) if path != "-" => std::fs::read_to_string(path),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "advisor-content".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };
        setup_logging(options.verbose);

        let config = match options.config.as_deref() {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        let content = read_input(options.input.as_deref())?;
        let pass = process_with(&content, &config);

        let mut output = if options.segments {
            json!({ "summary": pass.summary(), "segments": pass.segments() })
        } else {
            json!({ "summary": pass.summary(), "nodes": pass.render() })
        };
        if let Some(path) = options.sources.as_deref() {
            let raw = std::fs::read_to_string(path)?;
            let sources = serde_json::from_str::<Vec<Source>>(&raw)?;
            output["sources"] = serde_json::to_value(group_sources(&sources))?;
        }

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("advisor-content: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    fn parse(args: &[&str]) -> Result<CliOptions, ()> {
        parse_options(args.iter().map(|arg| (*arg).to_owned()))
    }

    #[test]
    fn parses_empty_args() {
        assert_eq!(parse(&[]).expect("parse options"), CliOptions::default());
    }

    #[test]
    fn parses_file_and_flags_in_any_order() {
        let options =
            parse(&["--segments", "reply.md", "--config", "cfg.json"]).expect("parse options");
        assert_eq!(options.input.as_deref(), Some("reply.md"));
        assert_eq!(options.config.as_deref(), Some("cfg.json"));
        assert!(options.segments);

        let options = parse(&["--sources", "src.json", "-"]).expect("parse options");
        assert_eq!(options.input.as_deref(), Some("-"));
        assert_eq!(options.sources.as_deref(), Some("src.json"));
    }

    #[test]
    fn counts_verbosity() {
        assert_eq!(parse(&["-v"]).expect("parse options").verbose, 1);
        assert_eq!(parse(&["-vv", "--verbose"]).expect("parse options").verbose, 3);
    }

    #[test]
    fn rejects_bad_args() {
        parse(&["--nope"]).unwrap_err();
        parse(&["-vx"]).unwrap_err();
        parse(&["--config"]).unwrap_err();
        parse(&["one.md", "two.md"]).unwrap_err();
        parse(&["--segments", "--segments"]).unwrap_err();
        parse(&["--config", "a", "--config", "b"]).unwrap_err();
    }
}
