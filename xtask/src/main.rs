//! Repository tasks for bulkdl
//!
//! `cargo xtask cli-docs` writes `docs/cli-reference.mdx` from the clap
//! definitions; `--check` fails when the committed file is stale.

use anyhow::{bail, Context};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

const REFERENCE_FILE: &str = "cli-reference.mdx";

#[derive(Parser)]
#[command(name = "xtask", about = "Repository tasks for bulkdl", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Write the bulkdl command reference
    CliDocs {
        #[arg(short, long, default_value = "docs")]
        output_dir: PathBuf,

        /// Compare with the existing file instead of writing it
        #[arg(long)]
        check: bool,
    },
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::CliDocs { output_dir, check } => {
            let path = output_dir.join(REFERENCE_FILE);
            if check {
                check_reference(&path)
            } else {
                write_reference(&path)
            }
        }
    }
}

fn render_reference() -> String {
    format!(
        r#"---
title: bulkdl command reference
updated: {updated}
---

# bulkdl

bulkdl loads the download types offered for a selection of samples or
workflow runs, checks which objects can be downloaded, and then starts the
download on the platform or saves CSV data locally.

```bash
bulkdl types --workflow short-read-mngs --ids 101,102
bulkdl validate --ids 101,102 --json
bulkdl download biom_format --ids 101,102 -f filter_by='[]' -f metric=NT.rpm
bulkdl download sample_metadata --ids 101,102 --output-dir ./downloads
bulkdl heatmap-link --ids 101,102 -f metric=NT.zscore
```

Settings come from `./bulkdl.toml` or the per-user `bulkdl/config.toml`,
overridden by `BULKDL_SERVER_URL`, `BULKDL_AUTH_TOKEN`, `BULKDL_USER_ID` and
`BULKDL_OUTPUT_DIR`. Logging follows `BULKDL_LOG_LEVEL`.

{commands}
"#,
        updated = chrono::Utc::now().format("%Y-%m-%d"),
        commands = clap_markdown::help_markdown::<bulkdl_cli::Cli>(),
    )
}

/// Reference text without the date line, for staleness checks
fn comparable(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.starts_with("updated:"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_reference(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    fs::write(path, render_reference()).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn check_reference(path: &Path) -> anyhow::Result<()> {
    let existing =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if comparable(&existing) != comparable(&render_reference()) {
        bail!("{} is out of date; run `cargo xtask cli-docs`", path.display());
    }
    println!("{} is up to date", path.display());
    Ok(())
}
