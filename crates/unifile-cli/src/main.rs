//! Unifile CLI
//!
//! Command-line interface for merging C-family sources into a single
//! compilation unit.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use unifile_core::Config;
use unifile_merge::{quickstrip::quickstrip, MergeReport, Merger};

#[derive(Parser)]
#[command(name = "unifile")]
#[command(author, version, about = "Merge C/C++ sources into a single compilation unit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a main file and its declared extra files
    Merge {
        /// Main source file (the one containing `main`)
        #[arg(value_name = "FILE")]
        main: PathBuf,

        /// Extra source file the merged unit may include (repeatable)
        #[arg(short = 'x', long = "extra", value_name = "FILE")]
        extras: Vec<PathBuf>,

        /// Collect extra sources from a directory tree (repeatable)
        #[arg(long = "extra-dir", value_name = "DIR")]
        extra_dirs: Vec<PathBuf>,

        /// Working directory used to resolve relative paths
        #[arg(short, long, value_name = "DIR")]
        workdir: Option<PathBuf>,

        /// Output file (default: <main-stem>.output.<ext> in the working directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Merge without compacting comments and whitespace
        #[arg(long)]
        no_compress: bool,

        /// Report format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Strip comments and blank lines from a single file (regex pass)
    Strip {
        /// Source file to strip
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            main,
            extras,
            extra_dirs,
            workdir,
            output,
            no_compress,
            format,
        } => {
            let mut config = Config::new(main);
            config.extra_files = extras;
            config.extra_dirs = extra_dirs;
            config.work_dir = workdir;
            config.output = output;
            config.compress = !no_compress;
            cmd_merge(&config, &format)?;
        }
        Commands::Strip { file, output } => {
            cmd_strip(&file, output.as_deref())?;
        }
    }

    Ok(())
}

fn cmd_merge(config: &Config, format: &str) -> Result<()> {
    let job = config.resolve()?;

    if format != "json" {
        println!("📂 Working directory: {}", job.work_dir.display());
        println!("   Main file: {}", job.main_file.display());
        println!("   Extra files:");
        for extra in &job.extra_files {
            println!("      {}", extra.display());
        }
        println!("   Output: {}", job.output.display());
    }

    let report = Merger::new(job).run()?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_order(&report);
        println!(
            "\n📦 Merged {} files ({} bytes) into {}",
            report.files.len(),
            report.bytes_written,
            report.output.display()
        );
    }

    Ok(())
}

/// Print the emission order and each file's resolved reliance set
fn print_order(report: &MergeReport) {
    println!("\n📊 Emission order:");
    for file in &report.files {
        if file.reliances.is_empty() {
            println!("   {} (no reliances)", file.path.display());
        } else {
            println!("   {} relies on:", file.path.display());
            for reliance in &file.reliances {
                println!("      {}", reliance.display());
            }
        }
    }
}

fn cmd_strip(file: &PathBuf, output: Option<&std::path::Path>) -> Result<()> {
    let source = std::fs::read_to_string(file)?;
    let stripped = quickstrip(&source);

    if let Some(out_path) = output {
        std::fs::write(out_path, &stripped)?;
        println!("📦 Stripped {} into {}", file.display(), out_path.display());
    } else {
        println!("{}", stripped);
    }

    Ok(())
}
