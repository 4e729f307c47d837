//! Expense report CLI tool
//!
//! A command-line tool for filling PDF expense reports and inspecting PDF forms.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use expense_report_filler::paths::{check_input_path, coerce_output_path, resolve_output_path};
use expense_report_filler::pdf::{
    load_document, write_field_names, write_field_structures, write_field_values,
    write_page_structures, StructureOptions,
};
use expense_report_filler::report::{fill_report, FillOptions, DEFAULT_TEMPLATE};
use expense_report_filler::setting::{format_field_values, read_field_setting, SETTING_EXTENSIONS};

const PDF_EXTENSIONS: &[&str] = &[".pdf"];

/// Expense Report - Fill PDF expense reports from YAML field settings
#[derive(Parser)]
#[command(name = "expense-report")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Fill the report template with the values of a field setting file
    expense-report fill -s voyage.yml -o rapport_rempli.pdf

    # Use another template and keep the fields editable
    expense-report fill -t rapport_depenses.pdf -s voyage.yml -o rapport_rempli.pdf --editable

    # List the fields of a template with their current values
    expense-report values rapport_depenses.pdf

    # Print the page objects of a template, two levels deep
    expense-report objects pages -f rapport_depenses.pdf -d 2 -o console")]
struct Cli {
    /// Increase logging verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a copy of the report template with the values of a field setting file
    Fill {
        /// Field setting file (.yaml or .yml)
        #[arg(short, long)]
        setting: PathBuf,

        /// Filled report to create (.pdf)
        #[arg(short, long)]
        output: PathBuf,

        /// Report template (.pdf), left unmodified
        #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
        template: PathBuf,

        /// Keep the filled fields editable
        #[arg(short, long)]
        editable: bool,
    },

    /// Write the name, type and value of every field of a PDF in a text file
    Values {
        /// PDF file to inspect
        input: PathBuf,

        /// Text file to create (default: <input>_field_values.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Copy a PDF, writing each text field's name in the field
    FieldNames {
        /// PDF file to copy
        input: PathBuf,

        /// PDF file to create (default: <input>_field_names.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the field values defined by a field setting file
    Settings {
        /// Field setting file (.yaml or .yml)
        file: PathBuf,

        /// Print the type of each value
        #[arg(short, long)]
        types: bool,
    },

    /// Write the object structure of a PDF's pages or fields
    Objects {
        /// Which objects to explore
        #[arg(value_enum)]
        kind: StructureKind,

        /// PDF file to explore
        #[arg(short, long)]
        file: PathBuf,

        /// Recursion depth limit. If 0 or less, no limit is set and
        /// references are not resolved.
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        depth: i32,

        /// Text file to create, or "console" to print the structure
        /// (default: <file>_page_objects.txt or <file>_field_objects.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StructureKind {
    Pages,
    Fields,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Fill { setting, output, template, editable } => {
            cmd_fill(setting, output, template, editable)
        }
        Commands::Values { input, output } => {
            cmd_values(input, output)
        }
        Commands::FieldNames { input, output } => {
            cmd_field_names(input, output)
        }
        Commands::Settings { file, types } => {
            cmd_settings(file, types)
        }
        Commands::Objects { kind, file, depth, output } => {
            cmd_objects(kind, file, depth, output)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Set up logging, RUST_LOG taking precedence over -v
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Fill the expense report
fn cmd_fill(setting: PathBuf, output: PathBuf, template: PathBuf, editable: bool) -> Result<()> {
    check_input_path(&setting, SETTING_EXTENSIONS)?;
    let output = resolve_output_path(Some(output.as_path()), &setting, "", ".pdf")?;

    eprintln!("Filling {} with {}...", template.display(), setting.display());

    let options = FillOptions {
        template,
        setting,
        output: output.clone(),
        editable,
    };

    let values = fill_report(&options).context("Failed to fill the report")?;

    eprintln!("Filled {} fields", values.len());
    eprintln!("Output: {}", output.display());

    Ok(())
}

/// Describe the fields of a PDF
fn cmd_values(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    check_input_path(&input, PDF_EXTENSIONS)?;
    let output = resolve_output_path(output.as_deref(), &input, "_field_values", ".txt")?;

    let count = write_field_values(&input, &output)
        .with_context(|| format!("Failed to read the fields of {}", input.display()))?;

    eprintln!("Wrote {} fields to {}", count, output.display());
    Ok(())
}

/// Write the text field names of a PDF in its fields
fn cmd_field_names(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    check_input_path(&input, PDF_EXTENSIONS)?;
    let output = resolve_output_path(output.as_deref(), &input, "_field_names", ".pdf")?;

    let count = write_field_names(&input, &output)
        .with_context(|| format!("Failed to write the field names of {}", input.display()))?;

    eprintln!("Named {} text fields", count);
    eprintln!("Output: {}", output.display());
    Ok(())
}

/// Print the field values of a field setting file
fn cmd_settings(file: PathBuf, types: bool) -> Result<()> {
    let setting = read_field_setting(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let values = setting.to_field_values()?;

    for line in format_field_values(&values, types) {
        println!("{}", line);
    }

    Ok(())
}

/// Dump the object structure of a PDF's pages or fields
fn cmd_objects(kind: StructureKind, file: PathBuf, depth: i32, output: Option<PathBuf>) -> Result<()> {
    check_input_path(&file, PDF_EXTENSIONS)?;

    let termination = match kind {
        StructureKind::Pages => "_page_objects",
        StructureKind::Fields => "_field_objects",
    };

    let to_console = output
        .as_deref()
        .map(|path| path.to_string_lossy().eq_ignore_ascii_case("console"))
        .unwrap_or(false);

    let doc = load_document(&file)?;
    let options = StructureOptions::with_depth_limit(depth);

    if to_console {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_structure(kind, &doc, &file, &mut out, &options)?;
        out.flush()?;
    } else {
        let output = coerce_output_path(output.as_deref(), &file, termination, ".txt");
        let mut out = BufWriter::new(
            File::create(&output).with_context(|| format!("Failed to create {}", output.display()))?,
        );
        write_structure(kind, &doc, &file, &mut out, &options)?;
        out.flush()?;
        eprintln!("Output: {}", output.display());
    }

    Ok(())
}

fn write_structure<W: Write>(
    kind: StructureKind,
    doc: &lopdf::Document,
    file: &Path,
    out: &mut W,
    options: &StructureOptions,
) -> Result<()> {
    match kind {
        StructureKind::Pages => write_page_structures(doc, file, out, options)?,
        StructureKind::Fields => write_field_structures(doc, file, out, options)?,
    }
    Ok(())
}
