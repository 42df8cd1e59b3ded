//! Sheetclean CLI - validate spreadsheet exports against a serializer definition
//!
//! # Main Commands
//!
//! ```bash
//! sheetclean validate orders.csv -d orders.json   # Validate and output cleaned rows
//! sheetclean check orders.json                    # Check a definition file
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! sheetclean parse orders.csv          # Dump the loaded grid as JSON
//! sheetclean example-definition        # Show an example definition
//! sheetclean field-types               # Show supported field types
//! ```

use clap::{Parser, Subcommand};
use sheetclean::{
    example_definition, field_types_description, load_file, CleanedRow, Grid, Hooks,
    ImportError, RunStatus, SerializerDefinition,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetclean")]
#[command(about = "Validate and clean spreadsheet rows against a typed schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a CSV file and output the cleaned rows as JSON
    Validate {
        /// Input CSV file
        input: PathBuf,

        /// Serializer definition (JSON)
        #[arg(short = 'd', long)]
        definition: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a serializer definition and print the resolved layout
    Check {
        /// Definition JSON file
        definition: PathBuf,
    },

    /// Parse a CSV file and output its rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show an example serializer definition
    ExampleDefinition,

    /// Show supported field types
    FieldTypes,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            input,
            definition,
            delimiter,
            output,
        } => cmd_validate(&input, &definition, delimiter, output),

        Commands::Check { definition } => cmd_check(&definition),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::ExampleDefinition => cmd_example_definition(),

        Commands::FieldTypes => cmd_field_types(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Writes the cleaned rows where the user asked for them.
struct OutputHooks {
    output: Option<PathBuf>,
}

impl Hooks for OutputHooks {
    fn invalid(&mut self, errors: &[String]) {
        eprintln!("\n❌ {} errors:", errors.len());
        for error in errors {
            eprintln!("   - {}", error);
        }
    }

    fn import_operation(&mut self, rows: &[CleanedRow]) -> Result<(), ImportError> {
        let json = serde_json::to_string_pretty(rows).map_err(ImportError::fatal)?;
        write_output(&json, self.output.as_deref()).map_err(ImportError::fatal)
    }
}

fn load_definition(path: &Path) -> Result<SerializerDefinition, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    Ok(SerializerDefinition::from_json(&content)?)
}

fn cmd_validate(
    input: &Path,
    definition: &Path,
    delimiter: Option<char>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Validating: {}", input.display());

    let definition = load_definition(definition)?;
    let serializer = definition.build()?;
    if !definition.description.is_empty() {
        eprintln!("   Definition: {}", definition.description);
    }

    let sheet = load_file(input, delimiter)?;
    eprintln!("   Encoding: {}", sheet.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(sheet.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Rows: {}", sheet.worksheet.max_row());

    let mut hooks = OutputHooks { output };
    let report = serializer.run(&sheet.worksheet, &mut hooks)?;
    eprintln!("\n📊 {}", report.summary());

    match report.status {
        RunStatus::Imported => {
            eprintln!("✅ {} rows cleaned", report.cleaned_data.len());
            Ok(())
        }
        RunStatus::Invalid => Err(format!("{} validation errors", report.errors.len()).into()),
        RunStatus::ImportFailed { errors } => Err(errors.join("; ").into()),
    }
}

fn cmd_check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Checking: {}", path.display());

    let definition = load_definition(path)?;
    let serializer = definition.build()?;
    let schema = serializer.schema();

    println!("start_index: {}", schema.start_index());
    println!("enable_transaction: {}", schema.enable_transaction());
    println!("fields:");
    for (position, (name, field)) in serializer.columns().enumerate() {
        println!(
            "  [{:2}] {} ({}, \"{}\"{})",
            position + 1,
            name,
            field.kind().name(),
            field.verbose_name(),
            if field.allows_blank() { ", blank" } else { "" }
        );
    }

    eprintln!("✅ Definition is valid");
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let sheet = load_file(input, delimiter)?;
    eprintln!("   Encoding: {}", sheet.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(sheet.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("✅ Parsed {} rows", sheet.worksheet.max_row());

    let json = serde_json::to_string_pretty(sheet.worksheet.rows())?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_example_definition() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", example_definition().to_json()?);
    Ok(())
}

fn cmd_field_types() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", field_types_description());
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> io::Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
