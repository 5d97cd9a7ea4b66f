//! Parse command - extract rows and totals from a single ledger text.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use nohin_core::directory::parse_delimiter;
use nohin_core::{Extraction, LedgerParser, TwoTokenPolicy, VendorDirectory, VendorEntry};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input text file, or "-" for stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Vendor directory file used to resolve address blocks
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Field delimiter of the vendor directory (",", ";", "tab")
    #[arg(long, default_value = ",")]
    delimiter: String,

    /// How blocks with exactly two numbers are read
    #[arg(long, value_enum)]
    two_token_policy: Option<PolicyArg>,

    /// Print extraction warnings and summary issues
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV of line items
    Csv,
    /// Plain text table
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum PolicyArg {
    /// Smaller number is the quantity, larger the amount
    AmountOnly,
    /// Smaller number is the quantity, larger the unit price
    ComputedAmount,
}

impl From<PolicyArg> for TwoTokenPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::AmountOnly => TwoTokenPolicy::AmountOnly,
            PolicyArg::ComputedAmount => TwoTokenPolicy::ComputedAmount,
        }
    }
}

/// Extraction plus the directory entries resolved for its vendors.
#[derive(Serialize)]
struct ParseOutput<'a> {
    #[serde(flatten)]
    extraction: &'a Extraction,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vendors: Vec<&'a VendorEntry>,
}

pub fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::config::load(config_path)?;
    let text = read_input(&args.input)?;

    info!("Parsing {}", args.input);

    let mut parser = LedgerParser::new().with_config(config);
    if let Some(policy) = args.two_token_policy {
        parser = parser.with_two_token_policy(policy.into());
    }
    let extraction = parser.parse(&text);

    let directory = match &args.directory {
        Some(path) => {
            let delimiter = parse_delimiter(&args.delimiter)?;
            Some(VendorDirectory::from_path(path, delimiter)?)
        }
        None => None,
    };
    let vendors = directory
        .as_ref()
        .map(|d| resolve_vendors(d, &extraction))
        .unwrap_or_default();

    if args.show_warnings {
        print_warnings(&extraction);
    }

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&ParseOutput {
            extraction: &extraction,
            vendors: vendors.clone(),
        })?,
        OutputFormat::Csv => format_csv(&extraction)?,
        OutputFormat::Text => {
            let mut out = format_text(&extraction);
            out.push_str(&format_vendors(&vendors));
            out
        }
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let path = Path::new(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(fs::read_to_string(path)?)
}

/// Directory entries for the distinct vendors of the extraction, in row order.
fn resolve_vendors<'a>(
    directory: &'a VendorDirectory,
    extraction: &Extraction,
) -> Vec<&'a VendorEntry> {
    let mut entries: Vec<&VendorEntry> = Vec::new();
    for row in &extraction.rows {
        if row.vendor.is_empty() {
            continue;
        }
        match directory.lookup(&row.vendor) {
            Some(entry) if !entries.contains(&entry) => entries.push(entry),
            Some(_) => {}
            None => debug!("vendor {:?} not in directory", row.vendor),
        }
    }
    entries
}

fn print_warnings(extraction: &Extraction) {
    let mut issues = extraction.warnings.clone();
    for issue in extraction.summary.validate() {
        if !issues.contains(&issue) {
            issues.push(issue);
        }
    }

    if issues.is_empty() {
        return;
    }

    eprintln!("{}", style("Warnings:").yellow());
    for issue in &issues {
        eprintln!("  - {}", issue);
    }
}

/// One CSV record per line item.
pub fn format_csv(extraction: &Extraction) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "vendor",
        "code",
        "name",
        "spec",
        "unit",
        "quantity",
        "unit_price",
        "amount",
        "note",
    ])?;

    for row in &extraction.rows {
        wtr.write_record([
            &row.vendor,
            &row.code,
            &row.name,
            &row.spec,
            &row.unit,
            &row.quantity,
            &row.unit_price,
            &row.amount,
            &row.note,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_text(extraction: &Extraction) -> String {
    let mut output = String::new();

    if let Some(period) = extraction.period {
        output.push_str(&format!("Period: {}\n", period.format("%Y-%m")));
    }
    output.push_str(&format!("Items: {}\n\n", extraction.rows.len()));

    for row in &extraction.rows {
        output.push_str(&format!("{} {}", row.code, row.name));
        if !row.unit.is_empty() {
            output.push_str(&format!(" [{}]", row.unit));
        }
        output.push('\n');
        output.push_str(&format!(
            "     qty {:>10}  price {:>14}  amount {:>14}\n",
            row.quantity, row.unit_price, row.amount
        ));
        if !row.vendor.is_empty() {
            output.push_str(&format!("     vendor {}\n", row.vendor));
        }
    }

    let summary = &extraction.summary;
    output.push('\n');
    output.push_str("Summary:\n");
    output.push_str(&format!("  Taxable base: {}\n", summary.taxable_base));
    output.push_str(&format!("  Tax:          {}\n", summary.tax));
    output.push_str(&format!("  Total:        {}\n", summary.total));
    output.push_str(&format!(
        "  Computed:     {} {}\n",
        summary.computed_base_text, summary.match_mark
    ));

    output
}

fn format_vendors(vendors: &[&VendorEntry]) -> String {
    let mut output = String::new();

    for entry in vendors {
        output.push_str(&format!("\nVendor {}:\n", entry.keyword));
        for line in entry.vendor.iter().filter(|l| !l.is_empty()) {
            output.push_str(&format!("  {}\n", line));
        }
        output.push_str("Recipient:\n");
        for line in entry.recipient.iter().filter(|l| !l.is_empty()) {
            output.push_str(&format!("  {}\n", line));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: &str = "令和6年10月分\n山田商店\n0001 苺タルト EA\n3 250.00\n750.00\n以下余白\n750.00\n825\n75\n";

    #[test]
    fn test_format_csv() {
        let extraction = LedgerParser::new().parse(LEDGER);
        let csv = format_csv(&extraction).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("vendor,code,name,spec,unit,quantity,unit_price,amount,note")
        );
        assert_eq!(lines.next(), Some("山田商店,0001,苺タルト,,EA,3,250.00,750.00,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_format_text() {
        let extraction = LedgerParser::new().parse(LEDGER);
        let text = format_text(&extraction);
        assert!(text.contains("Period: 2024-10"));
        assert!(text.contains("0001 苺タルト [EA]"));
        assert!(text.contains("Taxable base: 750.00"));
        assert!(text.contains("Computed:     750.00 ○"));
    }

    #[test]
    fn test_resolve_vendors_dedupes() {
        let directory =
            VendorDirectory::from_reader("山田,本社\n".as_bytes(), b',').unwrap();
        let text = LEDGER.replace("以下余白", "0002 苺タルト EA\n1 100\n以下余白");
        let extraction = LedgerParser::new().parse(&text);
        assert_eq!(extraction.rows.len(), 2);
        let vendors = resolve_vendors(&directory, &extraction);
        assert_eq!(vendors.len(), 1);
        assert_eq!(vendors[0].keyword, "山田");
    }
}
