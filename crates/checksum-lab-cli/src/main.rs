use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use checksum_lab_core::{
    Evaluation, EvaluationReport, IcmpEcho, SemanticPredicate, predicate_by_name,
};
use checksum_lab_tree::layout::HEADER_SYMBOL;
use checksum_lab_tree::{
    DerivationTree, HeaderLayout, LayoutOverride, normalize_hex, strip_whitespace,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Check and repair Internet checksums in hex-encoded headers")]
struct Args {
    /// File holding the header as hex text (whitespace is ignored).
    #[arg(long, conflicts_with = "hex")]
    input: Option<PathBuf>,

    /// Header hex given on the command line.
    #[arg(long)]
    hex: Option<String>,

    /// TOML file overriding parts of the default ICMP echo layout.
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Semantic predicate to evaluate.
    #[arg(long, default_value = "internet_checksum")]
    predicate: String,

    /// Apply the correction, if any, and emit the repaired header.
    #[arg(long, default_value_t = false)]
    repair: bool,

    /// Write the repaired header here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write a JSON report of the evaluation.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print an ICMP echo summary of the resulting header.
    #[arg(long, default_value_t = false)]
    inspect: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt::init();
    info!("checksum-lab-cli starting…");

    if args.out.is_some() && !args.repair {
        anyhow::bail!("--out only makes sense together with --repair");
    }

    let layout = args.load_layout()?;
    let hex_text = args.read_hex()?;
    let predicate = predicate_by_name(&args.predicate)?;

    let header = parse_header(&layout, &hex_text)?;
    let field = header
        .find_first(&layout.checksum_symbol())
        .with_context(|| format!("Header has no {} field", layout.checksum_symbol()))?
        .clone();

    let (evaluation, repaired) = run_predicate(&predicate, &header, &field, args.repair)?;
    println!("{}: {}", predicate.name, describe(&evaluation));

    let result = repaired.as_ref().unwrap_or(&header);
    if args.repair {
        emit_header(result, args.out.as_deref())?;
    }

    if args.inspect {
        let bytes = hex::decode(strip_whitespace(&result.render()))
            .context("Header is not valid hex")?;
        match IcmpEcho::parse(&bytes) {
            Ok(packet) => println!("{packet}"),
            Err(err) => warn!("Cannot inspect header as ICMP: {err}"),
        }
    }

    if let Some(path) = &args.report {
        let mut report =
            EvaluationReport::new(&layout.name, predicate.name, &header, &field, &evaluation);
        if let Some(fixed) = &repaired {
            report = report.with_repaired_header(fixed);
        }
        write_report(path, &report)?;
    }

    Ok(())
}

impl Args {
    fn load_layout(&self) -> Result<HeaderLayout> {
        let mut layout = HeaderLayout::default();
        if let Some(path) = &self.layout {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read layout file {}", path.display()))?;
            let over: LayoutOverride =
                toml::from_str(&content).context("Failed to parse layout file")?;
            over.apply_to(&mut layout);
        }
        layout.validate().context("Invalid header layout")?;
        Ok(layout)
    }

    fn read_hex(&self) -> Result<String> {
        if let Some(path) = &self.input {
            return fs::read_to_string(path)
                .with_context(|| format!("Failed to read header file {}", path.display()));
        }
        match &self.hex {
            Some(text) => Ok(text.clone()),
            None => anyhow::bail!("Either --input or --hex is required"),
        }
    }
}

fn parse_header(layout: &HeaderLayout, hex_text: &str) -> Result<DerivationTree> {
    let grammar = layout.grammar().context("Invalid header layout")?;
    let parser = checksum_lab_tree::Parser::new(&grammar, HEADER_SYMBOL)?;
    let text = normalize_hex(hex_text).context("Header is not valid hex")?;
    parser
        .parse(&text)
        .with_context(|| format!("Header does not match the {} layout", layout.name))
}

/// Evaluates the predicate and, when asked to, applies its correction.
fn run_predicate(
    predicate: &SemanticPredicate,
    header: &DerivationTree,
    field: &DerivationTree,
    repair: bool,
) -> Result<(Evaluation, Option<DerivationTree>)> {
    let evaluation = predicate.evaluate(&[header.clone(), field.clone()])?;
    let repaired = match evaluation.correction() {
        Some(correction) if repair => Some(correction.apply(header)?),
        _ => None,
    };
    Ok((evaluation, repaired))
}

fn describe(evaluation: &Evaluation) -> String {
    match evaluation {
        Evaluation::NotReady => "header incomplete, nothing to check yet".to_string(),
        Evaluation::Valid => "checksum is correct".to_string(),
        Evaluation::Invalid => "checksum field is malformed".to_string(),
        Evaluation::Correction(correction) => format!(
            "checksum {} should be {}",
            strip_whitespace(&correction.field().render()),
            strip_whitespace(&correction.replacement().render())
        ),
    }
}

fn emit_header(header: &DerivationTree, out: Option<&Path>) -> Result<()> {
    let text = strip_whitespace(&header.render());
    match out {
        Some(path) => fs::write(path, format!("{text}\n"))
            .with_context(|| format!("Failed to write header file {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn write_report(path: &Path, report: &EvaluationReport) -> Result<()> {
    let data = serde_json::to_vec_pretty(report).context("Failed to serialize evaluation report")?;
    fs::write(path, &data)
        .with_context(|| format!("Failed to write report file {}", path.display()))?;
    Ok(())
}
