use anyhow::{bail, Context};
use financial_statement_extractor::templates::standard_template;
use financial_statement_extractor::{
    extract_with_diagnostics, list_sheets, report, validate_configuration, Configuration,
    StatementType,
};

const USAGE: &str = "usage: extract_workbook <workbook> <config.json | pnl | cashflow> [sheet]";

fn load_configuration(arg: &str) -> anyhow::Result<Configuration> {
    if let Ok(statement_type) = arg.parse::<StatementType>() {
        return Ok(standard_template(statement_type));
    }

    Configuration::from_json_file(arg).with_context(|| format!("loading {}", arg))
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        bail!(USAGE);
    }

    let bytes = std::fs::read(&args[0]).with_context(|| format!("reading {}", args[0]))?;
    let configuration = load_configuration(&args[1])?;
    let sheet = args.get(2).map(String::as_str);

    println!("📄 Sheets: {}", list_sheets(&bytes)?.join(", "));

    let validation = validate_configuration(&configuration);
    for warning in &validation.warnings {
        println!("⚠️  {}", warning);
    }
    if !validation.is_valid {
        for error in &validation.errors {
            println!("❌ {}", error);
        }
        bail!("configuration '{}' is not valid", configuration.name);
    }

    let extraction = extract_with_diagnostics(
        &bytes,
        &configuration,
        configuration.statement_type(),
        sheet,
    )?;

    println!(
        "✅ Extracted {} periods: {}\n",
        extraction.data.period_count(),
        extraction.data.periods.join(", ")
    );
    println!("{}", report::to_markdown(&extraction.data));

    for warning in &extraction.warnings {
        println!(
            "⚠️  {}{} ({}): '{}' {}",
            warning.column, warning.row, warning.field, warning.raw, warning.reason
        );
    }
    for path in &extraction.empty_required_rows {
        println!("⚠️  Required row {} is empty", path);
    }

    println!("\n{}", extraction.data.to_json_pretty()?);

    Ok(())
}
