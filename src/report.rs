use crate::processed::{ProcessedData, RowSeries};
use crate::schema::{StatementType, Units};
use crate::utils::humanize_key;

/// Renders a statement as Markdown tables, values scaled to the configured units. Meant as
/// compact context for dashboards and LLM prompts.
pub fn to_markdown(data: &ProcessedData) -> String {
    let units = data.metadata.units;
    let mut output = String::new();

    let title = match data.statement_type {
        StatementType::Pnl => "Profit & Loss",
        StatementType::Cashflow => "Cash Flow",
    };
    output.push_str(&format!("# {}\n\n", title));
    output.push_str(&format!("**Currency:** {}", data.metadata.currency));
    if units != Units::Normal {
        output.push_str(&format!(" (in {})", units.as_str()));
    }
    output.push_str("\n\n");

    if !data.data_rows.is_empty() {
        output.push_str("## Summary\n\n");
        push_header(&mut output, "Line Item", &data.periods);
        for series in data.data_rows.values() {
            push_markdown_row(
                &mut output,
                &series.label,
                &series.values,
                series.total,
                units,
            );
        }
        output.push('\n');
    }

    for (section, categories) in &data.categories {
        if categories.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", humanize_key(section)));
        push_header(&mut output, "Category", &data.periods);
        for category in categories.values() {
            push_markdown_row(
                &mut output,
                &category.label,
                &category.values,
                category.total,
                units,
            );
            for sub in category.subcategories.iter().flat_map(|s| s.values()) {
                let label = format!("{} / {}", category.label, sub.label);
                push_markdown_row(&mut output, &label, &sub.values, sub.total, units);
            }
        }
        output.push('\n');
    }

    output
}

fn push_header(output: &mut String, first: &str, periods: &[String]) {
    output.push_str(&format!("| {} |", first));
    for period in periods {
        output.push_str(&format!(" {} |", period));
    }
    output.push_str(" Total |\n|---|");
    for _ in periods {
        output.push_str("---|");
    }
    output.push_str("---|\n");
}

fn push_markdown_row(
    output: &mut String,
    label: &str,
    values: &[Option<f64>],
    total: f64,
    units: Units,
) {
    output.push_str(&format!("| {} |", label.replace('|', "\\|")));
    for value in values {
        match value {
            Some(v) => output.push_str(&format!(" {:.2} |", units.scale(*v))),
            None => output.push_str(" n/a |"),
        }
    }
    output.push_str(&format!(" {:.2} |\n", units.scale(total)));
}

/// Renders a statement as CSV with raw (unscaled) values. Empty fields are `null` values.
///
/// Columns: `section,key,label,<one per period>,total`. Data rows use the section `dataRows`;
/// subcategory keys are written as `category.subcategory`.
pub fn to_csv(data: &ProcessedData) -> String {
    let mut output = String::new();

    let mut header = vec!["section".to_string(), "key".to_string(), "label".to_string()];
    header.extend(data.periods.iter().cloned());
    header.push("total".to_string());
    push_csv_line(&mut output, &header);

    for (key, series) in &data.data_rows {
        push_csv_series(&mut output, "dataRows", key, series);
    }

    for (section, categories) in &data.categories {
        for (key, category) in categories {
            let own = RowSeries {
                label: category.label.clone(),
                values: category.values.clone(),
                total: category.total,
            };
            push_csv_series(&mut output, section, key, &own);

            for (sub_key, sub) in category.subcategories.iter().flatten() {
                push_csv_series(&mut output, section, &format!("{}.{}", key, sub_key), sub);
            }
        }
    }

    output
}

fn push_csv_series(output: &mut String, section: &str, key: &str, series: &RowSeries) {
    let mut fields = vec![section.to_string(), key.to_string(), series.label.clone()];
    fields.extend(
        series
            .values
            .iter()
            .map(|v| v.map(|n| n.to_string()).unwrap_or_default()),
    );
    fields.push(series.total.to_string());
    push_csv_line(output, &fields);
}

fn push_csv_line(output: &mut String, fields: &[String]) {
    let line: Vec<String> = fields.iter().map(|f| escape_csv(f)).collect();
    output.push_str(&line.join(","));
    output.push('\n');
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
