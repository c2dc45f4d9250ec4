//! Ready-made configurations for the common single-header layouts: period labels across row 1
//! (columns B to M) and one line item per row below, with the item names in column A.

use crate::schema::*;
use std::collections::BTreeMap;

const STANDARD_PERIODS_RANGE: &str = "B1:M1";

/// Standard English P&L layout.
///
/// | Row | Line item |
/// |---|---|
/// | 2 | Revenue |
/// | 3 | Cost of Goods Sold |
/// | 4 | Gross Profit |
/// | 5 | Gross Margin % |
/// | 8-10 | Sales & Marketing, General & Administrative, Research & Development |
/// | 11 | Total Operating Expenses |
/// | 13 | EBITDA |
/// | 14 | EBITDA Margin % |
/// | 15 | Depreciation & Amortization |
/// | 16 | Operating Income |
/// | 17 | Interest Expense |
/// | 18 | Tax Expense |
/// | 19 | Net Income |
/// | 20 | Net Margin % |
pub fn standard_pnl() -> Configuration {
    let mut opex = BTreeMap::new();
    opex.insert("salesMarketing".to_string(), category(8, "Sales & Marketing"));
    opex.insert(
        "generalAdministrative".to_string(),
        category(9, "General & Administrative"),
    );
    opex.insert(
        "researchDevelopment".to_string(),
        category(10, "Research & Development"),
    );

    let mut categories = BTreeMap::new();
    categories.insert("opex".to_string(), opex);

    let data_rows = PnlDataRows {
        total_revenue: Some(2),
        cogs: Some(3),
        gross_profit: Some(4),
        gross_margin: Some(5),
        total_opex: Some(11),
        ebitda: Some(13),
        ebitda_margin: Some(14),
        depreciation: Some(15),
        operating_income: Some(16),
        interest_expense: Some(17),
        taxes: Some(18),
        net_income: Some(19),
        net_margin: Some(20),
        ..Default::default()
    };

    let mut configuration = Configuration::pnl(
        "Standard P&L",
        ConfigurationMetadata::default(),
        StatementStructure {
            periods_row: 1,
            periods_range: STANDARD_PERIODS_RANGE.to_string(),
            period_mapping: None,
            data_rows,
            categories,
        },
    );
    configuration.description = Some("Monthly P&L with line items in column A".to_string());
    configuration
}

/// Standard English cash flow layout: beginning balance, total income, total expenses,
/// net cash flow, ending balance and lowest balance in rows 2 to 7.
pub fn standard_cashflow() -> Configuration {
    let data_rows = CashFlowDataRows {
        initial_balance: Some(2),
        total_inflows: Some(3),
        total_outflows: Some(4),
        monthly_generation: Some(5),
        final_balance: Some(6),
        lowest_balance: Some(7),
        custom: BTreeMap::new(),
    };

    let mut configuration = Configuration::cashflow(
        "Standard Cash Flow",
        ConfigurationMetadata::default(),
        StatementStructure {
            periods_row: 1,
            periods_range: STANDARD_PERIODS_RANGE.to_string(),
            period_mapping: None,
            data_rows,
            categories: BTreeMap::new(),
        },
    );
    configuration.description = Some("Monthly cash flow with line items in column A".to_string());
    configuration
}

pub fn standard_template(statement_type: StatementType) -> Configuration {
    match statement_type {
        StatementType::Pnl => standard_pnl(),
        StatementType::Cashflow => standard_cashflow(),
    }
}

fn category(row: i64, label: &str) -> CategoryDefinition {
    CategoryDefinition {
        row,
        label: label.to_string(),
        required: false,
        subcategories: None,
    }
}
