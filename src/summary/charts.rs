//! Chart generation for the summary.
//!
//! This module creates ECharts options for the client:
//! - **Expenses by category**: doughnut chart of the expense totals
//! - **Top categories**: horizontal bar chart of the largest category totals
//! - **Net income**: monthly income minus expenses
//!
//! Each chart is sent as the JSON configuration for the ECharts library.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title, VisualMap, VisualMapPiece},
    datatype::DataPointItem,
    element::{
        AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, ItemStyle, Tooltip,
        Trigger,
    },
    series::{Bar, Line, Pie},
};
use serde::Serialize;

use crate::{
    Error,
    summary::aggregation::{
        CategoryTotal, MonthlyTotal, Summary, TOP_CATEGORY_COUNT, expenses_by_category,
        format_month_label, top_categories,
    },
    transaction::TransactionType,
};

/// The colour of income bars.
const INCOME_COLOR: &str = "#00e5a0";
/// The colour of expense bars.
const EXPENSE_COLOR: &str = "#ff4d6d";
/// The colour for categories without a colour of their own.
const DEFAULT_CATEGORY_COLOR: &str = "#8884d8";

/// A summary chart with its element ID and ECharts configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration
    pub options: serde_json::Value,
}

/// The colour of a category in the expenses chart.
pub fn category_color(category: &str) -> &'static str {
    match category {
        "Food" => "#ff7b00",
        "Transport" => "#3a86ff",
        "Entertainment" => "#f15bb5",
        "Health" => "#e63946",
        "Clothing" => "#9b5de5",
        "Education" => "#4361ee",
        "Rent" => "#f4a261",
        "Utilities" => "#7209b7",
        "Investment" => "#4cc9f0",
        "Other" => "#adb5bd",
        _ => DEFAULT_CATEGORY_COLOR,
    }
}

/// Build the charts for `summary` and the `monthly` totals.
///
/// Charts without any data are left out, so a user without transactions gets
/// an empty list.
///
/// # Errors
/// Returns [Error::JSONSerializationError] if a chart could not be serialized.
pub fn build_summary_charts(
    summary: &Summary,
    monthly: &[MonthlyTotal],
) -> Result<Vec<SummaryChart>, Error> {
    let mut charts = Vec::with_capacity(3);

    let expenses = expenses_by_category(&summary.by_category);
    if !expenses.is_empty() {
        charts.push(("expenses-by-category-chart", expenses_chart(&expenses)));
    }

    if !summary.is_empty() {
        let top = top_categories(&summary.by_category, TOP_CATEGORY_COUNT);
        charts.push(("top-categories-chart", top_categories_chart(&top)));
    }

    if !monthly.is_empty() {
        charts.push(("net-income-chart", net_income_chart(monthly)));
    }

    charts
        .into_iter()
        .map(|(id, chart)| {
            serde_json::to_value(&chart)
                .map(|options| SummaryChart { id, options })
                .map_err(|error| Error::JSONSerializationError(error.to_string()))
        })
        .collect()
}

pub(super) fn expenses_chart(expenses: &[(String, f64)]) -> Chart {
    let data: Vec<DataPointItem> = expenses
        .iter()
        .map(|(category, total)| {
            DataPointItem::new(*total)
                .name(category.as_str())
                .item_style(ItemStyle::new().color(category_color(category)))
        })
        .collect();

    Chart::new()
        .title(Title::new().text("Expenses by category"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().bottom("0%"))
        .series(
            Pie::new()
                .name("Expenses")
                .radius(vec!["40%", "70%"])
                .item_style(
                    ItemStyle::new()
                        .border_radius(6)
                        .border_color("#fff")
                        .border_width(2),
                )
                .data(data),
        )
}

/// A horizontal bar chart of `top` with income and expenses as separate series.
///
/// A category with both income and expenses gets a single row with both bars.
/// The largest total is drawn at the top.
pub(super) fn top_categories_chart(top: &[CategoryTotal]) -> Chart {
    let mut labels: Vec<String> = Vec::with_capacity(top.len());
    for row in top {
        if !labels.contains(&row.category) {
            labels.push(row.category.clone());
        }
    }
    // ECharts draws the first category at the bottom of the axis.
    labels.reverse();

    let values_of = |transaction_type: TransactionType| -> Vec<Option<f64>> {
        labels
            .iter()
            .map(|label| {
                top.iter()
                    .find(|row| {
                        row.category == *label && row.transaction_type == transaction_type
                    })
                    .map(|row| row.total)
            })
            .collect()
    };

    Chart::new()
        .title(Title::new().text("Top categories"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().right("4%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Value))
        .y_axis(Axis::new().type_(AxisType::Category).data(labels.clone()))
        .series(
            Bar::new()
                .name("Income")
                .stack("total")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .item_style(ItemStyle::new().color(INCOME_COLOR))
                .data(values_of(TransactionType::Income)),
        )
        .series(
            Bar::new()
                .name("Expense")
                .stack("total")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .item_style(ItemStyle::new().color(EXPENSE_COLOR))
                .data(values_of(TransactionType::Expense)),
        )
}

pub(super) fn net_income_chart(monthly: &[MonthlyTotal]) -> Chart {
    let labels: Vec<String> = monthly
        .iter()
        .map(|total| format_month_label(total.month))
        .collect();
    let values: Vec<f64> = monthly.iter().map(|total| total.net).collect();

    Chart::new()
        .title(Title::new().text("Net income"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .visual_map(VisualMap::new().show(false).pieces(vec![
            VisualMapPiece::new().lt(0).color("red"),
            VisualMapPiece::new().gte(0).color("green"),
        ]))
        .series(Line::new().name("Net income").data(values))
}
