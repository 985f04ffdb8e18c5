//! Summary module
//!
//! Aggregates a user's transactions into totals, a category breakdown and
//! monthly totals, and turns them into chart options.

mod aggregation;
mod charts;
mod handlers;

pub use aggregation::{CategoryTotal, MonthlyTotal, Summary, get_monthly_totals, get_summary};
pub use charts::{SummaryChart, build_summary_charts};
pub use handlers::{
    get_monthly_summary_endpoint, get_summary_charts_endpoint, get_summary_endpoint,
};
