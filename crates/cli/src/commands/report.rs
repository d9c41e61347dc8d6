//! Report command.

use chrono::Utc;
use serde::Serialize;

use stampcard_core::{Insight, LoyaltyReport, insights};

use super::{CommandError, loyalty, print_json};

#[derive(Serialize)]
struct ReportWithInsights {
    report: LoyaltyReport,
    insights: Vec<Insight>,
}

/// Print the report as of now, with insights if requested.
pub async fn run(with_insights: bool) -> Result<(), CommandError> {
    let report = loyalty().await?.report(Utc::now()).await?;

    if with_insights {
        let insights = insights::generate(&report);
        print_json(&ReportWithInsights { report, insights })
    } else {
        print_json(&report)
    }
}
