//! Advisory insights derived from a [`LoyaltyReport`].

use serde::{Deserialize, Serialize};

use crate::report::{LoyaltyReport, percentage, ratio};

/// Completion rate (percent) above which the program is considered healthy.
pub const HIGH_COMPLETION_PERCENT: f64 = 80.0;
/// Completion rate (percent) below which the program needs attention.
pub const LOW_COMPLETION_PERCENT: f64 = 30.0;
/// Share of customers joining in the trailing month that counts as growth.
pub const GROWTH_SHARE: f64 = 0.2;
/// Share of customers active in the trailing week below which re-engagement is suggested.
pub const REENGAGEMENT_SHARE: f64 = 0.1;

/// Severity of an insight, used by the dashboard for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Success,
    Warning,
    Info,
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// One advisory message for the shop owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub suggestion: String,
}

/// Evaluate every insight rule against a report.
///
/// Rules are independent and returned in a fixed order: completion rate,
/// growth, then activity. An empty customer set yields no insights.
#[must_use]
pub fn generate(report: &LoyaltyReport) -> Vec<Insight> {
    let total = report.total_customers;
    if total == 0 {
        return Vec::new();
    }

    let mut insights = Vec::new();

    let completion_rate = percentage(report.completed_cards, total);
    if completion_rate > HIGH_COMPLETION_PERCENT {
        insights.push(Insight {
            kind: InsightKind::Success,
            title: "Excellent Completion Rate!".to_string(),
            description: format!(
                "{completion_rate:.1}% of customers complete their loyalty cards. This indicates high customer engagement."
            ),
            suggestion: "Consider expanding the loyalty program or introducing premium rewards."
                .to_string(),
        });
    }
    if completion_rate < LOW_COMPLETION_PERCENT {
        insights.push(Insight {
            kind: InsightKind::Warning,
            title: "Low Completion Rate".to_string(),
            description: format!(
                "Only {completion_rate:.1}% of customers complete their loyalty cards."
            ),
            suggestion:
                "Consider offering intermediate rewards or reducing the number of required visits."
                    .to_string(),
        });
    }

    let new_customers = report.new_customers_last_30_days;
    let growth_share = ratio(new_customers, total);
    if growth_share > GROWTH_SHARE {
        insights.push(Insight {
            kind: InsightKind::Success,
            title: "Strong Customer Growth".to_string(),
            description: format!(
                "{new_customers} new customers joined in the last 30 days ({:.1}% of total).",
                growth_share * 100.0
            ),
            suggestion: "Maintain current marketing efforts and consider referral incentives."
                .to_string(),
        });
    }

    let active = report.recent_activity;
    if ratio(active, total) < REENGAGEMENT_SHARE {
        insights.push(Insight {
            kind: InsightKind::Info,
            title: "Consider Customer Re-engagement".to_string(),
            description: format!("Only {active} customers were active in the last week."),
            suggestion: "Send reminders to inactive customers or offer special promotions."
                .to_string(),
        });
    }

    insights
}
