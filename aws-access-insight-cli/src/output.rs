//! Rendering of reports for the terminal: plain-text tables or JSON.

use anyhow::{Context, Result};
use aws_access_insight_query::{
    AccessEntry, AccessReport, AccountSummary, CallerDetail, CallerProfile, CostReport,
};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Left-aligned column layout; enough for terminal reports
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let mut out = String::new();
    let render_row = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header_cells: Vec<String> = headers.iter().map(ToString::to_string).collect();
    out.push_str(&render_row(&header_cells));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out
}

pub fn print_access_report(report: &AccessReport, format: OutputFormat, pretty: bool) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(report, pretty),
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = report
                .entries
                .iter()
                .map(|e| {
                    vec![
                        e.principal_arn.clone(),
                        e.kind.as_str().to_string(),
                        e.decision.as_str().to_string(),
                    ]
                })
                .collect();

            println!(
                "Principals that can perform {} on {}:",
                report.action, report.resource
            );
            println!();
            if rows.is_empty() {
                println!("(none)");
            } else {
                print!("{}", render_table(&["Principal", "Kind", "Decision"], &rows));
            }
            println!();
            println!(
                "Scanned {} principals; {} allowed{}",
                report.scanned,
                report.allowed().count(),
                if report.incomplete {
                    "; some results are unknown (incomplete)"
                } else {
                    ""
                }
            );
            Ok(())
        }
    }
}

pub fn print_access_entry(entry: &AccessEntry, format: OutputFormat, pretty: bool) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(entry, pretty),
        OutputFormat::Table => {
            println!(
                "{} ({}) -> {}",
                entry.principal_arn,
                entry.kind.as_str(),
                entry.decision.as_str()
            );
            Ok(())
        }
    }
}

pub fn print_cost_report(report: &CostReport, format: OutputFormat, pretty: bool) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(report, pretty),
        OutputFormat::Table => {
            println!("Costs from {} to {} (exclusive):", report.start, report.end);
            println!();

            let daily_rows: Vec<Vec<String>> = report
                .daily
                .iter()
                .map(|d| vec![d.date.to_string(), format!("{:.2}", d.amount)])
                .collect();
            if daily_rows.is_empty() {
                println!("No cost entries in the window.");
            } else {
                print!("{}", render_table(&["Date", "Amount"], &daily_rows));
                println!();

                let service_rows: Vec<Vec<String>> = report
                    .by_service
                    .iter()
                    .map(|s| vec![s.service.clone(), format!("{:.2}", s.amount)])
                    .collect();
                print!("{}", render_table(&["Service", "Amount"], &service_rows));
            }

            println!();
            println!("Total: {:.2} {}", report.total, report.currency);
            if report.incomplete {
                println!("Warning: the breakdown is incomplete (billing pagination was cut short)");
            }
            Ok(())
        }
    }
}

pub fn print_caller_profile(
    profile: &CallerProfile,
    format: OutputFormat,
    pretty: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(profile, pretty),
        OutputFormat::Table => {
            println!("Account: {}", profile.account_id);
            println!("ARN:     {}", profile.arn);
            match &profile.principal {
                Some(principal) => {
                    println!("Kind:    {}", principal.kind.as_str());
                    println!("Name:    {}", principal.name);
                }
                None => println!("Kind:    (not an IAM user or role)"),
            }
            Ok(())
        }
    }
}

pub fn print_caller_detail(
    detail: &CallerDetail,
    format: OutputFormat,
    pretty: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(detail, pretty),
        OutputFormat::Table => {
            print_caller_profile(&detail.profile, OutputFormat::Table, pretty)?;
            println!();
            println!(
                "Attached policies: {}",
                join_or_dash(&detail.detail.attached_policies)
            );
            println!(
                "Inline policies:   {}",
                join_or_dash(&detail.detail.inline_policies)
            );
            println!("Groups:            {}", join_or_dash(&detail.detail.groups));
            if let Some(mfa) = detail.detail.mfa_enabled {
                println!("MFA enabled:       {}", if mfa { "yes" } else { "no" });
            }
            if let Some(trust) = &detail.detail.trust_policy {
                println!();
                println!("Trust policy:");
                println!(
                    "{}",
                    serde_json::to_string_pretty(trust).context("Failed to render trust policy")?
                );
            }
            Ok(())
        }
    }
}

pub fn print_account_summary(
    summary: &AccountSummary,
    format: OutputFormat,
    pretty: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(summary, pretty),
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = summary
                .iter()
                .map(|(key, value)| vec![key.clone(), value.to_string()])
                .collect();
            print!("{}", render_table(&["Counter", "Value"], &rows));
            Ok(())
        }
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_pads_columns() {
        let out = render_table(
            &["Name", "Kind"],
            &[
                vec!["alice".to_string(), "User".to_string()],
                vec!["continuous-deploy".to_string(), "Role".to_string()],
            ],
        );

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Name"));
        assert!(lines[1].starts_with("----"));
        assert!(lines[3].starts_with("continuous-deploy  Role"));
    }

    #[test]
    fn test_join_or_dash() {
        assert_eq!(join_or_dash(&[]), "-");
        assert_eq!(
            join_or_dash(&["a".to_string(), "b".to_string()]),
            "a, b"
        );
    }
}
