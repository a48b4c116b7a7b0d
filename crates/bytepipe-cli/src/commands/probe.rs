//! Probe command implementation.

use std::collections::BTreeSet;

use anyhow::{Context, Result};

use bytepipe_core::probe::{run_probe, ProbeEvent, ProbeOptions, ProbeReport, SystemInspector};

use super::ProbeArgs;

/// Run the probe command.
pub fn run(args: &ProbeArgs) -> Result<()> {
    let global_config = super::load_config();

    let mut options = ProbeOptions::from(&global_config.probe);
    if let Some(iterations) = args.iterations {
        options.iterations = iterations;
    }
    let bind_address = args.bind.unwrap_or(global_config.probe.bind_address);
    let inspector = SystemInspector::new(bind_address);

    let report = run_probe(&inspector, &options, |event| match event {
        ProbeEvent::Iteration { current, total } => {
            if !args.json {
                println!("Running iteration {} of {}", current, total);
            }
        }
        ProbeEvent::Conflict { port, pids } => {
            tracing::warn!(
                "Port conflict detected on port {} with PIDs: {}",
                port,
                join_pids(pids)
            );
        }
    })
    .context("Port probe failed")?;

    if args.json {
        output_json(&report)?;
    } else {
        display_report(&report);
    }

    Ok(())
}

/// Output the report as JSON.
fn output_json(report: &ProbeReport) -> Result<()> {
    println!("{}", render_json(report)?);
    Ok(())
}

fn render_json(report: &ProbeReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize probe report")
}

/// Display the report as text.
fn display_report(report: &ProbeReport) {
    for line in summary_lines(report) {
        println!("{line}");
    }
}

fn summary_lines(report: &ProbeReport) -> Vec<String> {
    if !report.has_collisions() {
        return vec!["No ports were found to be in use.".to_string()];
    }

    let mut lines = vec!["Ports that were found to be in use and their collision counts:".to_string()];
    lines.extend(
        report
            .collisions
            .iter()
            .map(|(port, count)| format!("Port {} was found in use {} times", port, count)),
    );
    lines
}

fn join_pids(pids: &BTreeSet<u32>) -> String {
    pids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_without_collisions() {
        let report = ProbeReport {
            iterations: 10,
            ..ProbeReport::default()
        };
        assert_eq!(summary_lines(&report), vec!["No ports were found to be in use."]);
    }

    #[test]
    fn test_summary_lists_ports_in_order() {
        let mut report = ProbeReport {
            iterations: 10,
            ..ProbeReport::default()
        };
        report.collisions.insert(40010, 1);
        report.collisions.insert(40002, 3);

        assert_eq!(
            summary_lines(&report),
            vec![
                "Ports that were found to be in use and their collision counts:",
                "Port 40002 was found in use 3 times",
                "Port 40010 was found in use 1 times",
            ]
        );
    }

    #[test]
    fn test_json_report() {
        let mut report = ProbeReport {
            iterations: 10,
            total_collisions: 3,
            ..ProbeReport::default()
        };
        report.collisions.insert(40002, 3);

        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "iterations": 10,
                "total_collisions": 3,
                "collisions": { "40002": 3 },
            })
        );
    }

    #[test]
    fn test_join_pids() {
        assert_eq!(join_pids(&BTreeSet::from([42, 7, 1000])), "7, 42, 1000");
        assert_eq!(join_pids(&BTreeSet::new()), "");
    }
}
