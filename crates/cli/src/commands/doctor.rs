use noforma_core::config::{AppConfig, LoadOptions};
use noforma_core::plan::constraints::validate_selections;
use noforma_core::{compute_monthly_total, AgentCatalog, SelectionState};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            Some(config)
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            None
        }
    };

    match config.as_ref().map(AppConfig::agent_catalog) {
        Some(Ok(catalog)) => {
            let anchor = &catalog.required_agent().id;
            checks.push(DoctorCheck {
                name: "catalog_validation",
                status: CheckStatus::Pass,
                details: format!("{} agents, anchor `{anchor}`", catalog.len()),
            });
            checks.push(check_baseline_pricing(&catalog));
            checks.push(check_selection_invariants(&catalog));
        }
        Some(Err(error)) => {
            checks.push(DoctorCheck {
                name: "catalog_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.extend(skipped(&["baseline_pricing", "selection_invariants"], "catalog"));
        }
        None => {
            checks.extend(skipped(
                &["catalog_validation", "baseline_pricing", "selection_invariants"],
                "configuration",
            ));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(names: &[&'static str], reason: &str) -> Vec<DoctorCheck> {
    names
        .iter()
        .map(|name| DoctorCheck {
            name,
            status: CheckStatus::Skipped,
            details: format!("skipped because {reason} did not load"),
        })
        .collect()
}

fn check_baseline_pricing(catalog: &AgentCatalog) -> DoctorCheck {
    let selections = SelectionState::initialize(catalog);
    let total = compute_monthly_total(catalog, &selections);
    let expected = catalog.required_agent().base_price;

    if total == expected {
        DoctorCheck {
            name: "baseline_pricing",
            status: CheckStatus::Pass,
            details: format!("initial plan prices at base price {total}"),
        }
    } else {
        DoctorCheck {
            name: "baseline_pricing",
            status: CheckStatus::Fail,
            details: format!("initial plan priced at {total}, expected {expected}"),
        }
    }
}

fn check_selection_invariants(catalog: &AgentCatalog) -> DoctorCheck {
    let mut selections = SelectionState::initialize(catalog);
    let anchor = catalog.required_agent().id.clone();

    let exercised = catalog
        .list_agent_types()
        .iter()
        .filter(|agent| !agent.required)
        .try_for_each(|agent| selections.toggle(catalog, &agent.id).map(|_| ()))
        .and_then(|()| selections.set_limit(catalog, &anchor, i64::MIN).map(|_| ()))
        .and_then(|()| selections.set_concurrency(catalog, &anchor, 0).map(|_| ()));
    if let Err(error) = exercised {
        return DoctorCheck {
            name: "selection_invariants",
            status: CheckStatus::Fail,
            details: error.to_string(),
        };
    }

    let result = validate_selections(catalog, &selections);
    if result.valid {
        DoctorCheck {
            name: "selection_invariants",
            status: CheckStatus::Pass,
            details: "clamping and limit sync hold for every agent".to_string(),
        }
    } else {
        let codes: Vec<&str> =
            result.violations.iter().map(|violation| violation.code.as_str()).collect();
        DoctorCheck {
            name: "selection_invariants",
            status: CheckStatus::Fail,
            details: format!("violations: {}", codes.join(", ")),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
