use crate::output::{print_json, print_table};
use anyhow::Context;
use devfleet_core::{
    config::FleetConfig,
    registry::ServiceRegistry,
    setup::{self, SetupOptions, StepStatus},
};
use std::path::Path;

pub fn run(root: &Path, opts: &SetupOptions, json: bool) -> anyhow::Result<()> {
    let cfg = FleetConfig::load(root).context("failed to load devfleet.yaml")?;
    let registry =
        ServiceRegistry::from_config(root, &cfg).context("failed to open compose files")?;

    let report = setup::run(root, &cfg, &registry, opts).context("setup pipeline failed")?;

    if json {
        return print_json(&report);
    }

    let rows: Vec<Vec<String>> = report
        .steps
        .iter()
        .map(|s| {
            let status = match &s.status {
                StepStatus::Done => "done".to_string(),
                StepStatus::Skipped(reason) => format!("skipped ({reason})"),
                StepStatus::Failed(reason) => format!("failed: {reason}"),
            };
            vec![s.service.clone(), s.step.to_string(), status]
        })
        .collect();
    print_table(&["SERVICE", "STEP", "STATUS"], rows);

    let failures = report.failures();
    if failures > 0 {
        println!("\n{} step(s) failed — see above.", failures);
    } else {
        println!("\nSetup complete.");
    }
    Ok(())
}
