use clap::ValueEnum;
use colored::Colorize;
use std::path::Path;

/// 診断ログの送信先ごとのテンプレート
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Event Hub + Application Insights + Azure Functions
    EventHub,
    /// ストレージアカウント
    Storage,
    /// Log Analytics ワークスペース
    LogAnalytics,
}

impl Scenario {
    pub fn template(self) -> &'static str {
        match self {
            Scenario::EventHub => include_str!("../../templates/event-hub.kdl"),
            Scenario::Storage => include_str!("../../templates/storage.kdl"),
            Scenario::LogAnalytics => include_str!("../../templates/log-analytics.kdl"),
        }
    }
}

pub fn handle(scenario: Scenario, output: &Path, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} は既に存在します（上書きするには --force を指定）",
            output.display()
        ));
    }

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, scenario.template())?;

    println!("{}", "✓ スタック定義を作成しました！".green());
    println!("  {}", output.display().to_string().cyan());
    println!();
    println!("{}", "次のコマンドでリソースを作成できます:".bold());
    println!("  {} validate -f {}", "stack".cyan(), output.display());
    println!("  {} up -f {}", "stack".cyan(), output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackflow_core::{DependencyGraph, ResourceKind, Variables, load_stack_str};

    fn load(scenario: Scenario) -> stackflow_core::Stack {
        load_stack_str(scenario.template(), "test".to_string(), &Variables::new()).unwrap()
    }

    #[test]
    fn test_every_template_is_valid() {
        for scenario in [Scenario::EventHub, Scenario::Storage, Scenario::LogAnalytics] {
            let stack = load(scenario);
            DependencyGraph::build(&stack.resources).unwrap();
            assert!(!stack.outputs.is_empty());
        }
    }

    #[test]
    fn test_event_hub_scenario_wires_function_settings() {
        let stack = load(Scenario::EventHub);
        let function = stack.get("function").unwrap();
        assert_eq!(function.kind, ResourceKind::FunctionApp);

        let deps = function.dependencies();
        for dep in ["group", "plan", "storage", "events", "insights"] {
            assert!(deps.contains(&dep), "function should depend on {}", dep);
        }
    }

    #[test]
    fn test_diagnostics_run_after_their_destination() {
        let stack = load(Scenario::LogAnalytics);
        let graph = DependencyGraph::build(&stack.resources).unwrap();
        let order = graph.execution_order();
        let position = |name: &str| order.iter().position(|n| *n == name).unwrap();

        assert!(position("workspace") < position("diagnostics"));
        assert!(position("hub") < position("diagnostics"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output = temp_dir.path().join("stack.kdl");
        std::fs::write(&output, "// mine").unwrap();

        assert!(handle(Scenario::Storage, &output, false).is_err());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "// mine");

        handle(Scenario::Storage, &output, true).unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            Scenario::Storage.template()
        );
    }
}
