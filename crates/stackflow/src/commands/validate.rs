use crate::utils;
use colored::Colorize;
use stackflow_core::DependencyGraph;
use std::path::PathBuf;

pub fn handle(file: Option<PathBuf>, vars: &[String]) -> anyhow::Result<()> {
    println!("{}", "スタック定義を検証中...".blue());

    let (path, stack) = match utils::load_stack(file, vars) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };
    println!("スタック定義: {}", path.display().to_string().cyan());

    let graph = match DependencyGraph::build(&stack.resources) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 依存関係エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", "✓ スタック定義は正常です！".green().bold());
    println!();
    println!("スタック: {}", stack.name.cyan());
    println!("実行順序 ({}個):", graph.len());
    for (step, &index) in graph.order().iter().enumerate() {
        let resource = &stack.resources[index];
        let deps = graph
            .dependencies_of(index)
            .iter()
            .map(|&d| graph.name(d))
            .collect::<Vec<_>>();
        let after = if deps.is_empty() {
            String::new()
        } else {
            format!(" ← {}", deps.join(", "))
        };
        println!(
            "  {}. {} ({}, {}){}",
            step + 1,
            resource.name.cyan(),
            resource.kind,
            resource.remote_name(),
            after.dimmed()
        );
    }

    if !stack.outputs.is_empty() {
        println!("出力 ({}個):", stack.outputs.len());
        for output in &stack.outputs {
            println!(
                "    - {} ← {}.{}",
                output.name.cyan(),
                output.source.resource,
                output.source.attribute
            );
        }
    }

    Ok(())
}
