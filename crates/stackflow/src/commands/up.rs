use crate::utils;
use colored::Colorize;
use stackflow_cloud::{EnvExport, ExecutionRecord, ExecutionStatus, Orchestrator, RunObserver, Summary};
use stackflow_cloud_azure::{AzCli, AzureError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// リソースごとの進捗を表示
struct ProgressPrinter;

impl RunObserver for ProgressPrinter {
    fn on_started(&self, record: &ExecutionRecord) {
        println!(
            "{}",
            format!("▶ {} ({}) を作成中...", record.resource, record.kind)
                .green()
                .bold()
        );
    }

    fn on_finished(&self, record: &ExecutionRecord) {
        let elapsed = record
            .duration_ms()
            .map(|ms| format!(" ({:.1}s)", ms as f64 / 1000.0))
            .unwrap_or_default();

        match record.status {
            ExecutionStatus::Succeeded => {
                println!("  {} {}{}", "✓".green(), record.resource, elapsed.dimmed());
            }
            ExecutionStatus::Failed => {
                let message = record
                    .failure
                    .as_ref()
                    .map(|f| f.message.as_str())
                    .unwrap_or("unknown error");
                eprintln!("  {} {}: {}", "✗".red(), record.resource, message);
            }
            ExecutionStatus::Skipped => {
                let reason = record
                    .skip_reason
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                println!("  {} {} をスキップ: {}", "⊘".yellow(), record.resource, reason);
            }
            ExecutionStatus::Pending | ExecutionStatus::Running => {}
        }
    }
}

pub async fn handle(
    file: Option<PathBuf>,
    vars: &[String],
    parallel: usize,
    subscription: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (path, stack) = utils::load_stack(file, vars)?;

    if !json {
        println!("スタック定義: {}", path.display().to_string().cyan());
        println!("スタック: {}", stack.name.cyan());
        println!(
            "{}",
            format!("リソース一覧 ({} 個):", stack.resources.len()).bold()
        );
        for resource in &stack.resources {
            println!("  • {} ({})", resource.name.cyan(), resource.kind);
        }
        println!();
    }

    // az CLI の認証状態を確認
    let mut az = AzCli::new();
    if let Some(subscription) = subscription {
        az = az.with_subscription(subscription);
    }
    let auth = match az.check_auth().await {
        Ok(auth) => auth,
        Err(AzureError::AzNotFound) => {
            eprintln!("{}", "✗ az コマンドが見つかりません".red().bold());
            eprintln!("  Azure CLI をインストールしてください:");
            eprintln!("  https://learn.microsoft.com/cli/azure/install-azure-cli");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    if !auth.authenticated {
        eprintln!("{}", "✗ Azure にログインしていません".red().bold());
        if let Some(error) = auth.error {
            eprintln!("  {}", error);
        }
        eprintln!("  az login を実行してください");
        std::process::exit(1);
    }
    if !json && let Some(account) = &auth.account_info {
        println!("アカウント: {}", account.cyan());
        println!();
    }

    // Ctrl-C で未着手のリソースをスキップ
    let cancellation = CancellationToken::new();
    let token = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!();
            eprintln!("{}", "⚠ 中断します（実行中のリソースの完了を待っています）".yellow());
            token.cancel();
        }
    });

    let mut orchestrator = Orchestrator::new(stackflow_cloud_azure::registry(Arc::new(az)))
        .with_max_parallel(parallel)
        .with_cancellation(cancellation);
    if !json {
        orchestrator = orchestrator.with_observer(Arc::new(ProgressPrinter));
    }

    let summary = orchestrator.run(&stack.resources).await?;
    let exports = summary.exports(&stack.outputs);

    if json {
        let output = serde_json::json!({
            "stack": stack.name,
            "summary": summary,
            "exports": exports,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&summary);
        print_exports(&exports);
    }

    if !summary.success || summary.cancelled {
        std::process::exit(1);
    }

    Ok(())
}

fn print_summary(summary: &Summary) {
    println!();
    if summary.success && !summary.cancelled {
        println!("{}", "✓ すべてのリソースを作成しました！".green().bold());
    } else if summary.cancelled {
        println!("{}", "⚠ 実行を中断しました".yellow().bold());
    } else {
        println!("{}", "✗ 一部のリソースの作成に失敗しました".red().bold());
        for record in summary.failures() {
            if let Some(failure) = &record.failure {
                println!("  {} {}: {}", "✗".red(), record.resource, failure.message);
            }
        }
    }
    println!("  {} ({:.1}s)", summary, summary.duration_ms as f64 / 1000.0);
}

fn print_exports(exports: &[EnvExport]) {
    if exports.is_empty() {
        return;
    }

    println!();
    println!("{}", "次の環境変数を設定してください:".bold());
    for export in exports {
        match &export.value {
            Some(value) => println!("  {}={}", export.name.cyan(), value),
            None => println!("  {}={}", export.name.cyan(), "(未作成)".dimmed()),
        }
    }
}
