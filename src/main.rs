use clap::Parser;
use diabetes_risk_client::core::artifacts::ArtifactOptions;
use diabetes_risk_client::core::report;
use diabetes_risk_client::core::ConfigProvider;
use diabetes_risk_client::utils::error::ErrorSeverity;
use diabetes_risk_client::utils::logger;
use diabetes_risk_client::{
    CliConfig, Command, HttpRiskApi, LocalStorage, RiskClientError, RiskWorkflow,
};

async fn run(config: CliConfig) -> Result<(), RiskClientError> {
    let settings = config.settings()?;
    tracing::debug!("Effective settings: {:?}", settings);

    let api = HttpRiskApi::from_config(&settings)?.with_headers(settings.headers.clone());
    let storage = LocalStorage::new(settings.output_path().to_string());
    let workflow = RiskWorkflow::new(api, storage)
        .with_artifact_options(ArtifactOptions {
            save_plots: settings.save_plots(),
            archive: settings.archive(),
        })
        .with_monitoring(config.monitor);

    match &config.command {
        Command::Preview { file, .. } => {
            let preview = workflow.preview(file.as_ref()).await?;
            print!("{}", report::render_preview(&preview, settings.preview_rows()));
        }
        Command::Analyze {
            file,
            show_all_scores,
            ..
        } => {
            let outcome = workflow.analyze(file.as_ref()).await?;

            print!(
                "{}",
                report::render_preview(&outcome.preview, settings.preview_rows())
            );
            if !outcome.analysis.predictions.is_empty() {
                println!();
                print!("{}", report::render_predictions(&outcome.analysis.predictions));
            }
            println!();
            print!(
                "{}",
                report::render_metrics(&outcome.analysis, *show_all_scores)
            );

            println!();
            let saved = &outcome.artifacts;
            if let Some(error) = &saved.error {
                eprintln!("⚠️ Results were not saved: {}", error);
            } else {
                println!("📁 Report saved to: {}", saved.report);
            }
            for plot in &saved.plots {
                println!("🖼️  Plot saved to: {}", plot);
            }
            for name in &saved.skipped_plots {
                eprintln!("⚠️ Plot '{}' could not be decoded and was skipped", name);
            }
            if let Some(archive) = &saved.archive {
                println!("📦 Archive saved to: {}", archive);
            }
        }
        Command::Predict(args) => {
            let form = args.to_form()?;
            let result = workflow.predict(&form).await?;
            print!("{}", report::render_prediction(&result));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        // 依錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        std::process::exit(exit_code);
    }
}
