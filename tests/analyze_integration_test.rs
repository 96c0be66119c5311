use anyhow::Result;
use base64::Engine as _;
use diabetes_risk_client::core::artifacts::ArtifactOptions;
use diabetes_risk_client::core::report;
use diabetes_risk_client::{HttpRiskApi, LocalStorage, RiskClientError, RiskWorkflow};
use httpmock::prelude::*;
use std::io::Write;
use tempfile::{Builder, NamedTempFile, TempDir};

const DATASET: &str = "Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age,Outcome
6,148,72,35,0,33.6,0.627,50,1
1,85,66,29,0,26.6,0.351,31,0
8,183,64,0,0,23.3,0.672,32,1
1,89,66,23,94,28.1,0.167,21,0
0,137,40,35,168,43.1,2.288,33,1
5,116,74,0,0,25.6,0.201,30,0
3,78,50,32,88,31,0.248,26,1
";

fn dataset_file() -> Result<NamedTempFile> {
    let mut file = Builder::new().suffix(".csv").tempfile()?;
    file.write_all(DATASET.as_bytes())?;
    Ok(file)
}

fn fake_png() -> String {
    base64::engine::general_purpose::STANDARD.encode(b"\x89PNG\r\n\x1a\nfake")
}

fn analysis_body() -> serde_json::Value {
    serde_json::json!({
        "accuracy": 0.7662337662,
        "confusion_matrix": [[87, 12], [24, 31]],
        "feature_importance": {
            "Pregnancies": 0.02,
            "Glucose": 0.61,
            "BloodPressure": 0.0,
            "SkinThickness": 0.0,
            "Insulin": 0.03,
            "BMI": 0.21,
            "DiabetesPedigreeFunction": 0.05,
            "Age": 0.08
        },
        "cross_val_scores": [0.70, 0.72, 0.74, 0.75, 0.76, 0.74, 0.73],
        "best_alpha": 0.00428,
        "plots": {
            "decision_tree": fake_png(),
            "confusion_matrix": fake_png(),
            "accuracy_vs_alpha": null
        }
    })
}

#[tokio::test]
async fn test_end_to_end_analysis() -> Result<()> {
    let output_dir = TempDir::new()?;
    let output_path = output_dir.path().to_str().unwrap().to_string();
    let dataset = dataset_file()?;

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/analyze")
            .body_contains("name=\"file\"")
            .body_contains("text/csv")
            .body_contains("DiabetesPedigreeFunction");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(analysis_body());
    });

    let api = HttpRiskApi::new(&server.base_url())?;
    let storage = LocalStorage::new(output_path.clone());
    let workflow = RiskWorkflow::new(api, storage).with_artifact_options(ArtifactOptions {
        save_plots: true,
        archive: true,
    });

    let outcome = workflow.analyze(Some(dataset.path())).await?;

    api_mock.assert();
    assert_eq!(outcome.preview.total_rows(), 7);
    assert!(outcome.preview.missing_columns().is_empty());
    assert_eq!(outcome.artifacts.plots.len(), 2);
    assert!(outcome.artifacts.archive.is_some());

    let plots_dir = output_dir.path().join("plots");
    assert!(plots_dir.join("decision_tree.png").exists());
    assert!(plots_dir.join("confusion_matrix.png").exists());
    assert!(!plots_dir.join("accuracy_vs_alpha.png").exists());
    assert!(output_dir.path().join("analysis_bundle.zip").exists());

    let report_json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output_dir.path().join("analysis.json"))?)?;
    assert_eq!(report_json["confusion_matrix"][1][1], 31);

    let rendered = report::render_metrics(&outcome.analysis, false);
    assert!(rendered.contains("Accuracy\n0.7662"));
    assert!(rendered.contains("0.7 ; 0.72 ; 0.74 ; 0.75 ; 0.76"));
    assert!(rendered.contains("Best Alpha\n0.0043"));

    let preview = report::render_preview(&outcome.preview, 5);
    assert!(preview.contains("Showing first 5 rows of 7 total rows"));

    Ok(())
}

#[tokio::test]
async fn test_analysis_failure_surfaces_detail() -> Result<()> {
    let output_dir = TempDir::new()?;
    let dataset = dataset_file()?;

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/api/analyze");
        then.status(400)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"detail": "\"['Glucose'] not in index\""}));
    });

    let api = HttpRiskApi::new(&server.base_url())?;
    let storage = LocalStorage::new(output_dir.path().to_str().unwrap().to_string());
    let workflow = RiskWorkflow::new(api, storage);

    let err = workflow.analyze(Some(dataset.path())).await.unwrap_err();

    api_mock.assert();
    match err {
        RiskClientError::ApiStatus { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("not in index"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // 失敗時不應留下報告
    assert!(!output_dir.path().join("analysis.json").exists());

    Ok(())
}

#[tokio::test]
async fn test_wrong_file_type_is_never_uploaded() -> Result<()> {
    let output_dir = TempDir::new()?;
    let mut text_file = Builder::new().suffix(".txt").tempfile()?;
    text_file.write_all(DATASET.as_bytes())?;

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/api/analyze");
        then.status(200).json_body(analysis_body());
    });

    let api = HttpRiskApi::new(&server.base_url())?;
    let storage = LocalStorage::new(output_dir.path().to_str().unwrap().to_string());
    let workflow = RiskWorkflow::new(api, storage);

    let err = workflow.analyze(Some(text_file.path())).await.unwrap_err();

    assert_eq!(err.to_string(), "Please upload a valid CSV file");
    api_mock.assert_hits(0);

    Ok(())
}

#[test]
fn test_preview_only_reads_locally() -> Result<()> {
    let dataset = dataset_file()?;
    let api = HttpRiskApi::new("http://127.0.0.1:9")?;
    let workflow = RiskWorkflow::new(api, LocalStorage::new("./unused".to_string()));

    let preview = tokio_test::block_on(workflow.preview(Some(dataset.path())))?;

    assert_eq!(preview.headers.len(), 9);
    assert_eq!(preview.head(5).len(), 5);
    assert_eq!(preview.rows[4][5], "43.1");

    Ok(())
}

#[tokio::test]
async fn test_undecodable_plot_keeps_metrics() -> Result<()> {
    let output_dir = TempDir::new()?;
    let dataset = dataset_file()?;

    let mut body = analysis_body();
    body["plots"]["decision_tree"] = serde_json::json!("not base64!");

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/api/analyze");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(body);
    });

    let api = HttpRiskApi::new(&server.base_url())?;
    let storage = LocalStorage::new(output_dir.path().to_str().unwrap().to_string());
    let workflow = RiskWorkflow::new(api, storage);

    let outcome = workflow.analyze(Some(dataset.path())).await?;

    api_mock.assert();
    assert_eq!(outcome.artifacts.skipped_plots, vec!["decision_tree"]);
    assert_eq!(outcome.artifacts.plots.len(), 1);
    assert!(outcome.artifacts.error.is_none());
    assert!(output_dir.path().join("analysis.json").exists());
    assert!(report::render_metrics(&outcome.analysis, false).contains("Accuracy\n0.7662"));

    Ok(())
}

#[tokio::test]
async fn test_non_utf8_dataset_is_uploaded() -> Result<()> {
    let output_dir = TempDir::new()?;
    let mut dataset = Builder::new().suffix(".csv").tempfile()?;
    dataset.write_all(b"Glucose,\xC2ge\n120,44\n")?;

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/api/analyze");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(analysis_body());
    });

    let api = HttpRiskApi::new(&server.base_url())?;
    let storage = LocalStorage::new(output_dir.path().to_str().unwrap().to_string());
    let workflow = RiskWorkflow::new(api, storage);

    let outcome = workflow.analyze(Some(dataset.path())).await?;

    api_mock.assert_hits(1);
    assert_eq!(outcome.preview.total_rows(), 1);

    Ok(())
}

#[tokio::test]
async fn test_unreachable_service_reports_upload_error() -> Result<()> {
    let dataset = dataset_file()?;
    let api = HttpRiskApi::new("http://127.0.0.1:9")?;
    let workflow = RiskWorkflow::new(api, LocalStorage::new("./unused".to_string()));

    let err = workflow.analyze(Some(dataset.path())).await.unwrap_err();

    assert!(matches!(err, RiskClientError::UploadFailed(_)));
    assert_eq!(err.user_friendly_message(), "Error uploading file");

    Ok(())
}
