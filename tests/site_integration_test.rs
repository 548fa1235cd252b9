use clap::Parser;
use httpmock::prelude::*;
use roster_site::adapters::{self, SiteSource};
use roster_site::core::ConfigProvider;
use roster_site::utils::validation::Validate;
use roster_site::{
    CliConfig, LoadError, LocalStorage, RosterError, RosterPage, RosterRenderer, SiteEngine,
};
use std::path::Path;
use tempfile::TempDir;

fn roster_json() -> serde_json::Value {
    serde_json::json!({
        "batches": [
            {
                "year": 2023,
                "coordinator": {"name": "Pr. Amina El Idrissi", "linkedin": "https://linkedin.com/in/amina"},
                "students": [
                    {"name": "Youssef Benali", "github": "https://github.com/ybenali"},
                    {"name": "Sara Tazi", "linkedin": "#"}
                ]
            },
            {
                "year": "2024",
                "coordinator": {"name": "Dr. Karim Alaoui", "image": "images/karim.jpg"},
                "students": [{"name": "Omar Fassi", "image": "images/omar.jpg"}]
            }
        ]
    })
}

fn engine_for(config: &CliConfig) -> SiteEngine<SiteSource, LocalStorage> {
    config.validate().unwrap();
    let source = SiteSource::from_config(config).unwrap();
    let mut page = RosterPage::new(source, RosterRenderer::new(config.labels()));
    if let Some(resolver) = adapters::photo_resolver(config).unwrap() {
        page = page.with_photo_resolver(resolver);
    }
    let storage = LocalStorage::new(config.output_path.clone());
    SiteEngine::new(page, storage, config.page_title()).with_initial_filter(config.initial_filter())
}

fn write_site(root: &Path) {
    std::fs::create_dir_all(root.join("data")).unwrap();
    std::fs::create_dir_all(root.join("images")).unwrap();
    std::fs::write(
        root.join("data/students.json"),
        serde_json::to_vec(&roster_json()).unwrap(),
    )
    .unwrap();
    std::fs::write(root.join("images/karim.jpg"), b"\xff\xd8\xff\xe0jpeg").unwrap();
}

fn read_snapshot(output: &Path) -> serde_json::Value {
    let raw = std::fs::read(output.join("roster.json")).unwrap();
    serde_json::from_slice(&raw).unwrap()
}

#[tokio::test]
async fn test_end_to_end_render_from_deployed_site() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let roster_mock = server.mock(|when, then| {
        when.method(GET).path("/bdsi/data/students.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(roster_json());
    });

    let config = CliConfig::parse_from([
        "roster-site",
        "--site-url",
        server.url("/bdsi").as_str(),
        "--output-path",
        output_path.as_str(),
    ]);

    let report = engine_for(&config).run().await.unwrap();

    roster_mock.assert();
    assert_eq!(report.files, vec!["index.html", "roster.json"]);
    assert_eq!(report.snapshot.coordinator_cards, 2);
    assert_eq!(report.snapshot.member_cards, 3);

    let html = std::fs::read_to_string(temp_dir.path().join("index.html")).unwrap();
    assert!(html.contains("<html lang=\"fr\">"));
    assert!(html.contains("<title>Nos Étudiants</title>"));
    assert!(html.contains("Promotion 2023"));
    assert!(html.contains("2 Étudiants"));
    assert!(html.contains("1 Étudiant<"));
    assert!(html.contains("https://linkedin.com/in/amina"));
    assert!(html.contains("https://github.com/ybenali"));
    // no script runs in the export, so sections must not wait for a reveal
    assert!(!html.contains("batch-section animate"));
    assert!(html.contains("class=\"batch-section\" data-batch=\"2023\""));
    assert!(html.contains("class=\"batch-section\" data-batch=\"2024\""));

    let snapshot = read_snapshot(temp_dir.path());
    assert_eq!(snapshot["state"], "ready");
    assert_eq!(snapshot["selectors"], serde_json::json!(["all", "2023", "2024"]));
    assert_eq!(snapshot["active_filter"], "all");
}

#[tokio::test]
async fn test_local_checkout_with_initial_filter() {
    let site = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_site(site.path());

    let config = CliConfig::parse_from([
        "roster-site",
        "--site-root",
        site.path().to_str().unwrap(),
        "--output-path",
        output.path().to_str().unwrap(),
        "--filter",
        "2024",
    ]);

    let report = engine_for(&config).run().await.unwrap();

    assert_eq!(report.snapshot.visible_years, vec!["2024"]);
    let html = std::fs::read_to_string(output.path().join("index.html")).unwrap();
    assert!(html.contains("class=\"batch-section animate show\" data-batch=\"2024\""));
    assert!(!html.contains("class=\"batch-section animate\" "));
    let snapshot = read_snapshot(output.path());
    assert_eq!(snapshot["active_filter"], "2024");
}

#[tokio::test]
async fn test_unknown_initial_filter_keeps_all_cohorts() {
    let site = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_site(site.path());

    let config = CliConfig::parse_from([
        "roster-site",
        "--site-root",
        site.path().to_str().unwrap(),
        "--output-path",
        output.path().to_str().unwrap(),
        "--filter",
        "1999",
    ]);

    let report = engine_for(&config).run().await.unwrap();

    assert_eq!(report.snapshot.visible_years, vec!["2023", "2024"]);
}

#[tokio::test]
async fn test_failed_load_still_writes_error_page() {
    let output = TempDir::new().unwrap();
    let server = MockServer::start();
    let roster_mock = server.mock(|when, then| {
        when.method(GET).path("/data/students.json");
        then.status(404);
    });

    let config = CliConfig::parse_from([
        "roster-site",
        "--site-url",
        server.base_url().as_str(),
        "--output-path",
        output.path().to_str().unwrap(),
    ]);

    let result = engine_for(&config).run().await;

    roster_mock.assert();
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        RosterError::Load(LoadError::Status { status: 404, .. })
    ));
    assert_eq!(err.exit_code(), 2);

    let html = std::fs::read_to_string(output.path().join("index.html")).unwrap();
    assert!(html.contains("error-message"));
    assert!(html.contains("Impossible de charger les données"));
    assert!(html.contains("Réessayer"));

    let snapshot = read_snapshot(output.path());
    assert_eq!(snapshot["state"], "failed");
    assert_eq!(snapshot["selectors"], serde_json::json!([]));
    assert!(snapshot["last_error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn test_probing_bakes_avatars_for_missing_photos() {
    let site = TempDir::new().unwrap();
    write_site(site.path());

    let plain_output = TempDir::new().unwrap();
    let plain = CliConfig::parse_from([
        "roster-site",
        "--site-root",
        site.path().to_str().unwrap(),
        "--output-path",
        plain_output.path().to_str().unwrap(),
    ]);
    let plain_report = engine_for(&plain).run().await.unwrap();

    let probed_output = TempDir::new().unwrap();
    let probed = CliConfig::parse_from([
        "roster-site",
        "--site-root",
        site.path().to_str().unwrap(),
        "--output-path",
        probed_output.path().to_str().unwrap(),
        "--probe-images",
    ]);
    let probed_report = engine_for(&probed).run().await.unwrap();

    // people without an image always get an avatar
    assert_eq!(plain_report.snapshot.avatar_fallbacks, 3);
    // omar.jpg is missing from the checkout, karim.jpg is present
    assert_eq!(probed_report.snapshot.avatar_fallbacks, 4);

    let html = std::fs::read_to_string(probed_output.path().join("index.html")).unwrap();
    assert!(html.contains("images/karim.jpg"));
    assert!(!html.contains("src=\"images/omar.jpg\""));
}
