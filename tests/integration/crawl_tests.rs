use pj_portal_crawler::aggregate::aggregate;
use pj_portal_crawler::config::{
    Config, FailurePolicy, HttpConfig, OutputConfig, SearchConfig, SiteConfig,
};
use pj_portal_crawler::crawler::crawl;
use pj_portal_crawler::output::{export_all, CsvSink};
use pj_portal_crawler::{CrawlError, FetchError, NOT_FOUND};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling the mock server
fn create_test_config(base_url: &str, keywords: &[&str], output_dir: &std::path::Path) -> Config {
    Config {
        site: SiteConfig {
            url: format!("{}/", base_url),
            base_url: None,
        },
        search: SearchConfig {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        },
        http: HttpConfig {
            user_agent: "TestBot/1.0".to_string(),
            timeout_secs: 5,
        },
        output: OutputConfig {
            directory: output_dir.to_path_buf(),
            on_error: FailurePolicy::Abort,
        },
    }
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn home_page(paths: &[&str]) -> String {
    let wrappers: String = paths
        .iter()
        .map(|p| {
            format!(
                r#"<div class="fakultaet_wrapper"><h2>Fakultät</h2><a href="{}">Details</a></div>"#,
                p
            )
        })
        .collect();
    format!(
        "<html><head><title>PJ-Portal</title></head><body>{}</body></html>",
        wrappers
    )
}

fn staff(position: &str, name: &str, email: &str) -> String {
    format!(
        r##"<div class="Position Stufe_0"><h3>{}</h3><p class="Person Stufe_0">{}</p><p><a href="#">{}</a></p></div>"##,
        position, name, email
    )
}

fn university_page(name: &str, staff_html: &str, hospital_paths: &[&str]) -> String {
    let links: String = hospital_paths
        .iter()
        .map(|p| format!(r#"<li><a href="{}">Krankenhaus</a></li>"#, p))
        .collect();
    format!(
        r#"<html><body>
            <h1 id="content_Fakultaet_bezeichnung">{}</h1>
            {}
            <ul id="Fakultaet_Krankenhaeuser">{}</ul>
        </body></html>"#,
        name, staff_html, links
    )
}

fn hospital_page(name: &str, homepage: Option<&str>, staff_html: &str, specialties: &[&str]) -> String {
    let websites = homepage
        .map(|h| {
            format!(
                r#"<div id="content_Krankenhaus_Webseiten"><p><a href="{}">{}</a></p></div>"#,
                h, h
            )
        })
        .unwrap_or_default();
    let spans: String = specialties
        .iter()
        .map(|s| format!(r#"<span class="Fach">{}</span>"#, s))
        .collect();
    format!(
        r#"<html><body>
            <h1 id="content_Krankenhaus_bezeichnung">{}</h1>
            {}
            {}
            <div class="Faecher">{}</div>
        </body></html>"#,
        name, websites, staff_html, spans
    )
}

/// Home lists University B before University A. A's hospital offers
/// Cardiology and Neurology, B's only Neurology.
async fn mount_directory(server: &MockServer) {
    mount_page(server, "/", home_page(&["/fakultaet/b", "/fakultaet/a"])).await;

    mount_page(
        server,
        "/fakultaet/b",
        university_page(
            "Universität B",
            &staff("Studiendekanat", "Bernd Berg", "berg (at) uni-b.de"),
            &["/krankenhaus/b1"],
        ),
    )
    .await;
    mount_page(
        server,
        "/fakultaet/a",
        university_page(
            "Universität A",
            &staff("PJ-Koordination", "Anna Alt", "alt (at) uni-a.de"),
            &["/krankenhaus/a1"],
        ),
    )
    .await;

    mount_page(
        server,
        "/krankenhaus/a1",
        hospital_page(
            "Klinikum A",
            Some("https://klinikum-a.de"),
            &staff("Chefarzt Kardiologie", "Dr. Carl Herz", "herz (at) klinikum-a.de"),
            &["Cardiology", "Neurology"],
        ),
    )
    .await;
    mount_page(
        server,
        "/krankenhaus/b1",
        hospital_page(
            "Klinikum B",
            None,
            &staff("Chefärztin", "Dr. Nina Nerv", "nerv@klinikum-b.de"),
            &["Neurology"],
        ),
    )
    .await;
}

#[tokio::test]
async fn test_full_crawl_builds_forest() {
    let mock_server = MockServer::start().await;
    mount_directory(&mock_server).await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &["Cardiology"], output_dir.path());

    let outcome = crawl(&config).await.expect("Crawl failed");

    assert_eq!(outcome.pages_fetched, 5);
    let names: Vec<&str> = outcome.universities.iter().map(|u| u.name()).collect();
    assert_eq!(names, vec!["Universität B", "Universität A"]);

    let uni_a = &outcome.universities[1];
    assert_eq!(uni_a.source_url(), format!("{}/fakultaet/a", mock_server.uri()));
    assert_eq!(uni_a.contacts()[0].email(), "alt@uni-a.de");

    let klinikum_a = &uni_a.hospitals()[0];
    assert_eq!(klinikum_a.name(), "Klinikum A");
    assert_eq!(klinikum_a.homepage_url(), "https://klinikum-a.de");
    assert_eq!(klinikum_a.specialties(), ["Cardiology", "Neurology"]);
    assert_eq!(klinikum_a.contacts()[0].name(), "Dr. Carl Herz");

    let klinikum_b = &outcome.universities[0].hospitals()[0];
    assert_eq!(klinikum_b.homepage_url(), NOT_FOUND);
}

#[tokio::test]
async fn test_cardiology_scenario_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_directory(&mock_server).await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &["Cardiology"], output_dir.path());

    let outcome = crawl(&config).await.expect("Crawl failed");
    let tables = aggregate(&outcome.universities, &config.search.keywords);

    assert_eq!(tables.len(), 1);
    let cardiology = &tables[0];
    assert_eq!(cardiology.university_rows.len(), 1);
    assert_eq!(cardiology.university_rows[0].university, "Universität A");
    assert_eq!(cardiology.hospital_rows.len(), 1);
    assert_eq!(cardiology.hospital_rows[0].keyword, "Cardiology");
    assert_eq!(cardiology.hospital_rows[0].email, "herz@klinikum-a.de");
    assert_eq!(cardiology.link_rows.len(), 1);
    assert_eq!(cardiology.link_rows[0].hospital, "Klinikum A");

    let sink = CsvSink::new(output_dir.path());
    let report = export_all(&sink, &tables);
    assert!(report.is_success());

    let uni_csv = std::fs::read_to_string(sink.path_for("Cardiology_Uni_emails")).unwrap();
    assert_eq!(
        uni_csv,
        "University,Keyword,Name,Position,Email\n\
         Universität A,Cardiology,Anna Alt,PJ-Koordination,alt@uni-a.de\n"
    );

    let hos_csv = std::fs::read_to_string(sink.path_for("Cardiology_Hos_emails")).unwrap();
    assert_eq!(
        hos_csv,
        "University,Hospital,Keyword,Name,Position,Email\n\
         Universität A,Klinikum A,Cardiology,Dr. Carl Herz,Chefarzt Kardiologie,herz@klinikum-a.de\n"
    );

    let links_csv = std::fs::read_to_string(sink.path_for("Cardiology_Hos_links")).unwrap();
    assert_eq!(
        links_csv,
        "Hospital,Homepage,Keyword\nKlinikum A,https://klinikum-a.de,Cardiology\n"
    );
}

#[tokio::test]
async fn test_ordering_follows_home_page() {
    let mock_server = MockServer::start().await;
    mount_directory(&mock_server).await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &["Neurology"], output_dir.path());

    let outcome = crawl(&config).await.expect("Crawl failed");
    let tables = aggregate(&outcome.universities, &config.search.keywords);

    let universities: Vec<&str> = tables[0]
        .university_rows
        .iter()
        .map(|r| r.university.as_str())
        .collect();
    assert_eq!(universities, vec!["Universität B", "Universität A"]);

    let homepages: Vec<&str> = tables[0]
        .link_rows
        .iter()
        .map(|r| r.homepage.as_str())
        .collect();
    assert_eq!(homepages, vec![NOT_FOUND, "https://klinikum-a.de"]);
}

#[tokio::test]
async fn test_keyword_without_matches_exports_empty_tables() {
    let mock_server = MockServer::start().await;
    mount_directory(&mock_server).await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &["Dermatology"], output_dir.path());

    let outcome = crawl(&config).await.expect("Crawl failed");
    let tables = aggregate(&outcome.universities, &config.search.keywords);
    assert!(tables[0].is_empty());

    let sink = CsvSink::new(output_dir.path());
    assert!(export_all(&sink, &tables).is_success());
    for name in [
        "Dermatology_Uni_emails",
        "Dermatology_Hos_emails",
        "Dermatology_Hos_links",
    ] {
        assert!(sink.path_for(name).exists(), "missing {}", name);
    }
}

#[tokio::test]
async fn test_blocked_rerun_keeps_previous_export() {
    let mock_server = MockServer::start().await;
    mount_directory(&mock_server).await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(
        &mock_server.uri(),
        &["Cardiology", "Neurology"],
        output_dir.path(),
    );
    let sink = CsvSink::new(output_dir.path());
    for name in [
        "Cardiology_Uni_emails",
        "Cardiology_Hos_emails",
        "Cardiology_Hos_links",
    ] {
        std::fs::write(sink.path_for(name), "previous run\n").unwrap();
    }
    let blocked = sink.path_for("Cardiology_Hos_emails");
    std::fs::remove_file(&blocked).unwrap();
    std::fs::create_dir(&blocked).unwrap();
    std::fs::write(blocked.join("notes.txt"), "x").unwrap();

    let outcome = crawl(&config).await.expect("Crawl failed");
    let tables = aggregate(&outcome.universities, &config.search.keywords);
    let report = export_all(&sink, &tables);

    assert_eq!(report.exported, vec!["Neurology"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "Cardiology");
    for name in ["Cardiology_Uni_emails", "Cardiology_Hos_links"] {
        assert_eq!(
            std::fs::read_to_string(sink.path_for(name)).unwrap(),
            "previous run\n"
        );
    }
    assert!(blocked.join("notes.txt").exists());

    let leftovers: Vec<_> = std::fs::read_dir(output_dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with('.'))
        .collect();
    assert!(leftovers.is_empty(), "leftover files: {:?}", leftovers);
}

#[tokio::test]
async fn test_broken_hospital_aborts_by_default() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", home_page(&["/fakultaet/a"])).await;
    mount_page(
        &mock_server,
        "/fakultaet/a",
        university_page("Universität A", "", &["/krankenhaus/kaputt"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/krankenhaus/kaputt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &["Cardiology"], output_dir.path());

    let result = crawl(&config).await;
    assert!(matches!(
        result,
        Err(CrawlError::Fetch(FetchError::Status { status: 500, .. }))
    ));
}

#[tokio::test]
async fn test_broken_hospital_skipped_with_skip_policy() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", home_page(&["/fakultaet/a"])).await;
    mount_page(
        &mock_server,
        "/fakultaet/a",
        university_page(
            "Universität A",
            "",
            &["/krankenhaus/kaputt", "/krankenhaus/gut"],
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/krankenhaus/gut",
        hospital_page("Klinikum Gut", None, "", &["Cardiology"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/krankenhaus/kaputt"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let output_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), &["Cardiology"], output_dir.path());
    config.output.on_error = FailurePolicy::Skip;

    let outcome = crawl(&config).await.expect("Crawl failed");

    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].url.ends_with("/krankenhaus/kaputt"));
    let hospitals: Vec<&str> = outcome.universities[0]
        .hospitals()
        .iter()
        .map(|h| h.name())
        .collect();
    assert_eq!(hospitals, vec!["Klinikum Gut"]);
}

#[tokio::test]
async fn test_unreachable_home_page_fails() {
    let mock_server = MockServer::start().await;
    // Nothing mounted: every request is answered with 404

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &["Cardiology"], output_dir.path());

    let result = crawl(&config).await;
    assert!(matches!(
        result,
        Err(CrawlError::Fetch(FetchError::Status { status: 404, .. }))
    ));
}
