use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn painel(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("painel").unwrap();
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("PAINEL_LOG");
    cmd
}

/// Answer a single HTTP request with `body` and return the base URL.
fn serve_once(body: &'static str) -> String {
    serve_once_with("200 OK", body)
}

fn serve_once_with(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf);
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
    });
    format!("http://{addr}")
}

#[test]
fn metas_prints_daily_goals() {
    let home = TempDir::new().unwrap();
    painel(&home)
        .args(["report", "metas", "--meta", "3500000", "--dias", "22"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R$ 95.454,55"))
        .stdout(predicate::str::contains("R$ 47.727,27"))
        .stdout(predicate::str::contains("R$ 15.909,09"))
        .stdout(predicate::str::contains("R$ 159.090,91"));
}

#[test]
fn metas_rejects_zero_business_days() {
    let home = TempDir::new().unwrap();
    painel(&home)
        .args(["report", "metas", "--dias", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("business days"));
}

#[test]
fn impossible_date_fails_before_fetching() {
    let home = TempDir::new().unwrap();
    painel(&home)
        .args(["report", "pedidos", "--date", "31/02/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn inverted_range_fails_before_fetching() {
    let home = TempDir::new().unwrap();
    painel(&home)
        .args([
            "report",
            "faturamento",
            "--from",
            "2024-09-30",
            "--to",
            "2024-09-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date range"));
}

#[test]
fn config_set_persists_and_validates() {
    let home = TempDir::new().unwrap();
    painel(&home)
        .args(["config", "set", "business_days", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("business_days = 20"));
    painel(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"business_days\": 20"));
    painel(&home)
        .args(["config", "set", "business_days", "0"])
        .assert()
        .failure();
    painel(&home)
        .args(["config", "set", "no_such_key", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Settings error"));
}

#[test]
fn config_path_points_at_settings_file() {
    let home = TempDir::new().unwrap();
    painel(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("settings.json"));
}

#[test]
fn pedidos_report_renders_fetched_rows() {
    let home = TempDir::new().unwrap();
    let url = serve_once(
        r#"[{"docdate":"2024-09-02","total_doal":1000,"total_licitacao":500,"Representantes":250.5,"acumulado":1750.5}]"#,
    );
    painel(&home)
        .args(["config", "set", "orders_api_url", &url])
        .assert()
        .success();
    painel(&home)
        .args(["report", "pedidos", "--date", "02092024"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pedidos de 02/09/2024"))
        .stdout(predicate::str::contains("R$ 1.750,50"));
}

#[test]
fn backend_error_message_is_reported() {
    let home = TempDir::new().unwrap();
    let url = serve_once_with(
        "500 Internal Server Error",
        r#"{"message":"Banco de dados indisponível"}"#,
    );
    painel(&home)
        .args(["config", "set", "orders_api_url", &url])
        .assert()
        .success();
    painel(&home)
        .args(["report", "pedidos", "--date", "2024-09-02"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error: Banco de dados indisponível (HTTP 500)",
        ));
}

#[test]
fn broken_settings_file_is_not_overwritten() {
    let home = TempDir::new().unwrap();
    let path = home.path().join(".config").join("painel").join("settings.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ \"monthly_goal\": 1000000,").unwrap();

    painel(&home)
        .args(["config", "set", "business_days", "20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Settings error"));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{ \"monthly_goal\": 1000000,"
    );
}

#[test]
fn transport_failure_is_reported() {
    let home = TempDir::new().unwrap();
    painel(&home)
        .args(["config", "set", "revenue_api_url", "http://127.0.0.1:1"])
        .assert()
        .success();
    painel(&home)
        .args([
            "report",
            "faturamento",
            "--from",
            "2024-09-01",
            "--to",
            "2024-09-30",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
