use httpmock::prelude::*;
use qc_report_bot::adapters::sheets::{
    ServiceAccountKey, SheetsSettings, SheetsSink, SpreadsheetRef,
};
use qc_report_bot::domain::ports::ReportSink;
use qc_report_bot::{BotError, DefectReport};
use serde_json::json;

const PRIVATE_KEY: &str = include_str!("fixtures/service_account_key.pem");

fn credentials(server: &MockServer) -> ServiceAccountKey {
    let key = json!({
        "type": "service_account",
        "client_email": "qc-bot@qc-project.iam.gserviceaccount.com",
        "private_key": PRIVATE_KEY,
        "token_uri": server.url("/token"),
    });
    ServiceAccountKey::from_json(&key.to_string()).unwrap()
}

fn settings(server: &MockServer, spreadsheet: SpreadsheetRef, worksheet: Option<&str>) -> SheetsSettings {
    SheetsSettings {
        credentials: credentials(server),
        spreadsheet,
        worksheet: worksheet.map(str::to_string),
        sheets_base_url: server.base_url(),
        drive_base_url: server.base_url(),
    }
}

fn report() -> DefectReport {
    DefectReport {
        kind: "Cosmetic Fail".to_string(),
        line: "L1".to_string(),
        defect: "scratch".to_string(),
        position: "top".to_string(),
        model: "X100".to_string(),
        total: 3,
        sn: "SN123".to_string(),
        datetime: "2024-05-01 13:45:00".to_string(),
    }
}

fn expected_row() -> serde_json::Value {
    json!({
        "values": [["Cosmetic Fail", "L1", "scratch", "top", "X100", 3, "SN123", "2024-05-01 13:45:00"]]
    })
}

fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST)
            .path("/token")
            .body_contains("jwt-bearer")
            .body_contains("assertion=eyJ");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "access_token": "sheets-token",
                "token_type": "Bearer",
                "expires_in": 3599
            }));
    })
}

#[tokio::test]
async fn test_append_resolves_spreadsheet_by_title() {
    let server = MockServer::start();
    let token_mock = mock_token(&server);

    let drive_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/drive/v3/files")
            .header("authorization", "Bearer sheets-token")
            .query_param(
                "q",
                "name = 'QC_Defect_Log' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
            );
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"files": [{"id": "sheet-123", "name": "QC_Defect_Log"}]}));
    });

    let meta_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v4/spreadsheets/sheet-123")
            .query_param("fields", "sheets.properties.title");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"sheets": [
                {"properties": {"title": "Sheet1"}},
                {"properties": {"title": "Archive"}}
            ]}));
    });

    let append_mock = server.mock(|when, then| {
        when.method(POST)
            .path_contains("/v4/spreadsheets/sheet-123/values/")
            .path_contains("Sheet1")
            .path_contains(":append")
            .header("authorization", "Bearer sheets-token")
            .query_param("valueInputOption", "RAW")
            .json_body(expected_row());
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"spreadsheetId": "sheet-123"}));
    });

    let sink = SheetsSink::new(settings(
        &server,
        SpreadsheetRef::Title("QC_Defect_Log".to_string()),
        None,
    ))
    .unwrap();

    sink.append(&report()).await.unwrap();

    token_mock.assert();
    drive_mock.assert();
    meta_mock.assert();
    append_mock.assert();
}

#[tokio::test]
async fn test_append_with_configured_id_and_worksheet_skips_lookups() {
    let server = MockServer::start();
    let token_mock = mock_token(&server);

    let drive_mock = server.mock(|when, then| {
        when.method(GET).path("/drive/v3/files");
        then.status(200).json_body(json!({"files": []}));
    });

    let append_mock = server.mock(|when, then| {
        when.method(POST)
            .path_contains("/v4/spreadsheets/fixed-id/values/")
            .path_contains("Defects")
            .json_body(expected_row());
        then.status(200).json_body(json!({}));
    });

    let sink = SheetsSink::new(settings(
        &server,
        SpreadsheetRef::Id("fixed-id".to_string()),
        Some("Defects"),
    ))
    .unwrap();

    sink.append(&report()).await.unwrap();

    token_mock.assert();
    append_mock.assert();
    drive_mock.assert_hits(0);
}

#[tokio::test]
async fn test_missing_spreadsheet_is_an_error() {
    let server = MockServer::start();
    mock_token(&server);

    server.mock(|when, then| {
        when.method(GET).path("/drive/v3/files");
        then.status(200).json_body(json!({"files": []}));
    });

    let sink = SheetsSink::new(settings(
        &server,
        SpreadsheetRef::Title("QC_Defect_Log".to_string()),
        None,
    ))
    .unwrap();

    let err = sink.append(&report()).await.unwrap_err();
    match err {
        BotError::SheetApiError { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("QC_Defect_Log"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_api_failure_is_reported_with_status() {
    let server = MockServer::start();
    mock_token(&server);

    server.mock(|when, then| {
        when.method(POST).path_contains(":append");
        then.status(403).body("PERMISSION_DENIED");
    });

    let sink = SheetsSink::new(settings(
        &server,
        SpreadsheetRef::Id("fixed-id".to_string()),
        Some("Sheet1"),
    ))
    .unwrap();

    let err = sink.append(&report()).await.unwrap_err();
    assert!(matches!(
        err,
        BotError::SheetApiError { status: 403, ref message } if message == "PERMISSION_DENIED"
    ));
}

#[tokio::test]
async fn test_rejected_token_exchange() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(400).json_body(json!({"error": "invalid_grant"}));
    });

    let sink = SheetsSink::new(settings(
        &server,
        SpreadsheetRef::Id("fixed-id".to_string()),
        Some("Sheet1"),
    ))
    .unwrap();

    let err = sink.append(&report()).await.unwrap_err();
    assert!(matches!(err, BotError::SheetApiError { status: 400, .. }));
}
