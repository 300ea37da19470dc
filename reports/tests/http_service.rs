//! HTTP Report Service and identity client against a mock server

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::NaiveDate;
use redflag_reports::{
    controller, Credentials, HttpReportService, IdentityClient, Location, NewReport, Registration,
    ReportChanges, ReportId, ReportService, ReportStatus, ReportType, ReportsAction,
    ReportsEnvironment, Role, ServiceError, Session, UserId,
};
use redflag_testing::test_clock;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> HttpReportService {
    HttpReportService::new(server.uri()).with_token("tok-123")
}

// ============================================================================
// Report Service
// ============================================================================

#[tokio::test]
async fn test_fetch_all_decodes_envelope_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reports"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reports": [
                {
                    "id": 7,
                    "type": "RED_FLAG",
                    "status": "UNDER_INVESTIGATION",
                    "title": "Bribery at checkpoint",
                    "description": "Officer demanded cash",
                    "location": { "latitude": "6.5244", "longitude": 3.3792 },
                    "incidentDate": "2024-10-01T00:00:00.000Z",
                    "reportDate": "2024-10-02",
                    "images": []
                },
                {
                    "id": "8",
                    "type": "INTERVENTION",
                    "status": "draft",
                    "title": "Collapsed bridge",
                    "description": "Footbridge over the canal",
                    "location": {},
                    "incidentDate": "2024-09-12"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reports = service(&server).fetch_all().await.unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].id, ReportId::new("7"));
    assert_eq!(reports[0].status, ReportStatus::UnderInvestigation);
    assert_eq!(reports[0].location, Some(Location::new(6.5244, 3.3792)));
    assert_eq!(reports[0].incident_date, NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
    assert_eq!(reports[1].report_type, ReportType::Intervention);
    assert_eq!(reports[1].status, ReportStatus::Draft);
    assert_eq!(reports[1].location, None);
    assert_eq!(reports[1].report_date, None);
}

#[tokio::test]
async fn test_fetch_for_user_uses_owner_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/report/u-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reports": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let reports = service(&server).fetch_for_user(&UserId::new("u-42")).await.unwrap();
    assert!(reports.is_empty());
}

#[tokio::test]
async fn test_create_expects_201_and_returns_assigned_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report"))
        .and(body_json(json!({
            "type": "RED_FLAG",
            "title": "Pothole",
            "description": "Main street",
            "incidentDate": "2024-12-01",
            "reportDate": "2025-01-01",
            "location": {},
            "userId": "alice"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "newReport": { "id": 31 } })))
        .expect(1)
        .mount(&server)
        .await;

    let request = NewReport {
        report_type: ReportType::RedFlag,
        title: "Pothole".to_string(),
        description: "Main street".to_string(),
        incident_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        report_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        location: None,
        user_id: UserId::new("alice"),
    };
    let created = service(&server).create(&request).await.unwrap();
    assert_eq!(created.id, ReportId::new("31"));
}

#[tokio::test]
async fn test_create_answered_with_200_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Duplicate report" })))
        .mount(&server)
        .await;

    let request = NewReport {
        report_type: ReportType::Intervention,
        title: "Flood".to_string(),
        description: "Ward 3".to_string(),
        incident_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        report_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        location: Some(Location::new(1.0, 2.0)),
        user_id: UserId::new("alice"),
    };
    let error = service(&server).create(&request).await.unwrap_err();
    assert_eq!(
        error,
        ServiceError::Rejected {
            status: 200,
            message: "Duplicate report".to_string(),
        }
    );
}

#[tokio::test]
async fn test_update_sends_only_changed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/report/5"))
        .and(body_json(json!({ "title": "Crater", "incidentDate": "2024-11-30" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let changes = ReportChanges::default()
        .with_title("Crater")
        .with_incident_date(NaiveDate::from_ymd_opt(2024, 11, 30).unwrap());
    service(&server).update(&ReportId::new("5"), &changes).await.unwrap();
}

#[tokio::test]
async fn test_set_status_puts_wire_status() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/report/5"))
        .and(body_json(json!({ "status": "RESOLVED" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    service(&server)
        .set_status(&ReportId::new("5"), ReportStatus::Resolved)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_report_id_cannot_change_the_route() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/report/5%2F..%2Freports%3Fall=1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    service(&server)
        .delete(&ReportId::new("5/../reports?all=1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_rejection_carries_error_field() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/report/5"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "error": "Report is resolved" })))
        .mount(&server)
        .await;

    let error = service(&server).delete(&ReportId::new("5")).await.unwrap_err();
    assert_eq!(error.server_message(), Some("Report is resolved"));
}

#[tokio::test]
async fn test_empty_error_body_falls_back_to_reason_phrase() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/report/5"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let error = service(&server).delete(&ReportId::new("5")).await.unwrap_err();
    assert_eq!(error.to_string(), "Internal Server Error");
}

#[tokio::test]
async fn test_unauthorized_keeps_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
        .mount(&server)
        .await;

    let error = service(&server).fetch_all().await.unwrap_err();
    assert_eq!(
        error,
        ServiceError::Unauthorized {
            message: "jwt expired".to_string(),
        }
    );
    assert_eq!(error.server_message(), Some("jwt expired"));
}

#[tokio::test]
async fn test_unauthorized_without_body_says_so() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/report/5"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let error = service(&server).delete(&ReportId::new("5")).await.unwrap_err();
    assert_eq!(error.to_string(), "Unauthorized");
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = service(&server).fetch_all().await.unwrap_err();
    assert!(matches!(error, ServiceError::Decode(_)));
}

#[tokio::test]
async fn test_expired_session_message_reaches_the_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/report/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reports": [{
                "id": 1,
                "type": "RED_FLAG",
                "status": "PENDING",
                "title": "Pothole",
                "description": "Main street",
                "incidentDate": "2024-12-01"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/report/1"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "message": "Session expired, please log in again" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new("tok-123", UserId::new("alice"), Role::Submitter);
    let env = ReportsEnvironment::new(Arc::new(service(&server)), Arc::new(test_clock()), session);
    let view = controller::mount_and_fetch(env, Duration::from_secs(5)).await.unwrap();

    let mut handle = view
        .send(ReportsAction::UpdateReport {
            id: ReportId::new("1"),
            changes: ReportChanges::default().with_title("Crater"),
        })
        .await
        .unwrap();
    handle.wait_with_timeout(Duration::from_secs(5)).await.unwrap();

    let message = view
        .state(|s| s.latest_notification().map(|n| n.message.clone()))
        .await;
    assert_eq!(message.as_deref(), Some("Session expired, please log in again"));
    let title = view
        .state(|s| s.reports.get(&ReportId::new("1")).map(|r| r.title.clone()))
        .await;
    assert_eq!(title.as_deref(), Some("Pothole"));
}

// ============================================================================
// Identity
// ============================================================================

#[tokio::test]
async fn test_login_issues_administrator_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt-abc",
            "user": { "userId": 3, "isAdmin": true }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = IdentityClient::new(server.uri())
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(session.token, "jwt-abc");
    assert_eq!(session.user_id, UserId::new("3"));
    assert_eq!(session.role, Role::Administrator);
}

#[tokio::test]
async fn test_login_without_admin_flag_is_submitter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt-def",
            "user": { "userId": "u-9" }
        })))
        .mount(&server)
        .await;

    let session = IdentityClient::new(server.uri())
        .login(&Credentials {
            email: "bo@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.role, Role::Submitter);
}

#[tokio::test]
async fn test_refused_login_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })))
        .mount(&server)
        .await;

    let error = IdentityClient::new(server.uri())
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "Invalid credentials");
}

#[tokio::test]
async fn test_registration_failure_falls_back_to_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter2"
        })))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let error = IdentityClient::new(server.uri())
        .register(&Registration {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        error,
        ServiceError::Rejected {
            status: 409,
            message: "Registration failed".to_string(),
        }
    );
}
