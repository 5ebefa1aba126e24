use std::time::Duration;

use jobscan_core::{
    AuthRequirement, ClassifiedRecord, JobError, JobOutcome, JobRequest, JobStatus, StartReply,
    Verdict,
};
use jobscan_engine::{Backend, BackendSettings, FailureKind, ReqwestBackend};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    ReqwestBackend::new(&BackendSettings::new(server.uri())).expect("valid base url")
}

#[tokio::test]
async fn health_probe_accepts_any_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nice-health"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"health":"nice"}"#))
        .mount(&server)
        .await;

    backend_for(&server).probe_health().await.expect("online");
}

#[tokio::test]
async fn health_probe_fails_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nice-health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = backend_for(&server).probe_health().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert!(matches!(JobError::from(err), JobError::Network(_)));
}

#[tokio::test]
async fn start_sends_email_and_limit_and_decodes_auth_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/emails/latest"))
        .and(query_param("user_email", "me+jobs@example.com"))
        .and(query_param("limit", "200"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"auth_url": "https://accounts.example/oauth"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = JobRequest::new(" me+jobs@example.com ", 200).unwrap();
    let reply = backend_for(&server).start_job(&request).await.unwrap();
    assert_eq!(
        reply,
        StartReply::AuthRequired(AuthRequirement {
            authorization_url: "https://accounts.example/oauth".to_string()
        })
    );
}

#[tokio::test]
async fn status_decodes_done_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/emails/status"))
        .and(query_param("user_email", "me@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"status": "done", "job_emails": [
                {"company_name": "Initech", "date": "Tue, 2 Apr 2024", "verdict": "interview_scheduled"}
            ]}"#,
        ))
        .mount(&server)
        .await;

    let status = backend_for(&server).job_status("me@example.com").await.unwrap();
    assert_eq!(
        status,
        JobStatus::Done(JobOutcome::Records(vec![ClassifiedRecord::new(
            "Initech",
            "Tue, 2 Apr 2024",
            Verdict::InterviewScheduled
        )]))
    );
}

#[tokio::test]
async fn unrecognized_body_is_a_protocol_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/emails/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Service waking up"))
        .mount(&server)
        .await;

    let err = backend_for(&server).job_status("me@example.com").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
    assert!(matches!(JobError::from(err), JobError::Protocol(_)));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/emails/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string(r#"{"status": "processing"}"#),
        )
        .mount(&server)
        .await;

    let settings = BackendSettings {
        request_timeout: Duration::from_millis(50),
        ..BackendSettings::new(server.uri())
    };
    let backend = ReqwestBackend::new(&settings).unwrap();

    let err = backend.job_status("me@example.com").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nice-health"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let backend =
        ReqwestBackend::new(&BackendSettings::new(format!("{}/api", server.uri()))).unwrap();
    backend.probe_health().await.expect("prefixed health path");
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestBackend::new(&BackendSettings::new("not a url")).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
