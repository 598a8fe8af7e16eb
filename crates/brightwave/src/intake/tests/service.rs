use super::common::*;
use crate::intake::service::AdmissionError;

#[tokio::test]
async fn accepts_valid_submission_and_notifies_both_legs() {
    let (service, mailer, repository) = build_service(RecordingMailer::default(), true);

    let ack = service
        .submit("203.0.113.9", Some(200), payload())
        .await
        .expect("submission accepted");

    assert!(ack.success);
    assert_eq!(repository.stored().len(), 1);
    assert_eq!(mailer.staff_deliveries().len(), 1);
    assert_eq!(mailer.confirmation_deliveries().len(), 1);
    assert_eq!(mailer.staff_deliveries()[0].name, "Adaeze Obi");
}

#[tokio::test]
async fn enforces_submission_rate_per_client() {
    let (service, _, _) = build_service(RecordingMailer::default(), true);

    let mut accepted = 0;
    let mut limited = 0;
    for _ in 0..5 {
        match service.submit("203.0.113.9", Some(200), payload()).await {
            Ok(_) => accepted += 1,
            Err(AdmissionError::RateLimited) => limited += 1,
            Err(other) => panic!("unexpected rejection: {other:?}"),
        }
    }

    assert_eq!(accepted, 3);
    assert_eq!(limited, 2);

    // A different address is unaffected.
    assert!(service.submit("198.51.100.7", Some(200), payload()).await.is_ok());
}

#[tokio::test]
async fn rejects_oversized_declared_length_before_validation() {
    let (service, mailer, repository) = build_service(RecordingMailer::default(), true);

    // Content is invalid too, but the size check must fire first.
    let err = service
        .submit(
            "203.0.113.9",
            Some(2000),
            crate::intake::domain::ContactPayload::default(),
        )
        .await
        .expect_err("oversized payload rejected");

    assert!(matches!(err, AdmissionError::PayloadTooLarge { limit: 1024 }));
    assert!(repository.stored().is_empty());
    assert!(mailer.staff_deliveries().is_empty());
}

#[tokio::test]
async fn raw_body_size_check_does_not_depend_on_parseable_json() {
    let (service, mailer, repository) = build_service(RecordingMailer::default(), true);

    let err = service
        .submit_raw("203.0.113.9", Some(2000), b"not json at all")
        .await
        .expect_err("oversized declared length rejected");

    assert!(matches!(err, AdmissionError::PayloadTooLarge { limit: 1024 }));
    assert!(repository.stored().is_empty());
    assert!(mailer.staff_deliveries().is_empty());
}

#[tokio::test]
async fn raw_body_larger_than_declared_is_judged_by_actual_size() {
    let (service, _, _) = build_service(RecordingMailer::default(), true);

    let body = vec![b'x'; 2000];
    let err = service
        .submit_raw("203.0.113.9", Some(10), &body)
        .await
        .expect_err("oversized body rejected");
    assert!(matches!(err, AdmissionError::PayloadTooLarge { limit: 1024 }));
}

#[tokio::test]
async fn malformed_raw_bodies_are_rejected_and_still_rate_limited() {
    let (service, _, _) = build_service(RecordingMailer::default(), true);

    let mut malformed = 0;
    let mut limited = 0;
    for _ in 0..5 {
        match service.submit_raw("203.0.113.9", Some(15), b"not json at all").await {
            Err(AdmissionError::MalformedBody) => malformed += 1,
            Err(AdmissionError::RateLimited) => limited += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    // Malformed bodies burn rate-limit slots like any other request.
    assert_eq!(malformed, 3);
    assert_eq!(limited, 2);
}

#[tokio::test]
async fn rejects_when_no_recipients_configured() {
    let (service, mailer, repository) = build_service(RecordingMailer::default(), false);

    let err = service
        .submit("203.0.113.9", Some(200), payload())
        .await
        .expect_err("misconfigured service rejects");

    assert!(matches!(err, AdmissionError::ServerMisconfigured));
    assert_eq!(err.status().as_u16(), 500);
    assert!(repository.stored().is_empty());
    assert!(mailer.staff_deliveries().is_empty());
}

#[tokio::test]
async fn staff_notification_failure_surfaces_as_generic_server_error() {
    let mailer = RecordingMailer {
        fail_staff: true,
        ..RecordingMailer::default()
    };
    let (service, _, repository) = build_service(mailer, true);

    let err = service
        .submit("203.0.113.9", Some(200), payload())
        .await
        .expect_err("notification failure rejects");

    assert!(matches!(err, AdmissionError::Notification(_)));
    assert_eq!(err.status().as_u16(), 500);
    // The SMTP error text must not leak into the client-facing message.
    assert!(!err.client_message().contains("550"));
    // Record was persisted before the notification attempt.
    assert_eq!(repository.stored().len(), 1);
}

#[tokio::test]
async fn confirmation_failure_is_swallowed() {
    let mailer = RecordingMailer {
        fail_confirmation: true,
        ..RecordingMailer::default()
    };
    let (service, mailer, repository) = build_service(mailer, true);

    let ack = service
        .submit("203.0.113.9", Some(200), payload())
        .await
        .expect("submission still accepted");

    assert!(ack.success);
    assert_eq!(repository.stored().len(), 1);
    assert_eq!(mailer.staff_deliveries().len(), 1);
    assert!(mailer.confirmation_deliveries().is_empty());
}

#[tokio::test]
async fn validation_failures_map_to_client_errors() {
    let (service, _, _) = build_service(RecordingMailer::default(), true);

    let mut bad_email = payload();
    bad_email.email = Some("not-an-email".to_string());
    let err = service
        .submit("a", Some(200), bad_email)
        .await
        .expect_err("bad email rejected");
    assert!(matches!(err, AdmissionError::InvalidEmail));
    assert_eq!(err.status().as_u16(), 400);

    let mut bad_phone = payload();
    bad_phone.phone = Some("123".to_string());
    let err = service
        .submit("b", Some(200), bad_phone)
        .await
        .expect_err("bad phone rejected");
    assert!(matches!(err, AdmissionError::InvalidPhone));

    let mut missing = payload();
    missing.message = None;
    let err = service
        .submit("c", Some(200), missing)
        .await
        .expect_err("missing message rejected");
    match err {
        AdmissionError::MissingFields(fields) => assert_eq!(fields, vec!["message"]),
        other => panic!("expected MissingFields, got {other:?}"),
    }
}
