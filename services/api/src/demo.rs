use crate::infra::{ConsoleMailer, InMemoryInquiryRepository};
use brightwave::error::AppError;
use brightwave::intake::{
    AdmissionError, ContactIntakeService, ContactPayload, InquiryRepository, RatePolicy,
    SubmissionPolicy,
};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Rate limit applied during the demo run
    #[arg(long, default_value_t = 3)]
    pub(crate) limit: u32,
    /// Also replay the valid submission until the limiter rejects it
    #[arg(long)]
    pub(crate) show_rate_limit: bool,
}

fn sample_submissions() -> Vec<(&'static str, ContactPayload)> {
    let valid = ContactPayload {
        name: Some("Adaeze Obi".to_string()),
        email: Some("adaeze@example.com".to_string()),
        phone: Some("+2348012345678".to_string()),
        message: Some("Do you have rooms free in October?".to_string()),
        subject: None,
        form_origin: Some("hostel-detail".to_string()),
    };

    let missing_message = ContactPayload {
        message: None,
        ..valid.clone()
    };

    let bad_email = ContactPayload {
        email: Some("not-an-email".to_string()),
        ..valid.clone()
    };

    let bad_phone = ContactPayload {
        phone: Some("123".to_string()),
        ..valid.clone()
    };

    vec![
        ("valid submission", valid),
        ("missing message", missing_message),
        ("malformed email", bad_email),
        ("malformed phone", bad_phone),
    ]
}

/// Walk sample payloads through the full admission pipeline with console
/// collaborators, printing each verdict.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryInquiryRepository::default());
    let service = ContactIntakeService::new(
        RatePolicy::new(args.limit, Duration::from_secs(60)),
        SubmissionPolicy::default(),
        true,
        Arc::new(ConsoleMailer),
        Arc::clone(&repository),
    );

    println!("== BrightWave contact intake demo ==");
    for (label, payload) in sample_submissions() {
        match service.submit("demo-client", Some(256), payload).await {
            Ok(ack) => println!("[{label}] accepted: {}", ack.message),
            Err(err) => println!(
                "[{label}] rejected ({}): {}",
                err.status(),
                err.client_message()
            ),
        }
    }

    if args.show_rate_limit {
        println!("-- replaying until the limiter rejects --");
        let (_, valid) = sample_submissions().remove(0);
        loop {
            match service.submit("demo-client", Some(256), valid.clone()).await {
                Ok(_) => println!("accepted"),
                Err(AdmissionError::RateLimited) => {
                    println!("rate limited after {} stored inquiries", stored(&repository));
                    break;
                }
                Err(err) => {
                    println!("rejected: {}", err.client_message());
                    break;
                }
            }
        }
    }

    println!("stored inquiries: {}", stored(&repository));
    Ok(())
}

fn stored(repository: &InMemoryInquiryRepository) -> usize {
    repository.list().map(|records| records.len()).unwrap_or(0)
}
