use crate::cli::ServeArgs;
use crate::infra::{AppState, ConsoleMailer, InMemoryInquiryRepository};
use crate::routes::operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use brightwave::auth::{admin_router, AdminGate};
use brightwave::config::AppConfig;
use brightwave::error::AppError;
use brightwave::intake::{
    contact_router, ContactIntakeService, ContactMailer, RatePolicy, SmtpMailer, SubmissionPolicy,
};
use brightwave::telemetry;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    // Submissions are refused at the recipient check until the mail
    // configuration is complete, and readiness stays false.
    let mail_ready = config.mail.is_complete();
    if mail_ready {
        let mailer = SmtpMailer::from_config(&config.mail)?;
        serve(config, Arc::new(mailer), true).await
    } else {
        warn!("mail configuration incomplete; contact submissions will be rejected");
        serve(config, Arc::new(ConsoleMailer), false).await
    }
}

async fn serve<M>(config: AppConfig, mailer: Arc<M>, mail_ready: bool) -> Result<(), AppError>
where
    M: ContactMailer + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryInquiryRepository::default());
    let intake_service = Arc::new(ContactIntakeService::new(
        RatePolicy::new(
            config.admission.contact_rate_limit,
            config.admission.rate_window,
        ),
        SubmissionPolicy {
            max_body_bytes: config.admission.max_body_bytes,
            require_phone: config.admission.require_phone,
        },
        mail_ready,
        mailer,
        Arc::clone(&repository),
    ));

    let gate = Arc::new(AdminGate::new(config.admin.clone()));

    let app = contact_router(Arc::clone(&intake_service))
        .merge(admin_router(gate, repository))
        .merge(operational_routes())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(mail_ready, Ordering::Release);

    info!(?config.environment, %addr, mail_ready, "contact intake service ready");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
