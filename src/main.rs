use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use medremind::{
    appsettings::AppSettings,
    delivery::{self, HttpEmailSender, TwilioCallSender},
    pipeline::{PipelineConfig, ReminderPipeline},
    scheduling::{IntervalTrigger, ZonedClock},
    storage::SqlitePrescriptionStore,
};

#[derive(Parser, Debug)]
#[command(about = "Medicine reminder scheduler")]
struct Args {
    /// Send a single test email to this address and exit.
    #[arg(long)]
    test_email: Option<String>,

    /// Place a single test call to this number and exit.
    #[arg(long)]
    test_call: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let args = Args::parse();
    let settings = AppSettings::new()?;
    settings.scheduler.validate()?;

    let email_sender = Arc::new(HttpEmailSender::new(settings.email.clone())?);
    let call_sender = Arc::new(TwilioCallSender::new(settings.twilio.clone())?);

    if args.test_email.is_some() || args.test_call.is_some() {
        if let Some(address) = &args.test_email {
            delivery::send_test_email(email_sender.as_ref(), address).await?;
        }
        if let Some(phone) = &args.test_call {
            delivery::place_test_call(call_sender.as_ref(), phone).await?;
        }
        return Ok(());
    }

    let store = SqlitePrescriptionStore::connect(&settings.database.url).await?;
    store.ensure_schema().await?;

    let cadence = settings.scheduler.cadence();
    let pipeline = ReminderPipeline::start(
        PipelineConfig {
            cadence,
            heartbeat: settings.scheduler.heartbeat(),
        },
        Arc::new(store),
        email_sender,
        call_sender,
        Arc::new(ZonedClock::new(settings.scheduler.timezone()?)),
        IntervalTrigger::aligned(cadence, Utc::now()),
    )?;

    tokio::signal::ctrl_c().await?;
    log::info!(
        "Shutting down, {} reminders were not delivered",
        pipeline.queue_depth()
    );
    pipeline.shutdown().await;

    Ok(())
}
