//! Basketball quarter-streak scanner.
//!
//! Runs once per invocation (cron schedules it):
//! - discovers the configured leagues on API-Basketball
//! - pulls each team's most recent games within a daily request budget
//! - ranks teams by active "1st quarter < 2nd quarter" streak
//! - sends the top-N report to Telegram

use tracing::{error, info, warn};

use quarter_streak_scanner::api::client::BasketballClient;
use quarter_streak_scanner::config::Settings;
use quarter_streak_scanner::notify::telegram::TelegramNotifier;
use quarter_streak_scanner::scanner::{RunOutcome, Scanner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load configuration.
    let settings = Settings::from_env();

    // Initialize logging.
    init_logging(&settings);

    info!("=== Quarter Streak Scanner ===");
    info!(
        base_url = %settings.api_base_url,
        targets = ?settings.scan_targets,
        window = settings.games_window,
        top_n = settings.top_n,
        daily_request_limit = settings.api_daily_request_limit,
        "Configuration loaded"
    );

    // Validate settings.
    if let Err(errors) = settings.validate() {
        for e in &errors {
            error!(error = %e, "Configuration error");
        }
        anyhow::bail!("Configuration validation failed");
    }

    let client = BasketballClient::new(settings.client_config())?;
    let notifier = TelegramNotifier::new(settings.telegram_config())?;

    let scanner = Scanner::new(&client, &notifier, settings.scan_options());
    let outcome = scanner.run().await;

    info!(
        requests_used = client.budget().used(),
        request_limit = client.budget().limit(),
        "Request budget"
    );

    match outcome {
        Ok(RunOutcome::Reported {
            teams_scanned,
            ranked,
        }) => {
            info!(teams_scanned, ranked, "Run complete, report sent");
            Ok(())
        }
        Ok(RunOutcome::QuotaExhausted {
            used,
            limit,
            teams_scanned,
        }) => {
            warn!(used, limit, teams_scanned, "Run stopped at request ceiling");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run aborted, no report sent");
            Err(e.into())
        }
    }
}

fn init_logging(settings: &Settings) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    if settings.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}
