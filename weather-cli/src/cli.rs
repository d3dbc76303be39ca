use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{ArgGroup, Parser};
use weather_alert_core::{
    AccuWeatherProvider, CheckType, Config, ForecastProvider, LogNotifier, Notifier, Outcome,
    TwilioNotifier, run_check,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-alert",
    version,
    about = "Check the forecast and send a text when it matters"
)]
#[command(group(
    ArgGroup::new("check_type").required(true).args(["check", "hourly", "daily", "nightly"])
))]
pub struct Cli {
    /// Which check to run: hourly, daily or nightly.
    pub check: Option<CheckType>,

    /// Same as `hourly`, for existing crontab entries.
    #[arg(long)]
    pub hourly: bool,

    /// Same as `daily`.
    #[arg(long)]
    pub daily: bool,

    /// Same as `nightly`.
    #[arg(long)]
    pub nightly: bool,

    /// Look the location up by name instead of using the configured default.
    #[arg(long, value_name = "QUERY")]
    pub location: Option<String>,

    /// Settings file; defaults to settings.toml in the platform config directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Decide and log the message, but do not send it.
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The check selected by the positional argument or one of the `--<check>` flags.
    pub fn check_type(&self) -> Option<CheckType> {
        let flags = [
            (self.hourly, CheckType::Hourly),
            (self.daily, CheckType::Daily),
            (self.nightly, CheckType::Nightly),
        ];
        self.check.or_else(|| flags.iter().find(|(set, _)| *set).map(|(_, check)| *check))
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let check = self.check_type().ok_or_else(|| anyhow!("No check type given"))?;

        let Config { credentials, settings } = Config::load(self.config.as_deref(), !self.dry_run)
            .context("Failed to load configuration")?;

        let http = settings.http_client().context("Failed to build HTTP client")?;

        let provider = AccuWeatherProvider::new(credentials.weather_api_key, http.clone())
            .with_base_url(&settings.accuweather_base_url)
            .with_metric(settings.metric);

        let location = match &self.location {
            Some(query) => provider
                .search_location(query)
                .await
                .with_context(|| format!("Failed to resolve location '{query}'"))?,
            None => settings.default_location()?.clone(),
        };

        let notifier: Box<dyn Notifier> = if self.dry_run {
            Box::new(LogNotifier)
        } else {
            let twilio = credentials
                .twilio
                .ok_or_else(|| anyhow!("Twilio credentials are required unless --dry-run is set"))?;
            Box::new(TwilioNotifier::new(twilio, http).with_base_url(&settings.twilio_base_url))
        };

        let outcome = run_check(
            check,
            &location,
            &settings.thresholds,
            &provider,
            notifier.as_ref(),
        )
        .await?;

        match outcome {
            Outcome::Sent { message, receipt } => match receipt.created_at {
                Some(created) => println!("Sent: {created} ({message})"),
                None => println!("Sent: {} ({message})", receipt.status),
            },
            Outcome::Quiet => println!("No {check} notification for {}.", location.name),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_check_and_flags() {
        let cli = Cli::try_parse_from([
            "weather-alert",
            "nightly",
            "--dry-run",
            "--location",
            "Boulder",
        ])
        .unwrap();

        assert_eq!(cli.check_type(), Some(CheckType::Nightly));
        assert!(cli.dry_run);
        assert_eq!(cli.location.as_deref(), Some("Boulder"));
    }

    #[test]
    fn accepts_dashed_check_spelling() {
        let cli = Cli::try_parse_from(["weather-alert", "--hourly"]).unwrap();
        assert_eq!(cli.check_type(), Some(CheckType::Hourly));

        let cli = Cli::try_parse_from(["weather-alert", "--nightly", "--dry-run"]).unwrap();
        assert_eq!(cli.check_type(), Some(CheckType::Nightly));
        assert!(cli.dry_run);
    }

    #[test]
    fn rejects_two_checks() {
        let err = Cli::try_parse_from(["weather-alert", "hourly", "--nightly"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        let err = Cli::try_parse_from(["weather-alert", "--hourly", "--daily"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_unknown_check() {
        let err = Cli::try_parse_from(["weather-alert", "weekly"]).unwrap_err();
        assert!(err.to_string().contains("weekly"));
    }

    #[test]
    fn requires_a_check() {
        let err = Cli::try_parse_from(["weather-alert"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
