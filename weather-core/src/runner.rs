//! One pass of a scheduled check: fetch, decide, maybe send.

use tracing::{debug, info};

use crate::{
    check::{CheckType, Thresholds, decide},
    error::AlertError,
    model::{Location, SentMessage},
    notifier::Notifier,
    provider::ForecastProvider,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sent { message: String, receipt: SentMessage },
    Quiet,
}

/// Run `check` for `location` once.
///
/// The notifier is called at most once, and never when the fetch fails or
/// the decision is quiet.
pub async fn run_check<P, N>(
    check: CheckType,
    location: &Location,
    thresholds: &Thresholds,
    provider: &P,
    notifier: &N,
) -> Result<Outcome, AlertError>
where
    P: ForecastProvider + ?Sized,
    N: Notifier + ?Sized,
{
    info!(%check, location = %location.name, "checking forecast");

    let forecast = provider.forecast(location, check.window()).await.map_err(AlertError::Fetch)?;

    let decision = decide(check, location, &forecast, thresholds);
    if !decision.notify {
        debug!(%check, "nothing to report");
        return Ok(Outcome::Quiet);
    }

    let receipt = notifier.send(&decision.message).await.map_err(AlertError::Dispatch)?;
    info!(sid = %receipt.sid, status = %receipt.status, "notification sent");

    Ok(Outcome::Sent { message: decision.message, receipt })
}
