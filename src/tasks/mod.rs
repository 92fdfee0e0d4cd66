//! Background scheduled tasks for the application.
//!
//! Currently a single job: the periodic investment accrual.
//! Call `spawn_all` once during startup to launch it.

use crate::services::InvestmentService;
use std::time::Duration;

/// Spawn all background tasks.
///
/// The accrual is idempotent for a given instant, so the interval only
/// bounds how stale `days_completed` may get between requests.
pub fn spawn_all(investment_service: InvestmentService, accrual_interval_secs: u64) {
    let interval = Duration::from_secs(accrual_interval_secs.max(1));

    // 投资收益结算
    tokio::spawn(async move {
        loop {
            match investment_service.update_investments().await {
                Ok(n) if n > 0 => log::info!("Investments accrued: {n}"),
                Ok(_) => log::debug!("Accrual run found nothing to update"),
                Err(e) => log::error!("Failed to accrue investments: {e:?}"),
            }
            tokio::time::sleep(interval).await;
        }
    });
}
