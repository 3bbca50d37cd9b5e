use anyhow::Result;
use chrono::Utc;
use sea_orm::Database;
use tracing::{debug, error, info, warn};

pub async fn run_automation(database_url: &str) -> Result<()> {
    info!("Running automation tasks");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url).await?;
    let today = Utc::now().date_naive();

    let summary = match compute::automation::run_automation(&db, "cli", today).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Automation run failed: {}", e);
            return Err(e.into());
        }
    };

    for outcome in &summary.outcomes {
        if outcome.success {
            info!("{}: {}", outcome.task, outcome.detail);
        } else {
            warn!("{} FAILED: {}", outcome.task, outcome.detail);
        }
    }

    let failed = summary.outcomes.iter().filter(|o| !o.success).count();
    if failed > 0 {
        anyhow::bail!("{failed} automation task(s) failed, see run {}", summary.run_id);
    }

    info!("Automation run {} completed", summary.run_id);
    Ok(())
}
