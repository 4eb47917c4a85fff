use std::sync::Arc;
use std::time::Duration;

use super::{FormationWorkflow, SweepAction};

/// Spawn the recurring sweep over submitted formation requests.
pub fn spawn_sweep_scheduler(workflow: Arc<FormationWorkflow>, interval_secs: u64) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            log::info!("Running formation request sweep");
            match workflow.sweep().await {
                Ok(outcomes) => {
                    let provisioned = outcomes
                        .iter()
                        .filter(|o| matches!(o.action, SweepAction::Provisioned { .. }))
                        .count();
                    let failed = outcomes
                        .iter()
                        .filter(|o| matches!(o.action, SweepAction::Failed { .. }))
                        .count();
                    if provisioned > 0 || failed > 0 {
                        log::info!(
                            "Sweep finished: {provisioned} of {} request(s) provisioned, {failed} failed",
                            outcomes.len()
                        );
                    }
                }
                Err(e) => log::error!("Sweep failed: {e}"),
            }
        }
    });
}
