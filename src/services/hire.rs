// src/services/hire.rs
use std::time::Duration;

use thiserror::Error;

use super::catalog::Catalog;

pub const HIRE_SENT_ALERT: &str = "تم إرسال طلب التوظيف بنجاح!";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HireError {
    #[error("no confirmer service with id {0}")]
    UnknownConfirmer(u32),
}

/// Simulated hire-request submission. Nothing is stored.
#[derive(Clone, Debug)]
pub struct HireDesk {
    delay: Duration,
}

impl HireDesk {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn submit(
        &self,
        catalog: &Catalog,
        confirmer_id: u32,
        message: &str,
    ) -> Result<&'static str, HireError> {
        let service = catalog
            .service_for(confirmer_id)
            .ok_or(HireError::UnknownConfirmer(confirmer_id))?;
        tracing::info!(confirmer_id, service = %service.title, len = message.len(), "submitting hire request");
        tokio::time::sleep(self.delay).await;
        Ok(HIRE_SENT_ALERT)
    }
}
