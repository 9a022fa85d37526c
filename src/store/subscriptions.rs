use chrono::NaiveDateTime;

use crate::api::SubscriptionApi;
use crate::error::{ConsoleError, Result};
use crate::pricing::{RenewalPreview, RenewalRequest};
use crate::subscription::{SubscriptionQuery, SubscriptionWithDetails};

use super::EntityStore;

pub type SubscriptionStore = EntityStore<SubscriptionWithDetails, dyn SubscriptionApi>;

impl SubscriptionStore {
    pub async fn active(&self) -> Vec<SubscriptionWithDetails> {
        self.filter(|s| !s.status.expired).await
    }

    pub async fn inactive(&self) -> Vec<SubscriptionWithDetails> {
        self.filter(|s| s.status.expired).await
    }

    pub async fn query(&self, query: &SubscriptionQuery) -> Vec<SubscriptionWithDetails> {
        self.filter(|s| query.matches(s)).await
    }

    /// Sum of the recorded prices of every cached subscription.
    pub async fn revenue(&self) -> f64 {
        self.read(|s| {
            s.entities
                .iter()
                .filter_map(|row| row.details.price)
                .sum::<f64>()
        })
        .await
    }

    /// Prices a renewal against the cached end date of `id` without calling
    /// the backend.
    pub async fn preview_renewal(
        &self,
        id: &str,
        request: &RenewalRequest,
        now: NaiveDateTime,
    ) -> Result<RenewalPreview> {
        let current = self
            .find(id)
            .await
            .ok_or_else(|| ConsoleError::Validation(format!("Unknown subscription {}", id)))?;
        RenewalPreview::compute(current.details.subscription_end_date, now, request)
    }

    /// Extends a subscription and swaps the renewed record into the list.
    /// The request is validated locally before anything is sent.
    pub async fn renew(
        &self,
        id: &str,
        request: &RenewalRequest,
    ) -> Result<SubscriptionWithDetails> {
        if let Err(e) = request.pricing_request().validate() {
            let result = Err(e);
            self.announce("renewed", &result);
            return result;
        }
        let result = self.replace_with(id, self.api().renew(id, request)).await;
        self.announce("renewed", &result);
        result
    }
}
