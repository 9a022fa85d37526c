use async_trait::async_trait;
use chrono::Local;
use reqwest::Method;

use super::{ApiClient, EntityApi, SubscriptionApi};
use crate::error::Result;
use crate::pricing::RenewalRequest;
use crate::subscription::{
    AddSubscription, EditSubscription, SubscriptionDetails, SubscriptionWithDetails,
};

// add/edit/renew answer with the bare record; the list endpoint already
// includes the computed status.
fn with_status(details: SubscriptionDetails) -> SubscriptionWithDetails {
    SubscriptionWithDetails::from_details(details, Local::now().naive_local())
}

#[async_trait]
impl EntityApi<SubscriptionWithDetails> for ApiClient {
    async fn list(&self) -> Result<Vec<SubscriptionWithDetails>> {
        self.get_json("/subscriptions/getAll/withDetails").await
    }

    async fn add(&self, draft: &AddSubscription) -> Result<SubscriptionWithDetails> {
        let details: SubscriptionDetails = self
            .send_json(Method::POST, "/subscriptions/add", draft)
            .await?;
        Ok(with_status(details))
    }

    async fn update(
        &self,
        id: &str,
        changes: &EditSubscription,
    ) -> Result<SubscriptionWithDetails> {
        let details: SubscriptionDetails = self
            .send_json(Method::PUT, &format!("/subscriptions/edit/{}", id), changes)
            .await?;
        Ok(with_status(details))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/subscriptions/delete/{}", id))
            .await
    }
}

#[async_trait]
impl SubscriptionApi for ApiClient {
    async fn renew(&self, id: &str, request: &RenewalRequest) -> Result<SubscriptionWithDetails> {
        let details: SubscriptionDetails = self
            .send_json(Method::PUT, &format!("/subscriptions/renew/{}", id), request)
            .await?;
        tracing::info!(id, plan = ?details.subscription_type, "subscription renewed");
        Ok(with_status(details))
    }
}
