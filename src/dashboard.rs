use serde::Serialize;

use crate::pricing::round2;
use crate::store::{SubscriptionStore, UserStore};

/// Headline numbers for the overview page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_users: usize,
    pub online_users: usize,
    pub total_subscriptions: usize,
    pub active_subscriptions: usize,
    pub expired_subscriptions: usize,
    pub revenue: f64,
    /// Revenue per subscription, rounded to a whole amount.
    pub average_revenue: f64,
}

impl DashboardSummary {
    pub async fn from_stores(user_store: &UserStore, subscription_store: &SubscriptionStore) -> Self {
        let users = user_store.entities().await;
        let subscriptions = subscription_store.entities().await;
        let active = subscriptions.iter().filter(|s| s.is_active()).count();
        let revenue = subscription_store.revenue().await;

        Self {
            total_users: users.len(),
            online_users: users.iter().filter(|u| u.online).count(),
            total_subscriptions: subscriptions.len(),
            active_subscriptions: active,
            expired_subscriptions: subscriptions.len() - active,
            revenue: round2(revenue),
            average_revenue: (revenue / subscriptions.len().max(1) as f64).round(),
        }
    }
}
