use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::pricing::{PricingRequest, SubscriptionPlan, TimeUnit};
use crate::store::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionState {
    Active,
    Expired,
}

/// A subscription record as stored by the backend. Everything except the id
/// may be missing from a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDetails {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub adresse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub subscription_type: Option<SubscriptionPlan>,
    #[serde(default)]
    pub channel_count: Option<u32>,
    #[serde(default)]
    pub subscription_start_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub subscription_end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: Option<SubscriptionState>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub remaining_hours: Option<i64>,
    #[serde(default)]
    pub remaining_days: Option<i64>,
}

/// Time left on a subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    #[serde(default)]
    pub remaining_days: i64,
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub expired: bool,
}

impl SubscriptionStatus {
    /// Same figures the backend reports: whole days left, percentage of the
    /// period still remaining, expired once no whole day is left.
    pub fn derive(start: NaiveDateTime, end: NaiveDateTime, now: NaiveDateTime) -> Self {
        let total_days = (end - start).num_days();
        let remaining_days = (end - now).num_days();
        let elapsed_days = (now - start).num_days();

        let elapsed_pct = if total_days > 0 {
            elapsed_days.clamp(0, total_days) as f64 / total_days as f64 * 100.0
        } else {
            100.0
        };

        Self {
            remaining_days,
            progress_percentage: 100.0 - elapsed_pct,
            expired: remaining_days <= 0,
        }
    }
}

/// Row of the subscriptions list: the record plus its computed status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionWithDetails {
    #[serde(default)]
    pub status: SubscriptionStatus,
    pub details: SubscriptionDetails,
}

impl SubscriptionWithDetails {
    /// Wraps a bare record returned by add/edit/renew so it can sit in the
    /// same list as the rows from `getAll/withDetails`.
    pub fn from_details(details: SubscriptionDetails, now: NaiveDateTime) -> Self {
        let status = match (details.subscription_start_date, details.subscription_end_date) {
            (Some(start), Some(end)) => SubscriptionStatus::derive(start, end, now),
            _ => SubscriptionStatus {
                remaining_days: details.remaining_days.unwrap_or(0),
                progress_percentage: 0.0,
                expired: details.status == Some(SubscriptionState::Expired),
            },
        };
        Self { status, details }
    }

    pub fn is_active(&self) -> bool {
        !self.status.expired
    }
}

impl Entity for SubscriptionWithDetails {
    type Draft = AddSubscription;
    type Changes = EditSubscription;
    const KIND: &'static str = "subscription";

    fn id(&self) -> &str {
        &self.details.id
    }
}

/// Body of `POST /subscriptions/add`. `code` is sent in clear and hashed by
/// the backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSubscription {
    pub fullname: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adresse: Option<String>,
    pub code: String,
    pub subscription_type: SubscriptionPlan,
    pub duration: u32,
    pub time_unit: TimeUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_count: Option<u32>,
}

impl AddSubscription {
    pub fn pricing_request(&self) -> PricingRequest {
        PricingRequest {
            plan: self.subscription_type,
            duration: self.duration,
            unit: self.time_unit,
            requested_channel_count: self.channel_count,
        }
    }
}

/// Body of `PUT /subscriptions/edit/{id}`. Plan and dates change only through renewal.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSubscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adresse: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MenuFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl MenuFilter {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => MenuFilter::Active,
            "inactive" => MenuFilter::Inactive,
            _ => MenuFilter::All,
        }
    }
}

/// Filter for the subscriptions table.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionQuery {
    pub menu: MenuFilter,
    pub search: Option<String>,
}

impl SubscriptionQuery {
    pub fn matches(&self, row: &SubscriptionWithDetails) -> bool {
        let menu_ok = match self.menu {
            MenuFilter::All => true,
            MenuFilter::Active => !row.status.expired,
            MenuFilter::Inactive => row.status.expired,
        };
        if !menu_ok {
            return false;
        }

        let term = match self.search.as_deref().map(str::trim) {
            None | Some("") => return true,
            Some(term) => term.to_lowercase(),
        };
        let d = &row.details;
        [d.fullname.as_deref(), d.email.as_deref(), d.tel.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
            || d.id.to_lowercase().contains(&term)
    }
}
