//! Payout statistics and the bank-transfer worksheet export.
//!
//! Aggregations run over paid applications joined with their campaign's
//! payout amount. The ledger carries no separate paid-at column, so rows key
//! on the application date, as the admin dashboard always has.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;

use super::domain::{Application, ApplicationStatus};
use super::repository::{
    ApplicationRepository, CampaignRepository, PageRequest, ProfileRepository, QueueOrder,
    RepositoryError,
};

pub struct PayoutDesk<P, C, A> {
    profiles: Arc<P>,
    campaigns: Arc<C>,
    applications: Arc<A>,
}

/// One aggregated stats row; the label is a month, a year, or a brand
/// depending on the requested breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutStatRow {
    pub label: String,
    pub total_amount: u64,
    pub count: u64,
}

/// Aggregated payout stats with grand totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutStats {
    pub rows: Vec<PayoutStatRow>,
    pub total_amount: u64,
    pub total_count: u64,
}

struct PaidItem {
    brand_name: String,
    year: i32,
    month: u32,
    amount: u64,
}

impl<P, C, A> PayoutDesk<P, C, A>
where
    P: ProfileRepository + 'static,
    C: CampaignRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(profiles: Arc<P>, campaigns: Arc<C>, applications: Arc<A>) -> Self {
        Self {
            profiles,
            campaigns,
            applications,
        }
    }

    /// Twelve rows for `year`, one per month, zero-filled.
    pub fn monthly(&self, year: i32) -> Result<PayoutStats, PayoutError> {
        let items: Vec<PaidItem> = self
            .paid_items()?
            .into_iter()
            .filter(|item| item.year == year)
            .collect();

        let mut by_month: BTreeMap<u32, (u64, u64)> = BTreeMap::new();
        for item in &items {
            let entry = by_month.entry(item.month).or_insert((0, 0));
            entry.0 += item.amount;
            entry.1 += 1;
        }

        let rows = (1..=12)
            .map(|month| {
                let (total_amount, count) = by_month.get(&month).copied().unwrap_or((0, 0));
                PayoutStatRow {
                    label: format!("{year}-{month:02}"),
                    total_amount,
                    count,
                }
            })
            .collect();

        Ok(totalled(rows))
    }

    /// One row per calendar year with any payouts, ascending.
    pub fn yearly(&self) -> Result<PayoutStats, PayoutError> {
        let mut by_year: BTreeMap<i32, (u64, u64)> = BTreeMap::new();
        for item in self.paid_items()? {
            let entry = by_year.entry(item.year).or_insert((0, 0));
            entry.0 += item.amount;
            entry.1 += 1;
        }

        let rows = by_year
            .into_iter()
            .map(|(year, (total_amount, count))| PayoutStatRow {
                label: year.to_string(),
                total_amount,
                count,
            })
            .collect();

        Ok(totalled(rows))
    }

    /// One row per brand, largest spend first.
    pub fn by_brand(&self) -> Result<PayoutStats, PayoutError> {
        let mut by_brand: BTreeMap<String, (u64, u64)> = BTreeMap::new();
        for item in self.paid_items()? {
            let entry = by_brand.entry(item.brand_name).or_insert((0, 0));
            entry.0 += item.amount;
            entry.1 += 1;
        }

        let mut rows: Vec<PayoutStatRow> = by_brand
            .into_iter()
            .map(|(brand, (total_amount, count))| PayoutStatRow {
                label: brand,
                total_amount,
                count,
            })
            .collect();
        rows.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));

        Ok(totalled(rows))
    }

    /// The confirmed-payout queue as a CSV worksheet for the bank transfer
    /// run, oldest first.
    pub fn export_queue_csv(&self) -> Result<String, PayoutError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "brand",
                "mission",
                "kol",
                "beneficiary",
                "address",
                "phone",
                "bank",
                "swift",
                "bank_address",
                "account",
                "iban",
                "amount_twd",
                "result_url",
            ])
            .map_err(export_error)?;

        let mut page = PageRequest::new(1, PageRequest::MAX_PER_PAGE);
        loop {
            let batch = self.applications.by_status(
                ApplicationStatus::Confirmed,
                QueueOrder::OldestFirst,
                page,
            )?;
            let batch_len = batch.items.len();
            self.write_queue_rows(&mut writer, &batch.items)?;
            if batch_len < page.per_page {
                break;
            }
            page = PageRequest::new(page.page + 1, page.per_page);
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| PayoutError::Export(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| PayoutError::Export(err.to_string()))
    }

    fn write_queue_rows(
        &self,
        writer: &mut csv::Writer<Vec<u8>>,
        applications: &[Application],
    ) -> Result<(), PayoutError> {
        for application in applications {
            let campaign = self.campaigns.fetch(&application.campaign_id)?;
            let profile = self.profiles.fetch(&application.kol_id)?;
            let (brand, title, amount) = match &campaign {
                Some(campaign) => (
                    campaign.brand_name.clone(),
                    campaign.title.clone(),
                    campaign.payout_amount,
                ),
                None => (String::new(), String::new(), 0),
            };
            let (kol_name, bank) = match &profile {
                Some(profile) => (
                    profile.full_name.clone().unwrap_or_default(),
                    profile.bank_info.clone(),
                ),
                None => (String::new(), Default::default()),
            };
            writer
                .write_record([
                    brand.as_str(),
                    title.as_str(),
                    kol_name.as_str(),
                    bank.beneficiary_name.as_str(),
                    bank.address_english.as_str(),
                    bank.phone_number.as_str(),
                    bank.bank_name.as_str(),
                    bank.swift_code.as_str(),
                    bank.bank_address.as_str(),
                    bank.account_number.as_str(),
                    bank.iban.as_deref().unwrap_or(""),
                    amount.to_string().as_str(),
                    application.result_url.as_deref().unwrap_or(""),
                ])
                .map_err(export_error)?;
        }
        Ok(())
    }

    fn paid_items(&self) -> Result<Vec<PaidItem>, PayoutError> {
        let paid = self.applications.with_status(ApplicationStatus::Paid)?;
        let mut items = Vec::with_capacity(paid.len());
        for application in paid {
            let Some(campaign) = self.campaigns.fetch(&application.campaign_id)? else {
                tracing::warn!(
                    application = %application.id.0,
                    "paid application references a missing campaign"
                );
                continue;
            };
            items.push(paid_item(&application, campaign.brand_name, campaign.payout_amount));
        }
        Ok(items)
    }
}

fn paid_item(application: &Application, brand_name: String, amount: u64) -> PaidItem {
    let date = application.applied_at.date_naive();
    PaidItem {
        brand_name,
        year: date.year(),
        month: date.month(),
        amount,
    }
}

fn totalled(rows: Vec<PayoutStatRow>) -> PayoutStats {
    let total_amount = rows.iter().map(|row| row.total_amount).sum();
    let total_count = rows.iter().map(|row| row.count).sum();
    PayoutStats {
        rows,
        total_amount,
        total_count,
    }
}

fn export_error(err: csv::Error) -> PayoutError {
    PayoutError::Export(err.to_string())
}

/// Error raised by the payout desk.
#[derive(Debug, thiserror::Error)]
pub enum PayoutError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("csv export failed: {0}")]
    Export(String),
}
