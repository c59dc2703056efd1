mod inmemory;
mod postgres;

use creneau_domain::{Campaign, ID};
pub use inmemory::InMemoryCampaignRepo;
pub use postgres::PostgresCampaignRepo;

#[async_trait::async_trait]
pub trait ICampaignRepo: Send + Sync {
    async fn insert(&self, campaign: &Campaign) -> anyhow::Result<()>;
    async fn save(&self, campaign: &Campaign) -> anyhow::Result<()>;
    async fn find(&self, campaign_id: &ID) -> Option<Campaign>;
}

#[cfg(test)]
mod tests {
    use crate::CreneauContext;
    use chrono::NaiveDate;
    use creneau_domain::Campaign;

    #[tokio::test]
    async fn archived_flag_is_persisted() {
        let ctx = CreneauContext::create_inmemory();
        let mut campaign = Campaign::new(
            "Migration postes",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        );
        ctx.repos.campaigns.insert(&campaign).await.unwrap();
        assert!(!ctx.repos.campaigns.find(&campaign.id).await.unwrap().archived);

        campaign.archived = true;
        ctx.repos.campaigns.save(&campaign).await.unwrap();
        let found = ctx.repos.campaigns.find(&campaign.id).await.unwrap();
        assert!(found.is_read_only());
    }
}
