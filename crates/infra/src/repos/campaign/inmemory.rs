use super::ICampaignRepo;
use crate::repos::shared::inmemory_repo::*;
use creneau_domain::{Campaign, ID};
use std::sync::Mutex;

pub struct InMemoryCampaignRepo {
    campaigns: Mutex<Vec<Campaign>>,
}

impl InMemoryCampaignRepo {
    pub fn new() -> Self {
        Self {
            campaigns: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ICampaignRepo for InMemoryCampaignRepo {
    async fn insert(&self, campaign: &Campaign) -> anyhow::Result<()> {
        insert(campaign, &self.campaigns);
        Ok(())
    }

    async fn save(&self, campaign: &Campaign) -> anyhow::Result<()> {
        save(campaign, &self.campaigns);
        Ok(())
    }

    async fn find(&self, campaign_id: &ID) -> Option<Campaign> {
        find(campaign_id, &self.campaigns)
    }
}
