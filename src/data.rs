use crate::cheapshark::{self, DealQuery};
use crate::fetch::FetchError;
use crate::gamerpower::{self, Platform};
use crate::model::{Article, Deal, Giveaway, StoreInfo, StoreMap};
use crate::news::{self, NewsCategory};

pub trait GiveawayService: Send + Sync {
    fn load_giveaways(&self, platform: Platform) -> Result<Vec<Giveaway>, FetchError>;
}

pub trait DealService: Send + Sync {
    fn load_deals(&self, query: &DealQuery) -> Result<Vec<Deal>, FetchError>;
    fn load_stores(&self) -> Result<StoreMap, FetchError>;
}

pub trait NewsService: Send + Sync {
    fn load_articles(&self, category: NewsCategory) -> Result<Vec<Article>, FetchError>;
}

impl GiveawayService for gamerpower::Client {
    fn load_giveaways(&self, platform: Platform) -> Result<Vec<Giveaway>, FetchError> {
        self.giveaways(platform)
    }
}

impl DealService for cheapshark::Client {
    fn load_deals(&self, query: &DealQuery) -> Result<Vec<Deal>, FetchError> {
        self.deals(query)
    }

    fn load_stores(&self) -> Result<StoreMap, FetchError> {
        self.stores()
    }
}

impl NewsService for news::Client {
    fn load_articles(&self, category: NewsCategory) -> Result<Vec<Article>, FetchError> {
        self.articles(category)
    }
}

#[derive(Default)]
pub struct MockGiveawayService {
    pub giveaways: Vec<Giveaway>,
}

impl GiveawayService for MockGiveawayService {
    fn load_giveaways(&self, platform: Platform) -> Result<Vec<Giveaway>, FetchError> {
        Ok(self
            .giveaways
            .iter()
            .filter(|giveaway| {
                platform == Platform::All
                    || giveaway
                        .platforms
                        .iter()
                        .any(|name| Platform::from_key(&name.replace(' ', "-")) == Some(platform))
            })
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MockDealService {
    pub deals: Vec<Deal>,
    pub stores: Vec<(String, String)>,
}

impl DealService for MockDealService {
    fn load_deals(&self, query: &DealQuery) -> Result<Vec<Deal>, FetchError> {
        let needle = query.title.trim().to_lowercase();
        Ok(self
            .deals
            .iter()
            .filter(|deal| {
                needle.is_empty()
                    || deal
                        .title
                        .as_deref()
                        .is_some_and(|title| title.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    fn load_stores(&self) -> Result<StoreMap, FetchError> {
        Ok(StoreMap::from_stores(
            self.stores
                .iter()
                .map(|(id, name)| StoreInfo {
                    store_id: Some(id.clone()),
                    store_name: Some(name.clone()),
                })
                .collect(),
        ))
    }
}

#[derive(Default)]
pub struct MockNewsService {
    pub articles: Vec<Article>,
}

impl NewsService for MockNewsService {
    fn load_articles(&self, _category: NewsCategory) -> Result<Vec<Article>, FetchError> {
        Ok(self.articles.clone())
    }
}
