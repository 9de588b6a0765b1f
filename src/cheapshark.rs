use anyhow::{bail, Result};
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::fetch::{self, ClientConfig, FetchError};
use crate::model::{Deal, StoreInfo, StoreMap};

pub const DEALS_URL: &str = "https://www.cheapshark.com/api/1.0/deals";
pub const STORES_URL: &str = "https://www.cheapshark.com/api/1.0/stores";
pub const REDIRECT_URL: &str = "https://www.cheapshark.com/redirect";
pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DealSort {
    #[default]
    DealRating,
    Price,
    Savings,
}

impl DealSort {
    pub const ALL: [DealSort; 3] = [DealSort::DealRating, DealSort::Price, DealSort::Savings];

    /// Value of the `sortBy` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            DealSort::DealRating => "dealRating",
            DealSort::Price => "price",
            DealSort::Savings => "savings",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DealSort::DealRating => "Deal Rating",
            DealSort::Price => "Price",
            DealSort::Savings => "Savings",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "deal-rating" | "dealrating" | "deal rating" => Some(DealSort::DealRating),
            "price" => Some(DealSort::Price),
            "savings" => Some(DealSort::Savings),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealQuery {
    pub sort: DealSort,
    pub title: String,
    pub store_id: String,
    pub page_size: u32,
}

impl Default for DealQuery {
    fn default() -> Self {
        Self {
            sort: DealSort::default(),
            title: String::new(),
            store_id: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DealQuery {
    /// Query parameters in request order; blank values are left out.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let page_size = if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        };
        let candidates = [
            ("storeID", self.store_id.trim().to_string()),
            ("sortBy", self.sort.as_param().to_string()),
            ("desc", "1".to_string()),
            ("pageSize", page_size.to_string()),
            ("title", self.title.trim().to_string()),
        ];
        candidates
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub deals: String,
    pub stores: String,
    pub redirect: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            deals: DEALS_URL.to_string(),
            stores: STORES_URL.to_string(),
            redirect: REDIRECT_URL.to_string(),
        }
    }
}

pub struct Client {
    http: HttpClient,
    user_agent: String,
    deals_url: Url,
    stores_url: Url,
    redirect_url: Url,
}

impl Client {
    pub fn new(config: &ClientConfig, endpoints: &Endpoints) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            bail!("cheapshark client user agent required");
        }

        Ok(Client {
            http: config.http()?,
            user_agent: config.user_agent.clone(),
            deals_url: Url::parse(&endpoints.deals)?,
            stores_url: Url::parse(&endpoints.stores)?,
            redirect_url: Url::parse(&endpoints.redirect)?,
        })
    }

    pub fn deals_url(&self, query: &DealQuery) -> Url {
        let mut url = self.deals_url.clone();
        url.query_pairs_mut().extend_pairs(query.params());
        url
    }

    pub fn deals(&self, query: &DealQuery) -> Result<Vec<Deal>, FetchError> {
        let url = self.deals_url(query);
        let mut deals: Vec<Deal> = fetch::get_json(&self.http, &self.user_agent, url)?;
        for deal in &mut deals {
            deal.redirect_url = deal
                .deal_id
                .as_deref()
                .filter(|id| !id.trim().is_empty())
                .map(|id| redirect_url(&self.redirect_url, id));
        }
        Ok(deals)
    }

    pub fn stores(&self) -> Result<StoreMap, FetchError> {
        let stores: Vec<StoreInfo> =
            fetch::get_json(&self.http, &self.user_agent, self.stores_url.clone())?;
        Ok(StoreMap::from_stores(stores))
    }
}

/// `{base}?dealID={id}`; CheapShark forwards it to the storefront page.
pub fn redirect_url(base: &Url, deal_id: &str) -> String {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("dealID", deal_id.trim());
    url.into()
}
