//! Record to display-row mapping.
//!
//! Every function here is total: absent or blank fields render as
//! [`NOT_AVAILABLE`] and nothing returns an error.

use crate::model::{Article, Deal, Giveaway, Record, RecordId, StoreMap};

pub const NOT_AVAILABLE: &str = "N/A";
pub const SUMMARY_PREVIEW_CHARS: usize = 180;
/// CheapShark savings are shown as the first four characters of the raw value.
pub const SAVINGS_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiveawayRow {
    pub id: RecordId,
    pub title: String,
    pub platforms: String,
    pub worth: String,
    pub expires: String,
}

impl GiveawayRow {
    pub fn cells(&self) -> [&str; 4] {
        [&self.title, &self.platforms, &self.worth, &self.expires]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealRow {
    pub id: RecordId,
    pub title: String,
    pub store: String,
    pub sale_price: String,
    pub normal_price: String,
    pub savings: String,
}

impl DealRow {
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.title,
            &self.store,
            &self.sale_price,
            &self.normal_price,
            &self.savings,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsRow {
    pub id: RecordId,
    pub title: String,
    pub source: String,
    pub summary: String,
}

impl NewsRow {
    pub fn cells(&self) -> [&str; 3] {
        [&self.title, &self.source, &self.summary]
    }
}

pub fn giveaway_row(id: RecordId, giveaway: &Giveaway) -> GiveawayRow {
    let platforms = if giveaway.platforms.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        giveaway.platforms.join(", ")
    };
    GiveawayRow {
        id,
        title: or_na(giveaway.title.as_deref()),
        platforms,
        worth: or_na(giveaway.worth.as_deref()),
        expires: or_na(giveaway.end_date.as_deref()),
    }
}

pub fn deal_row(id: RecordId, deal: &Deal, stores: &StoreMap) -> DealRow {
    DealRow {
        id,
        title: or_na(deal.title.as_deref()),
        store: store_label(deal, stores),
        sale_price: price_label(deal.sale_price.as_deref()),
        normal_price: price_label(deal.normal_price.as_deref()),
        savings: savings_label(deal.savings.as_deref()),
    }
}

pub fn news_row(id: RecordId, article: &Article) -> NewsRow {
    NewsRow {
        id,
        title: or_na(article.title.as_deref()),
        source: or_na(Some(article.source.as_str())),
        summary: summary_preview(&article.summary),
    }
}

pub fn or_na(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn store_label(deal: &Deal, stores: &StoreMap) -> String {
    match deal.store_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => stores.name_for(id).to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn price_label(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(price) if !price.is_empty() => format!("${price}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// `"55.555555"` becomes `"55.5%"`; a missing value is `"0%"`.
pub fn savings_label(value: Option<&str>) -> String {
    match value {
        Some(raw) => {
            let head: String = raw.trim().chars().take(SAVINGS_CHARS).collect();
            format!("{head}%")
        }
        None => "0%".to_string(),
    }
}

pub fn summary_preview(summary: &str) -> String {
    let summary = summary.trim();
    if summary.chars().count() > SUMMARY_PREVIEW_CHARS {
        let head: String = summary.chars().take(SUMMARY_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        summary.to_string()
    }
}

/// One line of the "copy all deals" clipboard text.
pub fn deal_line(deal: &Deal, stores: &StoreMap) -> String {
    format!(
        "{} | Store: {} | Sale: {} | Normal: {} | Savings: {} | {}",
        or_na(deal.title.as_deref()),
        store_label(deal, stores),
        price_label(deal.sale_price.as_deref()),
        price_label(deal.normal_price.as_deref()),
        savings_label(deal.savings.as_deref()),
        deal.link().unwrap_or(NOT_AVAILABLE),
    )
}
