use anyhow::{bail, Result};
use log::debug;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::fetch::{self, ClientConfig, FetchError};
use crate::model::Giveaway;

pub const GIVEAWAYS_URL: &str = "https://www.gamerpower.com/api/giveaways";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    #[default]
    All,
    Pc,
    Steam,
    EpicGamesStore,
    Gog,
    Origin,
    Ubisoft,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::All,
        Platform::Pc,
        Platform::Steam,
        Platform::EpicGamesStore,
        Platform::Gog,
        Platform::Origin,
        Platform::Ubisoft,
    ];

    /// Value of the `platform` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::All => "all",
            Platform::Pc => "pc",
            Platform::Steam => "steam",
            Platform::EpicGamesStore => "epic-games-store",
            Platform::Gog => "gog",
            Platform::Origin => "origin",
            Platform::Ubisoft => "ubisoft",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::All => "All platforms",
            Platform::Pc => "PC",
            Platform::Steam => "Steam",
            Platform::EpicGamesStore => "Epic Games Store",
            Platform::Gog => "GOG",
            Platform::Origin => "Origin",
            Platform::Ubisoft => "Ubisoft",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str().eq_ignore_ascii_case(key))
    }
}

/// GamerPower answers with a status object instead of a list when a
/// platform has nothing on offer.
#[derive(Deserialize)]
#[serde(untagged)]
enum GiveawaysPayload {
    List(Vec<Giveaway>),
    Notice(serde_json::Map<String, serde_json::Value>),
}

pub struct Client {
    http: HttpClient,
    user_agent: String,
    giveaways_url: Url,
}

impl Client {
    pub fn new(config: &ClientConfig, giveaways_url: &str) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            bail!("gamerpower client user agent required");
        }

        Ok(Client {
            http: config.http()?,
            user_agent: config.user_agent.clone(),
            giveaways_url: Url::parse(giveaways_url)?,
        })
    }

    pub fn giveaways_url(&self, platform: Platform) -> Url {
        let mut url = self.giveaways_url.clone();
        if platform != Platform::All {
            url.query_pairs_mut()
                .append_pair("platform", platform.as_str());
        }
        url
    }

    pub fn giveaways(&self, platform: Platform) -> Result<Vec<Giveaway>, FetchError> {
        let url = self.giveaways_url(platform);
        let payload: GiveawaysPayload = fetch::get_json(&self.http, &self.user_agent, url)?;
        match payload {
            GiveawaysPayload::List(giveaways) => Ok(giveaways),
            GiveawaysPayload::Notice(notice) => {
                debug!(
                    "gamerpower returned no giveaways for {}: {}",
                    platform.as_str(),
                    notice
                        .get("status_message")
                        .and_then(|message| message.as_str())
                        .unwrap_or("no message")
                );
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{json, serve};
    use crate::model::{Record, RecordId};
    use crate::normalize::{giveaway_row, NOT_AVAILABLE};

    const THREE_GIVEAWAYS: &str = r#"[
        {"id": 1, "title": "Alpha Quest", "worth": "$9.99", "platforms": "PC, Steam",
         "end_date": "2030-01-01 23:59:00", "open_giveaway_url": "https://www.gamerpower.com/open/alpha"},
        {"id": 2, "title": "Beta Racer", "platforms": "PC, Epic Games Store",
         "end_date": "N/A", "open_giveaway_url": "https://www.gamerpower.com/open/beta"},
        {"id": 3, "title": "Gamma DLC", "worth": "$4.99", "platforms": "GOG",
         "end_date": "2030-02-01 23:59:00", "open_giveaway_url": "https://www.gamerpower.com/open/gamma"}
    ]"#;

    fn client(base: &str) -> Client {
        Client::new(&ClientConfig::default(), &format!("{base}/api/giveaways")).unwrap()
    }

    #[test]
    fn platform_query_is_omitted_for_all() {
        let client = client("https://www.gamerpower.com");
        assert_eq!(
            client.giveaways_url(Platform::All).as_str(),
            "https://www.gamerpower.com/api/giveaways"
        );
        assert_eq!(
            client.giveaways_url(Platform::EpicGamesStore).as_str(),
            "https://www.gamerpower.com/api/giveaways?platform=epic-games-store"
        );
    }

    #[test]
    fn canned_response_renders_three_rows_with_missing_worth() {
        let server = serve(vec![json(THREE_GIVEAWAYS)]);
        let giveaways = client(&server.base).giveaways(Platform::Pc).unwrap();
        assert_eq!(
            server.requests.recv().unwrap(),
            "/api/giveaways?platform=pc"
        );

        let rows: Vec<_> = giveaways
            .iter()
            .enumerate()
            .map(|(idx, g)| giveaway_row(RecordId(idx), g))
            .collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].worth, "$9.99");
        assert_eq!(rows[1].worth, NOT_AVAILABLE);
        assert_eq!(rows[1].platforms, "PC, Epic Games Store");
        assert_eq!(
            giveaways[1].link(),
            Some("https://www.gamerpower.com/open/beta")
        );
    }

    #[test]
    fn status_object_means_no_giveaways() {
        let server = serve(vec![(
            201,
            "application/json",
            r#"{"status":0,"status_message":"No active giveaways available at the moment."}"#
                .to_string(),
        )]);
        let giveaways = client(&server.base).giveaways(Platform::Origin).unwrap();
        assert!(giveaways.is_empty());
    }

    #[test]
    fn unexpected_shape_is_a_decode_error() {
        let server = serve(vec![json(r#"["not an object"]"#)]);
        let err = client(&server.base).giveaways(Platform::All).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn platform_keys_round_trip() {
        for platform in Platform::ALL {
            assert_eq!(Platform::from_key(platform.as_str()), Some(platform));
        }
        assert_eq!(Platform::from_key("EPIC-GAMES-STORE"), Some(Platform::EpicGamesStore));
        assert_eq!(Platform::from_key("switch"), None);
    }

    #[test]
    fn empty_user_agent_is_rejected() {
        let config = ClientConfig {
            user_agent: " ".into(),
            ..ClientConfig::default()
        };
        assert!(Client::new(&config, GIVEAWAYS_URL).is_err());
    }
}
