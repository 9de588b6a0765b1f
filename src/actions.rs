use anyhow::{anyhow, Result};
use log::info;

use crate::model::{Deal, Record, StoreMap};
use crate::normalize;
use crate::store::TabStore;

pub trait Browser {
    fn open(&self, url: &str) -> Result<()>;
}

pub trait ClipboardSink {
    fn set_text(&mut self, text: String) -> Result<()>;
}

/// Opens URLs with the platform's default handler.
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        webbrowser::open(url).map_err(|err| anyhow!("open {url}: {err}"))
    }
}

/// The system clipboard, connected on first use. The connection is kept for
/// the life of the app so X11/Wayland selections stay owned.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: String) -> Result<()> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|err| anyhow!("open clipboard: {err}"))?;
            self.inner = Some(clipboard);
        }
        let Some(clipboard) = self.inner.as_mut() else {
            return Err(anyhow!("clipboard unavailable"));
        };
        clipboard
            .set_text(text)
            .map_err(|err| anyhow!("write clipboard: {err}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing selected, or the record has no link.
    Nothing,
    Opened(String),
    Copied(String),
}

/// Link of the record shown at `selected` in the view.
pub fn selected_link<T: Record>(store: &TabStore<T>, selected: Option<usize>) -> Option<String> {
    let (_, record) = store.get(selected?)?;
    record.link().map(str::to_string)
}

pub fn open_selected<T: Record>(
    store: &TabStore<T>,
    selected: Option<usize>,
    browser: &dyn Browser,
) -> Result<Outcome> {
    let Some(url) = selected_link(store, selected) else {
        return Ok(Outcome::Nothing);
    };
    browser.open(&url)?;
    info!("opened {url}");
    Ok(Outcome::Opened(url))
}

pub fn copy_selected<T: Record>(
    store: &TabStore<T>,
    selected: Option<usize>,
    clipboard: &mut dyn ClipboardSink,
) -> Result<Outcome> {
    let Some(url) = selected_link(store, selected) else {
        return Ok(Outcome::Nothing);
    };
    clipboard.set_text(url.clone())?;
    info!("copied {url}");
    Ok(Outcome::Copied(url))
}

/// Copies one line per deal in the current view.
pub fn copy_all_deals(
    store: &TabStore<Deal>,
    stores: &StoreMap,
    clipboard: &mut dyn ClipboardSink,
) -> Result<Outcome> {
    if store.is_empty() {
        return Ok(Outcome::Nothing);
    }
    let text = store
        .view()
        .map(|(_, deal)| normalize::deal_line(deal, stores))
        .collect::<Vec<_>>()
        .join("\n");
    clipboard.set_text(text.clone())?;
    info!("copied {} deals", store.len());
    Ok(Outcome::Copied(text))
}
