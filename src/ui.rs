use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Local};
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::{debug, info, warn};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Row, Table, TableState,
    Tabs, Wrap,
};
use ratatui::{Frame, Terminal};
use textwrap::{wrap, Options as WrapOptions};
use unicode_width::UnicodeWidthStr;

use crate::actions::{self, Browser, ClipboardSink, Outcome, SystemBrowser, SystemClipboard};
use crate::cheapshark::{DealQuery, DealSort};
use crate::data::{DealService, GiveawayService, NewsService};
use crate::fetch::FetchError;
use crate::gamerpower::Platform;
use crate::model::{Article, Deal, Giveaway, Record, RecordId, StoreMap};
use crate::news::NewsCategory;
use crate::normalize::{self, NOT_AVAILABLE};
use crate::scheduler::{RefreshScheduler, Source, Tasks};
use crate::store::TabStore;

// Palette
const COLOR_BG: Color = Color::Rgb(30, 30, 46);
const COLOR_PANEL_BG: Color = Color::Rgb(24, 24, 36);
const COLOR_PANEL_FOCUSED_BG: Color = Color::Rgb(49, 50, 68);
const COLOR_PANEL_SELECTED_BG: Color = Color::Rgb(69, 71, 90);
const COLOR_BORDER_IDLE: Color = Color::Rgb(49, 50, 68);
const COLOR_BORDER_FOCUSED: Color = Color::Rgb(137, 180, 250);
const COLOR_TEXT_PRIMARY: Color = Color::Rgb(205, 214, 244);
const COLOR_TEXT_SECONDARY: Color = Color::Rgb(166, 173, 200);
const COLOR_ACCENT: Color = Color::Rgb(137, 180, 250);
const COLOR_SUCCESS: Color = Color::Rgb(166, 227, 161);
const COLOR_ERROR: Color = Color::Rgb(243, 139, 168);

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK_RATE: Duration = Duration::from_millis(120);
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const PAGE_STEP: isize = 10;

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage(100 - percent_x - (100 - percent_x) / 2),
        ])
        .split(area);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage(100 - percent_y - (100 - percent_y) / 2),
        ])
        .split(horizontal[1]);
    vertical[1]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Giveaways,
    Deals,
    News,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Giveaways, Tab::Deals, Tab::News];

    fn title(self) -> &'static str {
        match self {
            Tab::Giveaways => "Free Giveaways",
            Tab::Deals => "Game Deals",
            Tab::News => "Gaming News",
        }
    }

    fn index(self) -> usize {
        match self {
            Tab::Giveaways => 0,
            Tab::Deals => 1,
            Tab::News => 2,
        }
    }

    fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn previous(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    fn source(self) -> Source {
        match self {
            Tab::Giveaways => Source::Giveaways,
            Tab::Deals => Source::Deals,
            Tab::News => Source::News,
        }
    }

    fn copied_notice(self) -> &'static str {
        match self {
            Tab::Giveaways => "Giveaway link copied to clipboard!",
            Tab::Deals => "Deal link copied to clipboard!",
            Tab::News => "News link copied to clipboard!",
        }
    }

    fn picker_title(self) -> &'static str {
        match self {
            Tab::Giveaways => "Platform",
            Tab::Deals => "Sort by",
            Tab::News => "News type",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Tab::Giveaways => "giveaways",
            Tab::Deals => "deals",
            Tab::News => "articles",
        }
    }
}

enum AsyncResponse {
    Giveaways {
        request_id: u64,
        result: Result<Vec<Giveaway>, FetchError>,
    },
    Deals {
        request_id: u64,
        result: Result<Vec<Deal>, FetchError>,
    },
    News {
        request_id: u64,
        result: Result<Vec<Article>, FetchError>,
    },
    Stores {
        request_id: u64,
        result: Result<StoreMap, FetchError>,
    },
}

impl AsyncResponse {
    fn key(&self) -> (Source, u64) {
        match self {
            AsyncResponse::Giveaways { request_id, .. } => (Source::Giveaways, *request_id),
            AsyncResponse::Deals { request_id, .. } => (Source::Deals, *request_id),
            AsyncResponse::News { request_id, .. } => (Source::News, *request_id),
            AsyncResponse::Stores { request_id, .. } => (Source::Stores, *request_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Notice {
    kind: NoticeKind,
    message: String,
}

impl Notice {
    fn error<S: Into<String>>(message: S) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    fn info<S: Into<String>>(message: S) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputMode {
    Normal,
    Search { buffer: String },
    Picker { selected: usize },
}

struct Spinner {
    index: usize,
    last_tick: Instant,
}

impl Spinner {
    fn new() -> Self {
        Self {
            index: 0,
            last_tick: Instant::now(),
        }
    }

    fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.index % SPINNER_FRAMES.len()]
    }

    fn advance(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_tick) >= TICK_RATE {
            self.index = (self.index + 1) % SPINNER_FRAMES.len();
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.index = 0;
        self.last_tick = Instant::now();
    }
}

/// One tab's records plus its table cursor.
struct TabView<T> {
    store: TabStore<T>,
    table: TableState,
    loaded_at: Option<DateTime<Local>>,
}

impl<T: Record> TabView<T> {
    fn new() -> Self {
        Self {
            store: TabStore::new(),
            table: TableState::default(),
            loaded_at: None,
        }
    }

    fn selected(&self) -> Option<usize> {
        self.table.selected()
    }

    fn selected_id(&self) -> Option<RecordId> {
        self.store.get(self.selected()?).map(|(id, _)| id)
    }

    fn selected_record(&self) -> Option<&T> {
        self.store.get(self.selected()?).map(|(_, record)| record)
    }

    fn replace(&mut self, records: Vec<T>) {
        let previous = self.table.selected();
        self.store.replace(records);
        self.loaded_at = Some(Local::now());
        self.table.select(clamp_selection(previous, self.store.len()));
    }

    /// Filters the view, keeping the cursor on the same record when it survives.
    fn apply_filter(&mut self, query: &str) {
        let current = self.selected_id();
        self.store.filter_text(query);
        let position = current.and_then(|id| self.store.position_of(id));
        *self.table.offset_mut() = 0;
        self.table
            .select(position.or_else(|| clamp_selection(None, self.store.len())));
    }

    fn move_by(&mut self, delta: isize) -> bool {
        if self.store.is_empty() {
            return false;
        }
        let last = self.store.len() as isize - 1;
        let current = self.selected().map(|idx| idx as isize).unwrap_or(0);
        let target = (current + delta).clamp(0, last) as usize;
        if self.selected() == Some(target) {
            return false;
        }
        self.table.select(Some(target));
        true
    }

    fn select_at(&mut self, index: usize) -> bool {
        if index >= self.store.len() {
            return false;
        }
        self.table.select(Some(index));
        true
    }
}

fn clamp_selection(previous: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(previous.unwrap_or(0).min(len - 1))
    }
}

fn wrap_plain(text: &str, width: usize, style: Style) -> Vec<Line<'static>> {
    let width = width.max(1);
    wrap(text, WrapOptions::new(width))
        .into_iter()
        .map(|line| Line::from(Span::styled(line.into_owned(), style)))
        .collect()
}

fn pad_lines_to_width(lines: &mut [Line<'static>], width: u16) {
    let width = width as usize;
    if width == 0 {
        return;
    }

    for line in lines {
        let mut current_width = 0usize;
        for span in &line.spans {
            current_width =
                current_width.saturating_add(UnicodeWidthStr::width(span.content.as_ref()));
        }
        if current_width >= width {
            continue;
        }
        let pad_style = line.spans.last().map(|span| span.style).unwrap_or_default();
        let padding = " ".repeat(width - current_width);
        line.spans.push(Span::styled(padding, pad_style));
    }
}

fn detail_lines(fields: &[(&str, String)], width: usize) -> Vec<Line<'static>> {
    let label_style = Style::default()
        .fg(COLOR_ACCENT)
        .bg(COLOR_PANEL_BG)
        .add_modifier(Modifier::BOLD);
    let value_style = Style::default().fg(COLOR_TEXT_PRIMARY).bg(COLOR_PANEL_BG);
    let mut lines = Vec::new();
    for (label, value) in fields {
        lines.push(Line::from(Span::styled(label.to_string(), label_style)));
        lines.extend(wrap_plain(value, width, value_style));
        lines.push(Line::default());
    }
    lines
}

fn giveaway_details(giveaway: &Giveaway) -> Vec<(&'static str, String)> {
    let row = normalize::giveaway_row(RecordId(0), giveaway);
    vec![
        ("Title", row.title),
        ("Platforms", row.platforms),
        ("Value", row.worth),
        ("Expires", row.expires),
        ("Type", normalize::or_na(giveaway.kind.as_deref())),
        ("Claimed by", normalize::or_na(giveaway.users.as_deref())),
        ("Description", normalize::or_na(giveaway.description.as_deref())),
        ("Instructions", normalize::or_na(giveaway.instructions.as_deref())),
        ("Link", giveaway.link().unwrap_or(NOT_AVAILABLE).to_string()),
    ]
}

fn deal_details(deal: &Deal, stores: &StoreMap) -> Vec<(&'static str, String)> {
    let row = normalize::deal_row(RecordId(0), deal, stores);
    vec![
        ("Title", row.title),
        ("Store", row.store),
        ("Sale price", row.sale_price),
        ("Normal price", row.normal_price),
        ("Savings", row.savings),
        ("Deal rating", normalize::or_na(deal.deal_rating.as_deref())),
        ("Metacritic", normalize::or_na(deal.metacritic_score.as_deref())),
        ("Steam rating", normalize::or_na(deal.steam_rating_text.as_deref())),
        ("Link", deal.link().unwrap_or(NOT_AVAILABLE).to_string()),
    ]
}

fn article_details(article: &Article) -> Vec<(&'static str, String)> {
    vec![
        ("Title", normalize::or_na(article.title.as_deref())),
        ("Source", normalize::or_na(Some(article.source.as_str()))),
        ("Summary", normalize::or_na(Some(article.summary.as_str()))),
        ("Link", article.link().unwrap_or(NOT_AVAILABLE).to_string()),
    ]
}

#[derive(Clone)]
pub struct Options {
    pub giveaway_service: Arc<dyn GiveawayService>,
    pub deal_service: Arc<dyn DealService>,
    pub news_service: Arc<dyn NewsService>,
    pub refresh_interval: Duration,
    pub platform: Platform,
    pub deal_sort: DealSort,
    pub deal_store_id: String,
    pub deal_page_size: u32,
    pub news_category: NewsCategory,
    pub config_path: String,
}

pub struct Model {
    status_message: String,
    active_tab: Tab,
    giveaways: TabView<Giveaway>,
    deals: TabView<Deal>,
    news: TabView<Article>,
    stores: StoreMap,
    platform: Platform,
    deal_sort: DealSort,
    deal_title: String,
    deal_store_id: String,
    deal_page_size: u32,
    news_category: NewsCategory,
    giveaway_service: Arc<dyn GiveawayService>,
    deal_service: Arc<dyn DealService>,
    news_service: Arc<dyn NewsService>,
    browser: Box<dyn Browser>,
    clipboard: Box<dyn ClipboardSink>,
    scheduler: RefreshScheduler,
    tasks: Tasks,
    notices: VecDeque<Notice>,
    input_mode: InputMode,
    table_area: Option<Rect>,
    last_click: Option<(Instant, usize)>,
    needs_redraw: bool,
    spinner: Spinner,
    response_tx: Sender<AsyncResponse>,
    response_rx: Receiver<AsyncResponse>,
}

impl Model {
    pub fn new(opts: Options) -> Self {
        Self::with_actions(
            opts,
            Box::new(SystemBrowser),
            Box::new(SystemClipboard::default()),
        )
    }

    pub fn with_actions(
        opts: Options,
        browser: Box<dyn Browser>,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        let (response_tx, response_rx) = unbounded();
        Self {
            status_message: format!("Fetching listings… (config: {})", opts.config_path),
            active_tab: Tab::Giveaways,
            giveaways: TabView::new(),
            deals: TabView::new(),
            news: TabView::new(),
            stores: StoreMap::default(),
            platform: opts.platform,
            deal_sort: opts.deal_sort,
            deal_title: String::new(),
            deal_store_id: opts.deal_store_id.trim().to_string(),
            deal_page_size: opts.deal_page_size,
            news_category: opts.news_category,
            giveaway_service: opts.giveaway_service,
            deal_service: opts.deal_service,
            news_service: opts.news_service,
            browser,
            clipboard,
            scheduler: RefreshScheduler::new(opts.refresh_interval),
            tasks: Tasks::new(),
            notices: VecDeque::new(),
            input_mode: InputMode::Normal,
            table_area: None,
            last_click: None,
            needs_redraw: true,
            spinner: Spinner::new(),
            response_tx,
            response_rx,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);
        self.tasks.cancel_all();

        disable_raw_mode()?;
        terminal.backend_mut().execute(DisableMouseCapture)?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        self.spawn_fetch(Source::Stores);
        let mut last_tick = Instant::now();

        loop {
            if self.scheduler.poll(Instant::now()) {
                info!("scheduled refresh");
                self.refresh_all();
            }

            if self.poll_async() {
                self.mark_dirty();
            }

            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            let timeout = TICK_RATE
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(16));

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match self.handle_key(key.code) {
                            Ok(true) => break,
                            Ok(false) => {}
                            Err(err) => {
                                self.status_message = format!("Error: {}", err);
                                self.mark_dirty();
                            }
                        }
                    }
                    Event::Mouse(mouse) => {
                        if let Err(err) = self.handle_mouse(mouse) {
                            self.status_message = format!("Error: {}", err);
                            self.mark_dirty();
                        }
                    }
                    Event::Resize(_, _) => self.mark_dirty(),
                    _ => {}
                }
            }

            if self.poll_async() {
                self.mark_dirty();
            }

            if last_tick.elapsed() >= TICK_RATE {
                last_tick = Instant::now();
                if self.is_loading() {
                    if self.spinner.advance() {
                        self.mark_dirty();
                    }
                } else {
                    self.spinner.reset();
                }
            }
        }

        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    fn is_loading(&self) -> bool {
        self.tasks.any_pending()
    }

    fn refresh_all(&mut self) {
        for source in Source::REFRESHED {
            self.spawn_fetch(source);
        }
        self.status_message = "Refreshing giveaways, deals and news…".to_string();
        self.mark_dirty();
    }

    fn refresh_tab(&mut self, tab: Tab) {
        self.spawn_fetch(tab.source());
        self.status_message = format!("Refreshing {}…", tab.source().label());
        self.mark_dirty();
    }

    fn deal_query(&self) -> DealQuery {
        DealQuery {
            sort: self.deal_sort,
            title: self.deal_title.clone(),
            store_id: self.deal_store_id.clone(),
            page_size: self.deal_page_size,
        }
    }

    /// Starts a worker for `source`, superseding any fetch already in flight.
    fn spawn_fetch(&mut self, source: Source) {
        let handle = self.tasks.begin(source);
        let request_id = handle.request_id();
        let tx = self.response_tx.clone();
        debug!("fetching {} (request {request_id})", source.label());

        match source {
            Source::Giveaways => {
                let service = self.giveaway_service.clone();
                let platform = self.platform;
                thread::spawn(move || {
                    let result = service.load_giveaways(platform);
                    if !handle.is_cancelled() {
                        let _ = tx.send(AsyncResponse::Giveaways { request_id, result });
                    }
                });
            }
            Source::Deals => {
                let service = self.deal_service.clone();
                let query = self.deal_query();
                thread::spawn(move || {
                    let result = service.load_deals(&query);
                    if !handle.is_cancelled() {
                        let _ = tx.send(AsyncResponse::Deals { request_id, result });
                    }
                });
            }
            Source::News => {
                let service = self.news_service.clone();
                let category = self.news_category;
                thread::spawn(move || {
                    let result = service.load_articles(category);
                    if !handle.is_cancelled() {
                        let _ = tx.send(AsyncResponse::News { request_id, result });
                    }
                });
            }
            Source::Stores => {
                let service = self.deal_service.clone();
                thread::spawn(move || {
                    let result = service.load_stores();
                    if !handle.is_cancelled() {
                        let _ = tx.send(AsyncResponse::Stores { request_id, result });
                    }
                });
            }
        }
    }

    fn poll_async(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.response_rx.try_recv() {
            self.handle_async_response(message);
            changed = true;
        }
        changed
    }

    fn handle_async_response(&mut self, message: AsyncResponse) {
        let (source, request_id) = message.key();
        if !self.tasks.finish(source, request_id) {
            debug!(
                "dropping superseded {} response (request {request_id})",
                source.label()
            );
            return;
        }

        match message {
            AsyncResponse::Giveaways { result, .. } => match result {
                Ok(giveaways) => {
                    info!("loaded {} giveaways", giveaways.len());
                    self.giveaways.replace(giveaways);
                    self.status_message = format!(
                        "Loaded {} giveaways ({}).",
                        self.giveaways.store.total(),
                        self.platform.display_name()
                    );
                }
                Err(err) => self.report_failure(source, &err),
            },
            AsyncResponse::Deals { result, .. } => match result {
                Ok(deals) => {
                    info!("loaded {} deals", deals.len());
                    self.deals.replace(deals);
                    self.status_message = format!(
                        "Loaded {} deals sorted by {}.",
                        self.deals.store.total(),
                        self.deal_sort.display_name()
                    );
                }
                Err(err) => self.report_failure(source, &err),
            },
            AsyncResponse::News { result, .. } => match result {
                Ok(articles) => {
                    info!("loaded {} news articles", articles.len());
                    self.news.replace(articles);
                    self.status_message = format!(
                        "Loaded {} {} articles.",
                        self.news.store.total(),
                        self.news_category.display_name()
                    );
                }
                Err(err) => self.report_failure(source, &err),
            },
            AsyncResponse::Stores { result, .. } => match result {
                Ok(stores) => {
                    debug!("loaded {} store names", stores.len());
                    self.stores = stores;
                }
                Err(err) => warn!("store names unavailable: {err}"),
            },
        }
        self.mark_dirty();
    }

    fn report_failure(&mut self, source: Source, err: &FetchError) {
        warn!("fetching {} failed: {err}", source.label());
        let message = format!("Failed to load {}: {err}", source.label());
        self.status_message = message.clone();
        self.notices.push_back(Notice::error(message));
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if !self.notices.is_empty() {
            return Ok(self.handle_notice_key(code));
        }

        match self.input_mode {
            InputMode::Search { .. } => return Ok(self.handle_search_key(code)),
            InputMode::Picker { .. } => return Ok(self.handle_picker_key(code)),
            InputMode::Normal => {}
        }

        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Tab => self.switch_tab(self.active_tab.next()),
            KeyCode::BackTab => self.switch_tab(self.active_tab.previous()),
            KeyCode::Char('1') => self.switch_tab(Tab::Giveaways),
            KeyCode::Char('2') => self.switch_tab(Tab::Deals),
            KeyCode::Char('3') => self.switch_tab(Tab::News),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::Home | KeyCode::Char('g') => self.move_selection(isize::MIN / 2),
            KeyCode::End | KeyCode::Char('G') => self.move_selection(isize::MAX / 2),
            KeyCode::Enter | KeyCode::Char('o') => self.open_selected(),
            KeyCode::Char('y') => self.copy_selected(),
            KeyCode::Char('Y') => self.copy_all_deals(),
            KeyCode::Char('/') => {
                let buffer = self.search_text().to_string();
                self.input_mode = InputMode::Search { buffer };
                self.mark_dirty();
            }
            KeyCode::Char('f') => {
                let selected = self.picker_current();
                self.input_mode = InputMode::Picker { selected };
                self.mark_dirty();
            }
            KeyCode::Esc => {
                if !self.search_text().is_empty() {
                    self.apply_search(String::new());
                }
            }
            KeyCode::Char('r') => self.refresh_tab(self.active_tab),
            KeyCode::Char('R') => self.refresh_all(),
            _ => {}
        }

        Ok(false)
    }

    fn handle_notice_key(&mut self, code: KeyCode) -> bool {
        if matches!(
            code,
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') | KeyCode::Char('q')
        ) {
            self.notices.pop_front();
            self.mark_dirty();
        }
        false
    }

    fn handle_search_key(&mut self, code: KeyCode) -> bool {
        let InputMode::Search { buffer } = &mut self.input_mode else {
            return false;
        };
        match code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                let query = std::mem::take(buffer);
                self.input_mode = InputMode::Normal;
                self.apply_search(query);
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(ch) => buffer.push(ch),
            _ => return false,
        }
        self.mark_dirty();
        false
    }

    fn handle_picker_key(&mut self, code: KeyCode) -> bool {
        let InputMode::Picker { selected } = &mut self.input_mode else {
            return false;
        };
        let len = picker_options(self.active_tab).len();
        match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('f') => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                *selected = selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if *selected + 1 < len {
                    *selected += 1;
                }
            }
            KeyCode::Enter => {
                let choice = *selected;
                self.input_mode = InputMode::Normal;
                self.apply_picker_choice(choice);
            }
            _ => return false,
        }
        self.mark_dirty();
        false
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Result<()> {
        if !self.notices.is_empty() || self.input_mode != InputMode::Normal {
            return Ok(());
        }

        match event.kind {
            MouseEventKind::ScrollDown => self.move_selection(1),
            MouseEventKind::ScrollUp => self.move_selection(-1),
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(index) = self.row_at(event.column, event.row) else {
                    return Ok(());
                };
                let now = Instant::now();
                let double = matches!(
                    self.last_click,
                    Some((at, row)) if row == index && now.duration_since(at) <= DOUBLE_CLICK_WINDOW
                );
                if self.select_row(index) || double {
                    self.mark_dirty();
                }
                if double {
                    self.last_click = None;
                    self.open_selected();
                } else {
                    self.last_click = Some((now, index));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// View index under a click inside the table body.
    fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.table_area?;
        let body_top = area.y.saturating_add(1);
        if column < area.x
            || column >= area.x.saturating_add(area.width)
            || row < body_top
            || row >= area.y.saturating_add(area.height)
        {
            return None;
        }
        let offset = match self.active_tab {
            Tab::Giveaways => self.giveaways.table.offset(),
            Tab::Deals => self.deals.table.offset(),
            Tab::News => self.news.table.offset(),
        };
        Some(offset + usize::from(row - body_top))
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.active_tab != tab {
            self.active_tab = tab;
            self.last_click = None;
            self.mark_dirty();
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let moved = match self.active_tab {
            Tab::Giveaways => self.giveaways.move_by(delta),
            Tab::Deals => self.deals.move_by(delta),
            Tab::News => self.news.move_by(delta),
        };
        if moved {
            self.mark_dirty();
        }
    }

    fn select_row(&mut self, index: usize) -> bool {
        match self.active_tab {
            Tab::Giveaways => self.giveaways.select_at(index),
            Tab::Deals => self.deals.select_at(index),
            Tab::News => self.news.select_at(index),
        }
    }

    /// Text shown in the active tab's search box. Deals search on the server,
    /// the other tabs filter locally and lose their query on refresh.
    fn search_text(&self) -> &str {
        match self.active_tab {
            Tab::Giveaways => self.giveaways.store.active_query().unwrap_or_default(),
            Tab::Deals => &self.deal_title,
            Tab::News => self.news.store.active_query().unwrap_or_default(),
        }
    }

    fn apply_search(&mut self, query: String) {
        let query = query.trim().to_string();
        match self.active_tab {
            Tab::Giveaways => {
                self.giveaways.apply_filter(&query);
                self.status_message = filter_status(Tab::Giveaways, &self.giveaways.store);
            }
            Tab::News => {
                self.news.apply_filter(&query);
                self.status_message = filter_status(Tab::News, &self.news.store);
            }
            Tab::Deals => {
                self.deal_title = query;
                self.spawn_fetch(Source::Deals);
                self.status_message = if self.deal_title.is_empty() {
                    "Loading deals…".to_string()
                } else {
                    format!("Searching deals for \"{}\"…", self.deal_title)
                };
            }
        }
        debug!("search on {:?}: {:?}", self.active_tab, self.search_text());
        self.mark_dirty();
    }

    fn picker_current(&self) -> usize {
        match self.active_tab {
            Tab::Giveaways => Platform::ALL
                .iter()
                .position(|p| *p == self.platform)
                .unwrap_or(0),
            Tab::Deals => DealSort::ALL
                .iter()
                .position(|s| *s == self.deal_sort)
                .unwrap_or(0),
            Tab::News => NewsCategory::ALL
                .iter()
                .position(|c| *c == self.news_category)
                .unwrap_or(0),
        }
    }

    fn apply_picker_choice(&mut self, choice: usize) {
        match self.active_tab {
            Tab::Giveaways => {
                let Some(platform) = Platform::ALL.get(choice).copied() else {
                    return;
                };
                self.platform = platform;
                self.status_message =
                    format!("Loading giveaways for {}…", platform.display_name());
            }
            Tab::Deals => {
                let Some(sort) = DealSort::ALL.get(choice).copied() else {
                    return;
                };
                self.deal_sort = sort;
                self.status_message = format!("Loading deals sorted by {}…", sort.display_name());
            }
            Tab::News => {
                let Some(category) = NewsCategory::ALL.get(choice).copied() else {
                    return;
                };
                self.news_category = category;
                self.status_message = format!("Loading {}…", category.display_name());
            }
        }
        self.spawn_fetch(self.active_tab.source());
        self.mark_dirty();
    }

    fn open_selected(&mut self) {
        let result = match self.active_tab {
            Tab::Giveaways => actions::open_selected(
                &self.giveaways.store,
                self.giveaways.selected(),
                self.browser.as_ref(),
            ),
            Tab::Deals => actions::open_selected(
                &self.deals.store,
                self.deals.selected(),
                self.browser.as_ref(),
            ),
            Tab::News => actions::open_selected(
                &self.news.store,
                self.news.selected(),
                self.browser.as_ref(),
            ),
        };
        match result {
            Ok(Outcome::Opened(url)) => {
                self.status_message = format!("Opened {url} in your browser.");
            }
            Ok(_) => return,
            Err(err) => {
                warn!("open failed: {err:#}");
                self.status_message = format!("Failed to open link: {err}");
            }
        }
        self.mark_dirty();
    }

    fn copy_selected(&mut self) {
        let result = match self.active_tab {
            Tab::Giveaways => actions::copy_selected(
                &self.giveaways.store,
                self.giveaways.selected(),
                self.clipboard.as_mut(),
            ),
            Tab::Deals => actions::copy_selected(
                &self.deals.store,
                self.deals.selected(),
                self.clipboard.as_mut(),
            ),
            Tab::News => actions::copy_selected(
                &self.news.store,
                self.news.selected(),
                self.clipboard.as_mut(),
            ),
        };
        match result {
            Ok(Outcome::Copied(_)) => {
                self.notices
                    .push_back(Notice::info(self.active_tab.copied_notice()));
                self.status_message = self.active_tab.copied_notice().to_string();
            }
            Ok(_) => return,
            Err(err) => {
                warn!("copy failed: {err:#}");
                self.status_message = format!("Failed to copy link: {err}");
            }
        }
        self.mark_dirty();
    }

    fn copy_all_deals(&mut self) {
        if self.active_tab != Tab::Deals {
            return;
        }
        match actions::copy_all_deals(&self.deals.store, &self.stores, self.clipboard.as_mut()) {
            Ok(Outcome::Copied(_)) => {
                self.notices
                    .push_back(Notice::info("All deals copied to clipboard!"));
            }
            Ok(_) => self.notices.push_back(Notice::info("No deals to copy.")),
            Err(err) => {
                warn!("copy all deals failed: {err:#}");
                self.status_message = format!("Failed to copy deals: {err}");
            }
        }
        self.mark_dirty();
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let full = frame.size();
        frame.render_widget(Block::default().style(Style::default().bg(COLOR_BG)), full);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(full);

        let status_text = if self.is_loading() {
            format!("{} {}", self.spinner.frame(), self.status_message)
                .trim()
                .to_string()
        } else {
            self.status_message.clone()
        };
        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .fg(COLOR_TEXT_PRIMARY)
                .bg(COLOR_PANEL_FOCUSED_BG)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, layout[0]);

        self.draw_tabs(frame, layout[1]);
        self.draw_controls(frame, layout[2]);

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(layout[3]);
        self.draw_table(frame, main[0]);
        self.draw_detail(frame, main[1]);

        let footer = Paragraph::new(self.footer_text())
            .style(
                Style::default()
                    .fg(COLOR_TEXT_SECONDARY)
                    .bg(COLOR_PANEL_BG)
                    .add_modifier(Modifier::ITALIC),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(footer, layout[4]);

        if matches!(self.input_mode, InputMode::Picker { .. }) {
            self.draw_picker(frame, layout[3]);
        }

        if let Some(notice) = self.notices.front() {
            draw_notice(frame, layout[3], notice, self.notices.len());
        }
    }

    fn draw_tabs(&self, frame: &mut Frame<'_>, area: Rect) {
        let titles: Vec<Line> = Tab::ALL
            .iter()
            .map(|tab| {
                let count = match tab {
                    Tab::Giveaways => self.giveaways.store.len(),
                    Tab::Deals => self.deals.store.len(),
                    Tab::News => self.news.store.len(),
                };
                Line::from(format!("{} {} ({count})", tab.index() + 1, tab.title()))
            })
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.active_tab.index())
            .style(Style::default().fg(COLOR_TEXT_SECONDARY).bg(COLOR_PANEL_BG))
            .highlight_style(
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::BOLD),
            )
            .divider(Span::styled("│", Style::default().fg(COLOR_BORDER_IDLE)));
        frame.render_widget(tabs, area);
    }

    fn draw_controls(&self, frame: &mut Frame<'_>, area: Rect) {
        let label = Style::default().fg(COLOR_TEXT_SECONDARY);
        let value = Style::default()
            .fg(COLOR_TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD);

        let search = match &self.input_mode {
            InputMode::Search { buffer } => Span::styled(
                format!("{buffer}▏"),
                Style::default()
                    .fg(COLOR_TEXT_PRIMARY)
                    .bg(COLOR_PANEL_SELECTED_BG),
            ),
            _ if self.search_text().is_empty() => Span::styled("(none)", label),
            _ => Span::styled(self.search_text().to_string(), value),
        };

        let (picker_label, picker_value) = (
            self.active_tab.picker_title(),
            picker_options(self.active_tab)
                .get(self.picker_current())
                .copied()
                .unwrap_or_default(),
        );

        let (shown, total, loaded_at) = match self.active_tab {
            Tab::Giveaways => (
                self.giveaways.store.len(),
                self.giveaways.store.total(),
                self.giveaways.loaded_at,
            ),
            Tab::Deals => (
                self.deals.store.len(),
                self.deals.store.total(),
                self.deals.loaded_at,
            ),
            Tab::News => (
                self.news.store.len(),
                self.news.store.total(),
                self.news.loaded_at,
            ),
        };
        let updated = loaded_at
            .map(|at| format!("updated {}", at.format("%H:%M")))
            .unwrap_or_else(|| "not loaded".to_string());
        let next_refresh = humantime::format_duration(Duration::from_secs(
            self.scheduler.time_until_next(Instant::now()).as_secs(),
        ));

        let line = Line::from(vec![
            Span::styled(" Search: ", label),
            search,
            Span::styled(format!("  {picker_label}: "), label),
            Span::styled(picker_value.to_string(), value),
            Span::styled(
                format!(
                    "  · {shown} of {total} {} · {updated} · next refresh in {next_refresh}",
                    self.active_tab.noun()
                ),
                label,
            ),
        ]);
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(COLOR_PANEL_BG)),
            area,
        );
    }

    fn panel_block(title: &str, focused: bool) -> Block<'static> {
        let border_style = if focused {
            Style::default().fg(COLOR_BORDER_FOCUSED)
        } else {
            Style::default().fg(COLOR_BORDER_IDLE)
        };
        let title_style = if focused {
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_TEXT_SECONDARY)
        };
        Block::default()
            .title(Span::styled(title.to_string(), title_style))
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(COLOR_PANEL_BG))
    }

    fn draw_table(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let block = Self::panel_block(self.active_tab.title(), true);
        let inner = block.inner(area);
        self.table_area = Some(inner);

        let (headers, widths, rows, empty): (Vec<&str>, Vec<Constraint>, Vec<Vec<String>>, bool) =
            match self.active_tab {
                Tab::Giveaways => (
                    vec!["Title", "Platforms", "Value", "Expires"],
                    vec![
                        Constraint::Percentage(44),
                        Constraint::Percentage(28),
                        Constraint::Length(10),
                        Constraint::Length(19),
                    ],
                    self.giveaways
                        .store
                        .view()
                        .map(|(id, giveaway)| {
                            normalize::giveaway_row(id, giveaway)
                                .cells()
                                .map(str::to_string)
                                .to_vec()
                        })
                        .collect(),
                    self.giveaways.store.is_empty(),
                ),
                Tab::Deals => (
                    vec!["Title", "Store", "Sale Price", "Normal Price", "Savings"],
                    vec![
                        Constraint::Min(20),
                        Constraint::Length(18),
                        Constraint::Length(10),
                        Constraint::Length(12),
                        Constraint::Length(8),
                    ],
                    self.deals
                        .store
                        .view()
                        .map(|(id, deal)| {
                            normalize::deal_row(id, deal, &self.stores)
                                .cells()
                                .map(str::to_string)
                                .to_vec()
                        })
                        .collect(),
                    self.deals.store.is_empty(),
                ),
                Tab::News => (
                    vec!["Title", "Source", "Summary"],
                    vec![
                        Constraint::Percentage(40),
                        Constraint::Percentage(18),
                        Constraint::Percentage(42),
                    ],
                    self.news
                        .store
                        .view()
                        .map(|(id, article)| {
                            normalize::news_row(id, article)
                                .cells()
                                .map(str::to_string)
                                .to_vec()
                        })
                        .collect(),
                    self.news.store.is_empty(),
                ),
            };

        if empty {
            let message = if self.tasks.is_pending(self.active_tab.source()) {
                format!("Loading {}…", self.active_tab.noun())
            } else if !self.search_text().is_empty() {
                format!("No {} match \"{}\".", self.active_tab.noun(), self.search_text())
            } else {
                format!("No {} to show. Press r to refresh.", self.active_tab.noun())
            };
            let placeholder = Paragraph::new(message)
                .block(block.padding(Padding::uniform(1)))
                .style(
                    Style::default()
                        .fg(COLOR_TEXT_SECONDARY)
                        .add_modifier(Modifier::ITALIC),
                )
                .alignment(Alignment::Center);
            frame.render_widget(placeholder, area);
            return;
        }

        let header = Row::new(headers.iter().map(|h| h.to_string())).style(
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        );
        let table = Table::new(rows.into_iter().map(Row::new), widths)
            .header(header)
            .block(block)
            .style(Style::default().fg(COLOR_TEXT_PRIMARY))
            .highlight_style(
                Style::default()
                    .fg(COLOR_TEXT_PRIMARY)
                    .bg(COLOR_PANEL_SELECTED_BG)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let state = match self.active_tab {
            Tab::Giveaways => &mut self.giveaways.table,
            Tab::Deals => &mut self.deals.table,
            Tab::News => &mut self.news.table,
        };
        frame.render_stateful_widget(table, area, state);
    }

    fn draw_detail(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Self::panel_block("Details", false).padding(Padding::horizontal(1));
        let inner = block.inner(area);
        let width = inner.width as usize;

        let fields = match self.active_tab {
            Tab::Giveaways => self.giveaways.selected_record().map(giveaway_details),
            Tab::Deals => self
                .deals
                .selected_record()
                .map(|deal| deal_details(deal, &self.stores)),
            Tab::News => self.news.selected_record().map(article_details),
        };

        let mut lines = match fields {
            Some(fields) => detail_lines(&fields, width),
            None => vec![Line::from(Span::styled(
                "Select a row to see its details.",
                Style::default()
                    .fg(COLOR_TEXT_SECONDARY)
                    .add_modifier(Modifier::ITALIC),
            ))],
        };
        pad_lines_to_width(&mut lines, inner.width);

        let paragraph = Paragraph::new(Text::from(lines))
            .block(block)
            .style(Style::default().bg(COLOR_PANEL_BG));
        frame.render_widget(paragraph, area);
    }

    fn draw_picker(&self, frame: &mut Frame<'_>, area: Rect) {
        let InputMode::Picker { selected } = self.input_mode else {
            return;
        };
        let popup_area = centered_rect(40, 50, area);
        frame.render_widget(Clear, popup_area);

        let current = self.picker_current();
        let items: Vec<ListItem> = picker_options(self.active_tab)
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let marker = if idx == current { "● " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(COLOR_SUCCESS)),
                    Span::styled(
                        name.to_string(),
                        Style::default().fg(COLOR_TEXT_PRIMARY).bg(COLOR_PANEL_BG),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(Span::styled(
                        self.active_tab.picker_title(),
                        Style::default()
                            .fg(COLOR_ACCENT)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(COLOR_ACCENT))
                    .style(Style::default().bg(COLOR_PANEL_BG)),
            )
            .highlight_style(
                Style::default()
                    .fg(COLOR_TEXT_PRIMARY)
                    .bg(COLOR_PANEL_SELECTED_BG)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(popup_area);

        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let instructions = Paragraph::new("j/k move · Enter apply · Esc close")
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(COLOR_TEXT_SECONDARY)
                    .bg(COLOR_PANEL_BG)
                    .add_modifier(Modifier::ITALIC),
            );
        frame.render_widget(instructions, chunks[1]);
    }

    fn footer_text(&self) -> String {
        if !self.notices.is_empty() {
            return "Enter/Esc dismiss".to_string();
        }
        match self.input_mode {
            InputMode::Search { .. } => {
                return "Type to search · Enter apply · Esc cancel".to_string();
            }
            InputMode::Picker { .. } => {
                return "j/k move · Enter apply · Esc close".to_string();
            }
            InputMode::Normal => {}
        }

        let mut parts: Vec<String> = vec![
            "Tab/1-3 switch".to_string(),
            "j/k move".to_string(),
            "Enter/o open".to_string(),
            "y copy link".to_string(),
        ];
        if self.active_tab == Tab::Deals {
            parts.push("Y copy all".to_string());
        }
        parts.push("/ search".to_string());
        parts.push(format!("f {}", self.active_tab.picker_title().to_lowercase()));
        parts.push("r refresh".to_string());
        parts.push("R refresh all".to_string());
        parts.push("q quit".to_string());
        parts.join(" · ")
    }
}

fn picker_options(tab: Tab) -> Vec<&'static str> {
    match tab {
        Tab::Giveaways => Platform::ALL.iter().map(|p| p.display_name()).collect(),
        Tab::Deals => DealSort::ALL.iter().map(|s| s.display_name()).collect(),
        Tab::News => NewsCategory::ALL.iter().map(|c| c.display_name()).collect(),
    }
}

fn filter_status<T>(tab: Tab, store: &TabStore<T>) -> String {
    match store.active_query() {
        Some(query) => format!(
            "Showing {} of {} {} matching \"{query}\".",
            store.len(),
            store.total(),
            tab.noun()
        ),
        None => format!("Showing all {} {}.", store.total(), tab.noun()),
    }
}

fn draw_notice(frame: &mut Frame<'_>, area: Rect, notice: &Notice, queued: usize) {
    let popup_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup_area);

    let (title, color) = match notice.kind {
        NoticeKind::Error => ("Error", COLOR_ERROR),
        NoticeKind::Info => ("Info", COLOR_SUCCESS),
    };
    let title = if queued > 1 {
        format!("{title} (1 of {queued})")
    } else {
        title.to_string()
    };

    let body = Paragraph::new(vec![
        Line::from(Span::styled(
            notice.message.clone(),
            Style::default().fg(COLOR_TEXT_PRIMARY),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Press Enter to dismiss",
            Style::default()
                .fg(COLOR_TEXT_SECONDARY)
                .add_modifier(Modifier::ITALIC),
        )),
    ])
    .block(
        Block::default()
            .title(Span::styled(
                title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(COLOR_PANEL_BG))
            .padding(Padding::uniform(1)),
    )
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center);
    frame.render_widget(body, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::{RecordingBrowser, RecordingClipboard};
    use crate::data::{MockDealService, MockGiveawayService, MockNewsService};
    use crate::fetch::testing::dead_endpoint;
    use crate::fetch::ClientConfig;
    use crate::gamerpower;
    use ratatui::backend::TestBackend;

    fn total_width(line: &Line<'_>) -> usize {
        line.spans
            .iter()
            .map(|span| UnicodeWidthStr::width(span.content.as_ref()))
            .sum()
    }

    fn giveaway(title: &str, worth: Option<&str>) -> Giveaway {
        Giveaway {
            title: Some(title.into()),
            worth: worth.map(str::to_string),
            platforms: vec!["PC".into()],
            end_date: Some("2030-01-01 23:59:00".into()),
            open_giveaway_url: Some(format!(
                "https://gp/{}",
                title.to_lowercase().replace(' ', "-")
            )),
            ..Giveaway::default()
        }
    }

    fn deal(title: &str, id: &str) -> Deal {
        Deal {
            title: Some(title.into()),
            store_id: Some("1".into()),
            sale_price: Some("4.99".into()),
            normal_price: Some("19.99".into()),
            savings: Some("75.037519".into()),
            deal_id: Some(id.into()),
            redirect_url: Some(format!("https://cs/redirect?dealID={id}")),
            ..Deal::default()
        }
    }

    fn options() -> Options {
        Options {
            giveaway_service: Arc::new(MockGiveawayService {
                giveaways: vec![
                    giveaway("Alpha Quest", Some("$9.99")),
                    giveaway("Beta Racer", None),
                    giveaway("Alpine Drift", Some("$4.99")),
                ],
            }),
            deal_service: Arc::new(MockDealService {
                deals: vec![deal("Portal", "p1"), deal("Doom", "d1")],
                stores: vec![("1".into(), "Steam".into())],
            }),
            news_service: Arc::new(MockNewsService {
                articles: vec![Article {
                    title: Some("Patch notes".into()),
                    source: "Google News".into(),
                    link: Some("https://news/patch".into()),
                    summary: "Balance changes".into(),
                }],
            }),
            refresh_interval: Duration::from_secs(300),
            platform: Platform::All,
            deal_sort: DealSort::DealRating,
            deal_store_id: String::new(),
            deal_page_size: 50,
            news_category: NewsCategory::Pc,
            config_path: "/tmp/config.yaml".into(),
        }
    }

    fn model() -> (Model, RecordingBrowser, RecordingClipboard) {
        let browser = RecordingBrowser::default();
        let clipboard = RecordingClipboard::default();
        let model = Model::with_actions(
            options(),
            Box::new(browser.clone()),
            Box::new(clipboard.clone()),
        );
        (model, browser, clipboard)
    }

    /// Applies worker responses until nothing is in flight.
    fn settle(model: &mut Model) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while model.tasks.any_pending() && Instant::now() < deadline {
            if let Ok(message) = model.response_rx.recv_timeout(Duration::from_millis(50)) {
                model.handle_async_response(message);
            }
        }
        assert!(!model.tasks.any_pending(), "fetches did not settle");
    }

    fn loaded_model() -> (Model, RecordingBrowser, RecordingClipboard) {
        let (mut model, browser, clipboard) = model();
        model.spawn_fetch(Source::Stores);
        model.refresh_all();
        settle(&mut model);
        (model, browser, clipboard)
    }

    fn type_search(model: &mut Model, text: &str) {
        model.handle_key(KeyCode::Char('/')).unwrap();
        for ch in text.chars() {
            model.handle_key(KeyCode::Char(ch)).unwrap();
        }
        model.handle_key(KeyCode::Enter).unwrap();
    }

    fn render(model: &mut Model) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal.draw(|frame| model.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn pad_lines_extends_to_width() {
        let mut lines = vec![Line::from(vec![Span::raw("abc")])];
        pad_lines_to_width(&mut lines, 6);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[0].spans[1].content.as_ref(), "   ");
        assert_eq!(total_width(&lines[0]), 6);
    }

    #[test]
    fn pad_lines_does_not_shorten() {
        let mut lines = vec![Line::from(vec![Span::raw("abcdef")])];
        pad_lines_to_width(&mut lines, 4);
        assert_eq!(lines[0].spans.len(), 1);
        assert_eq!(total_width(&lines[0]), 6);
    }

    #[test]
    fn pad_lines_supports_wide_glyphs() {
        let mut lines = vec![Line::from(vec![Span::raw("🦀")])];
        pad_lines_to_width(&mut lines, 3);
        assert_eq!(total_width(&lines[0]), 3);
        assert_eq!(lines[0].spans.len(), 2);
    }

    #[test]
    fn three_giveaways_render_with_missing_worth() {
        let (mut model, _, _) = loaded_model();
        assert_eq!(model.giveaways.store.len(), 3);
        assert_eq!(model.giveaways.selected(), Some(0));

        let screen = render(&mut model);
        assert!(screen.contains("Alpha Quest"));
        assert!(screen.contains("Beta Racer"));
        assert!(screen.contains("Alpine Drift"));
        assert!(screen.contains("N/A"));
        assert!(screen.contains("Free Giveaways (3)"));
    }

    #[test]
    fn network_failure_keeps_rows_and_raises_one_notice() {
        let (mut model, _, _) = loaded_model();
        let config = ClientConfig {
            timeout: Duration::from_secs(2),
            ..ClientConfig::default()
        };
        model.giveaway_service = Arc::new(
            gamerpower::Client::new(&config, &format!("{}/api/giveaways", dead_endpoint()))
                .unwrap(),
        );

        model.refresh_tab(Tab::Giveaways);
        settle(&mut model);

        assert_eq!(model.giveaways.store.len(), 3);
        assert_eq!(model.notices.len(), 1);
        let notice = &model.notices[0];
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(
            notice.message.starts_with("Failed to load giveaways: network error"),
            "unexpected notice: {}",
            notice.message
        );
        assert!(render(&mut model).contains("Alpha Quest"));
    }

    #[test]
    fn superseded_response_is_discarded() {
        let (mut model, _, _) = model();
        let stale = model.tasks.begin(Source::Giveaways);
        let current = model.tasks.begin(Source::Giveaways);
        assert!(stale.is_cancelled());

        model.handle_async_response(AsyncResponse::Giveaways {
            request_id: stale.request_id(),
            result: Ok(vec![giveaway("Old", None)]),
        });
        assert!(model.giveaways.store.is_empty());
        assert!(model.tasks.is_pending(Source::Giveaways));

        model.handle_async_response(AsyncResponse::Giveaways {
            request_id: current.request_id(),
            result: Ok(vec![giveaway("New", None), giveaway("Newer", None)]),
        });
        assert_eq!(model.giveaways.store.len(), 2);
        assert!(!model.tasks.is_pending(Source::Giveaways));
    }

    #[test]
    fn open_after_filter_resolves_the_shown_record() {
        let (mut model, browser, _) = loaded_model();
        type_search(&mut model, "alp");
        assert_eq!(model.giveaways.store.len(), 2);
        assert_eq!(model.search_text(), "alp");

        model.handle_key(KeyCode::Char('j')).unwrap();
        model.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(
            *browser.opened.borrow(),
            vec!["https://gp/alpine-drift".to_string()]
        );
    }

    #[test]
    fn filter_keeps_cursor_on_the_same_record() {
        let (mut model, _, _) = loaded_model();
        model.handle_key(KeyCode::End).unwrap();
        assert_eq!(model.giveaways.selected(), Some(2));
        type_search(&mut model, "alp");
        let selected = model.giveaways.selected_record().unwrap();
        assert_eq!(selected.title.as_deref(), Some("Alpine Drift"));
    }

    #[test]
    fn refresh_resets_local_filter() {
        let (mut model, _, _) = loaded_model();
        type_search(&mut model, "beta");
        assert_eq!(model.giveaways.store.len(), 1);

        model.refresh_tab(Tab::Giveaways);
        settle(&mut model);
        assert_eq!(model.giveaways.store.len(), 3);
        assert_eq!(model.search_text(), "");
    }

    #[test]
    fn copy_without_selection_does_nothing() {
        let (mut model, _, clipboard) = loaded_model();
        type_search(&mut model, "no such game");
        assert_eq!(model.giveaways.selected(), None);

        model.handle_key(KeyCode::Char('y')).unwrap();
        model.handle_key(KeyCode::Enter).unwrap();
        assert!(clipboard.copied.borrow().is_empty());
        assert!(model.notices.is_empty());
    }

    #[test]
    fn copy_shows_an_info_notice() {
        let (mut model, _, clipboard) = loaded_model();
        model.handle_key(KeyCode::Char('2')).unwrap();
        model.handle_key(KeyCode::Char('y')).unwrap();
        assert_eq!(
            *clipboard.copied.borrow(),
            vec!["https://cs/redirect?dealID=p1".to_string()]
        );
        assert_eq!(
            model.notices.front(),
            Some(&Notice::info("Deal link copied to clipboard!"))
        );

        model.handle_key(KeyCode::Enter).unwrap();
        assert!(model.notices.is_empty());
    }

    #[test]
    fn deal_search_queries_the_server() {
        let (mut model, _, clipboard) = loaded_model();
        model.handle_key(KeyCode::Char('2')).unwrap();
        type_search(&mut model, "portal");
        assert!(model.tasks.is_pending(Source::Deals));
        settle(&mut model);

        assert_eq!(model.deals.store.total(), 1);
        assert_eq!(model.search_text(), "portal");

        model.handle_key(KeyCode::Char('Y')).unwrap();
        assert_eq!(
            clipboard.copied.borrow()[0],
            "Portal | Store: Steam | Sale: $4.99 | Normal: $19.99 | Savings: 75.0% | https://cs/redirect?dealID=p1"
        );
    }

    #[test]
    fn copy_all_with_no_deals_says_so() {
        let (mut model, _, clipboard) = loaded_model();
        model.handle_key(KeyCode::Char('2')).unwrap();
        type_search(&mut model, "zzz");
        settle(&mut model);

        model.handle_key(KeyCode::Char('Y')).unwrap();
        assert!(clipboard.copied.borrow().is_empty());
        assert_eq!(
            model.notices.front(),
            Some(&Notice::info("No deals to copy."))
        );
    }

    #[test]
    fn picker_changes_platform_and_refetches() {
        let (mut model, _, _) = loaded_model();
        model.handle_key(KeyCode::Char('f')).unwrap();
        assert_eq!(model.input_mode, InputMode::Picker { selected: 0 });
        model.handle_key(KeyCode::Char('j')).unwrap();
        model.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(model.platform, Platform::Pc);
        assert_eq!(model.input_mode, InputMode::Normal);
        assert!(model.tasks.is_pending(Source::Giveaways));
        settle(&mut model);
        assert_eq!(model.giveaways.store.len(), 3);
    }

    #[test]
    fn tab_keys_cycle() {
        let (mut model, _, _) = model();
        model.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(model.active_tab, Tab::Deals);
        model.handle_key(KeyCode::BackTab).unwrap();
        model.handle_key(KeyCode::BackTab).unwrap();
        assert_eq!(model.active_tab, Tab::News);
        model.handle_key(KeyCode::Char('1')).unwrap();
        assert_eq!(model.active_tab, Tab::Giveaways);
        assert!(model.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn news_detail_shows_full_summary() {
        let (mut model, _, _) = loaded_model();
        model.handle_key(KeyCode::Char('3')).unwrap();
        let screen = render(&mut model);
        assert!(screen.contains("Patch notes"));
        assert!(screen.contains("Balance changes"));
    }

    #[test]
    fn double_click_opens_the_row() {
        let (mut model, browser, _) = loaded_model();
        render(&mut model);
        let area = model.table_area.unwrap();
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: area.x + 2,
            row: area.y + 2,
            modifiers: crossterm::event::KeyModifiers::NONE,
        };
        model.handle_mouse(click).unwrap();
        assert_eq!(model.giveaways.selected(), Some(1));
        assert!(browser.opened.borrow().is_empty());

        model.handle_mouse(click).unwrap();
        assert_eq!(
            *browser.opened.borrow(),
            vec!["https://gp/beta-racer".to_string()]
        );
    }
}
