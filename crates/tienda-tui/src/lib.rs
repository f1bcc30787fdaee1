// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tienda_app::{
    ATTRIBUTE_SETS, Activity, ActivityId, AppCommand, AppState, CatalogCommand, CatalogMode,
    DashboardSummary, PRODUCT_STATUSES, PRODUCT_TYPES, PageSize, PageWindow, Product,
    ProductFormInput, ProductId, ProductPage, ProductUpdate, RowMenu, STOCK_STATUSES, Selection,
    SelectionPolicy, TabKind,
};
use time::OffsetDateTime;

const DEFAULT_STATUS_CLEAR_SECONDS: u64 = 4;

/// Outcome of one paged catalog read, tagged with the request that asked
/// for it.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Loaded(ProductPage),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    PageLoaded { request_id: u64, outcome: PageOutcome },
}

/// Everything the UI needs from the store, injected into `run_app` so tests
/// can substitute a fake. `spawn_page_load` may run the read on another
/// thread as long as the tagged event lands on the channel; the receiving
/// side drops any response whose id is not the latest issued.
pub trait AppRuntime {
    fn load_products_page(&mut self, offset: u64, limit: u64) -> Result<ProductPage>;
    fn load_product(&mut self, product_id: ProductId) -> Result<Option<Product>>;
    fn save_product(&mut self, product_id: ProductId, update: &ProductUpdate) -> Result<()>;
    fn load_dashboard_summary(&mut self) -> Result<DashboardSummary>;
    fn load_recent_activities(&mut self, limit: u64) -> Result<Vec<Activity>>;
    fn mark_activity_read(&mut self, activity_id: ActivityId) -> Result<()>;

    fn spawn_page_load(
        &mut self,
        request_id: u64,
        offset: u64,
        limit: u64,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let outcome = match self.load_products_page(offset, limit) {
            Ok(page) => PageOutcome::Loaded(page),
            Err(error) => PageOutcome::Failed(error.to_string()),
        };
        tx.send(InternalEvent::PageLoaded {
            request_id,
            outcome,
        })
        .map_err(|_| anyhow::anyhow!("page event channel closed"))?;
        Ok(())
    }
}

/// Startup knobs carried over from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub page_size: PageSize,
    pub status_clear_seconds: u64,
    pub selection_policy: SelectionPolicy,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            status_clear_seconds: DEFAULT_STATUS_CLEAR_SECONDS,
            selection_policy: SelectionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Name,
    Sku,
    AttributeSet,
    ProductStatus,
    TypeName,
    DesignNumber,
    Stock,
    Price,
    Status,
}

const FORM_FIELDS: [FormField; 9] = [
    FormField::Name,
    FormField::Sku,
    FormField::AttributeSet,
    FormField::ProductStatus,
    FormField::TypeName,
    FormField::DesignNumber,
    FormField::Stock,
    FormField::Price,
    FormField::Status,
];

impl FormField {
    const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Sku => "sku",
            Self::AttributeSet => "attribute set",
            Self::ProductStatus => "product status",
            Self::TypeName => "type",
            Self::DesignNumber => "design number",
            Self::Stock => "quantity",
            Self::Price => "price",
            Self::Status => "stock status",
        }
    }

    /// Fixed options for the cycling selects; text fields return `None`.
    fn choices(self) -> Option<&'static [&'static str]> {
        match self {
            Self::AttributeSet => Some(&ATTRIBUTE_SETS),
            Self::ProductStatus => Some(&PRODUCT_STATUSES),
            Self::TypeName => Some(&PRODUCT_TYPES),
            Self::Status => Some(&STOCK_STATUSES),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormUiState {
    input: ProductFormInput,
    field_index: usize,
}

impl FormUiState {
    fn new(input: ProductFormInput) -> Self {
        Self {
            input,
            field_index: 0,
        }
    }

    fn field(&self) -> FormField {
        FORM_FIELDS[self.field_index]
    }

    fn move_field(&mut self, delta: isize) {
        let len = FORM_FIELDS.len() as isize;
        let next = (self.field_index as isize + delta).rem_euclid(len);
        self.field_index = next as usize;
    }

    fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.input.name,
            FormField::Sku => &self.input.sku,
            FormField::AttributeSet => &self.input.attribute_set,
            FormField::ProductStatus => &self.input.product_status,
            FormField::TypeName => &self.input.type_name,
            FormField::DesignNumber => &self.input.design_number,
            FormField::Stock => &self.input.stock,
            FormField::Price => &self.input.price,
            FormField::Status => &self.input.status,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.input.name,
            FormField::Sku => &mut self.input.sku,
            FormField::AttributeSet => &mut self.input.attribute_set,
            FormField::ProductStatus => &mut self.input.product_status,
            FormField::TypeName => &mut self.input.type_name,
            FormField::DesignNumber => &mut self.input.design_number,
            FormField::Stock => &mut self.input.stock,
            FormField::Price => &mut self.input.price,
            FormField::Status => &mut self.input.status,
        }
    }

    fn cycle_choice(&mut self, delta: isize) {
        let field = self.field();
        let Some(choices) = field.choices() else {
            return;
        };
        let current = self.value(field);
        let position = choices
            .iter()
            .position(|choice| *choice == current)
            .unwrap_or(0) as isize;
        let next = (position + delta).rem_euclid(choices.len() as isize) as usize;
        *self.value_mut(field) = choices[next].to_owned();
    }

    fn push_char(&mut self, ch: char) {
        let field = self.field();
        if field.choices().is_some() {
            return;
        }
        self.value_mut(field).push(ch);
    }

    fn pop_char(&mut self) {
        let field = self.field();
        if field.choices().is_some() {
            return;
        }
        self.value_mut(field).pop();
    }
}

/// Catalog tab state. `in_flight` holds the id of the latest issued page
/// request; any `PageLoaded` carrying another id is stale and dropped.
#[derive(Debug, Clone, PartialEq, Default)]
struct CatalogViewState {
    window: PageWindow,
    selection: Selection,
    rows: Vec<Product>,
    total_count: u64,
    cursor: usize,
    menu: RowMenu,
    mode: CatalogMode,
    form: Option<FormUiState>,
    in_flight: Option<u64>,
    next_request_id: u64,
}

impl CatalogViewState {
    fn cursor_row(&self) -> Option<&Product> {
        self.rows.get(self.cursor)
    }

    fn visible_ids(&self) -> Vec<ProductId> {
        self.rows.iter().map(|product| product.id).collect()
    }

    fn clamp_cursor(&mut self) {
        if self.rows.is_empty() {
            self.cursor = 0;
        } else if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len() - 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    catalog: CatalogViewState,
    summary: DashboardSummary,
    activities: Vec<Activity>,
    activity_cursor: usize,
    order_cursor: usize,
    help_visible: bool,
    status_token: u64,
    status_clear_seconds: u64,
}

impl ViewData {
    fn new(options: UiOptions) -> Self {
        Self {
            catalog: CatalogViewState {
                window: PageWindow::new(options.page_size),
                selection: Selection::new(options.selection_policy),
                ..CatalogViewState::default()
            },
            status_clear_seconds: options.status_clear_seconds,
            ..Self::default()
        }
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(options);
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_summary(runtime, &mut view_data) {
        state.set_status(&format!("dashboard load failed: {error}"));
    }
    issue_page_load(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::PageLoaded {
                request_id,
                outcome,
            } => {
                handle_page_loaded(state, view_data, tx, request_id, outcome);
            }
        }
    }
}

fn handle_page_loaded(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    request_id: u64,
    outcome: PageOutcome,
) {
    let catalog = &mut view_data.catalog;
    if catalog.in_flight != Some(request_id) {
        return;
    }
    catalog.in_flight = None;

    match outcome {
        PageOutcome::Loaded(page) => {
            catalog.rows = page.rows;
            catalog.total_count = page.total_count;
            catalog.selection.on_page_loaded();
            catalog.clamp_cursor();
        }
        PageOutcome::Failed(error) => {
            // Previous rows and count stay on screen.
            emit_status(
                state,
                view_data,
                tx,
                format!("product fetch failed: {error} -- check the store and retry"),
            );
        }
    }
}

/// Issues a fresh tagged page request. Any response still in flight for an
/// older request becomes stale the moment the new id is recorded.
fn issue_page_load<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let catalog = &mut view_data.catalog;
    catalog.next_request_id += 1;
    let request_id = catalog.next_request_id;
    catalog.in_flight = Some(request_id);

    let offset = catalog.window.offset();
    let limit = catalog.window.limit();
    if let Err(error) = runtime.spawn_page_load(request_id, offset, limit, internal_tx.clone()) {
        view_data.catalog.in_flight = None;
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("product fetch failed: {error} -- check the store and retry"),
        );
    }
}

fn refresh_summary<R: AppRuntime>(runtime: &mut R, view_data: &mut ViewData) -> Result<()> {
    view_data.summary = runtime.load_dashboard_summary()?;
    view_data.activities = runtime.load_recent_activities(20)?;
    if view_data.activity_cursor >= view_data.activities.len() {
        view_data.activity_cursor = view_data.activities.len().saturating_sub(1);
    }
    if view_data.order_cursor >= view_data.summary.recent_orders.len() {
        view_data.order_cursor = view_data.summary.recent_orders.len().saturating_sub(1);
    }
    Ok(())
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64, seconds: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(seconds));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.set_status(&message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token, view_data.status_clear_seconds);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if state.active_tab == TabKind::Products {
        match view_data.catalog.mode {
            CatalogMode::Editing(_) => {
                handle_form_key(state, runtime, view_data, internal_tx, key);
                return false;
            }
            CatalogMode::Missing(_) => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('b')) {
                    view_data.catalog.mode.dispatch(CatalogCommand::GoBack);
                }
                return false;
            }
            CatalogMode::Loading(_) => {
                if key.code == KeyCode::Esc {
                    view_data.catalog.mode.dispatch(CatalogCommand::CancelEdit);
                }
                return false;
            }
            CatalogMode::Listing => {}
        }

        if view_data.catalog.menu.open_row().is_some() {
            handle_menu_key(state, runtime, view_data, internal_tx, key);
            return false;
        }
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => {
            view_data.help_visible = true;
            return false;
        }
        KeyCode::Tab | KeyCode::Char('f') => {
            switch_tab(state, runtime, view_data, internal_tx, AppCommand::NextTab);
            return false;
        }
        KeyCode::BackTab | KeyCode::Char('b') => {
            switch_tab(state, runtime, view_data, internal_tx, AppCommand::PrevTab);
            return false;
        }
        KeyCode::Char(ch @ '1'..='4') => {
            let index = ch as usize - '1' as usize;
            switch_tab(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::GoToTab(TabKind::ALL[index]),
            );
            return false;
        }
        _ => {}
    }

    match state.active_tab {
        TabKind::Products => handle_catalog_key(state, runtime, view_data, internal_tx, key),
        TabKind::Orders => handle_orders_key(view_data, key),
        TabKind::Notifications => {
            handle_notifications_key(state, runtime, view_data, internal_tx, key)
        }
        TabKind::Dashboard => {}
    }
    false
}

fn switch_tab<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    state.dispatch(command);
    match state.active_tab {
        TabKind::Products => issue_page_load(state, runtime, view_data, internal_tx),
        TabKind::Dashboard | TabKind::Orders | TabKind::Notifications => {
            if let Err(error) = refresh_summary(runtime, view_data) {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("dashboard load failed: {error}"),
                );
            }
        }
    }
}

fn handle_catalog_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.catalog.cursor = view_data.catalog.cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_data.catalog.cursor += 1;
            view_data.catalog.clamp_cursor();
        }
        KeyCode::Char(' ') => {
            if let Some(product) = view_data.catalog.cursor_row() {
                let id = product.id;
                view_data.catalog.selection.toggle(id);
            }
        }
        KeyCode::Char('a') => {
            let visible = view_data.catalog.visible_ids();
            view_data.catalog.selection.toggle_all(&visible);
        }
        KeyCode::Char('m') => {
            if let Some(product) = view_data.catalog.cursor_row() {
                let id = product.id;
                view_data.catalog.menu.toggle(id);
            }
        }
        KeyCode::Char('n') => {
            let total = view_data.catalog.total_count;
            if view_data.catalog.window.next(total) {
                issue_page_load(state, runtime, view_data, internal_tx);
            } else {
                emit_status(state, view_data, internal_tx, "already on the last page");
            }
        }
        KeyCode::Char('p') => {
            if view_data.catalog.window.prev() {
                issue_page_load(state, runtime, view_data, internal_tx);
            } else {
                emit_status(state, view_data, internal_tx, "already on the first page");
            }
        }
        KeyCode::Char('s') => {
            let next = view_data.catalog.window.page_size().cycled();
            if view_data.catalog.window.set_page_size(next) {
                issue_page_load(state, runtime, view_data, internal_tx);
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("page size {}", next.as_str()),
                );
            }
        }
        KeyCode::Char('r') => {
            issue_page_load(state, runtime, view_data, internal_tx);
        }
        _ => {}
    }
}

fn handle_menu_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(id) = view_data.catalog.menu.open_row() {
                view_data.catalog.menu.close();
                begin_edit(state, runtime, view_data, internal_tx, id);
            }
        }
        KeyCode::Esc | KeyCode::Char('m') => {
            view_data.catalog.menu.close();
        }
        _ => {}
    }
}

/// Fetch failure and a zero-row read both end in the not-found view; the
/// user is not told which happened.
fn begin_edit<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    id: ProductId,
) {
    view_data.catalog.mode.dispatch(CatalogCommand::RequestEdit(id));
    match runtime.load_product(id) {
        Ok(Some(product)) => {
            view_data.catalog.mode.dispatch(CatalogCommand::RecordLoaded(id));
            view_data.catalog.form = Some(FormUiState::new(ProductFormInput::from_product(
                &product,
            )));
        }
        Ok(None) => {
            view_data
                .catalog
                .mode
                .dispatch(CatalogCommand::RecordUnavailable(id));
            view_data.catalog.form = None;
        }
        Err(error) => {
            view_data
                .catalog
                .mode
                .dispatch(CatalogCommand::RecordUnavailable(id));
            view_data.catalog.form = None;
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("product load failed: {error}"),
            );
        }
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.catalog.mode.dispatch(CatalogCommand::CancelEdit);
            view_data.catalog.form = None;
        }
        KeyCode::Enter => submit_edit(state, runtime, view_data, internal_tx),
        KeyCode::Up => {
            if let Some(form) = view_data.catalog.form.as_mut() {
                form.move_field(-1);
            }
        }
        KeyCode::Down => {
            if let Some(form) = view_data.catalog.form.as_mut() {
                form.move_field(1);
            }
        }
        KeyCode::Left => {
            if let Some(form) = view_data.catalog.form.as_mut() {
                form.cycle_choice(-1);
            }
        }
        KeyCode::Right => {
            if let Some(form) = view_data.catalog.form.as_mut() {
                form.cycle_choice(1);
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = view_data.catalog.form.as_mut() {
                form.pop_char();
            }
        }
        KeyCode::Char(ch) => {
            if let Some(form) = view_data.catalog.form.as_mut() {
                form.push_char(ch);
            }
        }
        _ => {}
    }
}

/// Save is a single update carrying every editable field. Any failure keeps
/// the form and its raw text intact for the retry.
fn submit_edit<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(id) = view_data.catalog.mode.editing_row() else {
        return;
    };
    let Some(form) = &view_data.catalog.form else {
        return;
    };

    let update = match form.input.to_update() {
        Ok(update) => update,
        Err(error) => {
            view_data.catalog.mode.dispatch(CatalogCommand::SaveFailed);
            emit_status(state, view_data, internal_tx, error.to_string());
            return;
        }
    };

    match runtime.save_product(id, &update) {
        Ok(()) => {
            view_data.catalog.mode.dispatch(CatalogCommand::SaveSucceeded);
            view_data.catalog.form = None;
            emit_status(state, view_data, internal_tx, "product saved");
            issue_page_load(state, runtime, view_data, internal_tx);
        }
        Err(error) => {
            view_data.catalog.mode.dispatch(CatalogCommand::SaveFailed);
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("save failed: {error}"),
            );
        }
    }
}

fn handle_orders_key(view_data: &mut ViewData, key: KeyEvent) {
    let len = view_data.summary.recent_orders.len();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.order_cursor = view_data.order_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view_data.order_cursor + 1 < len {
                view_data.order_cursor += 1;
            }
        }
        _ => {}
    }
}

fn handle_notifications_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.activity_cursor = view_data.activity_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view_data.activity_cursor + 1 < view_data.activities.len() {
                view_data.activity_cursor += 1;
            }
        }
        KeyCode::Char('r') => {
            let Some(activity) = view_data.activities.get(view_data.activity_cursor) else {
                return;
            };
            let id = activity.id;
            match runtime.mark_activity_read(id) {
                Ok(()) => {
                    if let Some(activity) = view_data
                        .activities
                        .iter_mut()
                        .find(|activity| activity.id == id)
                    {
                        activity.is_read = true;
                    }
                }
                Err(error) => {
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("mark read failed: {error}"),
                    );
                }
            }
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tab_titles = TabKind::ALL
        .iter()
        .map(|tab| tab.label().to_owned())
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("tienda").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match state.active_tab {
        TabKind::Dashboard => {
            let body = Paragraph::new(render_dashboard_text(&view_data.summary))
                .block(Block::default().borders(Borders::ALL).title("dashboard"));
            frame.render_widget(body, layout[1]);
        }
        TabKind::Products => render_catalog(frame, layout[1], view_data),
        TabKind::Orders => render_orders(frame, layout[1], view_data),
        TabKind::Notifications => render_notifications(frame, layout[1], view_data),
    }

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if state.active_tab == TabKind::Products {
        if let Some(id) = view_data.catalog.menu.open_row() {
            let area = centered_rect(40, 28, frame.area());
            frame.render_widget(Clear, area);
            let menu = Paragraph::new(render_row_menu_text(view_data, id))
                .block(Block::default().title("actions").borders(Borders::ALL));
            frame.render_widget(menu, area);
        }

        if view_data.catalog.mode.editing_row().is_some() {
            let area = centered_rect(64, 62, frame.area());
            frame.render_widget(Clear, area);
            let form = Paragraph::new(render_form_text(view_data)).block(
                Block::default()
                    .title("edit product")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
            frame.render_widget(form, area);
        }

        if let CatalogMode::Missing(id) = view_data.catalog.mode {
            let area = centered_rect(52, 32, frame.area());
            frame.render_widget(Clear, area);
            let missing = Paragraph::new(render_missing_text(id))
                .block(Block::default().title("not found").borders(Borders::ALL));
            frame.render_widget(missing, area);
        }
    }

    if view_data.help_visible {
        let area = centered_rect(70, 68, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_catalog(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(area);

    let catalog = &view_data.catalog;
    let columns = [
        "", "#", "name", "set", "status", "approval", "type", "design", "sku", "qty", "price",
        "created",
    ];
    let header_cells = columns.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let rows = catalog.rows.iter().enumerate().map(|(index, product)| {
        let mark = if catalog.selection.is_checked(product.id) {
            "[x]"
        } else {
            "[ ]"
        };
        let cells = vec![
            mark.to_owned(),
            catalog.window.display_row_number(index).to_string(),
            product.name.clone(),
            product.attribute_set.clone(),
            product.product_status.clone(),
            product.approval_status.clone(),
            product.type_name.clone(),
            product.design_number.clone(),
            product.sku.clone(),
            product.stock.to_string(),
            format_amount(product.price),
            format_date(product.created_at),
        ];

        let mut style = Style::default();
        if index == catalog.cursor {
            style = style.bg(Color::DarkGray);
        }
        Row::new(cells.into_iter().map(Cell::from)).style(style)
    });

    let widths = [
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Min(18),
        Constraint::Length(9),
        Constraint::Length(8),
        Constraint::Length(9),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(13),
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Length(11),
    ];
    let table = Table::new(rows, widths).header(header).column_spacing(1).block(
        Block::default()
            .title(format!("{} records found", catalog.total_count))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, split[0]);

    let footer = Paragraph::new(catalog_footer_text(catalog));
    frame.render_widget(footer, split[1]);
}

fn catalog_footer_text(catalog: &CatalogViewState) -> String {
    let (first, last) = catalog.window.shown_range(catalog.total_count);
    let total_pages = catalog.window.total_pages(catalog.total_count);
    let prev = if catalog.window.can_prev() {
        "p: prev"
    } else {
        "p: -"
    };
    let next = if catalog.window.can_next(catalog.total_count) {
        "n: next"
    } else {
        "n: -"
    };
    format!(
        "Showing {first} to {last} of {} | page {} of {total_pages} | {prev} | {next} | size {} (s cycles) | {} selected",
        catalog.total_count,
        catalog.window.page(),
        catalog.window.page_size().as_str(),
        catalog.selection.count(),
    )
}

fn render_dashboard_text(summary: &DashboardSummary) -> String {
    let mut lines = vec![
        format!("products: {}", summary.product_count),
        format!("lifetime sales: {}", format_amount(summary.lifetime_sales)),
        format!("completed transactions: {}", summary.completed_transactions),
        format!("returns: {}", summary.returns_count),
        format!("shipments in transit: {}", summary.shipments_in_transit),
        format!(
            "reviews: {} (avg {:.1})",
            summary.review_count, summary.average_rating
        ),
        String::new(),
        "recent orders:".to_owned(),
    ];
    if summary.recent_orders.is_empty() {
        lines.push("  (none)".to_owned());
    }
    for order in &summary.recent_orders {
        lines.push(format!(
            "  {}  {}  {}  {}",
            order.order_number,
            order.customer_name,
            format_amount(order.total_amount),
            order.status,
        ));
    }
    lines.push(String::new());
    lines.push("recent activity:".to_owned());
    if summary.activities.is_empty() {
        lines.push("  (none)".to_owned());
    }
    for activity in &summary.activities {
        lines.push(format!("  [{}] {}", activity.kind.as_str(), activity.title));
    }
    lines.join("\n")
}

fn render_orders(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let columns = ["order", "customer", "total", "status", "date"];
    let header_cells = columns.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let rows = view_data
        .summary
        .recent_orders
        .iter()
        .enumerate()
        .map(|(index, order)| {
            let cells = vec![
                order.order_number.clone(),
                order.customer_name.clone(),
                format_amount(order.total_amount),
                order.status.clone(),
                format_date(order.order_date),
            ];
            let mut style = Style::default();
            if index == view_data.order_cursor {
                style = style.bg(Color::DarkGray);
            }
            Row::new(cells.into_iter().map(Cell::from)).style(style)
        });

    let widths = [
        Constraint::Length(10),
        Constraint::Min(16),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(11),
    ];
    let table = Table::new(rows, widths).header(header).column_spacing(1).block(
        Block::default()
            .title(format!(
                "orders ({})",
                view_data.summary.recent_orders.len()
            ))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn render_notifications(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let mut lines = Vec::with_capacity(view_data.activities.len() + 1);
    if view_data.activities.is_empty() {
        lines.push("no notifications".to_owned());
    }
    for (index, activity) in view_data.activities.iter().enumerate() {
        let marker = if index == view_data.activity_cursor {
            ">"
        } else {
            " "
        };
        let read = if activity.is_read { " " } else { "*" };
        lines.push(format!(
            "{marker} {read} [{}] {}  {}",
            activity.kind.as_str(),
            activity.title,
            activity.description,
        ));
    }
    let body = Paragraph::new(lines.join("\n")).block(
        Block::default()
            .title("alerts (r marks read)")
            .borders(Borders::ALL),
    );
    frame.render_widget(body, area);
}

fn render_row_menu_text(view_data: &ViewData, id: ProductId) -> String {
    let name = view_data
        .catalog
        .rows
        .iter()
        .find(|product| product.id == id)
        .map(|product| product.name.as_str())
        .unwrap_or("(row)");
    format!("{name}\n\n  e    edit\n  esc  close")
}

fn render_form_text(view_data: &ViewData) -> String {
    let Some(form) = &view_data.catalog.form else {
        return String::new();
    };
    let mut lines = Vec::with_capacity(FORM_FIELDS.len() + 2);
    for (index, field) in FORM_FIELDS.iter().enumerate() {
        let marker = if index == form.field_index { ">" } else { " " };
        let value = form.value(*field);
        if field.choices().is_some() {
            lines.push(format!("{marker} {:>13}: < {value} >", field.label()));
        } else {
            lines.push(format!("{marker} {:>13}: {value}", field.label()));
        }
    }
    lines.push(String::new());
    lines.push("up/down: field  left/right: option  enter: save  esc: cancel".to_owned());
    lines.join("\n")
}

fn render_missing_text(id: ProductId) -> String {
    format!(
        "product {} not found\n\nthe record may have been removed\n\npress esc to go back",
        id.get()
    )
}

fn help_overlay_text() -> String {
    [
        "tab/f     next tab        shift-tab/b  previous tab",
        "1-4       jump to tab     q / ctrl-q   quit",
        "",
        "products:",
        "  up/down  move cursor    space  toggle selection",
        "  a        toggle page    m      row actions",
        "  n/p      next/prev page s      cycle page size",
        "  r        reload page",
        "",
        "edit form:",
        "  up/down  move field     left/right  cycle option",
        "  enter    save           esc         cancel",
        "",
        "alerts:",
        "  r        mark read",
        "",
        "esc or ? closes this help",
    ]
    .join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if let Some(line) = &state.status_line {
        return line.clone();
    }
    match state.active_tab {
        TabKind::Products => {
            if view_data.catalog.in_flight.is_some() {
                "loading products...".to_owned()
            } else {
                "space: select  a: all  m: menu  n/p: page  s: size  ?: help".to_owned()
            }
        }
        TabKind::Notifications => "r: mark read  ?: help".to_owned(),
        _ => "tab: switch  ?: help  q: quit".to_owned(),
    }
}

fn format_amount(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let whole = (cents / 100).abs();
    let frac = (cents % 100).abs();

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if cents < 0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac:02}")
    }
}

fn format_date(datetime: OffsetDateTime) -> String {
    datetime.date().to_string()
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
