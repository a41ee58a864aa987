use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate, Timelike};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use rand::seq::SliceRandom;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use tracing::{info, warn};

use crate::api::RevenueEndpoint;
use crate::cli::report::view::{
    chart_legend, products_table, render_revenue_chart, revenue_table, sales_table,
};
use crate::dates::{parse_iso_date, DateRange, DateRangeInput, DigitDateEntry, RangeField};
use crate::error::Result;
use crate::fetcher::JsonSource;
use crate::fmt::{br_date, reais};
use crate::goals::GoalThresholds;
use crate::models::Vocabulary;
use crate::presenter::{spawn_job, FetchState, Presenter, Ticket};
use crate::reports::{self, ChartScale, GroupTotal, ProductReport, RevenueReport, SalesReport};
use crate::settings::{load_settings, Settings};
use crate::tui::{wrap_text, ERROR_STYLE, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE};

const GREETINGS: &[&str] = &[
    "Vamos ver como estão as vendas.",
    "Bora bater a meta!",
    "Os números do dia estão chegando.",
    "Cada pedido conta.",
    "Foco na meta do mês.",
    "Mais um dia, mais um pedido.",
];

const POLL_INTERVAL: Duration = Duration::from_millis(100);

type SharedSource = Arc<dyn JsonSource + Send + Sync>;

fn greeting(hour: u32) -> String {
    let salute = match hour {
        5..=11 => "Bom dia",
        12..=17 => "Boa tarde",
        _ => "Boa noite",
    };
    let phrase = GREETINGS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default();
    format!("Painel: {salute}! {phrase}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Pedidos,
    Faturamento,
    Produtos,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Pedidos, Tab::Faturamento, Tab::Produtos];

    fn title(self) -> &'static str {
        match self {
            Tab::Pedidos => "Pedidos",
            Tab::Faturamento => "Faturamento",
            Tab::Produtos => "Produtos",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn prev(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Results posted back by fetch workers.
enum Message {
    Sales(Ticket, Result<SalesReport>),
    Revenue(Ticket, Result<RevenueReport>),
    Products(Ticket, Result<ProductReport>),
}

// ---------------------------------------------------------------------------
// Per-tab state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SalesField {
    Date,
    Meta,
    Dias,
}

struct SalesTab {
    date: DigitDateEntry,
    meta: String,
    dias: String,
    focus: SalesField,
    /// Last thresholds computed from valid field text.
    goals: GoalThresholds,
    offset: usize,
    presenter: Presenter<SalesReport>,
}

/// Two ISO date fields feeding a [`DateRangeInput`].
struct RangeFields {
    input: DateRangeInput,
    start_text: String,
    end_text: String,
    focus: RangeField,
}

impl RangeFields {
    fn new(range: DateRange) -> Self {
        Self {
            input: DateRangeInput::from_range(range),
            start_text: range.start.format("%Y-%m-%d").to_string(),
            end_text: range.end.format("%Y-%m-%d").to_string(),
            focus: RangeField::Start,
        }
    }

    fn text(&self, field: RangeField) -> &str {
        match field {
            RangeField::Start => &self.start_text,
            RangeField::End => &self.end_text,
        }
    }

    fn text_mut(&mut self) -> &mut String {
        match self.focus {
            RangeField::Start => &mut self.start_text,
            RangeField::End => &mut self.end_text,
        }
    }

    /// Commit the focused field. `Ok(Some)` means the range changed and is
    /// ready to fetch.
    fn commit(&mut self) -> std::result::Result<Option<DateRange>, String> {
        let text = self.text(self.focus).to_string();
        if !self.input.set(self.focus, &text) {
            // Unchanged, or rejected and already logged.
            return parse_iso_date(&text).map(|_| None).map_err(|e| e.to_string());
        }
        match self.input.range() {
            Some(range) => Ok(Some(range)),
            None => Err(
                match (self.input.get(RangeField::Start), self.input.get(RangeField::End)) {
                    (Some(start), Some(end)) => format!(
                        "Início {} depois do fim {}; nada foi buscado",
                        br_date(start),
                        br_date(end)
                    ),
                    _ => "Período incompleto; nada foi buscado".to_string(),
                },
            ),
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> std::result::Result<Option<DateRange>, String> {
        match code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    RangeField::Start => RangeField::End,
                    RangeField::End => RangeField::Start,
                };
                Ok(None)
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                let text = self.text_mut();
                if text.len() < 10 {
                    text.push(c);
                }
                if text.len() == 10 {
                    self.commit()
                } else {
                    Ok(None)
                }
            }
            KeyCode::Backspace => {
                self.text_mut().pop();
                Ok(None)
            }
            KeyCode::Enter => self.commit(),
            _ => Ok(None),
        }
    }
}

struct RevenueTab {
    fields: RangeFields,
    endpoint: RevenueEndpoint,
    scale: ChartScale,
    offset: usize,
    presenter: Presenter<RevenueReport>,
}

struct ProductsTab {
    fields: RangeFields,
    offset: usize,
    presenter: Presenter<ProductReport>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

struct Dashboard {
    greeting: String,
    tab: Tab,
    orders: SharedSource,
    revenue_source: SharedSource,
    vocabulary: Vocabulary,
    sales: SalesTab,
    revenue: RevenueTab,
    products: ProductsTab,
    tx: Sender<Message>,
    status_message: Option<String>,
}

impl Dashboard {
    fn new(
        settings: &Settings,
        orders: SharedSource,
        revenue_source: SharedSource,
        tx: Sender<Message>,
        today: NaiveDate,
    ) -> Result<Self> {
        let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
        let month = DateRange {
            start: month_start,
            end: today,
        };
        let goals = settings.goals().or_else(|e| {
            warn!("invalid goal settings, using defaults: {e}");
            Settings::default().goals()
        })?;
        Ok(Self {
            greeting: greeting(Local::now().hour()),
            tab: Tab::Pedidos,
            orders,
            revenue_source,
            vocabulary: settings.vocabulary(),
            sales: SalesTab {
                date: DigitDateEntry::with_date(today),
                meta: goals.monthly.to_string(),
                dias: goals.business_days.to_string(),
                focus: SalesField::Date,
                goals,
                offset: 0,
                presenter: Presenter::new("pedidos"),
            },
            revenue: RevenueTab {
                fields: RangeFields::new(month),
                endpoint: RevenueEndpoint::default(),
                scale: ChartScale::default(),
                offset: 0,
                presenter: Presenter::new("faturamento"),
            },
            products: ProductsTab {
                fields: RangeFields::new(month),
                offset: 0,
                presenter: Presenter::new("produtos"),
            },
            tx,
            status_message: None,
        })
    }

    // -- fetching -----------------------------------------------------------

    fn fetch_sales(&mut self) {
        let Some(date) = self.sales.date.committed() else {
            return;
        };
        if let Ok(g) = GoalThresholds::from_inputs(&self.sales.meta, &self.sales.dias) {
            self.sales.goals = g;
        }
        let goals = self.sales.goals;
        let source = Arc::clone(&self.orders);
        self.sales.offset = 0;
        let ticket = self.sales.presenter.begin();
        spawn_job(
            &self.tx,
            ticket,
            move || reports::get_sales(source.as_ref(), date, &goals),
            Message::Sales,
        );
    }

    fn fetch_revenue(&mut self) {
        let Some(range) = self.revenue.fields.input.range() else {
            return;
        };
        let endpoint = self.revenue.endpoint;
        let vocabulary = self.vocabulary.clone();
        let source = Arc::clone(&self.revenue_source);
        self.revenue.offset = 0;
        let ticket = self.revenue.presenter.begin();
        spawn_job(
            &self.tx,
            ticket,
            move || reports::get_revenue(source.as_ref(), endpoint, range, &vocabulary),
            Message::Revenue,
        );
    }

    fn fetch_products(&mut self) {
        let Some(range) = self.products.fields.input.range() else {
            return;
        };
        let source = Arc::clone(&self.orders);
        self.products.offset = 0;
        let ticket = self.products.presenter.begin();
        spawn_job(
            &self.tx,
            ticket,
            move || reports::get_products(source.as_ref(), range),
            Message::Products,
        );
    }

    fn fetch_all(&mut self) {
        self.fetch_sales();
        self.fetch_revenue();
        self.fetch_products();
    }

    fn apply(&mut self, msg: Message) -> bool {
        match msg {
            Message::Sales(t, r) => self.sales.presenter.complete(t, r),
            Message::Revenue(t, r) => self.revenue.presenter.complete(t, r),
            Message::Products(t, r) => self.products.presenter.complete(t, r),
        }
    }

    // -- keys ---------------------------------------------------------------

    /// Returns true when the dashboard should close.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        self.status_message = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => self.tab = self.tab.prev(),
            KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::F(n @ 1..=3) => self.tab = Tab::ALL[usize::from(n - 1)],
            KeyCode::Char('r') => match self.tab {
                Tab::Pedidos => self.fetch_sales(),
                Tab::Faturamento => self.fetch_revenue(),
                Tab::Produtos => self.fetch_products(),
            },
            KeyCode::Up => {
                let offset = self.offset_mut();
                *offset = offset.saturating_sub(1);
            }
            KeyCode::Down => {
                let offset = self.offset_mut();
                *offset += 1;
            }
            other => match self.tab {
                Tab::Pedidos => self.sales_key(other),
                Tab::Faturamento => self.revenue_key(other),
                Tab::Produtos => self.products_key(other),
            },
        }
        false
    }

    fn offset_mut(&mut self) -> &mut usize {
        match self.tab {
            Tab::Pedidos => &mut self.sales.offset,
            Tab::Faturamento => &mut self.revenue.offset,
            Tab::Produtos => &mut self.products.offset,
        }
    }

    fn sales_key(&mut self, code: KeyCode) {
        let tab = &mut self.sales;
        match code {
            KeyCode::Tab => {
                tab.focus = match tab.focus {
                    SalesField::Date => SalesField::Meta,
                    SalesField::Meta => SalesField::Dias,
                    SalesField::Dias => SalesField::Date,
                }
            }
            KeyCode::BackTab => {
                tab.focus = match tab.focus {
                    SalesField::Date => SalesField::Dias,
                    SalesField::Meta => SalesField::Date,
                    SalesField::Dias => SalesField::Meta,
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() => match tab.focus {
                SalesField::Date => {
                    if tab.date.push(c).is_some() {
                        self.fetch_sales();
                    }
                }
                SalesField::Meta => tab.meta.push(c),
                SalesField::Dias => tab.dias.push(c),
            },
            KeyCode::Char('.' | ',') if tab.focus == SalesField::Meta => {
                if !tab.meta.contains('.') {
                    tab.meta.push('.');
                }
            }
            KeyCode::Backspace => match tab.focus {
                SalesField::Date => tab.date.backspace(),
                SalesField::Meta => {
                    tab.meta.pop();
                }
                SalesField::Dias => {
                    tab.dias.pop();
                }
            },
            KeyCode::Enter => match tab.focus {
                SalesField::Date => {
                    if tab.date.committed().is_some() {
                        self.fetch_sales();
                    }
                }
                SalesField::Meta | SalesField::Dias => {
                    match GoalThresholds::from_inputs(&tab.meta, &tab.dias) {
                        Ok(_) => self.fetch_sales(),
                        Err(e) => self.status_message = Some(e.to_string()),
                    }
                }
            },
            _ => {}
        }
    }

    fn revenue_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('e') => {
                self.revenue.endpoint = self.revenue.endpoint.next();
                self.fetch_revenue();
            }
            KeyCode::Char('s') => self.revenue.scale = self.revenue.scale.next(),
            other => match self.revenue.fields.handle_key(other) {
                Ok(Some(_)) => self.fetch_revenue(),
                Ok(None) => {}
                Err(msg) => {
                    // Old data no longer matches the range on screen.
                    if self.revenue.fields.input.range().is_none() {
                        self.revenue.presenter.reset();
                    }
                    self.status_message = Some(msg);
                }
            },
        }
    }

    fn products_key(&mut self, code: KeyCode) {
        match self.products.fields.handle_key(code) {
            Ok(Some(_)) => self.fetch_products(),
            Ok(None) => {}
            Err(msg) => {
                if self.products.fields.input.range().is_none() {
                    self.products.presenter.reset();
                }
                self.status_message = Some(msg);
            }
        }
    }

    // -- drawing ------------------------------------------------------------

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, tabs_area, sep1, fields_area, sep2, content_area, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
            ])
            .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" {}", self.greeting)).style(HEADER_STYLE),
            header_area,
        );
        frame.render_widget(Paragraph::new(self.tabs_line()), tabs_area);

        let sep_line = "━".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget, sep2);

        match self.tab {
            Tab::Pedidos => self.draw_sales(frame, fields_area, content_area),
            Tab::Faturamento => self.draw_revenue(frame, fields_area, content_area),
            Tab::Produtos => self.draw_products(frame, fields_area, content_area),
        }

        if let Some(msg) = &self.status_message {
            frame.render_widget(
                Paragraph::new(format!(" {msg}")).style(Style::default().fg(Color::Yellow)),
                hints_area,
            );
        } else {
            let extra = match self.tab {
                Tab::Faturamento => "e=endpoint  s=escala  ",
                _ => "",
            };
            frame.render_widget(
                Paragraph::new(format!(
                    " \u{2190}/\u{2192}=aba  Tab=campo  Enter=aplicar  r=atualizar  {extra}\u{2191}/\u{2193}=rolar  q=sair"
                ))
                .style(FOOTER_STYLE),
                hints_area,
            );
        }
    }

    fn is_loading(&self, tab: Tab) -> bool {
        match tab {
            Tab::Pedidos => self.sales.presenter.is_loading(),
            Tab::Faturamento => self.revenue.presenter.is_loading(),
            Tab::Produtos => self.products.presenter.is_loading(),
        }
    }

    /// Tab titles; a tab still waiting on the backend gets a trailing "…".
    fn tabs_line(&self) -> Line<'static> {
        let mut spans = vec![Span::raw(" ")];
        for (i, tab) in Tab::ALL.iter().enumerate() {
            let marker = if self.is_loading(*tab) { " …" } else { "" };
            let label = format!(" F{} {}{marker} ", i + 1, tab.title());
            if *tab == self.tab {
                spans.push(Span::styled(label, SELECTED_STYLE));
            } else {
                spans.push(Span::styled(label, FOOTER_STYLE));
            }
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }

    fn draw_sales(&mut self, frame: &mut Frame, fields_area: Rect, content_area: Rect) {
        let tab = &mut self.sales;
        // Thresholds follow the field text on every draw.
        let goal_error = match GoalThresholds::from_inputs(&tab.meta, &tab.dias) {
            Ok(g) => {
                tab.goals = g;
                None
            }
            Err(e) => Some(e.to_string()),
        };

        let mut spans = Vec::new();
        spans.extend(field_spans("Data", tab.date.display(), tab.focus == SalesField::Date));
        spans.extend(field_spans("Meta mensal", tab.meta.clone(), tab.focus == SalesField::Meta));
        spans.extend(field_spans("Dias úteis", tab.dias.clone(), tab.focus == SalesField::Dias));
        frame.render_widget(Paragraph::new(Line::from(spans)), fields_area);

        let Some(report) = ready_or_placeholder(frame, content_area, tab.presenter.state()) else {
            return;
        };
        let [table_area, note_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(content_area);
        let mut table = sales_table(report, &tab.goals).with_offset(tab.offset);
        tab.offset = table.offset();
        table.render_table(frame, table_area);

        let note = match goal_error {
            Some(e) => Span::styled(format!(" {e} (usando a última meta válida)"), ERROR_STYLE),
            None => Span::styled(format!(" {}", table.notes().join("  ")), FOOTER_STYLE),
        };
        frame.render_widget(Paragraph::new(Line::from(note)), note_area);
    }

    fn draw_revenue(&mut self, frame: &mut Frame, fields_area: Rect, content_area: Rect) {
        let tab = &mut self.revenue;
        let mut spans = range_spans(&tab.fields);
        spans.push(Span::styled("  Endpoint: ", FOOTER_STYLE));
        spans.push(Span::raw(tab.endpoint.title()));
        frame.render_widget(Paragraph::new(Line::from(spans)), fields_area);

        let Some(report) = ready_or_placeholder(frame, content_area, tab.presenter.state()) else {
            return;
        };
        let [legend_area, chart_area, table_area, note_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Percentage(55),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(content_area);

        frame.render_widget(Paragraph::new(chart_legend(tab.scale)), legend_area);
        render_revenue_chart(frame, chart_area, report, tab.scale);
        let mut table = revenue_table(report).with_offset(tab.offset);
        tab.offset = table.offset();
        table.render_table(frame, table_area);
        frame.render_widget(
            Paragraph::new(format!(" {}", table.notes().join("  "))).style(FOOTER_STYLE),
            note_area,
        );
    }

    fn draw_products(&mut self, frame: &mut Frame, fields_area: Rect, content_area: Rect) {
        let tab = &mut self.products;
        frame.render_widget(Paragraph::new(Line::from(range_spans(&tab.fields))), fields_area);

        let Some(report) = ready_or_placeholder(frame, content_area, tab.presenter.state()) else {
            return;
        };
        let [lists_area, table_area] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Fill(1)])
                .areas(content_area);
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(lists_area);
        frame.render_widget(
            Paragraph::new(group_lines(" Grupos de produtos", &report.by_product, left.width)),
            left,
        );
        frame.render_widget(
            Paragraph::new(group_lines(" Grupos de clientes", &report.by_client, right.width)),
            right,
        );
        let mut table = products_table(report).with_offset(tab.offset);
        tab.offset = table.offset();
        table.render_table(frame, table_area);
    }
}

fn field_spans(label: &str, value: String, focused: bool) -> Vec<Span<'static>> {
    let (value, style) = if focused {
        (format!("{value}_"), SELECTED_STYLE)
    } else {
        (value, Style::new())
    };
    vec![
        Span::styled(format!(" {label}: "), FOOTER_STYLE),
        Span::styled(value, style),
        Span::raw(" "),
    ]
}

fn range_spans(fields: &RangeFields) -> Vec<Span<'static>> {
    let mut spans = field_spans(
        "Início",
        fields.start_text.clone(),
        fields.focus == RangeField::Start,
    );
    spans.extend(field_spans(
        "Fim",
        fields.end_text.clone(),
        fields.focus == RangeField::End,
    ));
    spans
}

/// Draw the loading or error state and return None, or hand back the data.
fn ready_or_placeholder<'a, T>(
    frame: &mut Frame,
    area: Rect,
    state: &'a FetchState<T>,
) -> Option<&'a T> {
    match state {
        FetchState::Ready(data) => Some(data),
        FetchState::Idle => {
            frame.render_widget(
                Paragraph::new(" Informe um período válido.").style(FOOTER_STYLE),
                area,
            );
            None
        }
        FetchState::Loading => {
            frame.render_widget(
                Paragraph::new(" Carregando...").style(FOOTER_STYLE),
                area,
            );
            None
        }
        FetchState::Failed(msg) => {
            let (wrapped, _) = wrap_text(msg, area.width.saturating_sub(2) as usize);
            let mut lines = vec![Line::from(Span::styled(" Erro ao carregar dados", ERROR_STYLE))];
            lines.extend(wrapped.lines().map(|l| Line::from(format!(" {l}"))));
            lines.push(Line::from(Span::styled(" r=tentar novamente", FOOTER_STYLE)));
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
            None
        }
    }
}

/// Horizontal bars, one per group, scaled to the largest total.
fn group_lines(heading: &str, groups: &[GroupTotal], width: u16) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        heading.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if groups.is_empty() {
        lines.push(Line::from(Span::styled(" Nenhum registro.", FOOTER_STYLE)));
        return lines;
    }
    let max = groups.iter().map(|g| g.total).fold(0.0_f64, f64::max);
    let name_width = groups
        .iter()
        .map(|g| g.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);
    let bar_width = (width as usize).saturating_sub(name_width + 22).max(1);
    for g in groups {
        let name: String = g.name.chars().take(name_width).collect();
        lines.push(Line::from(vec![
            Span::raw(format!(" {name:<name_width$} ")),
            Span::styled(
                "█".repeat(ChartScale::Linear.bar_len(g.total, max, bar_width)),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(format!(" {}", reais(g.total))),
        ]));
    }
    lines
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let orders: SharedSource = Arc::new(settings.orders_source()?);
    let revenue: SharedSource = Arc::new(settings.revenue_source()?);
    let (tx, rx) = mpsc::channel();

    let mut dashboard =
        Dashboard::new(&settings, orders, revenue, tx, Local::now().date_naive())?;
    dashboard.fetch_all();
    info!("dashboard started");

    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        while let Ok(msg) = rx.try_recv() {
            dashboard.apply(msg);
        }

        if let Err(e) = terminal.draw(|frame| dashboard.draw(frame)) {
            break Err(e.into());
        }

        match event::poll(POLL_INTERVAL) {
            Err(e) => break Err(e.into()),
            Ok(false) => continue,
            Ok(true) => {}
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }
                if dashboard.handle_key(key.code) {
                    break Ok(());
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    info!("dashboard closed");
    result
}
