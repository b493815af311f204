use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset as ChartSeries,
        GraphType, Paragraph, Row, Table, TableState,
    },
    Frame, Terminal,
};
use statement_ledger::model::{Category, TransactionRecord};
use statement_ledger::report::{
    available_years, format_currency, summarize, totals_by_category, totals_by_date,
    totals_by_period, ReportFilter, Summary,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Statements,
    Ledger,
    Charts,
    Filters,
}

impl Page {
    const ALL: [Page; 4] = [Page::Statements, Page::Ledger, Page::Charts, Page::Filters];

    pub fn next(&self) -> Self {
        match self {
            Page::Statements => Page::Ledger,
            Page::Ledger => Page::Charts,
            Page::Charts => Page::Filters,
            Page::Filters => Page::Statements,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Statements => Page::Filters,
            Page::Ledger => Page::Statements,
            Page::Charts => Page::Ledger,
            Page::Filters => Page::Charts,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Statements => "Statements",
            Page::Ledger => "Ledger",
            Page::Charts => "Charts",
            Page::Filters => "Filters",
        }
    }
}

/// One toggleable row on the Filters page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOption {
    Year(i32),
    Category(Category),
}

pub struct App {
    pub records: Vec<TransactionRecord>,
    pub filtered: Vec<TransactionRecord>,
    pub filter: ReportFilter,
    pub state: TableState,
    pub statements_state: TableState,
    pub filter_cursor: usize,
    pub current_page: Page,
    pub show_detail: bool,
    /// Where the records were loaded from, shown in the header
    pub source: String,
}

impl App {
    pub fn new(records: Vec<TransactionRecord>, source: impl Into<String>) -> Self {
        let mut state = TableState::default();
        if !records.is_empty() {
            state.select(Some(0));
        }

        let mut statements_state = TableState::default();
        statements_state.select(Some(0));

        let filtered = records.clone();

        Self {
            records,
            filtered,
            filter: ReportFilter::default(),
            state,
            statements_state,
            filter_cursor: 0,
            current_page: Page::Ledger,
            show_detail: false,
            source: source.into(),
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_record(&self) -> Option<&TransactionRecord> {
        self.state.selected().and_then(|i| self.filtered.get(i))
    }

    /// Years (newest first) followed by every category
    pub fn filter_options(&self) -> Vec<FilterOption> {
        available_years(&self.records)
            .into_iter()
            .map(FilterOption::Year)
            .chain(Category::ALL.iter().copied().map(FilterOption::Category))
            .collect()
    }

    pub fn is_active(&self, option: FilterOption) -> bool {
        match option {
            FilterOption::Year(year) => self.filter.years.contains(&year),
            FilterOption::Category(category) => self.filter.categories.contains(&category),
        }
    }

    pub fn toggle_filter_at_cursor(&mut self) {
        let Some(option) = self.filter_options().get(self.filter_cursor).copied() else {
            return;
        };

        match option {
            FilterOption::Year(year) => self.filter.toggle_year(year),
            FilterOption::Category(category) => self.filter.toggle_category(category),
        }
        self.refilter();
    }

    pub fn clear_filter(&mut self) {
        self.filter = ReportFilter::default();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = self.filter.apply(&self.records);

        // Reset selection to first item
        if !self.filtered.is_empty() {
            self.state.select(Some(0));
        } else {
            self.state.select(None);
        }
        self.statements_state.select(Some(0));
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn period_summary(&self) -> Vec<(String, Summary)> {
        totals_by_period(&self.filtered)
    }

    pub fn stats(&self) -> Summary {
        summarize(&self.filtered)
    }

    /// Length of the list the arrow keys move through on the current page
    fn cursor_len(&self) -> usize {
        match self.current_page {
            Page::Statements => self.period_summary().len(),
            Page::Filters => self.filter_options().len(),
            Page::Ledger | Page::Charts => self.filtered.len(),
        }
    }

    fn cursor(&self) -> Option<usize> {
        match self.current_page {
            Page::Statements => self.statements_state.selected(),
            Page::Filters => Some(self.filter_cursor),
            Page::Ledger | Page::Charts => self.state.selected(),
        }
    }

    fn set_cursor(&mut self, i: usize) {
        match self.current_page {
            Page::Statements => self.statements_state.select(Some(i)),
            Page::Filters => self.filter_cursor = i,
            Page::Ledger | Page::Charts => self.state.select(Some(i)),
        }
    }

    pub fn next(&mut self) {
        let len = self.cursor_len();
        if len == 0 {
            return;
        }
        let i = match self.cursor() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.set_cursor(i);
    }

    pub fn previous(&mut self) {
        let len = self.cursor_len();
        if len == 0 {
            return;
        }
        let i = match self.cursor() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.set_cursor(i);
    }

    pub fn page_down(&mut self) {
        let len = self.cursor_len();
        if len == 0 {
            return;
        }
        let i = match self.cursor() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        self.set_cursor(i);
    }

    pub fn page_up(&mut self) {
        let i = self.cursor().map(|i| i.saturating_sub(20)).unwrap_or(0);
        self.set_cursor(i);
    }

    pub fn home(&mut self) {
        if self.cursor_len() > 0 {
            self.set_cursor(0);
        }
    }

    pub fn end(&mut self) {
        let len = self.cursor_len();
        if len > 0 {
            self.set_cursor(len - 1);
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter if app.current_page == Page::Ledger => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char(' ') if app.current_page == Page::Filters => app.toggle_filter_at_cursor(),
                KeyCode::Char('c') => app.clear_filter(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.home(),
                KeyCode::End => app.end(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Ledger {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Statements => render_statements(f, chunks[1], app),
            Page::Ledger => render_table(f, chunks[1], app),
            Page::Charts => render_charts(f, chunks[1], app),
            Page::Filters => render_filters(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn amount_color(amount: f64) -> Color {
    if amount < 0.0 {
        Color::Red
    } else {
        Color::Green
    }
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Pix => Color::Cyan,
        Category::Card => Color::Yellow,
        Category::Slip => Color::Magenta,
        Category::Salary | Category::Redemption | Category::Yield => Color::Green,
        Category::Transfer => Color::Blue,
        Category::Other => Color::White,
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.stats();

    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("{} movimentos", stats.count),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("↑ {}", format_currency(stats.income)),
        Style::default().fg(Color::Green),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("↓ {}", format_currency(stats.expenses)),
        Style::default().fg(Color::Red),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", app.source)),
    );

    f.render_widget(header, area);
}

fn header_row<'a>(titles: &'a [&'a str]) -> Row<'a> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header = header_row(&["Mês/Ano", "Descrição", "Tipo", "Documento", "Valor", "Local"]);

    let rows = app.filtered.iter().map(|record| {
        let cells = vec![
            Cell::from(record.period.clone()),
            Cell::from(truncate(&record.description, 34)),
            Cell::from(record.category.label()).style(Style::default().fg(category_color(record.category))),
            Cell::from(truncate(&record.document_reference, 12)),
            Cell::from(format!("{:.2}", record.amount)).style(Style::default().fg(amount_color(record.amount))),
            Cell::from(truncate(&record.merchant_location, 24)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(36),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(26),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Movimentações "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_statements(f: &mut Frame, area: Rect, app: &mut App) {
    let summary = app.period_summary();
    let header = header_row(&["Período", "Movimentos", "Entradas", "Saídas", "Saldo"]);

    let rows = summary.iter().map(|(period, stats)| {
        let cells = vec![
            Cell::from(period.clone()),
            Cell::from(format!("{}", stats.count)),
            Cell::from(format_currency(stats.income)).style(Style::default().fg(Color::Green)),
            Cell::from(format_currency(stats.expenses)).style(Style::default().fg(Color::Red)),
            Cell::from(format_currency(stats.balance)).style(Style::default().fg(amount_color(stats.balance))),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(18),
            Constraint::Length(18),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Statements - Summary by Period "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.statements_state);
}

fn render_charts(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_category_bars(f, chunks[0], app);
    render_date_line(f, chunks[1], app);
}

fn render_category_bars(f: &mut Frame, area: Rect, app: &App) {
    let totals = totals_by_category(&app.filtered);

    // Bars are unsigned: height is the magnitude, color carries the sign
    let bars: Vec<Bar> = totals
        .iter()
        .map(|(category, total)| {
            Bar::default()
                .value(total.abs().round() as u64)
                .text_value(format!("{:.0}", total))
                .label(Line::from(category.label()))
                .style(Style::default().fg(amount_color(*total)))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Total por Tipo "),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(13)
        .bar_gap(2)
        .value_style(Style::default().fg(Color::Black).bg(Color::White));

    f.render_widget(chart, area);
}

fn render_date_line(f: &mut Frame, area: Rect, app: &App) {
    let totals = totals_by_date(&app.filtered);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Valor por Data ");

    if totals.is_empty() {
        f.render_widget(Paragraph::new("  No dated records").block(block), area);
        return;
    }

    let points: Vec<(f64, f64)> = totals
        .iter()
        .enumerate()
        .map(|(i, (_, total))| (i as f64, *total))
        .collect();

    let (min_y, max_y) = points
        .iter()
        .fold((0.0_f64, 0.0_f64), |(lo, hi), (_, y)| (lo.min(*y), hi.max(*y)));
    let max_x = (points.len().saturating_sub(1)).max(1) as f64;

    let first = totals[0].0.format("%m/%y").to_string();
    let last = totals[totals.len() - 1].0.format("%m/%y").to_string();

    let series = vec![ChartSeries::default()
        .name("valor")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points)];

    let chart = Chart::new(series)
        .block(block)
        .x_axis(
            Axis::default()
                .title("Data")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, max_x])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .title("Valor")
                .style(Style::default().fg(Color::Gray))
                .bounds([min_y, max_y])
                .labels(vec![
                    Span::raw(format!("{:.0}", min_y)),
                    Span::raw(format!("{:.0}", max_y)),
                ]),
        );

    f.render_widget(chart, area);
}

fn render_filters(f: &mut Frame, area: Rect, app: &App) {
    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Filter by year and type",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    let mut section = None;
    for (i, option) in app.filter_options().into_iter().enumerate() {
        let (heading, label) = match option {
            FilterOption::Year(year) => ("  Ano", year.to_string()),
            FilterOption::Category(category) => ("  Tipo", category.label().to_string()),
        };

        if section != Some(heading) {
            if section.is_some() {
                content.push(Line::from(""));
            }
            content.push(Line::from(Span::styled(
                heading,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED),
            )));
            section = Some(heading);
        }

        let pointer = if i == app.filter_cursor {
            Span::styled("  → ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            Span::raw("    ")
        };
        let checkbox = if app.is_active(option) { "[x] " } else { "[ ] " };

        content.push(Line::from(vec![
            pointer,
            Span::styled(checkbox, Style::default().fg(Color::Yellow)),
            Span::raw(label),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled("  Hint: ", Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC)),
        Span::styled(
            "Space toggles, c clears. Nothing checked means everything.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
    ]));

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Filters "),
    );

    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (selected, total) = match app.current_page {
        Page::Statements => (
            app.statements_state.selected().map(|i| i + 1).unwrap_or(0),
            app.period_summary().len(),
        ),
        Page::Filters => (app.filter_cursor + 1, app.filter_options().len()),
        Page::Ledger | Page::Charts => (app.state.selected().map(|i| i + 1).unwrap_or(0), app.filtered.len()),
    };

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    if !app.filter.is_empty() {
        let mut active: Vec<String> = app.filter.years.iter().map(|y| y.to_string()).collect();
        active.extend(app.filter.categories.iter().map(|c| c.label().to_string()));

        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Filter: {}", active.join(", ")),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Details | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn detail_line<'a>(label: &'a str, value: Span<'a>) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        value,
    ])
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Detalhes ");

    let Some(record) = app.selected_record() else {
        f.render_widget(Paragraph::new("No transaction selected").block(block), area);
        return;
    };

    let merchant = if record.merchant_location.is_empty() {
        "-"
    } else {
        record.merchant_location.as_str()
    };

    let content = vec![
        Line::from(""),
        detail_line("  Mês/Ano: ", Span::raw(record.period.as_str())),
        Line::from(""),
        detail_line(
            "  Valor: ",
            Span::styled(format_currency(record.amount), Style::default().fg(amount_color(record.amount))),
        ),
        Line::from(""),
        detail_line(
            "  Tipo: ",
            Span::styled(record.category.label(), Style::default().fg(category_color(record.category))),
        ),
        Line::from(""),
        detail_line("  Documento: ", Span::raw(record.document_reference.as_str())),
        Line::from(""),
        detail_line("  Local: ", Span::raw(merchant)),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
        Line::from(Span::styled(
            "  DESCRIÇÃO",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                wrap_text(&record.description, 35),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Press Enter to close",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(Paragraph::new(content).block(block), area);
}

/// Cut to `max_len` characters, ending in "..." when shortened
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn wrap_text(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }

    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let needed = current_line.chars().count() + word.chars().count() + 1;
        if current_line.is_empty() || needed <= width {
            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        } else {
            if !result.is_empty() {
                result.push_str("\n  ");
            }
            result.push_str(&current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        if !result.is_empty() {
            result.push_str("\n  ");
        }
        result.push_str(&current_line);
    }

    result
}
