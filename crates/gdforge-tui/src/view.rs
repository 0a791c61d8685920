//! Rendering for the editor screen
//!
//! Pure draw code: reads the [`App`] state and paints it. The only
//! mutation here is attaching the per-frame block decorations to the
//! text widgets, which ratatui requires to live on the widget itself.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::app::{App, Focus, SettingsField, ToolTab};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Paints one frame.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(12),
            Constraint::Length(1),
        ])
        .split(frame.area());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(20)])
        .split(rows[0]);

    draw_sidebar(frame, app, columns[0]);
    draw_editor(frame, app, columns[1]);
    draw_tools(frame, app, rows[1]);
    draw_status(frame, app, rows[2]);

    if app.name_prompt.is_some() {
        draw_name_prompt(frame, app);
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .session
        .snapshot()
        .files()
        .iter()
        .map(|file| {
            ListItem::new(Line::from(vec![
                Span::raw(file.name.clone()),
                Span::styled(
                    format!("  {}", file.kind().label()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(app.session.snapshot().position(app.session.active_id()));

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Files  [n]ew [d]elete")
                .border_style(border_style(app.focus == Focus::Sidebar)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_editor(frame: &mut Frame, app: &mut App, area: Rect) {
    let name = app.session.active_file().name.clone();
    let title = if app.editor_dirty() {
        format!("{} *", name)
    } else {
        name
    };
    app.editor.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style(app.focus == Focus::Editor)),
    );
    app.editor.set_line_number_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(&app.editor, area);
}

fn draw_tools(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Tools  [F2] next tab")
        .border_style(border_style(app.focus == Focus::Tools));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let titles: Vec<Line> = ToolTab::ALL.iter().map(|t| Line::from(t.title())).collect();
    let tabs = Tabs::new(titles)
        .select(app.tool_tab.index())
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, rows[0]);

    match app.tool_tab {
        ToolTab::Generate => draw_generate(frame, app, rows[1]),
        ToolTab::Chat => draw_chat(frame, app, rows[1]),
        ToolTab::Image => draw_image(frame, app, rows[1]),
        ToolTab::Debug => draw_debug(frame, app, rows[1]),
        ToolTab::Settings => draw_settings(frame, app, rows[1]),
    }
}

/// Left/right split used by the tabs that pair an input with output text.
fn halves(area: Rect) -> (Rect, Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    (columns[0], columns[1])
}

fn input_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(Style::default().fg(Color::DarkGray))
}

fn output_paragraph(text: String, title: &str) -> Paragraph<'static> {
    Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(Style::default().fg(Color::DarkGray)),
    )
}

fn draw_generate(frame: &mut Frame, app: &mut App, area: Rect) {
    let (left, right) = halves(area);
    app.generate_input.set_placeholder_text("what should the open file do?");
    app.generate_input
        .set_block(input_block("Prompt  [Enter] send  [Alt+Enter] newline"));
    frame.render_widget(&app.generate_input, left);

    let explanation = app
        .session
        .explanation()
        .unwrap_or("The explanation for the last rewrite appears here.")
        .to_string();
    frame.render_widget(output_paragraph(explanation, "Explanation"), right);
}

fn draw_chat(frame: &mut Frame, app: &mut App, area: Rect) {
    let (left, right) = halves(area);
    app.chat_input.set_placeholder_text("ask about the project");
    app.chat_input
        .set_block(input_block("Message  [Enter] send  [Alt+Enter] newline"));
    frame.render_widget(&app.chat_input, left);

    let mut lines: Vec<Line> = Vec::new();
    for message in app.session.transcript() {
        lines.push(Line::from(Span::styled(
            format!("{}:", message.role),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for text_line in message.content.lines() {
            lines.push(Line::from(format!("  {}", text_line)));
        }
    }
    // keep the tail in view
    let visible = right.height.saturating_sub(2) as usize;
    let skipped = lines.len().saturating_sub(visible);
    let paragraph = Paragraph::new(lines.split_off(skipped.min(lines.len())))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Transcript")
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(paragraph, right);
}

fn draw_image(frame: &mut Frame, app: &mut App, area: Rect) {
    let (left, right) = halves(area);
    app.image_input
        .set_placeholder_text("describe the asset; @/path/to/ref.png attaches a reference");
    app.image_input
        .set_block(input_block("Prompt  [Enter] send  [Alt+Enter] newline"));
    frame.render_widget(&app.image_input, left);

    let mut lines: Vec<Line> = Vec::new();
    for image in app.session.images() {
        lines.push(Line::from(Span::styled(
            image.prompt.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("  {}", image.url)));
    }
    if lines.is_empty() {
        lines.push(Line::from("Generated image URLs appear here."));
    }
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Images")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(paragraph, right);
}

fn draw_debug(frame: &mut Frame, app: &mut App, area: Rect) {
    let (left, right) = halves(area);
    app.debug_input
        .set_placeholder_text("paste a runtime error, or submit empty for a review");
    app.debug_input
        .set_block(input_block("Error  [Enter] analyze  [Alt+Enter] newline"));
    frame.render_widget(&app.debug_input, left);

    let analysis = app
        .session
        .analysis()
        .unwrap_or("The analysis of the open script appears here.")
        .to_string();
    frame.render_widget(output_paragraph(analysis, "Analysis"), right);
}

fn draw_settings(frame: &mut Frame, app: &App, area: Rect) {
    let settings = app.session.settings();
    let values = [
        format!("{:.2}", settings.creativity),
        settings.verbosity.to_string(),
        settings.typing.to_string(),
        settings.architecture.to_string(),
    ];

    let lines: Vec<Line> = SettingsField::ALL
        .iter()
        .zip(values)
        .enumerate()
        .map(|(row, (field, value))| {
            let selected = row == app.settings_field;
            let marker = if selected { ">" } else { " " };
            let style = if selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(
                format!("{} {:<14} < {} >", marker, field.label(), value),
                style,
            ))
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Arrows: pick a row, change its value")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(paragraph, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    frame.render_widget(Paragraph::new(app.status.clone()), area);

    let spinner = SPINNER[app.tick % SPINNER.len()];
    let mut right: Vec<String> = app
        .session
        .busy_kinds()
        .map(|kind| format!("{} {}", spinner, kind))
        .collect();
    right.push(format!(
        "undo {}/{}",
        app.session.history().index() + 1,
        app.session.history().len()
    ));
    frame.render_widget(
        Paragraph::new(right.join("  ")).alignment(Alignment::Right),
        area,
    );
}

fn draw_name_prompt(frame: &mut Frame, app: &mut App) {
    let area = centered_rect(44, 3, frame.area());
    frame.render_widget(Clear, area);
    if let Some(prompt) = &mut app.name_prompt {
        prompt.set_block(
            Block::default()
                .borders(Borders::ALL)
                .title("New file  [Enter] create  [Esc] cancel")
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(&*prompt, area);
    }
}

/// A rect of the given size centered in `area`, clipped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
