//! Application state and update logic
//!
//! One [`App`] value owns the editor session, the text widgets, and the
//! focus bookkeeping. Every event goes through [`App::handle`]; nothing
//! else mutates state, so the whole update path can be driven headless in
//! tests. Editor keystrokes land in a local buffer and are committed to
//! the session as a single history entry when focus leaves the editor or
//! a structural operation needs the latest content.

use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use tui_textarea::TextArea;

use gdforge_project::FileId;
use gdforge_providers::{
    ArchitectureStyle, ChatContext, CodeRequest, ErrorReport, GenerationClient, ImageRequest,
    TypingStyle, Verbosity,
};
use gdforge_session::{
    Applied, EditorSession, RequestTicket, SessionError, ToolKind, ToolResponse,
};

use crate::event::AppEvent;

/// Which region of the screen receives plain key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The file list on the left
    Sidebar,
    /// The script editor pane
    Editor,
    /// The tabbed tool panel at the bottom
    Tools,
}

impl Focus {
    /// Next region in Tab order.
    pub fn next(self) -> Focus {
        match self {
            Focus::Sidebar => Focus::Editor,
            Focus::Editor => Focus::Tools,
            Focus::Tools => Focus::Sidebar,
        }
    }

    /// Previous region in Tab order.
    pub fn previous(self) -> Focus {
        match self {
            Focus::Sidebar => Focus::Tools,
            Focus::Editor => Focus::Sidebar,
            Focus::Tools => Focus::Editor,
        }
    }
}

/// The tabs of the bottom tool panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolTab {
    /// Prompt-driven rewrite of the open file
    Generate,
    /// Conversational Q&A with project context
    Chat,
    /// Game asset image generation
    Image,
    /// Runtime error analysis
    Debug,
    /// The four generation knobs
    Settings,
}

impl ToolTab {
    /// All tabs, in display order.
    pub const ALL: [ToolTab; 5] = [
        ToolTab::Generate,
        ToolTab::Chat,
        ToolTab::Image,
        ToolTab::Debug,
        ToolTab::Settings,
    ];

    /// Tab caption.
    pub fn title(self) -> &'static str {
        match self {
            ToolTab::Generate => "Generate",
            ToolTab::Chat => "Chat",
            ToolTab::Image => "Image",
            ToolTab::Debug => "Debug",
            ToolTab::Settings => "Settings",
        }
    }

    /// The request slot this tab submits into, if it submits at all.
    pub fn tool_kind(self) -> Option<ToolKind> {
        match self {
            ToolTab::Generate => Some(ToolKind::Code),
            ToolTab::Chat => Some(ToolKind::Chat),
            ToolTab::Image => Some(ToolKind::Image),
            ToolTab::Debug => Some(ToolKind::Analysis),
            ToolTab::Settings => None,
        }
    }

    /// Position in [`ToolTab::ALL`].
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    /// Next tab, wrapping at the end.
    pub fn next(self) -> ToolTab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

/// Rows of the settings tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    /// Sampling temperature
    Creativity,
    /// Comment density
    Verbosity,
    /// Static vs dynamic typing
    Typing,
    /// Structural preference
    Architecture,
}

impl SettingsField {
    /// All rows, in display order.
    pub const ALL: [SettingsField; 4] = [
        SettingsField::Creativity,
        SettingsField::Verbosity,
        SettingsField::Typing,
        SettingsField::Architecture,
    ];

    /// Row caption.
    pub fn label(self) -> &'static str {
        match self {
            SettingsField::Creativity => "Creativity",
            SettingsField::Verbosity => "Verbosity",
            SettingsField::Typing => "Typing",
            SettingsField::Architecture => "Architecture",
        }
    }
}

/// All mutable state behind the TUI.
pub struct App {
    pub(crate) session: EditorSession,
    client: Arc<dyn GenerationClient>,
    events: UnboundedSender<AppEvent>,
    pub(crate) focus: Focus,
    pub(crate) tool_tab: ToolTab,
    pub(crate) editor: TextArea<'static>,
    editor_file: FileId,
    editor_baseline: String,
    pub(crate) generate_input: TextArea<'static>,
    pub(crate) chat_input: TextArea<'static>,
    pub(crate) image_input: TextArea<'static>,
    pub(crate) debug_input: TextArea<'static>,
    pub(crate) settings_field: usize,
    pub(crate) name_prompt: Option<TextArea<'static>>,
    pub(crate) status: String,
    pub(crate) tick: usize,
    should_quit: bool,
}

impl App {
    /// Wires up the app around a session and a generation back end.
    ///
    /// `events` is where spawned generation tasks deliver their results;
    /// in production it is the run loop's own channel.
    pub fn new(
        session: EditorSession,
        client: Arc<dyn GenerationClient>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let mut app = App {
            session,
            client,
            events,
            focus: Focus::Editor,
            tool_tab: ToolTab::Generate,
            editor: TextArea::default(),
            editor_file: FileId::new(),
            editor_baseline: String::new(),
            generate_input: TextArea::default(),
            chat_input: TextArea::default(),
            image_input: TextArea::default(),
            debug_input: TextArea::default(),
            settings_field: 0,
            name_prompt: None,
            status: "Ready".to_string(),
            tick: 0,
            should_quit: false,
        };
        app.load_editor();
        app
    }

    /// Whether the run loop should exit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Read access for rendering and tests.
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Whether the editor buffer differs from the committed file content.
    pub fn editor_dirty(&self) -> bool {
        self.editor.lines().join("\n") != self.editor_baseline
    }

    /// Routes one event through the update logic.
    pub fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Generation { ticket, response } => self.on_generation(ticket, response),
            AppEvent::Tick => self.tick = self.tick.wrapping_add(1),
            AppEvent::Resize { .. } => {}
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.name_prompt.is_some() {
            self.on_name_prompt_key(key);
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match (key.code, ctrl) {
            (KeyCode::Char('q'), true) => {
                self.commit_editor();
                self.should_quit = true;
            }
            (KeyCode::Char('z'), true) => self.undo(),
            (KeyCode::Char('y'), true) => self.redo(),
            (KeyCode::F(2), _) => self.tool_tab = self.tool_tab.next(),
            (KeyCode::Tab, _) => self.cycle_focus(true),
            (KeyCode::BackTab, _) => self.cycle_focus(false),
            _ => match self.focus {
                Focus::Sidebar => self.on_sidebar_key(key),
                Focus::Editor => {
                    self.editor.input(textarea_input(key));
                }
                Focus::Tools => self.on_tool_key(key),
            },
        }
    }

    /// Moves focus, committing the editor buffer when leaving the pane.
    fn cycle_focus(&mut self, forward: bool) {
        if self.focus == Focus::Editor {
            self.commit_editor();
        }
        self.focus = if forward {
            self.focus.next()
        } else {
            self.focus.previous()
        };
    }

    fn on_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.select_neighbor(false),
            KeyCode::Down => self.select_neighbor(true),
            KeyCode::Enter => self.focus = Focus::Editor,
            KeyCode::Char('n') => {
                let mut prompt = TextArea::default();
                prompt.set_placeholder_text("new file name, e.g. enemy.gd");
                self.name_prompt = Some(prompt);
            }
            KeyCode::Char('d') => {
                self.commit_editor();
                let doomed = self.session.active_id();
                match self.session.delete_file(doomed) {
                    Ok(()) => {
                        self.load_editor();
                        self.status = "File deleted".to_string();
                    }
                    Err(e) => self.status = e.to_string(),
                }
            }
            _ => {}
        }
    }

    /// Opens the file above or below the current one in the list.
    fn select_neighbor(&mut self, down: bool) {
        let active = self.session.active_id();
        let Some(position) = self.session.snapshot().position(active) else {
            return;
        };
        let count = self.session.snapshot().len();
        let target = if down {
            (position + 1).min(count - 1)
        } else {
            position.saturating_sub(1)
        };
        if target == position {
            return;
        }

        self.commit_editor();
        // the commit cannot reorder files, so the index stays valid
        let id = self.session.snapshot().files()[target].id;
        if self.session.select_file(id).is_ok() {
            self.load_editor();
        }
    }

    fn on_name_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let name = self
                    .name_prompt
                    .take()
                    .map(|p| p.lines().join(""))
                    .unwrap_or_default();
                self.commit_editor();
                match self.session.create_file(&name) {
                    Ok(_) => {
                        self.load_editor();
                        self.focus = Focus::Editor;
                        self.status = format!("Created {}", name.trim());
                    }
                    Err(e) => self.status = e.to_string(),
                }
            }
            KeyCode::Esc => {
                self.name_prompt = None;
            }
            _ => {
                if let Some(prompt) = &mut self.name_prompt {
                    prompt.input(textarea_input(key));
                }
            }
        }
    }

    fn on_tool_key(&mut self, key: KeyEvent) {
        if self.tool_tab == ToolTab::Settings {
            self.on_settings_key(key);
            return;
        }

        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
                self.tool_input_mut().insert_newline();
            }
            KeyCode::Enter => self.submit_tool(),
            _ => {
                let input = textarea_input(key);
                self.tool_input_mut().input(input);
            }
        }
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                self.settings_field = self.settings_field.saturating_sub(1);
            }
            KeyCode::Down => {
                self.settings_field = (self.settings_field + 1).min(SettingsField::ALL.len() - 1);
            }
            KeyCode::Left => self.adjust_setting(false),
            KeyCode::Right => self.adjust_setting(true),
            _ => {}
        }
    }

    fn adjust_setting(&mut self, forward: bool) {
        let settings = self.session.settings_mut();
        match SettingsField::ALL[self.settings_field] {
            SettingsField::Creativity => {
                let step = if forward { 0.05 } else { -0.05 };
                settings.creativity = ((settings.creativity + step) * 100.0).round() / 100.0;
                settings.creativity = settings.creativity.clamp(0.0, 1.0);
            }
            SettingsField::Verbosity => {
                settings.verbosity = cycle(&Verbosity::ALL, settings.verbosity, forward);
            }
            SettingsField::Typing => {
                settings.typing = cycle(&TypingStyle::ALL, settings.typing, forward);
            }
            SettingsField::Architecture => {
                settings.architecture = cycle(&ArchitectureStyle::ALL, settings.architecture, forward);
            }
        }
    }

    fn tool_input_mut(&mut self) -> &mut TextArea<'static> {
        match self.tool_tab {
            ToolTab::Generate => &mut self.generate_input,
            ToolTab::Chat => &mut self.chat_input,
            ToolTab::Image => &mut self.image_input,
            ToolTab::Debug => &mut self.debug_input,
            // settings has no input; callers check the tab first
            ToolTab::Settings => &mut self.debug_input,
        }
    }

    fn submit_tool(&mut self) {
        match self.tool_tab {
            ToolTab::Generate => self.submit_code(),
            ToolTab::Chat => self.submit_chat(),
            ToolTab::Image => self.submit_image(),
            ToolTab::Debug => self.submit_analysis(),
            ToolTab::Settings => {}
        }
    }

    fn submit_code(&mut self) {
        // the request snapshot must carry what the user sees
        self.commit_editor();
        let prompt = self.generate_input.lines().join("\n");
        match self.session.begin_code_request(&prompt) {
            Ok((ticket, request)) => {
                self.spawn_code(ticket, request);
                self.status = format!("Generating code for {}...", self.session.active_file().name);
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn submit_chat(&mut self) {
        let message = self.chat_input.lines().join("\n");
        match self.session.begin_chat_request(&message) {
            Ok((ticket, context)) => {
                self.chat_input = TextArea::default();
                self.spawn_chat(ticket, context);
                self.status = "Waiting for a reply...".to_string();
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn submit_image(&mut self) {
        let (prompt, reference) = parse_image_input(&self.image_input.lines().join("\n"));
        let reference_image = match reference {
            Some(path) => match std::fs::read(&path) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    self.status = format!("Could not read {}: {}", path.display(), e);
                    return;
                }
            },
            None => None,
        };

        match self.session.begin_image_request(&prompt, reference_image) {
            Ok((ticket, request)) => {
                self.spawn_image(ticket, request);
                self.status = "Generating image...".to_string();
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn submit_analysis(&mut self) {
        self.commit_editor();
        let error_text = self.debug_input.lines().join("\n");
        match self.session.begin_analysis_request(&error_text) {
            Ok((ticket, report)) => {
                self.spawn_analysis(ticket, report);
                self.status = format!("Analyzing {}...", report_name(&error_text));
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn spawn_code(&self, ticket: RequestTicket, request: CodeRequest) {
        let client = Arc::clone(&self.client);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let response = ToolResponse::Code(client.generate_code(request).await);
            let _ = tx.send(AppEvent::Generation { ticket, response });
        });
    }

    fn spawn_chat(&self, ticket: RequestTicket, context: ChatContext) {
        let client = Arc::clone(&self.client);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let response = ToolResponse::Chat(client.chat(context).await);
            let _ = tx.send(AppEvent::Generation { ticket, response });
        });
    }

    fn spawn_image(&self, ticket: RequestTicket, request: ImageRequest) {
        let client = Arc::clone(&self.client);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let response = ToolResponse::Image(client.generate_image(request).await);
            let _ = tx.send(AppEvent::Generation { ticket, response });
        });
    }

    fn spawn_analysis(&self, ticket: RequestTicket, report: ErrorReport) {
        let client = Arc::clone(&self.client);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let response = ToolResponse::Analysis(client.analyze_error(report).await);
            let _ = tx.send(AppEvent::Generation { ticket, response });
        });
    }

    fn on_generation(&mut self, ticket: RequestTicket, response: ToolResponse) {
        match self.session.complete(ticket, response) {
            Ok(applied) => {
                if matches!(applied, Applied::Code { .. }) {
                    self.load_editor();
                }
                self.status = applied.to_string();
            }
            // stale responses vanish without disturbing the status line
            Err(SessionError::StaleResponse) => {
                debug!("Stale generation response dropped");
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn undo(&mut self) {
        self.commit_editor();
        if self.session.undo() {
            self.load_editor();
            self.status = "Undone".to_string();
        } else {
            self.status = "Nothing to undo".to_string();
        }
    }

    fn redo(&mut self) {
        self.commit_editor();
        if self.session.redo() {
            self.load_editor();
            self.status = "Redone".to_string();
        } else {
            self.status = "Nothing to redo".to_string();
        }
    }

    /// Commits the editor buffer as one history entry, if it changed.
    ///
    /// Called when focus leaves the editor and before every structural
    /// operation, so keystrokes batch into one undoable edit instead of
    /// one entry each.
    fn commit_editor(&mut self) {
        let text = self.editor.lines().join("\n");
        if text == self.editor_baseline || !self.session.snapshot().contains(self.editor_file) {
            return;
        }
        match self.session.update_file_content(self.editor_file, text.clone()) {
            Ok(()) => self.editor_baseline = text,
            Err(e) => self.status = e.to_string(),
        }
    }

    /// Reloads the editor buffer from the active file.
    fn load_editor(&mut self) {
        let file = self.session.active_file();
        self.editor_file = file.id;
        self.editor = TextArea::from(file.content.lines());
        self.editor_baseline = self.editor.lines().join("\n");
    }
}

/// Bridges terminal key events into the text widget's input type.
///
/// The event loop and the text widgets are built against different
/// crossterm releases, so the widget's `From<KeyEvent>` impl does not
/// apply; the mapping is spelled out instead.
fn textarea_input(key: KeyEvent) -> tui_textarea::Input {
    use tui_textarea::Key;

    let key_code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Tab => Key::Tab,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Esc => Key::Esc,
        KeyCode::F(n) => Key::F(n),
        _ => Key::Null,
    };
    tui_textarea::Input {
        key: key_code,
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
    }
}

/// Cycles through the allowed values of a settings enum.
fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let position = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (position + 1) % all.len()
    } else {
        (position + all.len() - 1) % all.len()
    };
    all[next]
}

/// Splits the image tab input into a prompt and an optional reference
/// image path. Lines starting with `@` name the reference file.
fn parse_image_input(text: &str) -> (String, Option<PathBuf>) {
    let mut prompt_lines = Vec::new();
    let mut reference = None;
    for line in text.lines() {
        match line.trim().strip_prefix('@') {
            Some(path) if !path.trim().is_empty() => {
                reference = Some(PathBuf::from(path.trim()));
            }
            _ => prompt_lines.push(line),
        }
    }
    (prompt_lines.join("\n"), reference)
}

/// Short label for the analysis status line.
fn report_name(error_text: &str) -> &str {
    if error_text.trim().is_empty() {
        "the open script"
    } else {
        "the pasted error"
    }
}
