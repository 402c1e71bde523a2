//! Application orchestration layer
//!
//! The [`Application`] wires the navigation state, the plugin registry, the input service
//! and the renderer into a single synchronous loop: draw, block for one input event,
//! apply it. Failures of user actions become a status-bar message; only terminal and
//! input errors end the loop.

pub mod breadcrumb;
pub mod state;

pub use breadcrumb::{Breadcrumbs, Crumb};
pub use state::{AppMode, AppState, ForceViewMode, ViewMode, ViewPolicy};

use crate::config::Config;
use crate::error::{FatError, Result};
use crate::input::{
    Action, EditOutcome, EventSource, InputEvent, InputService, KeyMap, LineEditor,
    ScrollDirection,
};
use crate::plugin::{temp_file_prefix, PluginRegistry};
use crate::render::pipeline::{content_rows, content_width, render_content};
use crate::render::ui::{
    HelpRow, Overlay, PaneLayout, PromptLine, StatusLine, SuspendGuard, ThemeCatalog,
    UIRenderer, ViewState,
};
use ratatui::crossterm::event::KeyCode;
use ratatui::layout::Rect;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Application orchestrator - owns every component for the lifetime of the session
pub struct Application {
    state: AppState,
    registry: PluginRegistry,
    config: Config,
    themes: ThemeCatalog,
    theme_name: String,
    ui_renderer: Box<dyn UIRenderer>,
    input: InputService,
    /// Transient status message, dismissed by the next key
    message: Option<String>,
    /// Directory swept for leftover extraction files on shutdown
    sweep_dir: Option<PathBuf>,
    shut_down: bool,
}

impl Application {
    /// Create application by wiring components together. Nothing is loaded or drawn yet.
    pub fn new(
        config: Config,
        force: ForceViewMode,
        registry: PluginRegistry,
        themes: ThemeCatalog,
        ui_renderer: Box<dyn UIRenderer>,
        events: Box<dyn EventSource>,
    ) -> Self {
        let policy = ViewPolicy {
            force,
            text_mimes: config.text_mimes.clone(),
            binary_mimes: config.binary_mimes.clone(),
        };
        let keymap = KeyMap::with_overrides(&config.keys);
        Self {
            state: AppState::new(policy),
            registry,
            config,
            themes,
            theme_name: "default".to_string(),
            ui_renderer,
            input: InputService::new(events, keymap),
            message: None,
            sweep_dir: Some(std::env::temp_dir()),
            shut_down: false,
        }
    }

    /// Record which catalog theme the renderer was started with.
    pub fn set_theme_name(&mut self, name: impl Into<String>) {
        self.theme_name = name.into();
    }

    /// Load the file given on the command line.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        self.state.load_file(path, &self.registry)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the interactive loop until the user quits, then shut down.
    pub fn run(&mut self) -> Result<()> {
        self.ui_renderer.initialize()?;
        let result = self.event_loop();
        self.shutdown();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        loop {
            if !self.wait_for_usable_size()? {
                log::info!("quit from the terminal-size notice");
                return Ok(());
            }
            self.draw(None, None)?;

            let event = self.input.next_event()?;
            let is_key = matches!(event, InputEvent::Action(_) | InputEvent::Unbound(_));
            if self.message.is_some() && is_key {
                self.message = None;
                continue;
            }

            match event {
                InputEvent::Action(action) => {
                    if !self.dispatch(action)? {
                        return Ok(());
                    }
                }
                InputEvent::Scroll { direction, lines } => {
                    let lines = usize::try_from(lines).unwrap_or(usize::MAX);
                    match direction {
                        ScrollDirection::Up => self.state.scroll_up(lines),
                        ScrollDirection::Down => self.state.scroll_down(lines),
                    }
                }
                InputEvent::Resize { width, height } => {
                    log::debug!("terminal resized to {}x{}", width, height);
                }
                InputEvent::Unbound(key) => log::trace!("unbound key {:?}", key.code),
            }
        }
    }

    /// Apply one action; returns false when the application should quit.
    fn dispatch(&mut self, action: Action) -> Result<bool> {
        let mut outcome = Ok(());
        match action {
            Action::Quit => return Ok(false),
            Action::ScrollUp => self.state.scroll_up(1),
            Action::ScrollDown => self.state.scroll_down(1),
            Action::PageUp => {
                let page = self.page_size()?;
                self.state.scroll_up(page);
            }
            Action::PageDown => {
                let page = self.page_size()?;
                self.state.scroll_down(page);
            }
            Action::ScrollLeft => self.state.scroll_left(),
            Action::ScrollRight => {
                let width = self.visible_width()?;
                self.state.scroll_right(width);
            }
            Action::JumpToStart => self.state.jump_to_start(),
            Action::JumpToEnd => self.state.jump_to_end(),
            Action::JumpToLine => {
                let typed = self.prompt(LineEditor::numeric(), PromptLine::JumpToLine)?;
                if let Some(line) = typed.and_then(|t| t.parse::<usize>().ok()) {
                    self.state.jump_to_line(line);
                }
            }
            Action::ToggleWrap => outcome = self.state.toggle_wrap(),
            Action::Search => outcome = self.search()?,
            Action::NextMatch => outcome = self.state.next_match(),
            Action::PrevMatch => outcome = self.state.prev_match(),
            Action::ToggleViewMode => outcome = self.state.toggle_view_mode(&self.registry),
            Action::OpenExternal => outcome = self.open_external(None)?,
            Action::OpenExternalDefault => {
                let command = self.config.command_for(self.state.mime()).map(str::to_string);
                outcome = self.open_external(command)?;
            }
            Action::GoBack => outcome = self.state.go_back(&self.registry),
            Action::SelectTheme => self.select_theme()?,
            Action::ToggleHelp => self.show_help()?,
            Action::Confirm => {
                if self.state.view_mode == ViewMode::Archive {
                    outcome = self.state.confirm(&self.registry);
                }
            }
        }

        if let Err(err) = outcome {
            self.report(&err);
        }
        Ok(true)
    }

    fn report(&mut self, err: &FatError) {
        log::warn!("{}", err);
        self.message = Some(err.user_message().to_string());
    }

    fn screen_area(&self) -> Result<Rect> {
        let (width, height) = self.ui_renderer.get_terminal_size()?;
        Ok(Rect::new(0, 0, width, height))
    }

    fn page_size(&self) -> Result<usize> {
        let layout = PaneLayout::split(self.screen_area()?);
        Ok(content_rows(layout.content.height).max(1))
    }

    fn visible_width(&self) -> Result<usize> {
        let layout = PaneLayout::split(self.screen_area()?);
        Ok(content_width(layout.content.width))
    }

    /// Build the frame for a `width` x `height` terminal.
    pub fn view_state(
        &self,
        width: u16,
        height: u16,
        prompt: Option<PromptLine>,
        overlay: Option<Overlay>,
    ) -> ViewState {
        let layout = PaneLayout::split(Rect::new(0, 0, width, height));
        let mut status = StatusLine::new(self.state.view_mode.tag());
        status.wrap = self.state.wrap();
        status.path = self.state.location().to_string();
        status.position = self.state.position_text();
        status.prompt = prompt;
        status.message = self.message.clone();

        ViewState {
            metadata: self.state.metadata().entries().to_vec(),
            content: render_content(
                &self.state.render_input(),
                layout.content.width,
                layout.content.height,
            ),
            status,
            overlay,
        }
    }

    fn draw(&mut self, prompt: Option<PromptLine>, overlay: Option<Overlay>) -> Result<()> {
        let (width, height) = self.ui_renderer.get_terminal_size()?;
        let frame = self.view_state(width, height, prompt, overlay);
        self.ui_renderer.render(&frame)
    }

    /// Show the size notice until the terminal is large enough (true) or the user quits
    /// (false).
    fn wait_for_usable_size(&mut self) -> Result<bool> {
        loop {
            let (width, height) = self.ui_renderer.get_terminal_size()?;
            let (min_width, min_height) = (self.config.min_term_width, self.config.min_term_height);
            if width >= min_width && height >= min_height {
                return Ok(true);
            }
            self.ui_renderer
                .render(&ViewState::too_small(width, height, min_width, min_height))?;
            match self.input.next_event()? {
                InputEvent::Action(Action::Quit) => return Ok(false),
                InputEvent::Unbound(key) if key.code == KeyCode::Char('q') => return Ok(false),
                _ => {}
            }
        }
    }

    /// Edit a line in the status bar; `None` when cancelled.
    fn prompt(
        &mut self,
        mut editor: LineEditor,
        line: fn(String) -> PromptLine,
    ) -> Result<Option<String>> {
        loop {
            self.draw(Some(line(editor.buffer().to_string())), None)?;
            let key = self.input.next_key()?;
            match editor.handle_key(&key) {
                EditOutcome::Editing => {}
                EditOutcome::Submit(text) => return Ok(Some(text)),
                EditOutcome::Cancel => return Ok(None),
            }
        }
    }

    fn search(&mut self) -> Result<Result<()>> {
        let previous = self.state.search().term().to_string();
        self.state.app_mode = AppMode::SearchInput;
        let submitted = self.prompt(LineEditor::new(previous), PromptLine::Search);
        self.state.app_mode = AppMode::Normal;
        Ok(match submitted? {
            Some(term) => self.state.submit_search(term.as_bytes()),
            None => Ok(()),
        })
    }

    /// Run `command` (or one typed at a prompt) on the current file with the terminal
    /// released, then reload the view.
    fn open_external(&mut self, command: Option<String>) -> Result<Result<()>> {
        let command = match command {
            Some(command) => command,
            None => {
                self.state.app_mode = AppMode::CommandInput;
                let typed = self.prompt(LineEditor::default(), PromptLine::Command);
                self.state.app_mode = AppMode::Normal;
                match typed? {
                    Some(command) if !command.trim().is_empty() => command,
                    _ => return Ok(Ok(())),
                }
            }
        };
        let Some(path) = self.state.current_path().map(Path::to_path_buf) else {
            return Ok(Err(FatError::unsupported("no file loaded")));
        };

        log::info!("running external command: {} on {}", command, path.display());
        let status = {
            let _guard = SuspendGuard::new(self.ui_renderer.as_mut())?;
            shell(&command, &path).status()
        };
        match status {
            Ok(status) if !status.success() => log::info!("external command exited with {}", status),
            Ok(_) => {}
            Err(err) => return Ok(Err(FatError::generic(format!("{}: {}", command, err)))),
        }

        Ok(match self.state.view_mode {
            ViewMode::Archive => Ok(()),
            mode => self.state.reload_content(mode, &self.registry),
        })
    }

    fn show_help(&mut self) -> Result<()> {
        let mode_name = self.state.view_mode.name();
        let rows = self
            .input
            .keymap()
            .help_rows(mode_name)
            .into_iter()
            .map(|(keys, description)| HelpRow {
                keys,
                description: description.to_string(),
            })
            .collect();
        self.draw(None, Some(Overlay::Help { mode_name, rows }))?;
        self.input.next_key()?;
        Ok(())
    }

    fn select_theme(&mut self) -> Result<()> {
        let names: Vec<String> = self.themes.entries().iter().map(|e| e.name.clone()).collect();
        if names.is_empty() {
            return Ok(());
        }
        let mut selected = names
            .iter()
            .position(|name| *name == self.theme_name)
            .unwrap_or(0);

        loop {
            let overlay = Overlay::ThemeSelector {
                names: names.clone(),
                selected,
            };
            self.draw(None, Some(overlay))?;
            let key = self.input.next_key()?;
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    selected = selected.checked_sub(1).unwrap_or(names.len() - 1);
                }
                KeyCode::Down | KeyCode::Char('j') => selected = (selected + 1) % names.len(),
                KeyCode::Enter => {
                    let entry = &self.themes.entries()[selected];
                    match entry.load() {
                        Ok(theme) => {
                            log::info!("switched to theme {}", entry.name);
                            self.theme_name = entry.name.clone();
                            self.ui_renderer.set_theme(theme);
                        }
                        Err(err) => self.report(&err),
                    }
                    return Ok(());
                }
                KeyCode::Esc | KeyCode::Char('q') => return Ok(()),
                _ => {}
            }
        }
    }

    /// Release extracted files, sweep leftovers of this process and restore the terminal.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.state.close();
        if let Some(dir) = &self.sweep_dir {
            let removed = sweep_temp_files(dir);
            if removed > 0 {
                log::info!("removed {} leftover extraction files", removed);
            }
        }
        if let Err(err) = self.ui_renderer.cleanup() {
            log::error!("terminal cleanup failed: {}", err);
        }
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// `<command> "<path>"` through the shell. The path is passed as a positional parameter,
/// never spliced into the script.
#[cfg(unix)]
fn shell(command: &str, path: &Path) -> Command {
    let mut shell = Command::new("sh");
    shell
        .arg("-c")
        .arg(format!("{} \"$1\"", command))
        .arg("sh")
        .arg(path);
    shell
}

#[cfg(windows)]
fn shell(command: &str, path: &Path) -> Command {
    let mut shell = Command::new("cmd");
    shell.arg("/C").arg(command).arg(path);
    shell
}

/// Remove files in `dir` named with this process's extraction prefix.
pub fn sweep_temp_files(dir: &Path) -> usize {
    let prefix = temp_file_prefix();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
        .filter(|entry| match std::fs::remove_file(entry.path()) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("could not remove {}: {}", entry.path().display(), err);
                false
            }
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedEvents;
    use crate::plugins::register_bundled;
    use crate::render::ui::MockUIRenderer;
    use ratatui::crossterm::event::{Event, KeyEvent, KeyModifiers};
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    type FrameLog = Rc<RefCell<Vec<ViewState>>>;

    fn keys(spec: &str) -> Vec<Event> {
        spec.chars()
            .map(|c| {
                let code = match c {
                    '\n' => KeyCode::Enter,
                    '\x1b' => KeyCode::Esc,
                    '\x08' => KeyCode::Backspace,
                    c => KeyCode::Char(c),
                };
                Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
            })
            .collect()
    }

    fn app_with(renderer: MockUIRenderer, events: Vec<Event>) -> (Application, FrameLog) {
        let frames = renderer.frame_log();
        let mut registry = PluginRegistry::new();
        register_bundled(&mut registry);
        let mut app = Application::new(
            Config::default(),
            ForceViewMode::None,
            registry,
            ThemeCatalog::builtin(),
            Box::new(renderer),
            Box::new(ScriptedEvents::new(events)),
        );
        // other tests in this process own files with the same prefix
        app.sweep_dir = None;
        (app, frames)
    }

    fn fixture(body: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, body).unwrap();
        (dir, path)
    }

    fn run(body: &str, script: &str) -> (Application, FrameLog, TempDir) {
        let (dir, path) = fixture(body);
        let (mut app, frames) = app_with(MockUIRenderer::new(), keys(script));
        app.open(&path).unwrap();
        app.run().unwrap();
        (app, frames, dir)
    }

    fn last_status(frames: &FrameLog) -> StatusLine {
        frames.borrow().last().unwrap().status.clone()
    }

    #[test]
    fn scrolls_and_quits() {
        let (app, frames, _dir) = run("one\ntwo\nthree\n", "jjjq");
        assert_eq!(app.state().top_line(), 2);
        assert_eq!(last_status(&frames).position, "Line 3/3");
    }

    #[test]
    fn search_prompt_and_match_cycling() {
        let (app, frames, _dir) = run("xfoofoo\nbar\n", "/foo\nnq");
        assert_eq!(last_status(&frames).position, "Match 2/2 | Line 1/2");
        assert!(frames
            .borrow()
            .iter()
            .any(|f| f.status.prompt == Some(PromptLine::Search("fo".to_string()))));
        assert_eq!(app.state().app_mode, AppMode::Normal);
    }

    #[test]
    fn search_prompt_is_prefilled_and_cancellable() {
        let (app, frames, _dir) = run("foo\n", "/foo\n/\x1bq");
        let prefilled = frames
            .borrow()
            .iter()
            .filter(|f| f.status.prompt == Some(PromptLine::Search("foo".to_string())))
            .count();
        assert!(prefilled >= 2);
        assert!(app.state().search().is_active());
    }

    #[test]
    fn failures_show_a_message_until_the_next_key() {
        // `x` switches to hex, where wrapping is unsupported
        let (_app, frames, _dir) = run("abc\n", "xwjq");
        let frames = frames.borrow();
        let message_frames: Vec<_> = frames
            .iter()
            .filter(|f| f.status.message.is_some())
            .collect();
        assert_eq!(message_frames.len(), 1);
        assert_eq!(
            message_frames[0].status.message.as_deref(),
            Some("Operation not supported.")
        );
        assert_eq!(frames.last().unwrap().status.mode, crate::render::ui::ModeTag::Binary);
    }

    #[test]
    fn jump_to_line_with_g_prefix() {
        let (app, _frames, _dir) = run("a\nb\nc\nd\n", "gt3\nq");
        assert_eq!(app.state().top_line(), 2);
        let (app, _frames, _dir) = run("a\nb\nc\nd\n", "Ggkggq");
        assert_eq!(app.state().top_line(), 0);
    }

    #[test]
    fn help_overlay_lists_current_mode() {
        let (_app, frames, _dir) = run("a\n", "?zq");
        let frames = frames.borrow();
        let help = frames
            .iter()
            .find_map(|f| match &f.overlay {
                Some(Overlay::Help { mode_name, rows }) => Some((*mode_name, rows.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(help.0, "normal");
        assert!(help.1.iter().any(|r| r.keys == "w"));
    }

    #[test]
    fn theme_selector_switches_theme() {
        let (_dir, path) = fixture("a\n");
        let (mut app, frames) = app_with(MockUIRenderer::new(), keys("tjj\nq"));
        app.open(&path).unwrap();
        app.run().unwrap();
        assert_eq!(app.theme_name, "high-contrast");
        assert!(frames.borrow().iter().any(|f| matches!(
            f.overlay,
            Some(Overlay::ThemeSelector { selected: 2, .. })
        )));
    }

    #[test]
    fn too_small_terminal_can_be_quit() {
        let (_dir, path) = fixture("a\n");
        let mut renderer = MockUIRenderer::new();
        renderer.set_terminal_size(40, 10);
        let (mut app, frames) = app_with(renderer, keys("q"));
        app.open(&path).unwrap();
        app.run().unwrap();
        assert_eq!(frames.borrow()[0], ViewState::too_small(40, 10, 80, 20));
    }

    #[test]
    fn page_down_moves_by_pane_height() {
        let body: String = (1..=100).map(|n| format!("line {}\n", n)).collect();
        // 30 rows: 29-row pane, 27 rows of text
        let (app, _frames, _dir) = run(&body, " q");
        assert_eq!(app.state().top_line(), 27);
    }

    #[cfg(unix)]
    #[test]
    fn shell_passes_path_as_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("$(touch marker) `touch marker2`.txt");
        fs::write(&path, "x").unwrap();

        let command = format!("cd '{}' && test -f", dir.path().display());
        let status = shell(&command, &path).status().unwrap();
        assert!(status.success());
        assert!(!dir.path().join("marker").exists());
        assert!(!dir.path().join("marker2").exists());
    }

    #[cfg(unix)]
    #[test]
    fn external_command_on_crafted_entry_runs_nothing_else() {
        use std::io::Write;
        use zip::write::FileOptions;

        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("crafted.zip");
        let mut writer = zip::ZipWriter::new(fs::File::create(&archive).unwrap());
        writer
            .start_file("$(touch marker).txt", FileOptions::default())
            .unwrap();
        writer.write_all(b"payload\n").unwrap();
        writer.finish().unwrap();

        let (mut app, _frames) = app_with(MockUIRenderer::new(), Vec::new());
        app.open(&archive).unwrap();
        app.state.confirm(&app.registry).unwrap();
        let extracted = app.state().current_path().unwrap().to_path_buf();
        let name = extracted.file_name().unwrap().to_string_lossy().into_owned();
        assert!(!name.contains('$') && !name.contains('('));

        let command = format!("cd '{}' && cat", dir.path().display());
        app.open_external(Some(command)).unwrap().unwrap();
        assert!(!dir.path().join("marker").exists());
        assert_eq!(app.state().content().line(0).unwrap(), "payload");
    }

    #[test]
    fn sweep_removes_only_this_process_files() {
        let dir = TempDir::new().unwrap();
        let ours = dir.path().join(format!("{}notes.txt-abc", temp_file_prefix()));
        let theirs = dir.path().join("fat-0-other.txt-abc");
        fs::write(&ours, "x").unwrap();
        fs::write(&theirs, "x").unwrap();

        assert_eq!(sweep_temp_files(dir.path()), 1);
        assert!(!ours.exists());
        assert!(theirs.exists());
    }
}
