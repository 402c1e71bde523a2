//! Navigation and lifecycle state of the viewer.
//!
//! [`AppState`] owns what is displayed: the content, its metadata, the scroll and wrap
//! settings, the search results and the breadcrumb history. Every transition either
//! succeeds completely or leaves the previous view untouched.

use crate::app::breadcrumb::Breadcrumbs;
use crate::content::{
    detect_mime, generate_hex_dump, is_binary_mime, read_text_lines, Content, FileMetadata,
};
use crate::error::{FatError, Result};
use crate::plugin::PluginRegistry;
use crate::render::pipeline::RenderInput;
use crate::render::ui::ModeTag;
use crate::search::SearchState;
use bstr::BStr;
use std::path::{Path, PathBuf};

/// What kind of view the current content is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Text lines
    Normal,
    /// Entry listing of an archive
    Archive,
    /// Hex dump
    BinaryHex,
}

impl ViewMode {
    /// Name used by key binding `modes`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Archive => "archive",
            Self::BinaryHex => "binary",
        }
    }

    pub fn tag(self) -> ModeTag {
        match self {
            Self::Normal => ModeTag::Normal,
            Self::Archive => ModeTag::Archive,
            Self::BinaryHex => ModeTag::Binary,
        }
    }
}

/// Input mode, orthogonal to [`ViewMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Normal,
    SearchInput,
    CommandInput,
}

/// View mode forced from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceViewMode {
    #[default]
    None,
    Text,
    Hex,
}

/// Inputs to the view-mode decision for a freshly loaded file.
#[derive(Debug, Clone, Default)]
pub struct ViewPolicy {
    pub force: ForceViewMode,
    pub text_mimes: Vec<String>,
    pub binary_mimes: Vec<String>,
}

/// A fully built view, ready to replace the current one.
#[derive(Debug)]
struct LoadedView {
    content: Content,
    metadata: FileMetadata,
    view_mode: ViewMode,
    mime: String,
    handler: Option<usize>,
}

#[derive(Debug)]
pub struct AppState {
    policy: ViewPolicy,
    breadcrumbs: Breadcrumbs,
    content: Content,
    metadata: FileMetadata,
    mime: String,
    /// Registry index of the plugin that produced an archive listing
    handler: Option<usize>,
    pub view_mode: ViewMode,
    pub app_mode: AppMode,
    top_line: usize,
    left_char: usize,
    wrap: bool,
    search: SearchState,
}

impl AppState {
    pub fn new(policy: ViewPolicy) -> Self {
        Self {
            policy,
            breadcrumbs: Breadcrumbs::new(),
            content: Content::empty(),
            metadata: FileMetadata::default(),
            mime: String::new(),
            handler: None,
            view_mode: ViewMode::Normal,
            app_mode: AppMode::Normal,
            top_line: 0,
            left_char: 0,
            wrap: false,
            search: SearchState::new(),
        }
    }

    /// Open `path` as the root of a new history.
    pub fn load_file(&mut self, path: &Path, registry: &PluginRegistry) -> Result<()> {
        let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let view = self.build_view(&path, None, registry)?;
        self.breadcrumbs.reset(&path);
        self.apply(view);
        log::info!("opened {} as {:?}", path.display(), self.view_mode);
        Ok(())
    }

    /// Rebuild the current file in `mode`. The old view is kept if loading fails.
    pub fn reload_content(&mut self, mode: ViewMode, registry: &PluginRegistry) -> Result<()> {
        let path = self.require_path()?;
        let view = self.build_view(&path, Some(mode), registry)?;
        self.apply(view);
        Ok(())
    }

    /// Open the archive entry under the cursor as a new breadcrumb level.
    pub fn confirm(&mut self, registry: &PluginRegistry) -> Result<()> {
        if self.view_mode != ViewMode::Archive {
            return Err(FatError::unsupported("confirm outside an archive listing"));
        }
        let archive = self.require_path()?;
        let plugin = self
            .handler
            .and_then(|idx| registry.get(idx))
            .ok_or_else(|| FatError::unsupported("archive handler no longer available"))?;
        let entry = self
            .content
            .line(self.top_line)
            .ok_or_else(|| FatError::not_found("no entry selected"))?
            .to_vec();

        let temp = plugin.extract_entry(&archive, &entry)?;
        match self.build_view(&temp, None, registry) {
            Ok(view) => {
                log::info!("entered {} from {}", BStr::new(&entry), archive.display());
                self.breadcrumbs.push_extracted(&entry, temp);
                self.apply(view);
                Ok(())
            }
            Err(err) => {
                if let Err(close_err) = temp.close() {
                    log::warn!("failed to remove extracted entry: {}", close_err);
                }
                Err(err)
            }
        }
    }

    /// Step out of a nested view, else drop an active search, else do nothing.
    pub fn go_back(&mut self, registry: &PluginRegistry) -> Result<()> {
        if let Some(parent) = self.breadcrumbs.parent() {
            let parent = parent.path().to_path_buf();
            let view = self.build_view(&parent, None, registry)?;
            self.breadcrumbs.pop();
            self.apply(view);
        } else if self.search.is_active() {
            self.search.clear();
        }
        Ok(())
    }

    fn require_path(&self) -> Result<PathBuf> {
        self.current_path()
            .map(Path::to_path_buf)
            .ok_or_else(|| FatError::unsupported("no file loaded"))
    }

    fn resolve_mode(
        &self,
        path: &Path,
        mime: &str,
        registry: &PluginRegistry,
    ) -> (ViewMode, Option<usize>) {
        match self.policy.force {
            ForceViewMode::Text => return (ViewMode::Normal, None),
            ForceViewMode::Hex => return (ViewMode::BinaryHex, None),
            ForceViewMode::None => {}
        }
        if let Some(idx) = registry.handler_index(path) {
            return (ViewMode::Archive, Some(idx));
        }
        if is_binary_mime(mime, &self.policy.text_mimes, &self.policy.binary_mimes) {
            (ViewMode::BinaryHex, None)
        } else {
            (ViewMode::Normal, None)
        }
    }

    fn build_view(
        &self,
        path: &Path,
        mode: Option<ViewMode>,
        registry: &PluginRegistry,
    ) -> Result<LoadedView> {
        let mime = detect_mime(path)?;
        let mut metadata = FileMetadata::read(path, &mime)?;

        let (view_mode, handler) = match mode {
            Some(ViewMode::Archive) | None => self.resolve_mode(path, &mime, registry),
            Some(other) => (other, None),
        };

        let (content, view_mode) = match (view_mode, handler.and_then(|idx| registry.get(idx))) {
            (ViewMode::Archive, Some(plugin)) => (plugin.list_contents(path)?, ViewMode::Archive),
            (ViewMode::BinaryHex, _) => (generate_hex_dump(path)?, ViewMode::BinaryHex),
            _ => (read_text_lines(path)?, ViewMode::Normal),
        };

        let label = if view_mode == ViewMode::Archive { "Entries" } else { "Lines" };
        metadata.set_count(label, content.len());

        Ok(LoadedView {
            content,
            metadata,
            view_mode,
            mime,
            handler,
        })
    }

    fn apply(&mut self, view: LoadedView) {
        self.content = view.content;
        self.metadata = view.metadata;
        self.view_mode = view.view_mode;
        self.mime = view.mime;
        self.handler = view.handler;
        self.app_mode = AppMode::Normal;
        self.top_line = 0;
        self.left_char = 0;
        self.wrap = false;
        self.search.reset();
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.breadcrumbs.current().map(|crumb| crumb.path())
    }

    /// Display name of the current location.
    pub fn location(&self) -> &str {
        self.breadcrumbs.current().map_or("", |crumb| crumb.label())
    }

    pub fn breadcrumbs(&self) -> &Breadcrumbs {
        &self.breadcrumbs
    }

    /// Release every extracted file; the state is empty afterwards.
    pub fn close(&mut self) {
        self.breadcrumbs.clear();
        self.content = Content::empty();
        self.search.reset();
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn top_line(&self) -> usize {
        self.top_line
    }

    pub fn left_char(&self) -> usize {
        self.left_char
    }

    pub fn wrap(&self) -> bool {
        self.wrap
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    fn last_line(&self) -> usize {
        self.content.len().saturating_sub(1)
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.top_line = self.top_line.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.top_line = self.top_line.saturating_add(lines).min(self.last_line());
    }

    /// Scroll right by one character while the longest line still extends past the
    /// visible width. Only meaningful without wrapping.
    pub fn scroll_right(&mut self, visible_width: usize) {
        if self.wrap {
            return;
        }
        let limit = self.content.max_line_len().saturating_sub(visible_width);
        if self.left_char < limit {
            self.left_char += 1;
        }
    }

    pub fn scroll_left(&mut self) {
        if !self.wrap {
            self.left_char = self.left_char.saturating_sub(1);
        }
    }

    pub fn jump_to_start(&mut self) {
        self.top_line = 0;
    }

    pub fn jump_to_end(&mut self) {
        self.top_line = self.last_line();
    }

    /// Move to the 1-based `line`, clamped to the last line. Zero is ignored.
    pub fn jump_to_line(&mut self, line: usize) {
        if line > 0 {
            self.top_line = (line - 1).min(self.last_line());
        }
    }

    pub fn toggle_wrap(&mut self) -> Result<()> {
        if self.view_mode != ViewMode::Normal {
            return Err(FatError::unsupported("wrapping only applies to text views"));
        }
        self.wrap = !self.wrap;
        self.left_char = 0;
        Ok(())
    }

    /// Switch between text and hex rendering of the current file.
    pub fn toggle_view_mode(&mut self, registry: &PluginRegistry) -> Result<()> {
        let target = match self.view_mode {
            ViewMode::Normal => ViewMode::BinaryHex,
            ViewMode::BinaryHex => ViewMode::Normal,
            ViewMode::Archive => {
                return Err(FatError::unsupported("archive listings have no hex view"))
            }
        };
        self.reload_content(target, registry)
    }

    /// Run a search for `term` and move to the first match. An empty term clears the
    /// search.
    pub fn submit_search(&mut self, term: &[u8]) -> Result<()> {
        if self.view_mode == ViewMode::Archive {
            return Err(FatError::unsupported("search in archive listings"));
        }
        if let Some(first) = self.search.submit(&self.content, term)? {
            self.top_line = first.line_idx;
        }
        Ok(())
    }

    pub fn next_match(&mut self) -> Result<()> {
        let target = self.search.next_match()?;
        self.top_line = target.line_idx;
        Ok(())
    }

    pub fn prev_match(&mut self) -> Result<()> {
        let target = self.search.prev_match()?;
        self.top_line = target.line_idx;
        Ok(())
    }

    /// Right-aligned status text: `Match i/n | Line k/N` (or `Entry k/N`).
    pub fn position_text(&self) -> String {
        let noun = if self.view_mode == ViewMode::Archive { "Entry" } else { "Line" };
        let current = if self.content.is_empty() { 0 } else { self.top_line + 1 };
        let position = format!("{} {}/{}", noun, current, self.content.len());
        match self.search.position() {
            Some((idx, total)) => format!("Match {}/{} | {}", idx, total, position),
            None => position,
        }
    }

    pub fn render_input(&self) -> RenderInput<'_> {
        RenderInput {
            content: &self.content,
            top_line: self.top_line,
            left_char: self.left_char,
            wrap: self.wrap,
            search: Some(&self.search),
        }
    }
}
