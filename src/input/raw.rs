//! Low-level input collection: blocking event reads, mouse scroll coalescing, and
//! translation into primitive events that the higher-level input service can consume.

use crate::error::{FatError, Result};
use ratatui::crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default coalescing window in milliseconds for scroll events.
const DEFAULT_COALESCE_WINDOW_MS: u64 = 12;
/// Number of lines produced by a single mouse wheel tick.
const MOUSE_SCROLL_LINES: u64 = 3;

/// Where terminal events come from.
pub trait EventSource {
    /// Wait for the next event
    ///
    /// This method should:
    /// - Block indefinitely when `timeout` is `None`
    /// - Return `Ok(None)` when the timeout expires without an event
    fn read(&mut self, timeout: Option<Duration>) -> Result<Option<Event>>;
}

/// Events from the real terminal through crossterm.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn read(&mut self, timeout: Option<Duration>) -> Result<Option<Event>> {
        match timeout {
            None => Ok(Some(event::read()?)),
            Some(timeout) => {
                if event::poll(timeout)? {
                    Ok(Some(event::read()?))
                } else {
                    Ok(None)
                }
            }
        }
    }
}

/// Pre-recorded events, replayed in order. Running dry is an error rather than a hang.
#[derive(Debug, Default, Clone)]
pub struct ScriptedEvents {
    events: VecDeque<Event>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for ScriptedEvents {
    fn read(&mut self, timeout: Option<Duration>) -> Result<Option<Event>> {
        match self.events.pop_front() {
            Some(event) => Ok(Some(event)),
            None if timeout.is_some() => Ok(None),
            None => Err(FatError::generic("scripted input exhausted")),
        }
    }
}

/// Direction for scroll coalescing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Low-level events surfaced by the raw input collector.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInputEvent {
    Key(KeyEvent),
    Resize {
        width: u16,
        height: u16,
    },
    Scroll {
        direction: ScrollDirection,
        lines: u64,
    },
}

/// Aggregates high-frequency scroll events into larger steps.
#[derive(Debug, Clone)]
pub struct InputCoalescer {
    window: Duration,
    pending: Option<PendingScroll>,
}

#[derive(Debug, Clone)]
struct PendingScroll {
    direction: ScrollDirection,
    lines: u64,
    last_event: Instant,
}

impl InputCoalescer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn with_default_window() -> Self {
        Self::new(Duration::from_millis(DEFAULT_COALESCE_WINDOW_MS))
    }

    /// Register a new scroll event, returning any previously queued scroll that should be flushed.
    pub fn push(
        &mut self,
        direction: ScrollDirection,
        lines: u64,
        now: Instant,
    ) -> Option<(ScrollDirection, u64)> {
        match self.pending {
            Some(ref mut pending) if pending.direction == direction => {
                pending.lines = pending.lines.saturating_add(lines);
                pending.last_event = now;
                None
            }
            _ => {
                let flushed = self.flush();
                self.pending = Some(PendingScroll {
                    direction,
                    lines,
                    last_event: now,
                });
                flushed
            }
        }
    }

    /// Time left before the pending scroll goes stale, if one is pending.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| self.window.saturating_sub(now.duration_since(p.last_event)))
    }

    /// Flush accumulated scrolls if the coalescing window has expired.
    pub fn flush_if_stale(&mut self, now: Instant) -> Option<(ScrollDirection, u64)> {
        if let Some(pending) = &self.pending {
            if now.duration_since(pending.last_event) >= self.window {
                return self.flush();
            }
        }
        None
    }

    /// Flush all accumulated scrolls immediately.
    pub fn flush(&mut self) -> Option<(ScrollDirection, u64)> {
        self.pending
            .take()
            .map(|pending| (pending.direction, pending.lines))
    }

    /// Return true when there is no pending scroll to be flushed.
    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}

/// Collector that reads events from an [`EventSource`] and applies scroll coalescing.
pub struct RawInputCollector {
    source: Box<dyn EventSource>,
    coalescer: InputCoalescer,
    pending_events: VecDeque<RawInputEvent>,
}

impl std::fmt::Debug for RawInputCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawInputCollector")
            .field("coalescer", &self.coalescer)
            .field("pending_events", &self.pending_events)
            .finish()
    }
}

impl RawInputCollector {
    /// Create a collector with the default coalescing window.
    pub fn new(source: Box<dyn EventSource>) -> Self {
        Self::with_window(source, Duration::from_millis(DEFAULT_COALESCE_WINDOW_MS))
    }

    /// Create a collector with a custom coalescing window (useful for tests).
    pub fn with_window(source: Box<dyn EventSource>, window: Duration) -> Self {
        Self {
            source,
            coalescer: InputCoalescer::new(window),
            pending_events: VecDeque::new(),
        }
    }

    /// Check whether the collector has no pending events or scroll accumulation.
    pub fn is_idle(&self) -> bool {
        self.pending_events.is_empty() && self.coalescer.is_empty()
    }

    /// Block until the next raw event is available.
    ///
    /// Wheel ticks keep accumulating while they arrive within the coalescing window; any
    /// other event flushes the accumulated scroll ahead of itself.
    pub fn next_event(&mut self) -> Result<RawInputEvent> {
        loop {
            if let Some(event) = self.pending_events.pop_front() {
                return Ok(event);
            }

            let timeout = self.coalescer.remaining(Instant::now());
            match self.source.read(timeout)? {
                Some(event) => self.enqueue_event(event),
                None => {
                    if let Some((direction, lines)) = self.coalescer.flush_if_stale(Instant::now())
                    {
                        return Ok(RawInputEvent::Scroll { direction, lines });
                    }
                }
            }
        }
    }

    /// Block until the next key press, discarding everything else.
    pub fn next_key(&mut self) -> Result<KeyEvent> {
        self.coalescer.flush();
        loop {
            if let RawInputEvent::Key(key) = self.next_event()? {
                return Ok(key);
            }
        }
    }

    fn enqueue_event(&mut self, event: Event) {
        match event {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.flush_pending_scroll();
                self.pending_events.push_back(RawInputEvent::Key(key_event));
            }
            Event::Resize(width, height) => {
                self.flush_pending_scroll();
                self.pending_events
                    .push_back(RawInputEvent::Resize { width, height });
            }
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        let direction = match mouse_event.kind {
            MouseEventKind::ScrollUp => ScrollDirection::Up,
            MouseEventKind::ScrollDown => ScrollDirection::Down,
            _ => return,
        };

        let now = Instant::now();
        if let Some((flushed_dir, lines)) = self.coalescer.push(direction, MOUSE_SCROLL_LINES, now)
        {
            self.pending_events.push_back(RawInputEvent::Scroll {
                direction: flushed_dir,
                lines,
            });
        }
    }

    fn flush_pending_scroll(&mut self) {
        if let Some((direction, lines)) = self.coalescer.flush() {
            self.pending_events
                .push_back(RawInputEvent::Scroll { direction, lines });
        }
    }
}
