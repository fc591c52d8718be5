use tracing::debug;

use crate::events::{DisplaySelection, RawLevel, RenderCommand};

/// Maps confirmed input levels to the image that should be on screen.
#[derive(Debug, Clone, Default)]
pub struct DisplayStateMachine {
    current: DisplaySelection,
}

impl DisplayStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> DisplaySelection {
        self.current
    }

    /// Apply a confirmed level. Emits a command only when the selection changes.
    pub fn on_confirmed(&mut self, level: RawLevel) -> Option<RenderCommand> {
        let next = DisplaySelection::for_level(level);
        if next == self.current {
            debug!(%level, selection = %next, "confirmed level matches current selection");
            return None;
        }
        self.current = next;
        Some(RenderCommand(next))
    }

    /// Flip the selection regardless of the input. The next confirmed level
    /// brings the display back in line with the button.
    pub fn toggle(&mut self) -> RenderCommand {
        self.current = self.current.other();
        RenderCommand(self.current)
    }
}
