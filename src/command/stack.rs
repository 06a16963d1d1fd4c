use crate::error::CoreError;
use crate::event::{CoreEvent, EventBus};

use super::{Command, CommandContext};

/// Linear undo/redo log over scene mutations, with delta-merging.
///
/// `index` points *past* the last applied command. Pushing truncates any
/// redo tail; exceeding the limit drops the oldest entries.
pub struct CommandStack {
    commands: Vec<Command>,
    index: usize,
    limit: usize,
    clean_index: usize,
}

impl CommandStack {
    pub fn new(limit: usize) -> Self {
        Self {
            commands: Vec::new(),
            index: 0,
            limit: limit.max(1),
            clean_index: 0,
        }
    }

    /// Apply `command` and record it.
    ///
    /// If the top entry absorbs it via `merge_with`, the top already holds
    /// the combined delta, and only the *new* command's `redo()` runs to
    /// apply its incremental effect — re-running the merged top's undo/redo
    /// pair would reverse the combined delta and reapply it for zero net
    /// effect. A command that fails to apply is not recorded.
    pub fn push(
        &mut self,
        mut command: Command,
        ctx: &mut CommandContext<'_>,
    ) -> Result<(), CoreError> {
        if self.index > 0 && self.commands[self.index - 1].merge_with(&command) {
            log::debug!("merged command into stack top: {}", command.description());
            command.redo(ctx)?;
            self.commands.truncate(self.index);
            // The merged top no longer matches a clean mark at or past it.
            if self.clean_index >= self.index {
                self.clean_index = usize::MAX;
            }
            self.notify(ctx.events);
            return Ok(());
        }

        command.redo(ctx)?;
        self.commands.truncate(self.index);
        log::debug!("push command: {}", command.description());
        self.commands.push(command);
        self.index += 1;

        if self.commands.len() > self.limit {
            let excess = self.commands.len() - self.limit;
            self.commands.drain(..excess);
            self.index -= excess;
            self.clean_index = self.clean_index.saturating_sub(excess);
        }

        self.notify(ctx.events);
        Ok(())
    }

    /// Undo the most recent command, if any. A failed undo (collaborator
    /// error) leaves the position unchanged.
    pub fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), CoreError> {
        if !self.can_undo() {
            return Ok(());
        }
        self.commands[self.index - 1].undo(ctx)?;
        self.index -= 1;
        self.notify(ctx.events);
        Ok(())
    }

    /// Redo the next command, if any.
    pub fn redo(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), CoreError> {
        if !self.can_redo() {
            return Ok(());
        }
        self.commands[self.index].redo(ctx)?;
        self.index += 1;
        self.notify(ctx.events);
        Ok(())
    }

    pub fn clear(&mut self, events: &EventBus) {
        self.commands.clear();
        self.index = 0;
        self.clean_index = 0;
        self.notify(events);
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.commands.len()
    }

    /// Description of the command the next `undo` would reverse.
    pub fn undo_text(&self) -> String {
        if self.can_undo() {
            self.commands[self.index - 1].description()
        } else {
            String::new()
        }
    }

    /// Description of the command the next `redo` would apply.
    pub fn redo_text(&self) -> String {
        if self.can_redo() {
            self.commands[self.index].description()
        } else {
            String::new()
        }
    }

    pub fn count(&self) -> usize {
        self.commands.len()
    }

    /// Mark the current position as the saved state.
    pub fn mark_clean(&mut self) {
        self.clean_index = self.index;
    }

    pub fn is_dirty(&self) -> bool {
        self.index != self.clean_index
    }

    fn notify(&self, events: &EventBus) {
        events.emit(CoreEvent::StackChanged {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_text: self.undo_text(),
            redo_text: self.redo_text(),
        });
    }
}
