//! Interactive line editing on a raw-mode terminal.
//!
//! A [`Terminal`] reads one line at a time with cursor movement, history and
//! tab completion, and cooperates with output written through its
//! [`SharedWriter`] while a read is in progress.

pub mod actions;
pub mod buffer;
pub mod completion;
pub mod device;
mod editor;
pub mod history;
mod shared_writer;
mod terminal;
pub mod virtual_terminal;
pub mod width;

pub use actions::EditorAction;
pub use buffer::LineBuffer;
pub use completion::Completer;
pub use device::{CrosstermDevice, CrosstermKeys, KeySource, TerminalDevice, WrapMode};
pub use editor::EditorState;
pub use history::History;
pub use shared_writer::SharedWriter;
pub use terminal::{CancelHandle, PromptHandle, ReadGuard, Terminal};
pub use virtual_terminal::{ScriptedKeys, VirtualTerminal};
pub use width::{UnicodeWidthTable, WidthTable};
