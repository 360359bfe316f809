use std::io;
use std::sync::{Arc, Mutex};

use super::device::TerminalDevice;
use super::editor::{lock, EditorCore};

/// An [`io::Write`] that routes output through the editor.
///
/// While a read is in progress the text appears above the line being edited,
/// which is then drawn again. Otherwise it is written straight through.
/// Clones write to the same editor and can be sent to other threads.
pub struct SharedWriter<D: TerminalDevice> {
    core: Arc<Mutex<EditorCore<D>>>,
}

impl<D: TerminalDevice> SharedWriter<D> {
    pub(crate) fn new(core: Arc<Mutex<EditorCore<D>>>) -> Self {
        Self { core }
    }
}

impl<D: TerminalDevice> Clone for SharedWriter<D> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<D: TerminalDevice> io::Write for SharedWriter<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.core).write_foreign(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
