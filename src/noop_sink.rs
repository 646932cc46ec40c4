use crate::sink::LogSink;
use std::io;

/// A sink that simply drops all lines.
///
/// Backs [`Logger::discard`](crate::logger::Logger::discard) and is useful
/// in tests that don't care about output.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn write_line(&self, _line: &[u8]) -> io::Result<()> {
        Ok(())
    }
}
