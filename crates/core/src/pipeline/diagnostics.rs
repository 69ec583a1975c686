/// Cross-cutting status channel for pipeline events.
///
/// The pipeline never writes to stdout or a file itself; construction
/// warnings, backend fallbacks, and per-stage timings all flow through
/// this trait so the host application decides where they land (log
/// line, GUI signal, nothing).
pub trait DiagnosticsSink: Send {
    /// A recoverable degradation the operator should know about, e.g. a
    /// backend falling back because its weights were unavailable.
    fn warning(&mut self, message: &str);

    /// A routine status message.
    fn info(&mut self, message: &str);

    /// Wall-clock duration of a named per-frame stage. Default: no-op.
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
}

/// Forwards everything to the `log` facade; the host picks the logger.
pub struct LogDiagnostics;

impl DiagnosticsSink for LogDiagnostics {
    fn warning(&mut self, message: &str) {
        log::warn!("{message}");
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        log::trace!("{stage}: {duration_ms:.1}ms");
    }
}

/// Discards all events. For tests and hosts with their own signaling.
pub struct NullDiagnostics;

impl DiagnosticsSink for NullDiagnostics {
    fn warning(&mut self, _message: &str) {}
    fn info(&mut self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_accepts_everything() {
        let mut sink = NullDiagnostics;
        sink.warning("w");
        sink.info("i");
        sink.timing("locate", 3.5);
    }

    #[test]
    fn test_log_sink_accepts_everything() {
        // No logger installed: calls must still be safe no-ops.
        let mut sink = LogDiagnostics;
        sink.warning("w");
        sink.info("i");
        sink.timing("classify", 1.0);
    }
}
