//! Diagnostic sink setup.
//!
//! Stdout carries protocol bytes only, so the sink is always handed an explicit
//! writer (stderr in the binary). `RUST_LOG` takes precedence over the filter
//! passed to [`init`].

use tracing::Subscriber;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter};

/// Builds the filter: `RUST_LOG` if set and valid, otherwise `default_filter`,
/// falling back to `info` when that does not parse either.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Builds a subscriber that writes diagnostics to `writer` only, without
/// installing it. Callers scope it with `tracing::subscriber::set_default`
/// or install it process-wide through [`init`].
pub fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false),
    )
}

/// Installs the sink for the whole process.
///
/// # Errors
///
/// Fails if a global subscriber has already been installed.
pub fn init<W>(default_filter: &str, writer: W) -> anyhow::Result<()>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing::subscriber::set_global_default(subscriber(env_filter(default_filter), writer))?;
    Ok(())
}

/// In-memory writer for asserting on diagnostics in tests.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(test)]
impl CapturedLog {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[cfg(test)]
impl std::io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl<'writer> MakeWriter<'writer> for CapturedLog {
    type Writer = CapturedLog;

    fn make_writer(&'writer self) -> Self::Writer {
        self.clone()
    }
}
