use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use std::path::Path;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields, FormattedFields},
    prelude::*,
    registry::LookupSpan,
    EnvFilter, Layer, Registry,
};

/// Terminal + hourly-rotated file logging. The returned guard flushes the
/// file writer on drop and must be kept alive by the caller.
pub fn setup_logger() -> Option<WorkerGuard> {
    std::fs::create_dir_all("logs").ok();
    let (file_layer, guard) = file_layer::<Registry>(Path::new("logs"));

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter);

    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();

    // A subscriber set elsewhere (tests) keeps working; the guard is useless then.
    installed.ok().map(|_| guard)
}

fn file_layer<S>(dir: &Path) -> (impl Layer<S>, WorkerGuard)
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file_appender = tracing_appender::rolling::hourly(dir, "merak");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(LevelFilter::INFO);
    (layer, guard)
}

// --- Formatters ---

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

fn wallet_id<S, N>(ctx: &FmtContext<'_, S, N>) -> Option<String>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let span = ctx.lookup_current()?;
    let wallet = span.scope().find(|s| s.name() == "wallet")?;
    let extensions = wallet.extensions();
    let fields = extensions.get::<FormattedFields<N>>()?;
    field_value(&fields.fields, "wallet_id").map(str::to_string)
}

/// Value of `key` in a `key=value key2=value2` rendering.
fn field_value<'a>(formatted: &'a str, key: &str) -> Option<&'a str> {
    formatted
        .split_whitespace()
        .find_map(|pair| pair.strip_prefix(key)?.strip_prefix('='))
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut msg_visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut msg_visitor);
        let msg = msg_visitor.message;

        let colored_msg = if msg.starts_with("SUCCESS") || msg.starts_with("COMPLETE") {
            let green_text = Style::new().fg(Color::LightGreen).bold();
            match msg.split_once(' ') {
                Some((tag, rest)) => format!("{} {}", green_text.paint(tag), rest),
                None => green_text.paint(msg.as_str()).to_string(),
            }
        } else if msg.starts_with("FAILED") {
            let red_text = Style::new().fg(Color::LightRed).bold();
            msg.replacen("FAILED", &format!("{}", red_text.paint("FAILED")), 1)
        } else if msg.starts_with("WALLET") || msg.starts_with("SUMMARY") {
            let magenta = Style::new().fg(Color::Magenta).bold();
            match msg.split_once(' ') {
                Some((tag, rest)) => format!("{} {}", magenta.paint(tag), rest),
                None => msg,
            }
        } else {
            msg
        };

        let timestamp = Style::new()
            .dimmed()
            .paint(format!("[{}]", Local::now().format("%H:%M:%S")));
        let level = match *event.metadata().level() {
            Level::ERROR => Color::Red.bold().paint(" ERROR "),
            Level::WARN => Color::Yellow.bold().paint(" WARN  "),
            Level::INFO => Color::Blue.paint(" INFO  "),
            _ => Style::new().dimmed().paint(" DEBUG "),
        };

        write!(writer, "{}{}", timestamp, level)?;
        if let Some(id) = wallet_id(ctx) {
            write!(writer, "[{}] ", id)?;
        }
        write!(writer, "{}", colored_msg)?;
        writeln!(writer)
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = event.metadata().level();

        write!(writer, "{} [{}] ", timestamp, level)?;
        if let Some(id) = wallet_id(ctx) {
            write!(writer, "[{}] ", id)?;
        }

        let mut msg_visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut msg_visitor);
        writeln!(writer, "{}", msg_visitor.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{error, info};

    #[test]
    fn test_field_value() {
        assert_eq!(field_value("wallet_id=001", "wallet_id"), Some("001"));
        assert_eq!(field_value("attempt=2 wallet_id=014", "wallet_id"), Some("014"));
        assert_eq!(field_value("wallet_idx=3", "wallet_id"), None);
        assert_eq!(field_value("", "wallet_id"), None);
    }

    #[test]
    fn test_file_log_tagged_and_flushed_on_guard_drop() {
        let dir = tempfile::tempdir().unwrap();
        let (layer, guard) = file_layer::<Registry>(dir.path());
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            info!("before any wallet");
            let span = tracing::info_span!("wallet", wallet_id = %format!("{:03}", 1));
            let _entered = span.enter();
            error!("FATAL ERROR boom");
        });
        drop(guard);

        let mut content = String::new();
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            content.push_str(&std::fs::read_to_string(entry.unwrap().path()).unwrap());
        }
        assert!(content.contains("[INFO] before any wallet"), "{}", content);
        assert!(content.contains("[ERROR] [001] FATAL ERROR boom"), "{}", content);
        assert!(!content.contains("wallet_id="), "{}", content);
    }
}
