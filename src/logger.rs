use tracing::warn;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::EnvFilter;

/// 安装全局日志订阅者；`RUST_LOG` 优先，其次使用配置中的默认指令
///
/// `default_directives` 可以是逗号分隔的多条指令。
pub fn init_logger(default_directives: &str) {
    let (filter, rejected) = env_filter(default_directives);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_ids(true)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .is_ok();

    if installed {
        for (directive, e) in rejected {
            warn!("Ignoring invalid log directive {:?}: {}", directive, e);
        }
    }
}

/// 环境变量过滤器加上默认指令；返回无法解析的指令
fn env_filter(default_directives: &str) -> (EnvFilter, Vec<(String, ParseError)>) {
    let mut filter = EnvFilter::from_default_env();
    let mut rejected = Vec::new();
    for raw in default_directives.split(',').map(str::trim).filter(|raw| !raw.is_empty()) {
        match raw.parse::<Directive>() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => rejected.push((raw.to_string(), e)),
        }
    }
    (filter, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_LOG_FILTER;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn capture_with(default_directives: &str, emit: impl FnOnce()) -> String {
        let (filter, rejected) = env_filter(default_directives);
        assert!(rejected.is_empty());

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        captured.text()
    }

    #[test]
    fn test_default_filter_lets_host_display_through() {
        let output = capture_with(DEFAULT_LOG_FILTER, || {
            tracing::info!(target: "menu_widget_host", meal = %"Lunch", "Dal");
            tracing::info!(target: "mess_menu_widget::widget", "Rendering Lunch");
            tracing::debug!(target: "mess_menu_widget::cache", "Cache hit");
        });

        assert!(output.contains("meal=Lunch"), "{}", output);
        assert!(output.contains("Dal"));
        assert!(output.contains("Rendering Lunch"));
        assert!(!output.contains("Cache hit"));
    }

    #[test]
    fn test_invalid_directive_is_reported() {
        let (_, rejected) = env_filter("mess_menu_widget=info, not a [valid directive");
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, "not a [valid directive");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logger("mess_menu_widget=debug");
        init_logger("not a [valid directive");
    }
}
