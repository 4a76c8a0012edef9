use std::sync::Arc;

use mess_menu_widget::dispatch::{self, EventSender};
use mess_menu_widget::logger::init_logger;
use mess_menu_widget::prelude::*;
use mess_menu_widget::Config;
use tokio::signal;
use tracing::info;

/// 把渲染结果写到日志里的展示面
struct LogDisplay;

impl DisplaySurface for LogDisplay {
    fn render(&self, meal_label: &str, menu_text: &str) {
        info!(meal = %meal_label, "{}", menu_text);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_logger(&config.log_filter);

    info!("Starting menu widget host");
    info!("Menu endpoint: {}", config.endpoint);

    let (events, receiver) = dispatch::channel();

    let widget = build_widget(&config, &events)?;
    let control = tokio::spawn(widget.run(receiver));

    // 宿主启动即视为展示面首次激活
    events.send(WidgetEvent::Boot);

    #[cfg(unix)]
    forward_user_signals(events.clone())?;

    // 等待关闭信号
    wait_for_shutdown().await;

    info!("Shutting down...");
    events.send(WidgetEvent::Disabled);
    events.send(WidgetEvent::Shutdown);
    control.await?;
    info!("Shutdown complete");

    Ok(())
}

/// 按配置组装各组件
fn build_widget(config: &Config, events: &EventSender) -> mess_menu_widget::Result<MenuWidget> {
    let store = Arc::new(FileStore::new(&config.store_dir)?);
    let cache = Arc::new(MenuCache::new(store));
    let fetcher = Arc::new(HttpMenuFetcher::new(&config.endpoint)?);
    let facility = Arc::new(TokioWakeFacility::new(events.clone())?);
    let scheduler = RefreshScheduler::new(config.trigger_schedule()?, facility);

    Ok(MenuWidget::new(
        cache,
        fetcher,
        scheduler,
        Arc::new(LogDisplay),
        Arc::new(SystemClock),
        config.meals,
        events.clone(),
    ))
}

/// SIGUSR1 相当于点击刷新按钮，SIGUSR2 相当于点击展示面
#[cfg(unix)]
fn forward_user_signals(events: EventSender) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut refetch = signal(SignalKind::user_defined1())?;
    let mut reload = signal(SignalKind::user_defined2())?;
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                Some(()) = refetch.recv() => WidgetEvent::Refetch,
                Some(()) = reload.recv() => WidgetEvent::Reload,
                else => break,
            };
            if !events.send(event) {
                break;
            }
        }
    });
    Ok(())
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
