use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};

use crate::cache::MenuCache;
use crate::clock::{Clock, TimeOfDay};
use crate::day_key::day_key;
use crate::dispatch::{EventReceiver, EventSender, WidgetEvent};
use crate::meal::{MealCutoffs, MealSlot};
use crate::model::WeeklySchedule;
use crate::network::{FetchError, MenuFetcher};
use crate::scheduler::RefreshScheduler;

/// 没有任何菜单可用
pub const WEEKLY_MENU_MISSING: &str = "Couldn't find weekly menu";
/// 菜单里缺少需要展示的那一天
pub const CURRENT_MENU_MISSING: &str = "Couldn't find current menu";

/// 宿主的展示面
pub trait DisplaySurface: Send + Sync {
    fn render(&self, meal_label: &str, menu_text: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuView {
    pub slot: MealSlot,
    pub text: String,
}

impl MenuView {
    pub fn label(&self) -> &'static str {
        self.slot.label()
    }
}

/// 根据渲染时刻计算餐次与要展示的文字
pub fn render_view(
    schedule: Option<&WeeklySchedule>,
    now: DateTime<Local>,
    cutoffs: &MealCutoffs,
) -> MenuView {
    let slot = cutoffs.classify(TimeOfDay::of(&now));
    let key = day_key(now.date_naive(), slot.day_offset());

    let text = match schedule {
        None => WEEKLY_MENU_MISSING,
        Some(schedule) => match schedule.get(&key) {
            Some(menu) if !menu.dish(slot).trim().is_empty() => menu.dish(slot),
            Some(_) => CURRENT_MENU_MISSING,
            None => {
                debug!("No menu for {:?} in cached schedule", key);
                CURRENT_MENU_MISSING
            }
        },
    };

    MenuView {
        slot,
        text: text.to_string(),
    }
}

/// 展示刷新的编排者，所有事件都在同一个控制任务里依次处理
pub struct MenuWidget {
    cache: Arc<MenuCache>,
    fetcher: Arc<dyn MenuFetcher>,
    scheduler: RefreshScheduler,
    display: Arc<dyn DisplaySurface>,
    clock: Arc<dyn Clock>,
    cutoffs: MealCutoffs,
    events: EventSender,
    fetches_in_flight: usize,
}

impl MenuWidget {
    pub fn new(
        cache: Arc<MenuCache>,
        fetcher: Arc<dyn MenuFetcher>,
        scheduler: RefreshScheduler,
        display: Arc<dyn DisplaySurface>,
        clock: Arc<dyn Clock>,
        cutoffs: MealCutoffs,
        events: EventSender,
    ) -> Self {
        Self {
            cache,
            fetcher,
            scheduler,
            display,
            clock,
            cutoffs,
            events,
            fetches_in_flight: 0,
        }
    }

    pub fn fetches_in_flight(&self) -> usize {
        self.fetches_in_flight
    }

    /// 处理单个事件；收到 [`WidgetEvent::Shutdown`] 时返回 false
    pub async fn handle(&mut self, event: WidgetEvent) -> bool {
        debug!("Handling {:?}", event);
        match event {
            WidgetEvent::Wake | WidgetEvent::Reload | WidgetEvent::Enabled | WidgetEvent::Boot => {
                self.update().await;
            }
            WidgetEvent::Refetch => {
                info!("Refetch requested");
                self.start_fetch();
                self.schedule_next();
            }
            WidgetEvent::Disabled => {
                info!("Last surface removed, cancelling updates");
                self.scheduler.cancel();
            }
            WidgetEvent::FetchCompleted(result) => {
                self.finish_fetch(result).await;
            }
            WidgetEvent::Shutdown => return false,
        }
        true
    }

    #[tracing::instrument(skip(self, events))]
    pub async fn run(mut self, mut events: EventReceiver) {
        info!("Widget control loop started");
        while let Some(event) = events.recv().await {
            if !self.handle(event).await {
                break;
            }
        }
        info!("Widget control loop stopped");
    }

    async fn update(&mut self) {
        let now = self.clock.now();
        if self.cache.is_valid(now).await {
            self.render().await;
        } else {
            info!("Cached menu is stale, fetching");
            self.start_fetch();
        }
        self.schedule_next();
    }

    /// 在后台任务里获取，结果以事件形式投递回控制任务
    fn start_fetch(&mut self) {
        let fetcher = self.fetcher.clone();
        let events = self.events.clone();
        self.fetches_in_flight += 1;
        tokio::spawn(async move {
            let result = fetcher.fetch().await;
            events.send(WidgetEvent::FetchCompleted(result));
        });
    }

    async fn finish_fetch(&mut self, result: Result<WeeklySchedule, FetchError>) {
        self.fetches_in_flight = self.fetches_in_flight.saturating_sub(1);
        match result {
            Ok(schedule) => {
                if let Err(e) = self.cache.set(schedule).await {
                    warn!("Rejected fetched schedule: {}", e);
                }
            }
            Err(e) => warn!("Menu fetch failed: {}", e),
        }
        self.render().await;
    }

    async fn render(&self) {
        let now = self.clock.now();
        self.cache.restore(now).await;
        let view = self
            .cache
            .read(|schedule| render_view(schedule, now, &self.cutoffs))
            .await;
        info!("Rendering {}: {}", view.label(), view.text);
        self.display.render(view.label(), &view.text);
    }

    fn schedule_next(&self) {
        if let Err(e) = self.scheduler.schedule_next(self.clock.now()) {
            error!("Failed to schedule next update: {}", e);
        }
    }
}
