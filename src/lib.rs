pub mod cache;
pub mod clock;
pub mod config;
pub mod day_key;
pub mod dispatch;
pub mod error;
pub mod logger;
pub mod meal;
pub mod model;
pub mod network;
pub mod scheduler;
pub mod storage;
pub mod widget;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, Result};

pub mod prelude {
    pub use crate::cache::{MemoryStore, MenuCache, ScheduleStore};
    pub use crate::clock::{Clock, SystemClock, TimeOfDay};
    pub use crate::dispatch::{EventSender, WidgetEvent};
    pub use crate::meal::{MealCutoffs, MealSlot};
    pub use crate::model::{DayMenu, WeeklySchedule};
    pub use crate::network::{HttpMenuFetcher, MenuFetcher};
    pub use crate::scheduler::{RefreshScheduler, TokioWakeFacility, TriggerSchedule, WakeFacility};
    pub use crate::storage::FileStore;
    pub use crate::widget::{DisplaySurface, MenuWidget};
}
