use serde::{Deserialize, Serialize};

use crate::clock::TimeOfDay;

/// 当前应该展示的餐次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    /// 晚餐结束后展示明天的早餐
    UpcomingBreakfast,
}

impl MealSlot {
    pub fn label(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
            MealSlot::UpcomingBreakfast => "Tomorrow's Breakfast",
        }
    }

    /// 菜单所在日期相对今天的偏移
    pub fn day_offset(&self) -> i64 {
        match self {
            MealSlot::UpcomingBreakfast => 1,
            _ => 0,
        }
    }
}

/// 各餐次的结束时间（不含）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealCutoffs {
    pub breakfast_end: TimeOfDay,
    pub lunch_end: TimeOfDay,
    pub dinner_end: TimeOfDay,
}

impl Default for MealCutoffs {
    fn default() -> Self {
        Self {
            breakfast_end: TimeOfDay::new(9, 30),
            lunch_end: TimeOfDay::new(14, 0),
            dinner_end: TimeOfDay::new(21, 30),
        }
    }
}

impl MealCutoffs {
    /// 截止时间必须在一天之内严格递增
    pub fn is_ordered(&self) -> bool {
        [self.breakfast_end, self.lunch_end, self.dinner_end]
            .iter()
            .all(TimeOfDay::is_valid)
            && self.breakfast_end < self.lunch_end
            && self.lunch_end < self.dinner_end
    }

    /// 按 (小时, 分钟) 整体比较，`now < cutoff` 即落在该餐次
    pub fn classify(&self, now: TimeOfDay) -> MealSlot {
        if now < self.breakfast_end {
            MealSlot::Breakfast
        } else if now < self.lunch_end {
            MealSlot::Lunch
        } else if now < self.dinner_end {
            MealSlot::Dinner
        } else {
            MealSlot::UpcomingBreakfast
        }
    }
}
