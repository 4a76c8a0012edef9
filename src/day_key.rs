use chrono::{Duration, NaiveDate};

/// 日期键格式，例如 "Monday 17.03.25"
///
/// chrono 的 `%A` 固定输出首字母大写的英文星期名，与区域设置无关。
pub const DAY_KEY_FORMAT: &str = "%A %d.%m.%y";

pub fn format_day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// 以 `today` 为基准偏移 `offset_days` 天后的日期键，用于查找明天的菜单
pub fn day_key(today: NaiveDate, offset_days: i64) -> String {
    format_day_key(today + Duration::days(offset_days))
}

/// 解析日期键；星期名与日期不一致时视为无效
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DAY_KEY_FORMAT).ok()
}
