use tokio::sync::mpsc;
use tracing::warn;

use crate::model::WeeklySchedule;
use crate::network::FetchError;

/// 控制线程按顺序处理的事件
#[derive(Debug)]
pub enum WidgetEvent {
    /// 定时唤醒
    Wake,
    /// 用户点击了展示面
    Reload,
    /// 用户点击了刷新按钮，强制重新获取
    Refetch,
    /// 第一个展示面被添加
    Enabled,
    /// 最后一个展示面被移除
    Disabled,
    /// 宿主重启完成
    Boot,
    /// 后台获取结束，由获取任务投递回控制线程
    FetchCompleted(Result<WeeklySchedule, FetchError>),
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<WidgetEvent>,
}

impl EventSender {
    /// 投递事件；控制线程已退出时返回 false
    pub fn send(&self, event: WidgetEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                warn!("Control loop is gone, dropping event {:?}", e.0);
                false
            }
        }
    }
}

#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<WidgetEvent>,
}

impl EventReceiver {
    pub async fn recv(&mut self) -> Option<WidgetEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<WidgetEvent> {
        self.rx.try_recv().ok()
    }
}

pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}
