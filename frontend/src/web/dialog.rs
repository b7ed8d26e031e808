//! 阻塞式提示框，用于冲突与写入失败

use tracing::warn;

pub fn alert(message: &str) {
    let shown = web_sys::window()
        .map(|w| w.alert_with_message(message).is_ok())
        .unwrap_or(false);
    if !shown {
        warn!("alert could not be shown: {}", message);
    }
}
