use std::io::Write;

use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NoticeConfig {
    pub bell: bool,
    pub notice_ms: u64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            bell: false,
            notice_ms: 2500,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    posted_ms: f64,
}

impl Notice {
    pub fn is_visible(&self, config: &NoticeConfig, now_ms: f64) -> bool {
        now_ms - self.posted_ms < config.notice_ms as f64
    }
}

pub fn fire_notice<W: Write>(
    config: &NoticeConfig,
    out: &mut W,
    kind: NoticeKind,
    message: &str,
    now_ms: f64,
) -> Notice {
    if config.bell {
        out.write_all(b"\x07").ok();
        out.flush().ok();
    }
    match kind {
        NoticeKind::Info => log::info!("{}", message),
        NoticeKind::Error => log::error!("{}", message),
    }
    Notice {
        kind,
        text: message.to_string(),
        posted_ms: now_ms,
    }
}
