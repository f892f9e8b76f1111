//! 按键映射：将原始按键代码转换为播放控制命令
//!
//! 负责维护配置的键位映射关系，并将原始输入事件转换为播放控制输入。

use std::collections::HashMap;

use crate::config::Keys;
use crate::loops::{Command, KeyState, RawInputMsg, RawKeyCode};

/// 按键映射器
pub struct KeyMap {
    /// 按键代码字符串到命令的映射
    map: HashMap<String, Command>,
}

impl KeyMap {
    /// 从键位配置创建映射器
    ///
    /// 多个命令配置为同一按键时，后出现的命令生效。
    #[must_use]
    pub fn new(keys: &Keys) -> Self {
        let pairs = [
            (&keys.start_countdown, Command::StartCountdown),
            (&keys.start_immediately, Command::StartImmediately),
            (&keys.stop, Command::Stop),
            (&keys.toggle_heavy_load, Command::ToggleHeavyLoad),
        ];
        let map = pairs
            .into_iter()
            .map(|(code, cmd)| (code.clone(), cmd))
            .collect();
        Self { map }
    }

    /// 已配置的按键代码
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// 将原始输入消息转换为控制命令
    ///
    /// 只有按下会产生命令；未映射的按键返回 `None`
    #[must_use]
    pub fn convert(&self, raw_msg: RawInputMsg) -> Option<Command> {
        match raw_msg {
            RawInputMsg::Key { code, state } => {
                let RawKeyCode(key_str) = code;
                let cmd = self.map.get(&key_str).copied()?;
                match state {
                    KeyState::Pressed => Some(cmd),
                    KeyState::Released => None,
                }
            }
        }
    }
}
