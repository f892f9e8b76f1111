//! 演出核心
//!
//! - `effect`：效果接口与按场景持有的效果集合
//! - `scene`：带拍数预算的场景
//! - `sequencer`：按拍推进的场景序列

pub mod effect;
pub mod scene;
pub mod sequencer;

pub use effect::{BeatEvent, Effect, EffectBase, EffectRegistry};
pub use scene::Scene;
pub use sequencer::SceneSequencer;
