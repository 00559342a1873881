//! Reply Parsing
//!
//! Pulls structured results out of free-form model replies.
//!
//! - **Emotion tags**: `[EMOTION:<n>]` anywhere in the reply
//! - **Gait objects**: a flat `{"y_vel": .., "yaw_vel": .., "freq_offset": ..}`
//!   embedded in surrounding prose
//!
//! Both parsers degrade to defaults instead of failing.
//!
//! # Example
//!
//! ```rust
//! use ser_core::parsing::{EmotionParser, MotionParser, OutputParser};
//!
//! let emotion = EmotionParser::new().parse("好的！[EMOTION:1]");
//! assert_eq!(emotion.label(), 1);
//!
//! let motion = MotionParser::new().parse(r#"{"y_vel": 0.2, "yaw_vel": 0.0, "freq_offset": 0.0}"#);
//! assert_eq!(motion.y_vel, 0.2);
//! ```

mod emotion;
mod motion;
mod parser;

pub use emotion::{Emotion, EmotionParser, EmotionResult};
pub use motion::{MotionParser, MotionResult};
pub use parser::OutputParser;
