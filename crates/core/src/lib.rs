//! Core library for the SoundJam soundboard.
//!
//! Nothing in here knows about a GUI toolkit. The crate provides the pieces
//! a host needs to put a soundboard on screen: the circular progress dial's
//! geometry, the poof animation clock, cooperative timers, the board model
//! and the drag-and-drop importer. Each module owns one of those concerns
//! and exchanges plain data with the host.

pub mod animation;
pub mod assets;
pub mod board;
pub mod color;
pub mod config;
pub mod error;
pub mod hold;
pub mod import;
pub mod progress;
pub mod render;
pub mod timeline;

pub use animation::{AnimationClock, Blit, Frame, PoofAnimation};
pub use assets::SpriteSheet;
pub use board::{Board, Clip, ClipId, PlayCommand, PlayState, SelectionMode, Tile};
pub use color::Rgba;
pub use config::{AnimationConfig, AppConfig, BoardConfig, HoldConfig, ProgressConfig};
pub use error::{Result, SoundjamError};
pub use hold::{HoldButton, Release};
pub use import::{spawn_import, DropData, ImportEvent};
pub use progress::{Bounds, CircularProgressBar, DrawCommand, LineCap, ProgressGeometry, ProgressState};
pub use render::{Canvas, SvgCanvas};
pub use timeline::{ControlFlow, MonotonicClock, TimerId, TimerQueue};
