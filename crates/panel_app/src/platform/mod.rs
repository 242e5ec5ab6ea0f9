mod effects;
mod render;
mod runtime;

pub use effects::{system_clock, Clock, EffectRunner, Followup, TimerEvent, TimerSlot};
pub use render::{render_lines, Renderer, TerminalRenderer};
pub use runtime::PanelRuntime;
