mod sweep;
mod types;
mod waterfall;

pub use sweep::{SweepAxis, SweepError, count_to_step, value_to_index};
pub use types::{
    Bar, BarType, BarValue, DecompositionError, Node, NodeKind, RawNode, add_elementwise,
};
pub use waterfall::{decomposition_to_waterfall, project_bars, select_index, visible_bars};
