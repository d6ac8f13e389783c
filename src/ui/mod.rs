pub mod board;
pub mod icons;

pub use board::{render_board, render_loyalty, render_outcome, render_summary, render_task_line};
