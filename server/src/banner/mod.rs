pub mod assets;
pub mod background;
pub mod cache;
pub mod canvas;
pub mod clock;
pub mod compositor;
pub mod draw;
pub mod format;
pub mod history;
pub mod layout;
pub mod text;
pub mod widgets;

pub use compositor::RenderContext;
pub use history::HistoryBuffer;
