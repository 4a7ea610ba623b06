//! エディタセッション
//!
//! ウィンドウ単位の状態機械と、UI 側との境界

pub mod display;
pub mod editor;
pub mod factory;
pub mod shell;
pub mod state;

pub use display::{document_name, DisplayState, APP_TITLE, UNTITLED};
pub use editor::EditorSession;
pub use factory::BufferFactory;
pub use shell::{ConfirmRequest, ConfirmResponse, WindowShell};
pub use state::{CloseIntent, SessionState};
