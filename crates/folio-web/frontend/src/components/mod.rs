pub mod chat_feed;
pub mod dock;
pub mod input_bar;
pub mod terminal;
pub mod window_frame;
