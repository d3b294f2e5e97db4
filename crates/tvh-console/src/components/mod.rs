pub mod autorec_dialog;
pub mod config_grid;
pub mod epg_grid;
pub mod event_detail;
pub mod filter_bar;
pub mod help_overlay;
pub mod picker;
