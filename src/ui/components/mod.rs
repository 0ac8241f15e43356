pub mod analysis_form;
pub mod history_panel;
pub mod report_view;
