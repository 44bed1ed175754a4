pub mod file_info;
pub mod header;
pub mod progress_bar;
pub mod results_table;
pub mod threat_chart;
pub mod toast;
pub mod upload_area;
