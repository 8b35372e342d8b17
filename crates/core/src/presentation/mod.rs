pub mod job_list_view;
pub mod results_view;
pub mod speaker_color;
pub mod status_badge;
pub mod text_renderer;
