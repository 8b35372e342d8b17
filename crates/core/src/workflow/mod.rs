pub mod edit_segments_use_case;
pub mod export_use_case;
pub mod upload_request;
pub mod upload_use_case;
pub mod workflow_error;
