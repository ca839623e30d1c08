pub mod background_dispatcher;
pub mod http_upload_sink;
pub mod local_save_sink;
pub mod png_encoder;
