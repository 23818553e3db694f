pub mod constants;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use string_utils::{safe_truncate_chars, sanitize_base_name, title_to_base_name};
pub use url_utils::{is_data_url, is_valid_url, normalize_image_url, url_path_extension};
