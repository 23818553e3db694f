//! Shared configuration constants for articlescrape
//!
//! Default values used by the config builder, the browser launcher and the
//! image pipeline, kept in one place to avoid magic numbers.

/// Chrome user agent string sent by both the browser and the image client
///
/// Matches a current desktop Chrome on macOS. Update quarterly to stay within
/// a reasonable version window.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Accept-Language header for image requests
pub const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Host prepended to host-relative (`/...`) image URLs
pub const DEFAULT_BASE_HOST: &str = "https://mp.weixin.qq.com";

/// Root directory under which per-article directories are created
pub const DEFAULT_OUTPUT_DIR: &str = "articles";

/// Retrieval attempts before giving up on a URL
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Browser window size
pub const DEFAULT_WINDOW_WIDTH: u32 = 1920;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 1080;

/// Upper bound on scroll rounds for pages that keep growing forever
pub const DEFAULT_MAX_SCROLL_ROUNDS: u32 = 50;

/// Maximum size for a single image download: 10MB
///
/// Article images are typically 50-800KB; long infographics can reach a few MB.
pub const DEFAULT_MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Parallel image fetches per article
pub const DEFAULT_IMAGE_CONCURRENCY: usize = 4;

/// Characters kept from a title when deriving a directory base name
pub const MAX_BASE_NAME_CHARS: usize = 50;

/// Name of the per-article image directory, also used in rewritten `src` paths
pub const IMAGES_DIR_NAME: &str = "images";
