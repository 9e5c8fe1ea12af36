// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you the story
//! of how a document is retrieved: where it is fetched from, how long
//! media may take, and where the results land.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Lark Open API endpoints
// ---------------------------------------------------------------------------

/// Default Open API domain for document, drive, sheet and board calls.
pub const DEFAULT_API_DOMAIN: &str = "https://open.larksuite.com";

/// Default accounts domain hosting the OAuth authorization page.
pub const DEFAULT_AUTH_DOMAIN: &str = "https://accounts.larksuite.com";

/// How many blocks the docx API returns per page of results.
///
/// 500 is the API maximum; fewer pages means fewer sequential round-trips.
pub const LARK_BLOCKS_PAGE_SIZE: u32 = 500;

/// Scopes requested during interactive login.
pub const OAUTH_SCOPES: &str = "board:whiteboard:node:read docs:document.content:read docs:document.media:download docx:document:readonly drive:drive.metadata:readonly sheets:spreadsheet:readonly";

// ---------------------------------------------------------------------------
// Media budgets
// ---------------------------------------------------------------------------

/// Upper bound on a single image download or sheet request.
pub const MEDIA_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on a whiteboard snapshot download.
///
/// Diagrams are rendered server-side on demand, which is slower than
/// serving a stored image.
pub const BOARD_SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(60);

/// Highest per-class concurrency accepted from configuration.
pub const MAX_MEDIA_CONCURRENCY: u32 = 16;

// ---------------------------------------------------------------------------
// Local media serving
// ---------------------------------------------------------------------------

/// Port of the static file server that serves the media directory.
pub const DEFAULT_STATIC_PORT: u16 = 48080;

/// Default public prefix for stored media files.
pub const DEFAULT_MEDIA_BASE_URL: &str = "http://localhost:48080/static";

/// Default media directory, relative to the working directory.
pub const DEFAULT_MEDIA_DIR: &str = "static";

// ---------------------------------------------------------------------------
// Document layout
// ---------------------------------------------------------------------------

/// Separator placed between rendered blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Estimated characters per block, used to pre-allocate output strings.
///
/// This is a performance hint, not a constraint.
pub const CHARS_PER_BLOCK_ESTIMATE: usize = 128;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
