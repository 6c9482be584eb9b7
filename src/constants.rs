//! Centralized constants for bubblechat.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "bubblechat";

/// Default Gemini model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// System prompt sent once at session setup unless overridden in config.
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("prompts/system_prompt.txt");

/// First transcript entry shown in every interactive session.
pub const WELCOME_MESSAGE: &str = "Welcome to BubbleChat! Type your message below:";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "bubblechat.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

/// Log filename, written under the cache directory.
pub const LOG_FILENAME: &str = "bubblechat.log";

// --- Gemini ---

/// Default base URL for the Gemini REST API.
pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variable consulted first for the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

// --- Conversation loop ---

/// Maximum chat round-trips (query plus tool results) per user turn.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Name of the single string argument every command tool takes.
pub const COMMAND_ARGUMENT: &str = "command";

// --- Retry defaults ---

/// Total attempts per chat send, including the first.
pub const RETRY_MAX_ATTEMPTS_DEFAULT: u32 = 3;

/// Delay before the first retry.
pub const RETRY_INITIAL_BACKOFF_SECS_DEFAULT: u64 = 10;

/// Upper bound for a single retry delay.
pub const RETRY_MAX_BACKOFF_SECS_DEFAULT: u64 = 60;

/// Growth factor between consecutive retry delays.
pub const RETRY_BACKOFF_FACTOR_DEFAULT: f64 = 2.0;

/// Whether retry delays are randomized.
pub const RETRY_JITTER_DEFAULT: bool = true;

/// Randomization factor applied to retry delays when jitter is on.
pub const RETRY_RANDOMIZATION_FACTOR: f64 = 0.5;

// --- Tool limits ---

/// Default wall-clock limit for a single tool subprocess.
pub const TOOL_DEFAULT_TIMEOUT_SECS: u64 = 120;

// --- TUI ---

/// Spinner frames shown while a turn is running.
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

// --- Entry colours (RGB) ---

pub const ERROR_RGB: (u8, u8, u8) = (0xcc, 0x00, 0x00);
pub const AGENT_RGB: (u8, u8, u8) = (0x72, 0x9f, 0xcf);
pub const USER_RGB: (u8, u8, u8) = (0xd3, 0xd7, 0xcf);
pub const TOOL_RGB: (u8, u8, u8) = (0x32, 0xaf, 0xff);
