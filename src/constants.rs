// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const FILENAME_TRUNCATE_LENGTH: usize = 65;
pub const MAX_FILENAME_BYTES: usize = 200;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "app.log";
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const DEFAULT_SAVE_DIR: &str = "downloads";
pub const DEFAULT_SELECTION: &str = "all";
pub const SESSION_COOKIE_NAME: &str = "MoodleSession";
pub const SESSION_ENV_VAR: &str = "MOODLE_SESSION";
pub const FALLBACK_COURSE_NAME: &str = "course";
pub const FALLBACK_FILE_STEM: &str = "document";
pub const FALLBACK_FOLDER_NAME: &str = "Folder";
pub const DEFAULT_MAX_FETCH_BYTES: u64 = 256 * 1024 * 1024;
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const HELP_SESSION_GUIDE: &str = r#"
1. Log in to your Moodle site with Chrome / Edge / Firefox.
2. Open the developer tools:
   - On Windows / Linux: press F12 or Ctrl+Shift+I
   - On macOS: press Cmd+Opt+I
3. Switch to the "Application" tab (Chrome/Edge) or "Storage" tab (Firefox).
4. Under "Cookies", select your Moodle site and copy the value of the
   cookie named "MoodleSession".
   (The cookie is HttpOnly, so it is not visible from the console.)
5. Provide the value in one of three ways:
----------------------------------------------
  moodle-pack --url <COURSE_URL> --session <VALUE>
  MOODLE_SESSION=<VALUE> moodle-pack --url <COURSE_URL>
  (or store it when prompted; it is kept in the config file)
----------------------------------------------
The cookie expires when the browser session does; repeat these steps
whenever the tool reports an authentication failure."#;

pub mod selectors {
    pub mod course {
        pub const HEADER: &str = ".page-header-headings";
        pub const HEADER_INNER: &str = ".h2";
        pub const TOPICS: &str = ".topics";
        pub const SECTION: &str = r#"[id*="section-"]"#;
        pub const SECTION_TITLE: &str = "h3";
        pub const ACTIVITY_LIST: &str = "ul";
        pub const ACTIVITY_ITEM: &str = r#"li[class^="activity"]"#;
        pub const ACTIVITY_LINK: &str = ".activityname a";
        pub const ACTIVITY_ICON: &str = "img";
        pub const ACCESS_HIDE: &str = ".accesshide";
    }
    pub mod wrapper {
        pub const LINK: &str = ".resourceworkaround a";
        pub const OBJECT: &str = "object#resourceobject";
        pub const IFRAME: &str = "iframe#resourceobject";
    }
    pub mod folder {
        pub const TREE_LINKS: &str = ".foldertree a[href]";
        pub const MANAGER_LINKS: &str = ".filemanager a[href]";
        pub const HEADING: &str = "#region-main h2";
    }
    pub mod video {
        pub const SOURCE: &str = "video source[src]";
        pub const DIRECT: &str = "video[src]";
        pub const EMBED: &str = "iframe[src]";
    }
}
