use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.quran.com/api/v4";
pub const DEFAULT_AUDIO_CDN: &str = "https://cdn.islamic.network/quran/audio/128/ar.muhammadayyoub";
pub const DEFAULT_RECITER: &str = "الشيخ محمد أيوب";

/// Players probed in order when `player` is "auto", with the arguments each needs
/// to play a URL headless and exit when done.
pub const PLAYER_PRESET_LIST: &[(&str, &[&str])] = &[
    ("mpv", &["--no-video", "--really-quiet"]),
    ("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"]),
    ("mplayer", &["-really-quiet", "-novideo"]),
    ("cvlc", &["--play-and-exit", "--quiet"]),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base: String,
    pub audio_cdn: String,
    pub player: String,
    pub player_args: Vec<String>,
    pub verses_per_page: u32,
    pub search_size: u32,
    pub request_timeout_secs: u64,
    pub download_dir: Option<String>,
    pub show_translation: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            audio_cdn: DEFAULT_AUDIO_CDN.to_string(),
            player: "auto".to_string(),
            player_args: Vec::new(),
            verses_per_page: 20,
            search_size: 20,
            request_timeout_secs: 15,
            download_dir: None,
            show_translation: true,
        }
    }
}
