//! The capability surface handlers act through
//!
//! Everything a matched intent can do (speak, toggle the watch, launch
//! things, tap media keys) goes through [`Actions`]; handlers never
//! reach for globals or devices directly.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use crate::security::SecurityMonitor;
use crate::speech::SpeechHandle;
use crate::{Error, Result};

/// French day names, Monday first (matches `chrono::Weekday` ordering)
const WEEKDAYS: [&str; 7] = [
    "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
];

/// French month names
const MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Opens URLs and applications on the host
pub trait UrlLauncher {
    /// Open `url` in the default browser
    ///
    /// # Errors
    ///
    /// Returns error if no opener could be started
    fn open_url(&self, url: &str) -> Result<()>;

    /// Launch the configured browser directly
    ///
    /// # Errors
    ///
    /// Returns error if no candidate binary could be started
    fn open_browser(&self) -> Result<()>;
}

/// Sends media-control key taps to the host
pub trait MediaControl {
    /// Toggle play/pause
    ///
    /// # Errors
    ///
    /// Returns error if the key tap could not be delivered
    fn play_pause(&self) -> Result<()>;

    /// Nudge the system volume
    ///
    /// # Errors
    ///
    /// Returns error if the key tap could not be delivered
    fn volume(&self, up: bool) -> Result<()>;
}

/// Production launcher: configured browser paths, then the platform opener
pub struct SystemLauncher {
    browser_paths: Vec<PathBuf>,
}

impl SystemLauncher {
    /// Create a launcher trying `browser_paths` in order
    #[must_use]
    pub const fn new(browser_paths: Vec<PathBuf>) -> Self {
        Self { browser_paths }
    }

    /// The platform's URL opener command
    const fn opener() -> &'static str {
        if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(target_os = "windows") {
            "cmd"
        } else {
            "xdg-open"
        }
    }
}

impl UrlLauncher for SystemLauncher {
    fn open_url(&self, url: &str) -> Result<()> {
        let mut command = Command::new(Self::opener());
        if cfg!(target_os = "windows") {
            command.args(["/C", "start", ""]);
        }
        command
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Launch(format!("failed to open {url}: {e}")))?;
        Ok(())
    }

    fn open_browser(&self) -> Result<()> {
        for path in &self.browser_paths {
            if path.exists() {
                match Command::new(path)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                {
                    Ok(_) => return Ok(()),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "browser launch failed");
                    }
                }
            }
        }

        // Shell fallback: whatever the system resolves for common names
        for name in ["google-chrome", "chromium", "chrome"] {
            if let Ok(found) = which::which(name) {
                return Command::new(found)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .map(|_| ())
                    .map_err(|e| Error::Launch(format!("failed to launch {name}: {e}")));
            }
        }

        Err(Error::Launch("no browser binary found".to_string()))
    }
}

/// Media keys through synthetic input events
///
/// The backing engine is created on first use; a headless session where
/// it cannot initialize degrades to errors per tap, not a startup crash.
pub struct MediaTap {
    enigo: Mutex<Option<Enigo>>,
}

impl MediaTap {
    /// Create an idle tap source
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enigo: Mutex::new(None),
        }
    }

    fn tap(&self, key: Key) -> Result<()> {
        let mut guard = self
            .enigo
            .lock()
            .map_err(|_| Error::Launch("media tap state poisoned".to_string()))?;

        if guard.is_none() {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|e| Error::Launch(format!("input synthesis unavailable: {e}")))?;
            *guard = Some(enigo);
        }

        if let Some(enigo) = guard.as_mut() {
            enigo
                .key(key, Direction::Click)
                .map_err(|e| Error::Launch(format!("key tap failed: {e}")))?;
        }
        Ok(())
    }
}

impl Default for MediaTap {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaControl for MediaTap {
    fn play_pause(&self) -> Result<()> {
        self.tap(Key::MediaPlayPause)
    }

    fn volume(&self, up: bool) -> Result<()> {
        self.tap(if up { Key::VolumeUp } else { Key::VolumeDown })
    }
}

/// Capability bundle handed to intent handlers
pub struct Actions {
    speech: SpeechHandle,
    security: SecurityMonitor,
    launcher: Box<dyn UrlLauncher>,
    media: Box<dyn MediaControl>,
}

impl Actions {
    /// Bundle the capabilities
    #[must_use]
    pub fn new(
        speech: SpeechHandle,
        security: SecurityMonitor,
        launcher: Box<dyn UrlLauncher>,
        media: Box<dyn MediaControl>,
    ) -> Self {
        Self {
            speech,
            security,
            launcher,
            media,
        }
    }

    /// Queue `text` for vocalization
    pub fn speak(&self, text: impl Into<String>) {
        self.speech.say(text);
    }

    /// Speak the current time as HH:MM
    pub fn speak_time(&self) {
        let now = chrono::Local::now().format("%H:%M");
        self.speak(format!("Il est {now}."));
    }

    /// Speak today's date in French
    pub fn speak_date(&self) {
        use chrono::Datelike;

        let now = chrono::Local::now();
        let weekday = WEEKDAYS[now.weekday().num_days_from_monday() as usize];
        let month = MONTHS[now.month0() as usize];
        self.speak(format!(
            "Nous sommes le {weekday} {} {month} {}.",
            now.day(),
            now.year()
        ));
    }

    /// Arm the security watch, with a spoken notice
    pub fn arm_security(&self) {
        self.security.arm(true);
    }

    /// Disarm the security watch
    pub fn disarm_security(&self) {
        self.security.disarm();
    }

    /// Take a manual snapshot and confirm it out loud
    pub fn capture_now(&self) {
        self.security.capture(None);
        self.speak("Capture effectuée.");
    }

    /// Launch the browser and report the outcome out loud
    pub fn open_browser(&self) {
        match self.launcher.open_browser() {
            Ok(()) => self.speak("Chrome ouvert."),
            Err(e) => {
                tracing::warn!(error = %e, "browser launch failed");
                self.speak("Impossible d'ouvrir Chrome.");
            }
        }
    }

    /// Open WhatsApp Web
    pub fn open_whatsapp(&self) {
        self.open_announced("https://web.whatsapp.com", "Ouverture de WhatsApp Web");
    }

    /// Open the YouTube home page
    pub fn open_youtube(&self) {
        self.open_announced("https://www.youtube.com", "YouTube ouvert.");
    }

    /// Run a YouTube search for `terms`
    pub fn youtube_search(&self, terms: &str) {
        let url = format!(
            "https://www.youtube.com/results?search_query={}",
            urlencoding::encode(terms)
        );
        self.open_announced(&url, format!("Recherche YouTube pour {terms}"));
    }

    /// Run a Google search for `terms`
    pub fn google_search(&self, terms: &str) {
        let url = format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(terms)
        );
        self.open_announced(&url, format!("Recherche Google pour {terms}"));
    }

    /// Toggle media play/pause
    ///
    /// # Errors
    ///
    /// Returns error if the key tap could not be delivered
    pub fn media_play_pause(&self) -> Result<()> {
        self.media.play_pause()
    }

    /// Nudge the volume; delivery failures are logged, not propagated
    pub fn media_volume(&self, up: bool) {
        if let Err(e) = self.media.volume(up) {
            tracing::warn!(error = %e, "volume tap failed");
        }
    }

    fn open_announced(&self, url: &str, message: impl Into<String>) {
        match self.launcher.open_url(url) {
            Ok(()) => self.speak(message),
            Err(e) => {
                tracing::warn!(url, error = %e, "open failed");
                self.speak("Impossible d'ouvrir la page.");
            }
        }
    }
}
