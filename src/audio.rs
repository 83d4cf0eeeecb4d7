use eyre::Result;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::Duration;

use crate::settings::{PLAYER_PRESET_LIST, Settings};

pub fn verse_audio_url(cdn: &str, verse_id: u32) -> String {
    format!("{}/{}.mp3", cdn.trim_end_matches('/'), verse_id)
}

/// `:` would open an alternate data stream on NTFS, so it is only kept on unix.
pub fn download_file_name(verse_key: &str) -> String {
    if cfg!(unix) {
        format!("verse-{verse_key}.mp3")
    } else {
        format!("verse-{}.mp3", verse_key.replace(':', "_"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Something that can play one verse recitation at a time.
pub trait AudioOutput {
    fn play(&mut self, url: &str) -> Result<()>;
    fn stop(&mut self);
    fn set_paused(&mut self, paused: bool) -> Result<()>;
    fn state(&self) -> PlaybackState;
    /// `Some(success)` once the current recitation ended on its own.
    fn poll_finished(&mut self) -> Option<bool>;
}

/// Player command for `settings`: an explicit player is used as configured,
/// "auto" picks the first preset found on `PATH`.
pub fn resolve_player(settings: &Settings) -> Option<(String, Vec<String>)> {
    let player = settings.player.trim();
    if !player.is_empty() && player != "auto" {
        return Some((player.to_string(), settings.player_args.clone()));
    }
    PLAYER_PRESET_LIST
        .iter()
        .find(|(name, _)| find_in_path(name).is_some())
        .map(|(name, args)| {
            (
                name.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
            )
        })
}

fn find_in_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        let exe = dir.join(format!("{program}.exe"));
        exe.is_file().then_some(exe)
    })
}

struct Finished {
    generation: u64,
    success: bool,
}

/// Plays recitations through an external player process, one at a time.
pub struct ProcessPlayer {
    command: Option<(String, Vec<String>)>,
    pid: Option<u32>,
    generation: u64,
    paused: bool,
    tx: Sender<Finished>,
    rx: Receiver<Finished>,
}

impl ProcessPlayer {
    pub fn new(command: Option<(String, Vec<String>)>) -> Self {
        let (tx, rx) = channel();
        Self {
            command,
            pid: None,
            generation: 0,
            paused: false,
            tx,
            rx,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let command = resolve_player(settings);
        match &command {
            Some((program, args)) => tracing::info!(program, ?args, "using audio player"),
            None => tracing::warn!("no audio player found on PATH"),
        }
        Self::new(command)
    }

    fn kill_current(&mut self) {
        // Bumping the generation first makes the wait thread's report stale.
        self.generation += 1;
        self.paused = false;
        if let Some(pid) = self.pid.take() {
            #[cfg(unix)]
            unsafe {
                libc::kill(-(pid as i32), libc::SIGCONT);
                libc::kill(-(pid as i32), libc::SIGKILL);
            }
            #[cfg(not(unix))]
            {
                let _ = Command::new("taskkill")
                    .args(["/PID", &pid.to_string(), "/T", "/F"])
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status();
            }
        }
    }
}

impl AudioOutput for ProcessPlayer {
    fn play(&mut self, url: &str) -> Result<()> {
        self.kill_current();
        let Some((program, args)) = self.command.clone() else {
            return Err(eyre::eyre!(
                "no audio player available; set \"player\" in the configuration"
            ));
        };

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group so players that fork helpers die together.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            unsafe {
                cmd.pre_exec(|| {
                    libc::setsid();
                    Ok(())
                });
            }
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| eyre::eyre!("could not start {program}: {e}"))?;
        self.pid = Some(child.id());
        let generation = self.generation;
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let success = child.wait().map(|status| status.success()).unwrap_or(false);
            let _ = tx.send(Finished {
                generation,
                success,
            });
        });
        tracing::debug!(url, generation, "playback started");
        Ok(())
    }

    fn stop(&mut self) {
        self.kill_current();
    }

    fn set_paused(&mut self, paused: bool) -> Result<()> {
        let Some(pid) = self.pid else {
            return Ok(());
        };
        #[cfg(unix)]
        {
            let signal = if paused { libc::SIGSTOP } else { libc::SIGCONT };
            unsafe {
                libc::kill(-(pid as i32), signal);
            }
            self.paused = paused;
            Ok(())
        }
        #[cfg(not(unix))]
        {
            let _ = (pid, paused);
            Err(eyre::eyre!("pausing is not supported on this platform"))
        }
    }

    fn state(&self) -> PlaybackState {
        match (self.pid, self.paused) {
            (None, _) => PlaybackState::Stopped,
            (Some(_), true) => PlaybackState::Paused,
            (Some(_), false) => PlaybackState::Playing,
        }
    }

    fn poll_finished(&mut self) -> Option<bool> {
        while let Ok(finished) = self.rx.try_recv() {
            if finished.generation == self.generation && self.pid.is_some() {
                self.pid = None;
                self.paused = false;
                return Some(finished.success);
            }
        }
        None
    }
}

impl Drop for ProcessPlayer {
    fn drop(&mut self) {
        self.kill_current();
    }
}

/// Fetches a recitation into `dest_dir` as `verse-<key>.mp3`.
pub fn download_verse_audio(
    url: &str,
    dest_dir: &Path,
    verse_key: &str,
    timeout: Duration,
) -> Result<PathBuf> {
    let mut builder = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("tilawa/", env!("CARGO_PKG_VERSION")));
    if url.starts_with("http://127.0.0.1") || url.starts_with("http://localhost") {
        builder = builder.no_proxy();
    }
    let client = builder.build()?;
    let bytes = client.get(url).send()?.error_for_status()?.bytes()?;

    std::fs::create_dir_all(dest_dir)?;
    let path = dest_dir.join(download_file_name(verse_key));
    std::fs::write(&path, &bytes)?;
    tracing::info!(path = %path.display(), size = bytes.len(), "saved recitation");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::time::Instant;

    fn wait_finished(player: &mut ProcessPlayer) -> Option<bool> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(result) = player.poll_finished() {
                return Some(result);
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        None
    }

    #[test]
    fn test_verse_audio_url() {
        assert_eq!(
            verse_audio_url("https://cdn.example/audio/", 262),
            "https://cdn.example/audio/262.mp3"
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_download_file_name_keeps_verse_key() {
        assert_eq!(download_file_name("2:255"), "verse-2:255.mp3");
    }

    #[test]
    #[cfg(not(unix))]
    fn test_download_file_name_avoids_stream_separator() {
        assert_eq!(download_file_name("2:255"), "verse-2_255.mp3");
    }

    #[test]
    fn test_explicit_player_is_used_verbatim() {
        let settings = Settings {
            player: "ffplay".to_string(),
            player_args: vec!["-nodisp".to_string()],
            ..Settings::default()
        };
        assert_eq!(
            resolve_player(&settings),
            Some(("ffplay".to_string(), vec!["-nodisp".to_string()]))
        );
    }

    #[test]
    fn test_play_without_player_fails() {
        let mut player = ProcessPlayer::new(None);
        assert!(player.play("http://x/1.mp3").is_err());
        assert_eq!(player.state(), PlaybackState::Stopped);
    }

    #[cfg(unix)]
    #[test]
    fn test_finished_reported_once() {
        let mut player = ProcessPlayer::new(Some(("true".to_string(), vec![])));
        player.play("http://x/1.mp3").unwrap();
        assert_eq!(wait_finished(&mut player), Some(true));
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert_eq!(player.poll_finished(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_player_reports_failure() {
        let mut player = ProcessPlayer::new(Some(("false".to_string(), vec![])));
        player.play("http://x/1.mp3").unwrap();
        assert_eq!(wait_finished(&mut player), Some(false));
    }

    #[cfg(unix)]
    #[test]
    fn test_stopped_track_does_not_report_finished() {
        let mut player = ProcessPlayer::new(Some(("sleep".to_string(), vec![])));
        player.play("5").unwrap();
        player.stop();
        assert_eq!(player.state(), PlaybackState::Stopped);
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(player.poll_finished(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_pause_and_resume() {
        let mut player = ProcessPlayer::new(Some(("sleep".to_string(), vec![])));
        player.play("5").unwrap();
        player.set_paused(true).unwrap();
        assert_eq!(player.state(), PlaybackState::Paused);
        player.set_paused(false).unwrap();
        assert_eq!(player.state(), PlaybackState::Playing);
        player.stop();
    }

    #[test]
    fn download_mock_http_writes_file() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            assert!(request_line.starts_with("GET /262.mp3"));
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }
            let mut stream = reader.into_inner();
            let body = b"ID3fake";
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(body).unwrap();
            stream.flush().unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let url = verse_audio_url(&base, 262);
        let path = download_verse_audio(&url, dir.path(), "2:255", Duration::from_secs(2)).unwrap();
        server.join().unwrap();

        assert_eq!(path, dir.path().join("verse-2:255.mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3fake");
    }
}
