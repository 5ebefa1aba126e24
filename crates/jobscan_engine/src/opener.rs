use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("opening links is unsupported on `{0}`")]
    Unsupported(String),
    #[error("url opener `{program}` could not be started: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Host facility that opens a URL outside the app, usually in a browser.
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<(), OpenError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenCommand {
    program: PathBuf,
    prefix_args: Vec<OsString>,
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Clone)]
pub struct SystemUrlOpener {
    command: OpenCommand,
}

impl SystemUrlOpener {
    pub fn new() -> Result<Self, OpenError> {
        let command = command_for_os(std::env::consts::OS)?;
        Ok(Self { command })
    }

    fn args_for_url(&self, url: &str) -> Vec<OsString> {
        let mut args = self.command.prefix_args.clone();
        args.push(OsString::from(url));
        args
    }
}

fn command_for_os(target_os: &str) -> Result<OpenCommand, OpenError> {
    match target_os {
        "macos" => Ok(OpenCommand {
            program: PathBuf::from("open"),
            prefix_args: Vec::new(),
        }),
        "linux" | "freebsd" | "openbsd" | "netbsd" => Ok(OpenCommand {
            program: PathBuf::from("xdg-open"),
            prefix_args: Vec::new(),
        }),
        // Not `cmd /C start`: cmd splits the URL at every `&`.
        "windows" => Ok(OpenCommand {
            program: PathBuf::from("rundll32"),
            prefix_args: vec![OsString::from("url.dll,FileProtocolHandler")],
        }),
        _ => Err(OpenError::Unsupported(target_os.to_string())),
    }
}

impl UrlOpener for SystemUrlOpener {
    fn open(&self, url: &str) -> Result<(), OpenError> {
        let mut command = Command::new(&self.command.program);
        command
            .args(self.args_for_url(url))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        spawn_reaped(&mut command)
            .map(|_| ())
            .map_err(|source| OpenError::Spawn {
                program: self.command.program.display().to_string(),
                source,
            })
    }
}

/// Spawns `command` and waits for it on a background thread so the handler
/// does not linger as a zombie.
fn spawn_reaped(command: &mut Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command.spawn()?;
    thread::Builder::new()
        .name("url-opener-reaper".to_string())
        .spawn(move || child.wait())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_matches_platform() {
        let mac = command_for_os("macos").unwrap();
        assert_eq!(mac.program, PathBuf::from("open"));

        let linux = command_for_os("linux").unwrap();
        assert_eq!(linux.program, PathBuf::from("xdg-open"));

        let windows = command_for_os("windows").unwrap();
        assert_eq!(windows.program, PathBuf::from("rundll32"));
    }

    #[test]
    fn unknown_platform_is_unsupported() {
        let err = command_for_os("plan9").unwrap_err();
        assert!(matches!(err, OpenError::Unsupported(os) if os == "plan9"));
    }

    #[test]
    fn windows_passes_query_url_as_one_untouched_argument() {
        let opener = SystemUrlOpener {
            command: command_for_os("windows").unwrap(),
        };
        let url = "https://accounts.example/oauth?client_id=abc&redirect_uri=x&scope=mail";
        let args = opener.args_for_url(url);
        assert_eq!(
            args,
            vec![
                OsString::from("url.dll,FileProtocolHandler"),
                OsString::from(url),
            ]
        );
        assert!(!args.iter().any(|arg| arg == "/C" || arg == "start"));
    }

    #[cfg(unix)]
    #[test]
    fn spawned_handler_is_waited_on() {
        let reaper = spawn_reaped(&mut Command::new("true")).unwrap();
        let status = reaper.join().unwrap().unwrap();
        assert!(status.success());
    }
}
