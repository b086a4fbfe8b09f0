use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

/// Value of `PAGER` that disables paging.
pub const NO_PAGER: &str = "NOPAGER";

/// Pagers tried, in order, when `PAGER` is not set.
const FALLBACK_PAGERS: [(&str, &[&str]); 2] = [("less", &["-R"]), ("more", &[])];

/// Resolves the pager command: `PAGER` first, then the first fallback found
/// on the `PATH`. `None` means output goes straight to stdout.
pub fn resolve_pager() -> Option<(PathBuf, Vec<String>)> {
    match env::var("PAGER") {
        Ok(pager) if pager == NO_PAGER => None,
        Ok(pager) if !pager.trim().is_empty() => {
            let parts = shellwords::split(&pager).unwrap_or_else(|_| vec![pager.clone()]);
            let (exe, args) = parts.split_first()?;
            Some((PathBuf::from(exe), args.to_vec()))
        }
        _ => FALLBACK_PAGERS.iter().find_map(|(name, args)| match which::which(name) {
            Ok(path) => Some((path, args.iter().map(|a| a.to_string()).collect())),
            Err(e) => {
                log::warn!("Failed to find pager {name}: {e}");
                None
            }
        }),
    }
}

/// A running pager process.
///
/// Writing sends data to the pager; dropping closes its input and waits for
/// it to exit.
pub struct Pager {
    stdin: Option<ChildStdin>,
    process: Child,
}

impl Pager {
    /// Starts the resolved pager, or returns `None` when there is none.
    pub fn start() -> Option<io::Result<Self>> {
        let (path, args) = resolve_pager()?;
        log::info!("Using Pager {}", path.display());

        let mut process = match Command::new(&path).args(&args).stdin(Stdio::piped()).spawn() {
            Ok(process) => process,
            Err(e) => return Some(Err(e)),
        };
        let stdin = process.stdin.take();
        Some(Ok(Self { stdin, process }))
    }

    fn stdin(&mut self) -> io::Result<&mut ChildStdin> {
        self.stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "pager input is closed"))
    }
}

impl Write for Pager {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdin()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdin()?.flush()
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        self.stdin.take();
        log::debug!("Waiting for pager");
        match self.process.wait() {
            Ok(status) => log::info!("Pager done: {status}"),
            Err(e) => log::error!("Failed to wait for pager: {e}"),
        }
    }
}
