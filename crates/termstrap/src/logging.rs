use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use termstrap_platform::AppPaths;

/// Append-only log file that is reopened when it disappears mid-run, e.g.
/// after the user clears the data directory.
struct ReopeningLogFile {
    path: PathBuf,
    file: Option<File>,
}

impl ReopeningLogFile {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = open_append(&path)?;
        Ok(Self {
            path,
            file: Some(file),
        })
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

impl Write for ReopeningLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.path.exists() {
            self.file = None;
        }
        let file = match self.file.take() {
            Some(file) => file,
            None => open_append(&self.path)?,
        };
        self.file.insert(file).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.as_mut().map_or(Ok(()), File::flush)
    }
}

/// Drop the older half of an oversized log, cutting at a line boundary.
fn trim_oversized_log(log_path: &Path, max_log_size: u64) {
    let Ok(metadata) = std::fs::metadata(log_path) else {
        return;
    };
    if metadata.len() <= max_log_size {
        return;
    }
    let Ok(contents) = std::fs::read(log_path) else {
        return;
    };

    let middle = contents.len() / 2;
    let keep_from = contents[middle..]
        .iter()
        .position(|&byte| byte == b'\n')
        .map_or(middle, |offset| middle + offset + 1);
    if let Err(error) = std::fs::write(log_path, &contents[keep_from..]) {
        eprintln!("termstrap: could not trim {}: {error}", log_path.display());
    }
}

fn terminal_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Progress goes to stderr; the log file under the data directory always
/// receives debug output so failed runs can be diagnosed afterwards.
pub fn init_logging(verbose: bool, max_log_size: u64) {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("termstrap")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::with_capacity(2);
    loggers.push(TermLogger::new(
        terminal_level(verbose),
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));

    let log_path = AppPaths::new().ok().and_then(|paths| {
        paths.ensure_dirs().ok()?;
        Some(paths.log_file())
    });

    if let Some(log_path) = &log_path {
        trim_oversized_log(log_path, max_log_size);
        if let Ok(writer) = ReopeningLogFile::open(log_path.clone()) {
            loggers.push(WriteLogger::new(LevelFilter::Debug, config, writer));
        }
    }

    let _ = CombinedLogger::init(loggers);

    if let Some(log_path) = log_path {
        log::debug!("Logging to {}", log_path.display());
    }
}
