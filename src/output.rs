use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::outcome::RankedTracker;

/// One URL per line with a trailing newline. With `blank_line_separator`
/// an empty line sits between entries, the layout qBittorrent expects.
pub fn render(trackers: &[RankedTracker], blank_line_separator: bool) -> String {
    if trackers.is_empty() {
        return String::new();
    }

    let separator = if blank_line_separator { "\n\n" } else { "\n" };
    let mut text = trackers
        .iter()
        .map(|t| t.url.as_str())
        .collect::<Vec<_>>()
        .join(separator);
    text.push('\n');
    text
}

/// Writes the list next to `path` first and renames it into place, so a
/// reader never sees a half-written file.
pub fn write_trackers(
    path: &Path,
    trackers: &[RankedTracker],
    blank_line_separator: bool,
) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let written = File::create(&tmp).and_then(|file| {
        let mut writer = BufWriter::new(file);
        writer.write_all(render(trackers, blank_line_separator).as_bytes())?;
        writer.flush()
    });

    if let Err(e) = written.and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

/// Log lines for the top `count` trackers.
pub fn preview_lines(trackers: &[RankedTracker], count: usize) -> Vec<String> {
    trackers
        .iter()
        .take(count)
        .map(|t| match t.latency_ms {
            Some(ms) => format!("{:>8.1}ms - {}", ms, t.url),
            None => format!("{:>10} - {}", "n/a", t.url),
        })
        .collect()
}
