//! Text output formatter
//!
//! Lists the requested buckets one entry per line, prefixed with a marker
//! for the bucket, followed by a summary line.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::scanner::{Disposition, EntryKind, Scan};
use crate::tokenizer::SEPARATOR;

use super::config::OutputConfig;

fn marker(disposition: Disposition) -> (&'static str, Color) {
    match disposition {
        Disposition::Included => ("+", Color::Green),
        Disposition::NotIncluded => ("-", Color::White),
        Disposition::Excluded => ("x", Color::Red),
        Disposition::Deselected => ("~", Color::Yellow),
    }
}

pub struct TextFormatter<W: WriteColor = StandardStream> {
    config: OutputConfig,
    out: W,
}

impl TextFormatter<StandardStream> {
    pub fn stdout(config: OutputConfig) -> Self {
        let choice = if config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::new(config, StandardStream::stdout(choice))
    }
}

impl<W: WriteColor> TextFormatter<W> {
    pub fn new(config: OutputConfig, out: W) -> Self {
        Self { config, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write the configured buckets of one scan.
    ///
    /// Only reads results; run the slow pass beforehand when showing
    /// anything other than included entries.
    pub fn write_scan(&mut self, scan: &Scan, with_header: bool) -> io::Result<()> {
        if with_header {
            self.out.set_color(ColorSpec::new().set_bold(true))?;
            writeln!(self.out, "{}", scan.basedir().display())?;
            self.out.reset()?;
        }

        let show = self.config.show.clone();
        let tag_lines = show.len() > 1;
        for disposition in show {
            if self.config.directories {
                let dirs = scan.state().directories().get(disposition);
                for dir in dirs {
                    self.write_entry(dir, EntryKind::Directory, disposition, tag_lines)?;
                }
            }
            for file in scan.state().files().get(disposition) {
                self.write_entry(file, EntryKind::File, disposition, tag_lines)?;
            }
        }

        if self.config.summary {
            self.write_summary(scan)?;
        }
        Ok(())
    }

    fn write_entry(
        &mut self,
        name: &str,
        kind: EntryKind,
        disposition: Disposition,
        tagged: bool,
    ) -> io::Result<()> {
        let (symbol, color) = marker(disposition);
        if tagged {
            self.out.set_color(ColorSpec::new().set_fg(Some(color)))?;
            write!(self.out, "{} ", symbol)?;
            self.out.reset()?;
        }

        let display = match (kind, name.is_empty()) {
            (EntryKind::Directory, true) => ".".to_string(),
            (EntryKind::Directory, false) => format!("{}{}", name, SEPARATOR),
            (EntryKind::File, _) => name.to_string(),
        };
        if kind == EntryKind::Directory {
            self.out
                .set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
        }
        writeln!(self.out, "{}", display)?;
        self.out.reset()
    }

    fn write_summary(&mut self, scan: &Scan) -> io::Result<()> {
        let state = scan.state();
        let files = state.files();
        let dirs = state.directories();

        let mut parts = vec![format!(
            "{} {} and {} {} included",
            files.included.len(),
            plural(files.included.len(), "file", "files"),
            dirs.included.len(),
            plural(dirs.included.len(), "directory", "directories"),
        )];
        if scan.has_slow_results() {
            for disposition in &Disposition::ALL[1..] {
                let count = files.get(*disposition).len() + dirs.get(*disposition).len();
                if count > 0 {
                    parts.push(format!("{} {}", count, disposition.label()));
                }
            }
        }

        // Truncate to milliseconds
        let elapsed = std::time::Duration::from_millis(scan.elapsed().as_millis() as u64);
        self.out.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(
            self.out,
            "\n{} ({})",
            parts.join(", "),
            humantime::format_duration(elapsed)
        )?;
        self.out.reset()
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DirectoryScanner;
    use crate::test_utils::TestTree;
    use termcolor::NoColor;

    fn render(scan: &Scan, config: OutputConfig) -> String {
        let mut formatter = TextFormatter::new(config, NoColor::new(Vec::new()));
        formatter.write_scan(scan, false).unwrap();
        String::from_utf8(formatter.into_inner().into_inner()).unwrap()
    }

    #[test]
    fn test_included_only_listing() {
        let tree = TestTree::with_files(&["a.txt", "b.log"]);
        let scan = DirectoryScanner::new()
            .with_basedir(tree.path())
            .with_includes(&["*.txt"])
            .scan()
            .unwrap();

        let out = render(
            &scan,
            OutputConfig {
                use_color: false,
                summary: false,
                ..Default::default()
            },
        );
        assert_eq!(out, "a.txt\n");
    }

    #[test]
    fn test_tagged_listing_with_directories() {
        let tree = TestTree::with_files(&["a.txt", "b.log"]);
        let mut scan = DirectoryScanner::new()
            .with_basedir(tree.path())
            .with_includes(&["*.txt"])
            .sorted()
            .scan()
            .unwrap();
        scan.slow_scan();

        let out = render(
            &scan,
            OutputConfig {
                use_color: false,
                show: vec![Disposition::Included, Disposition::NotIncluded],
                directories: true,
                summary: false,
            },
        );
        assert_eq!(out, "+ a.txt\n- .\n- b.log\n");
    }

    #[test]
    fn test_summary_counts() {
        let tree = TestTree::with_files(&["a.txt", "b.log", "c.log"]);
        let mut scan = DirectoryScanner::new()
            .with_basedir(tree.path())
            .with_includes(&["*.txt"])
            .scan()
            .unwrap();
        scan.slow_scan();

        let out = render(
            &scan,
            OutputConfig {
                use_color: false,
                show: vec![],
                ..Default::default()
            },
        );
        assert!(out.contains("1 file and 0 directories included"), "{}", out);
        assert!(out.contains("3 not included"), "{}", out);
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "file", "files"), "file");
        assert_eq!(plural(0, "file", "files"), "files");
        assert_eq!(plural(2, "file", "files"), "files");
    }
}
