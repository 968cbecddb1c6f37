//! Line-oriented curation loop over a [`CurationSession`].

use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::archiver;
use crate::error::{CatalogError, Result};
use crate::render::RenderOptions;
use crate::session::{Catalog, CurationSession, LoadOutcome};

pub const CATALOG_HTML: &str = "catalog.html";

const HELP: &str = "\
commands:
  list                 show the catalog, three per row
  rm <i> [<j> ...]     delete by index (also 0,2 or 1-3)
  html [path]          write the catalog page (default catalog.html)
  save [path]          write the curated JSON (default: uploaded file name)
  reload               re-read the uploaded file
  help                 this text
  quit                 leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Remove(IndexList),
    Html(Option<PathBuf>),
    Save(Option<PathBuf>),
    Reload,
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    let Some((word, rest)) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .or_else(|| (!line.is_empty()).then_some((line, "")))
    else {
        return Ok(None);
    };

    let path_arg = || (!rest.is_empty()).then(|| PathBuf::from(rest));

    let cmd = match word.to_ascii_lowercase().as_str() {
        "list" | "ls" => Command::List,
        "rm" | "del" | "delete" => Command::Remove(IndexList::parse(rest)?),
        "html" => Command::Html(path_arg()),
        "save" => Command::Save(path_arg()),
        "reload" => Command::Reload,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CatalogError::Validation(format!("unknown command: {other}"))),
    };
    Ok(Some(cmd))
}

/// Deletion targets as typed: single indices and inclusive `a-b` ranges.
///
/// Ranges stay unexpanded until [`IndexList::resolve`] knows the catalog
/// length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexList(Vec<RangeInclusive<usize>>);

impl IndexList {
    /// Indices separated by commas or spaces; `a-b` is an inclusive range.
    pub fn parse(s: &str) -> Result<Self> {
        let bad = |part: &str| CatalogError::Validation(format!("not an index: {part:?}"));

        let mut ranges = Vec::new();
        for part in s.split(|c: char| c == ',' || c.is_whitespace()) {
            if part.is_empty() {
                continue;
            }
            if let Some((a, b)) = part.split_once('-') {
                let a: usize = a.trim().parse().map_err(|_| bad(part))?;
                let b: usize = b.trim().parse().map_err(|_| bad(part))?;
                if a > b {
                    return Err(CatalogError::Validation(format!("invalid range: {part}")));
                }
                ranges.push(a..=b);
            } else {
                let i: usize = part.parse().map_err(|_| bad(part))?;
                ranges.push(i..=i);
            }
        }
        if ranges.is_empty() {
            return Err(CatalogError::Validation("no indices given".into()));
        }
        Ok(Self(ranges))
    }

    /// Expand against a catalog of `len` products. Any index past the end
    /// rejects the whole list before anything is expanded.
    pub fn resolve(&self, len: usize) -> Result<BTreeSet<usize>> {
        if let Some(end) = self.0.iter().map(|r| *r.end()).find(|&end| end >= len) {
            return Err(CatalogError::Validation(format!(
                "no product at index {end} (catalog has {len})"
            )));
        }
        Ok(self.0.iter().flat_map(|r| r.clone()).collect())
    }
}

/// Parse and bound-check in one step.
pub fn parse_indices(s: &str, len: usize) -> Result<BTreeSet<usize>> {
    IndexList::parse(s)?.resolve(len)
}

/// Where curated output goes and how the page is titled.
#[derive(Debug, Clone)]
pub struct CurateContext {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub title: String,
    pub contact: Option<String>,
}

impl CurateContext {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            title: self.title.clone(),
            contact: self.contact.clone(),
            generated_at: Utc::now(),
        }
    }

    pub fn default_html_path(&self) -> PathBuf {
        self.output_dir.join(CATALOG_HTML)
    }

    /// Curated JSON keeps the uploaded file's name.
    pub fn default_json_path(&self, session: &CurationSession) -> PathBuf {
        let name = session.file_name().unwrap_or("catalog.json");
        self.output_dir.join(name)
    }
}

pub fn upload_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CatalogError::Validation(format!("not a file: {}", path.display())))
}

/// Read `ctx.source` into the session.
pub fn load_source(session: &mut CurationSession, ctx: &CurateContext) -> Result<LoadOutcome> {
    let records = archiver::load_from_file(&ctx.source)?;
    session.load(&upload_name(&ctx.source)?, records)
}

pub fn write_html(session: &CurationSession, ctx: &CurateContext, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, session.render_html(&ctx.render_options()))?;
    info!(path = %path.display(), count = session.catalog().len(), "catalog page written");
    Ok(())
}

pub fn print_grid(catalog: &Catalog, out: &mut impl Write) -> Result<()> {
    if catalog.is_empty() {
        writeln!(out, "(catalog is empty)")?;
        return Ok(());
    }
    for row in catalog.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|(i, p)| format!("[{i}] {}", p.product_name))
            .collect();
        writeln!(out, "{}", cells.join("  |  "))?;
    }
    writeln!(out, "{} product(s)", catalog.len())?;
    Ok(())
}

/// What a non-interactive `--delete` run changed and wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub removed: usize,
    pub written: Vec<PathBuf>,
}

/// Apply one batch of deletions and write the requested outputs. With no
/// output requested the curated JSON is saved, so a deletion is never lost.
pub fn apply_batch(
    session: &mut CurationSession,
    ctx: &CurateContext,
    indices: &str,
    html: Option<&Path>,
    save: bool,
) -> Result<BatchOutcome> {
    let indices = parse_indices(indices, session.catalog().len())?;
    let removed = session.remove(&indices)?;

    let mut written = Vec::new();
    if let Some(path) = html {
        write_html(session, ctx, path)?;
        written.push(path.to_path_buf());
    }
    if save || html.is_none() {
        let path = ctx.default_json_path(session);
        archiver::save_to_file(session.catalog().records(), &path)?;
        written.push(path);
    }
    Ok(BatchOutcome { removed, written })
}

/// Drive the session from `input` until `quit` or end of input.
///
/// Command errors are reported on `out` and the loop continues.
pub fn run(
    session: &mut CurationSession,
    ctx: &CurateContext,
    input: impl BufRead,
    mut out: impl Write,
) -> Result<()> {
    print_grid(session.catalog(), &mut out)?;
    writeln!(out, "type 'help' for commands")?;

    for line in input.lines() {
        let line = line?;
        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };

        match execute(session, ctx, cmd, &mut out) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => writeln!(out, "error: {e}")?,
        }
        out.flush()?;
    }
    Ok(())
}

// Returns false when the loop should end.
fn execute(
    session: &mut CurationSession,
    ctx: &CurateContext,
    cmd: Command,
    out: &mut impl Write,
) -> Result<bool> {
    match cmd {
        Command::List => print_grid(session.catalog(), out)?,
        Command::Remove(list) => {
            let indices = list.resolve(session.catalog().len())?;
            let removed = session.remove(&indices)?;
            writeln!(out, "deleted {removed}")?;
            print_grid(session.catalog(), out)?;
        }
        Command::Html(path) => {
            let path = path.unwrap_or_else(|| ctx.default_html_path());
            write_html(session, ctx, &path)?;
            writeln!(out, "wrote {}", path.display())?;
        }
        Command::Save(path) => {
            let path = path.unwrap_or_else(|| ctx.default_json_path(session));
            archiver::save_to_file(session.catalog().records(), &path)?;
            writeln!(out, "wrote {}", path.display())?;
        }
        Command::Reload => {
            match load_source(session, ctx)? {
                LoadOutcome::Fresh => writeln!(out, "file changed, catalog reset")?,
                LoadOutcome::Resumed => writeln!(out, "file unchanged, keeping edits")?,
            }
            print_grid(session.catalog(), out)?;
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse_command("list").unwrap(), Some(Command::List));
        assert_eq!(parse_command("QUIT").unwrap(), Some(Command::Quit));
        match parse_command("rm 2 0").unwrap() {
            Some(Command::Remove(list)) => {
                assert_eq!(list.resolve(3).unwrap(), BTreeSet::from([0, 2]));
            }
            other => panic!("expected rm, got {other:?}"),
        }
        assert_eq!(
            parse_command("html out/page.html").unwrap(),
            Some(Command::Html(Some(PathBuf::from("out/page.html"))))
        );
        assert_eq!(parse_command("save").unwrap(), Some(Command::Save(None)));
        assert!(parse_command("frobnicate").is_err());
        assert!(parse_command("rm").is_err());
    }

    #[test]
    fn parses_index_lists() {
        assert_eq!(parse_indices("0,2", 3).unwrap(), BTreeSet::from([0, 2]));
        assert_eq!(parse_indices("1-3, 7", 8).unwrap(), BTreeSet::from([1, 2, 3, 7]));
        assert_eq!(parse_indices("4 4 4", 5).unwrap(), BTreeSet::from([4]));
        assert!(parse_indices("3-1", 5).is_err());
        assert!(parse_indices("x", 5).is_err());
        assert!(parse_indices("-1", 5).is_err());
    }

    #[test]
    fn huge_range_is_rejected_without_expanding() {
        let err = parse_indices("0-18446744073709551615", 3).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(err.to_string().contains("no product at index 18446744073709551615"));

        assert!(matches!(parse_indices("0-99999999999", 3), Err(CatalogError::Validation(_))));

        // The interactive parser keeps ranges unexpanded.
        match parse_command("rm 0-18446744073709551615").unwrap() {
            Some(Command::Remove(list)) => assert!(list.resolve(3).is_err()),
            other => panic!("expected rm, got {other:?}"),
        }
    }

    #[test]
    fn index_past_the_end_is_rejected() {
        assert!(parse_indices("0,3", 3).is_err());
        assert_eq!(parse_indices("0-2", 3).unwrap(), BTreeSet::from([0, 1, 2]));
        assert!(parse_indices("0", 0).is_err());
    }

    #[test]
    fn grid_lists_rows_of_three() {
        use crate::models::ProductRecord;
        let catalog = Catalog::new(
            ["A", "B", "C", "D"]
                .iter()
                .map(|n| ProductRecord::new(*n, format!("https://x.example/{n}.png")))
                .collect(),
        );
        let mut buf = Vec::new();
        print_grid(&catalog, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[0] A  |  [1] B  |  [2] C");
        assert_eq!(lines[1], "[3] D");
        assert_eq!(lines[2], "4 product(s)");
    }
}
