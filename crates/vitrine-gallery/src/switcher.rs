//! Demo switching by full process reload.
//!
//! Moving to another demo never tears the running one down in place: the
//! gallery re-executes itself with the new `--demo-index` and exits, so the
//! operating system reclaims everything the previous demo allocated.

use std::process::Command;

use crate::error::GalleryError;

const INDEX_FLAG: &str = "--demo-index";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    Prev,
    Next,
}

/// Wraps `index` into `0..count`. `count` must be non-zero.
pub fn wrap_index(index: i64, count: usize) -> usize {
    debug_assert!(count > 0);
    index.rem_euclid(count.max(1) as i64) as usize
}

/// Index of the demo before or after `current`.
pub fn neighbor(current: usize, direction: Direction, count: usize) -> usize {
    let step = match direction {
        Direction::Prev => -1,
        Direction::Next => 1,
    };
    wrap_index(current as i64 + step, count)
}

/// Rewrites the process arguments so the relaunched gallery opens `index`.
///
/// Any previous `--demo-index` (either `--demo-index N` or `--demo-index=N`)
/// is dropped; every other argument is kept in order.
pub fn relaunch_args<I>(args: I, index: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out = Vec::new();
    let mut skip_value = false;
    for arg in args {
        if skip_value {
            skip_value = false;
            continue;
        }
        if arg == INDEX_FLAG {
            skip_value = true;
            continue;
        }
        if arg.starts_with("--demo-index=") {
            continue;
        }
        out.push(arg);
    }
    out.push(INDEX_FLAG.to_string());
    out.push(index.to_string());
    out
}

/// Spawns a fresh gallery process showing `index`. The caller exits afterwards.
pub fn relaunch(index: usize) -> Result<(), GalleryError> {
    let relaunch_err = |source| GalleryError::Relaunch { index, source };

    let exe = std::env::current_exe().map_err(relaunch_err)?;
    let args = relaunch_args(std::env::args().skip(1), index);

    log::info!("relaunching {} with {:?}", exe.display(), args);
    Command::new(exe).args(&args).spawn().map_err(relaunch_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // ── wrapping ─────────────────────────────────────────────────────────

    #[test]
    fn wrap_covers_every_demo() {
        assert_eq!(wrap_index(0, 4), 0);
        assert_eq!(wrap_index(3, 4), 3);
        assert_eq!(wrap_index(4, 4), 0);
        assert_eq!(wrap_index(-1, 4), 3);
        assert_eq!(wrap_index(-9, 4), 3);
    }

    #[test]
    fn next_from_last_reaches_first() {
        assert_eq!(neighbor(3, Direction::Next, 4), 0);
        assert_eq!(neighbor(0, Direction::Prev, 4), 3);
        assert_eq!(neighbor(1, Direction::Next, 4), 2);
    }

    #[test]
    fn single_demo_wraps_to_itself() {
        assert_eq!(neighbor(0, Direction::Next, 1), 0);
        assert_eq!(neighbor(0, Direction::Prev, 1), 0);
    }

    // ── relaunch arguments ───────────────────────────────────────────────

    #[test]
    fn replaces_separate_index_value() {
        let out = relaunch_args(args(&["--log", "debug", "--demo-index", "1"]), 2);
        assert_eq!(out, args(&["--log", "debug", "--demo-index", "2"]));
    }

    #[test]
    fn replaces_inline_index_value() {
        let out = relaunch_args(args(&["--demo-index=3", "--font", "a.ttf"]), 0);
        assert_eq!(out, args(&["--font", "a.ttf", "--demo-index", "0"]));
    }

    #[test]
    fn appends_index_when_absent() {
        assert_eq!(relaunch_args(Vec::new(), 1), args(&["--demo-index", "1"]));
    }
}
