//! Classification of `git status --porcelain` output into change counters.

/// Width of the `XY ` status field that starts every porcelain line.
const STATUS_WIDTH: usize = 3;

/// Working tree changes of one repository, counted per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub modified: usize,
    pub added: usize,
    pub deleted: usize,
    pub renamed: usize,
    pub copied: usize,
    pub unmerged: usize,
    pub untracked: usize,
}

impl Changes {
    /// Parses porcelain v1 status text.
    ///
    /// Lines too short to carry a status field and status codes that do not
    /// describe a change (ignored files, future codes) are skipped.
    pub fn from_porcelain(text: &str) -> Self {
        let mut changes = Changes::default();
        for line in text.lines() {
            let Some(code) = line.get(..STATUS_WIDTH) else {
                continue;
            };
            let bytes = code.as_bytes();
            if bytes[2] != b' ' {
                continue;
            }
            changes.count(bytes[0], bytes[1]);
        }
        changes
    }

    fn count(&mut self, index: u8, worktree: u8) {
        match (index, worktree) {
            (b'?', b'?') => self.untracked += 1,
            (b'D', b'D') | (b'A', b'A') | (b'U', _) | (_, b'U') => self.unmerged += 1,
            _ => {
                let code = if index == b' ' { worktree } else { index };
                match code {
                    b'M' | b'T' => self.modified += 1,
                    b'A' => self.added += 1,
                    b'D' => self.deleted += 1,
                    b'R' => self.renamed += 1,
                    b'C' => self.copied += 1,
                    _ => {}
                }
            }
        }
    }

    /// Changes to tracked files, i.e. what `git stash` would set aside.
    pub fn stashable(&self) -> usize {
        self.modified + self.added + self.deleted + self.renamed + self.copied + self.unmerged
    }

    pub fn total(&self) -> usize {
        self.stashable() + self.untracked
    }
}
