//! Content search over one reference's tree with `git grep`

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::command::GitCli;
use crate::{Error, Result};

/// One line reported by `git grep -n -z`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrepMatch {
    /// File path inside the reference's tree
    pub path: String,
    /// 1-based line number
    pub line_number: u64,
    /// The matching line, without its trailing newline
    pub content: String,
}

/// Parse a `git grep -n -z <ref>` output line
///
/// git prefixes every line with `<ref>:`; the rest is split on the first
/// two NULs into path, line number and content. With `-z` git does not
/// quote paths, so the path is the tree entry exactly, `:` included.
/// Returns `None` when the line does not have that shape.
pub fn parse_grep_line(line: &str, reference: &str) -> Option<GrepMatch> {
    let rest = line
        .strip_prefix(reference)
        .and_then(|r| r.strip_prefix(':'))
        .unwrap_or(line);

    let mut fields = rest.splitn(3, '\0');
    let path = fields.next().filter(|p| !p.is_empty())?;
    let line_number = fields.next()?.parse::<u64>().ok().filter(|n| *n > 0)?;
    let content = fields.next()?;

    Some(GrepMatch {
        path: path.to_string(),
        line_number,
        content: content.to_string(),
    })
}

/// Lazily read matches from a running `git grep`
///
/// Lines are pulled from the child's stdout one at a time; nothing is
/// buffered beyond the current line.
#[derive(Debug)]
pub struct SearchStream {
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr: Option<JoinHandle<String>>,
    reference: String,
    deadline: Option<(Instant, Duration)>,
    buf: Vec<u8>,
}

impl SearchStream {
    /// Next well-formed match, or `None` once git has no more output
    ///
    /// Malformed lines are logged and skipped.
    pub async fn next_match(&mut self) -> Result<Option<GrepMatch>> {
        loop {
            self.buf.clear();
            let read = self.stdout.read_until(b'\n', &mut self.buf);
            let n = match self.deadline {
                Some((at, limit)) => tokio::time::timeout_at(at, read)
                    .await
                    .map_err(|_| Error::Timeout {
                        command: "grep".to_string(),
                        elapsed: limit,
                    })??,
                None => read.await?,
            };

            if n == 0 {
                return Ok(None);
            }

            let raw = String::from_utf8_lossy(&self.buf);
            let line = raw.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }

            match parse_grep_line(line, &self.reference) {
                Some(m) => return Ok(Some(m)),
                None => {
                    tracing::warn!(reference = %self.reference, line = %line, "Skipping malformed git grep line");
                }
            }
        }
    }

    /// Wait for git to exit and report whether the search itself failed
    ///
    /// Exit status 1 only means "no match" and is not an error.
    pub async fn finish(mut self) -> Result<()> {
        // Drain anything left so the child never blocks on a full pipe
        let mut rest = Vec::new();
        self.stdout.read_to_end(&mut rest).await?;

        let stderr = match self.stderr.take() {
            Some(reader) => reader.await.unwrap_or_default(),
            None => String::new(),
        };

        let status = self.child.wait().await?;
        match status.code() {
            Some(0) | Some(1) => Ok(()),
            _ => Err(Error::Search(format!(
                "git grep on {} exited with {}: {}",
                self.reference,
                status,
                stderr.trim()
            ))),
        }
    }
}

impl GitCli {
    /// Search every text file of `reference` in `mirror` for `pattern`
    ///
    /// Binary files are skipped (`-I`). The pattern is handed to git
    /// unchanged, so its syntax is git grep's.
    pub async fn search_content(
        &self,
        mirror: &Path,
        reference: &str,
        pattern: &str,
    ) -> Result<SearchStream> {
        let args = [
            OsStr::new("grep"),
            OsStr::new("-I"),
            OsStr::new("--no-color"),
            OsStr::new("-n"),
            OsStr::new("-z"),
            OsStr::new("-e"),
            OsStr::new(pattern),
            OsStr::new(reference),
            OsStr::new("--"),
        ];

        let mut cmd = self.command(args, Some(mirror));
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        tracing::debug!(mirror = %mirror.display(), reference = %reference, pattern = %pattern, "Running git grep");

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::Search(format!("Failed to run {}: {}", self.binary(), e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Search("git grep stdout was not captured".to_string()))?;

        // Collected alongside stdout so a chatty stderr never fills its pipe
        let stderr = child.stderr.take().map(|mut err| {
            tokio::spawn(async move {
                let mut bytes = Vec::new();
                let _ = err.read_to_end(&mut bytes).await;
                String::from_utf8_lossy(&bytes).into_owned()
            })
        });

        Ok(SearchStream {
            child,
            stdout: BufReader::new(stdout),
            stderr,
            reference: reference.to_string(),
            deadline: self.timeout().map(|limit| (Instant::now() + limit, limit)),
            buf: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Join fields the way `git grep -z` separates them
    fn nul_line(fields: &[&str]) -> String {
        fields.join("\0")
    }

    #[test]
    fn test_parse_with_reference_prefix() {
        let m = parse_grep_line(&nul_line(&["main:src/lib.rs", "12", "let foo = 1;"]), "main").unwrap();
        assert_eq!(m.path, "src/lib.rs");
        assert_eq!(m.line_number, 12);
        assert_eq!(m.content, "let foo = 1;");
    }

    #[test]
    fn test_parse_content_keeps_colons() {
        let m = parse_grep_line(&nul_line(&["origin/dev:config.yml", "3", "url: http://foo:8080"]), "origin/dev").unwrap();
        assert_eq!(m.path, "config.yml");
        assert_eq!(m.line_number, 3);
        assert_eq!(m.content, "url: http://foo:8080");
    }

    #[test]
    fn test_parse_path_with_colon_and_non_ascii() {
        let m = parse_grep_line(&nul_line(&["main:a:b.txt", "1", "foo"]), "main").unwrap();
        assert_eq!(m.path, "a:b.txt");
        assert_eq!(m.line_number, 1);

        let m = parse_grep_line(&nul_line(&["main:docs/zażółć.txt", "4", "foo"]), "main").unwrap();
        assert_eq!(m.path, "docs/zażółć.txt");
        assert_eq!(m.line_number, 4);
    }

    #[test]
    fn test_parse_empty_content() {
        let m = parse_grep_line(&nul_line(&["main:empty.txt", "7", ""]), "main").unwrap();
        assert_eq!(m.line_number, 7);
        assert_eq!(m.content, "");
    }

    #[test]
    fn test_parse_without_prefix() {
        let m = parse_grep_line(&nul_line(&["README.md", "1", "foo"]), "main").unwrap();
        assert_eq!(m.path, "README.md");
        assert_eq!(m.line_number, 1);
        assert_eq!(m.content, "foo");
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_grep_line("main:README.md", "main").is_none());
        assert!(parse_grep_line(&nul_line(&["main:README.md", "abc", "foo"]), "main").is_none());
        assert!(parse_grep_line(&nul_line(&["main:README.md", "0", "foo"]), "main").is_none());
        assert!(parse_grep_line(&nul_line(&["main:", "3", "foo"]), "main").is_none());
        assert!(parse_grep_line("main:README.md:3:foo", "main").is_none());
        assert!(parse_grep_line("Binary file matches", "main").is_none());
    }

    #[tokio::test]
    async fn test_search_failure_carries_git_stderr() {
        let git = GitCli::default();
        if !git.is_available() {
            return;
        }

        let temp = tempfile::TempDir::new().unwrap();
        {
            let repo = git2::Repository::init_bare(temp.path()).unwrap();
            let sig = git2::Signature::now("Test", "test@example.com").unwrap();
            let blob = repo.blob(b"foo\n").unwrap();
            let mut builder = repo.treebuilder(None).unwrap();
            builder.insert("hello.txt", blob, 0o100644).unwrap();
            let tree = repo.find_tree(builder.write().unwrap()).unwrap();
            repo.commit(Some("refs/heads/main"), &sig, &sig, "init", &tree, &[])
                .unwrap();
        }

        let mut stream = git.search_content(temp.path(), "main", "foo[").await.unwrap();
        assert!(stream.next_match().await.unwrap().is_none());
        match stream.finish().await {
            Err(Error::Search(msg)) => {
                assert!(msg.contains("main"));
                assert!(msg.contains("fatal"), "stderr missing from: {}", msg);
            }
            other => panic!("expected a search error, got {:?}", other),
        }
    }
}
