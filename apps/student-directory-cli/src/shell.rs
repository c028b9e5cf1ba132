//! Interactive session over one directory controller.

use anyhow::{Context, Result, anyhow, bail};
use student_directory::{DirectoryController, PageSize, StudentId};

use crate::terminal::TerminalInput;

const HELP: &str = "\
commands:
  refresh          reload the current page
  page N           go to page N
  next | prev      move one page
  limit N          page size (5, 10, 25, 50)
  search QUERY     id or name; empty query returns to the listing
  view ID          show one record
  delete ID        delete after confirmation
  help             this text
  quit             leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Refresh,
    Page(i64),
    Next,
    Prev,
    Limit(PageSize),
    Search(String),
    View(StudentId),
    Delete(StudentId),
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<ShellCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

    let command = match verb.to_ascii_lowercase().as_str() {
        "refresh" | "r" => ShellCommand::Refresh,
        "page" | "p" => ShellCommand::Page(
            rest.parse()
                .with_context(|| format!("'{rest}' is not a page number"))?,
        ),
        "next" | "n" => ShellCommand::Next,
        "prev" => ShellCommand::Prev,
        "limit" => ShellCommand::Limit(rest.parse()?),
        "search" | "s" => ShellCommand::Search(rest.to_owned()),
        "view" | "v" => ShellCommand::View(parse_id(rest)?),
        "delete" | "d" => ShellCommand::Delete(parse_id(rest)?),
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => bail!("unknown command '{other}', try 'help'"),
    };
    Ok(Some(command))
}

fn parse_id(raw: &str) -> Result<StudentId> {
    raw.parse()
        .map_err(|_| anyhow!("'{raw}' is not a student id"))
}

/// Read commands until `quit` or end of input.
pub async fn run(directory: &DirectoryController, input: &TerminalInput) -> Result<()> {
    directory.refresh().await;
    loop {
        eprint!("> ");
        let Some(line) = input.next_line().await? else {
            return Ok(());
        };
        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err:#}");
                continue;
            }
        };
        tracing::debug!(?command, "shell command");
        let page = i64::from(directory.state().pagination.page);
        match command {
            ShellCommand::Refresh => {
                directory.refresh().await;
            }
            ShellCommand::Page(n) => {
                directory.change_page(n).await;
            }
            ShellCommand::Next => {
                directory.change_page(page + 1).await;
            }
            ShellCommand::Prev => {
                directory.change_page(page - 1).await;
            }
            ShellCommand::Limit(size) => {
                directory.change_limit(size).await;
            }
            ShellCommand::Search(query) => {
                directory.search(&query).await;
            }
            ShellCommand::View(id) => {
                // Failures are already reported through the notifier.
                directory.view_record(id).await.ok();
            }
            ShellCommand::Delete(id) => {
                directory.delete_record(id).await;
            }
            ShellCommand::Help => eprintln!("{HELP}"),
            ShellCommand::Quit => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("  ").unwrap(), None);
        assert_eq!(parse("refresh").unwrap(), Some(ShellCommand::Refresh));
        assert_eq!(parse("page 3").unwrap(), Some(ShellCommand::Page(3)));
        assert_eq!(parse("NEXT").unwrap(), Some(ShellCommand::Next));
        assert_eq!(
            parse("limit 25").unwrap(),
            Some(ShellCommand::Limit(PageSize::TwentyFive))
        );
        assert_eq!(
            parse("search  Ann Lee ").unwrap(),
            Some(ShellCommand::Search("Ann Lee".to_owned()))
        );
        assert_eq!(
            parse("search").unwrap(),
            Some(ShellCommand::Search(String::new()))
        );
        assert_eq!(parse("delete 7").unwrap(), Some(ShellCommand::Delete(7)));
        assert_eq!(parse("q").unwrap(), Some(ShellCommand::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_arguments() {
        assert!(parse("page two").is_err());
        assert!(parse("limit 7").is_err());
        assert!(parse("view -1").is_err());
        assert!(parse("frobnicate").is_err());
    }
}
