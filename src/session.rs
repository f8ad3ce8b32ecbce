use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::chart::{self, OutputFormat};
use crate::models::ViewKind;
use crate::state::Dashboard;

const HELP: &str = "Commands:
  load <path>   replace the current data with a file
  view <name>   show a view (see `views`)
  views         list the available views
  status        show which file is active
  help          show this message
  quit          leave the session
";

/// Line-oriented dashboard shell. Re-renders the selected view after every
/// view change and every successful load.
pub async fn run<R, W>(
    dashboard: &Dashboard,
    input: R,
    mut output: W,
    format: OutputFormat,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let top_n = dashboard.config().top_n;
    let mut selected = ViewKind::ByGeneration;
    let mut lines = input.lines();

    output
        .write_all(format!("{}\n", dashboard.status()).as_bytes())
        .await?;
    output
        .write_all(chart::present(&dashboard.render(selected), format, top_n).as_bytes())
        .await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };
        debug!(command, argument, "session command");

        let reply = match command {
            "quit" | "exit" => break,
            "help" => HELP.to_string(),
            "status" => format!("{}\n", dashboard.status()),
            "views" => ViewKind::ALL
                .iter()
                .map(|kind| format!("  {:<20} {}\n", kind.slug(), kind.label()))
                .collect(),
            "view" => match argument.parse::<ViewKind>() {
                Ok(kind) => {
                    selected = kind;
                    chart::present(&dashboard.render(selected), format, top_n)
                }
                Err(message) => format!("{message}\n"),
            },
            "load" if argument.is_empty() => "usage: load <path>\n".to_string(),
            "load" => match dashboard.load_path(Path::new(argument)) {
                Ok(message) => format!(
                    "{message}\n{}",
                    chart::present(&dashboard.render(selected), format, top_n)
                ),
                Err(err) => format!("{err}\n"),
            },
            other => format!("unknown command '{other}' (try `help`)\n"),
        };

        output.write_all(reply.as_bytes()).await?;
        output.flush().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    async fn drive(dashboard: &Dashboard, script: &str) -> String {
        let mut output = Vec::new();
        run(dashboard, script.as_bytes(), &mut output, OutputFormat::Text)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn empty_session_reports_no_data_for_every_view() {
        let dashboard = Dashboard::default();
        let transcript = drive(&dashboard, "view program\nview failure-subject\nquit\n").await;
        assert!(transcript.starts_with("Waiting for file..."));
        assert_eq!(transcript.matches("No data loaded.").count(), 3);
    }

    #[tokio::test]
    async fn load_rerenders_selected_view_and_bad_loads_are_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "ALUCTR,PE\n1,ISC\n2,ISC\n3,IGE").unwrap();

        let dashboard = Dashboard::default();
        let script = format!(
            "view program\nload {}\nload /missing/file.csv\nview pie\nstatus\n",
            path.display()
        );
        let transcript = drive(&dashboard, &script).await;

        assert!(transcript.contains("File 'upload.csv' loaded successfully."));
        assert!(transcript.contains("Enrollment by PE"));
        assert!(transcript.contains("Error processing file 'file.csv'"));
        assert!(transcript.contains("unknown view 'pie'"));
        assert!(transcript.trim_end().ends_with("File 'upload.csv' loaded successfully."));
    }
}
