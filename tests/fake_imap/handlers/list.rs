//! LIST command handler.
//!
//! Responds with one `* LIST` line per folder, followed by the tagged
//! OK. Hierarchy-only folders carry `\Noselect` (RFC 3501 Section
//! 7.2.2):
//!
//! ```text
//! * LIST (\Noselect \HasChildren) "/" "[Gmail]"
//! * LIST (\HasNoChildren) "/" "INBOX"
//! A0002 OK LIST completed
//! ```

use crate::fake_imap::io::write_line;
use crate::fake_imap::mailbox::Mailbox;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle the LIST command. Emits one `* LIST` line per folder.
pub async fn handle_list<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    mailbox: &Mailbox,
    stream: &mut BufReader<S>,
) {
    for folder in &mailbox.folders {
        let attributes = if folder.selectable {
            "\\HasNoChildren"
        } else {
            "\\Noselect \\HasChildren"
        };
        let line = format!("* LIST ({attributes}) \"/\" \"{}\"\r\n", folder.name);
        if write_line(stream, &line).await.is_err() {
            return;
        }
    }
    let resp = format!("{tag} OK LIST completed\r\n");
    let _ = write_line(stream, &resp).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::mailbox::MailboxBuilder;
    use tokio::io::BufReader;

    async fn run(tag: &str, mailbox: &Mailbox) -> String {
        let (client, server) = tokio::io::duplex(4096);
        let mut stream = BufReader::new(server);

        handle_list(tag, mailbox, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn lists_folders_in_order() {
        let mailbox = MailboxBuilder::new()
            .folder("INBOX")
            .folder("Archive")
            .build();

        let output = run("A1", &mailbox).await;

        let inbox = output.find("\"INBOX\"").unwrap();
        let archive = output.find("\"Archive\"").unwrap();
        assert!(inbox < archive);
        assert!(output.ends_with("A1 OK LIST completed\r\n"));
    }

    #[tokio::test]
    async fn empty_mailbox_returns_only_ok() {
        let mailbox = MailboxBuilder::new().build();
        let output = run("T2", &mailbox).await;

        assert_eq!(output, "T2 OK LIST completed\r\n");
    }

    #[tokio::test]
    async fn marks_hierarchy_folders_noselect() {
        let mailbox = MailboxBuilder::new()
            .noselect("[Gmail]")
            .folder("[Gmail]/All Mail")
            .build();
        let output = run("T3", &mailbox).await;

        assert!(output.contains("* LIST (\\Noselect \\HasChildren) \"/\" \"[Gmail]\""));
        assert!(output.contains("* LIST (\\HasNoChildren) \"/\" \"[Gmail]/All Mail\""));
    }
}
