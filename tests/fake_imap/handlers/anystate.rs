//! Commands valid in any IMAP state: CAPABILITY, NOOP and LOGOUT.
//!
//! RFC 3501 Section 6.1 requires all three. LOGOUT answers with an
//! untagged BYE before the tagged OK so the client knows the server is
//! about to close the connection.

use crate::fake_imap::io::write_line;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle the CAPABILITY command.
pub async fn handle_capability<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    stream: &mut BufReader<S>,
) {
    let _ = write_line(stream, "* CAPABILITY IMAP4rev1 STARTTLS\r\n").await;
    let _ = write_line(stream, &format!("{tag} OK CAPABILITY completed\r\n")).await;
}

/// Handle the NOOP command.
pub async fn handle_noop<S: AsyncRead + AsyncWrite + Unpin>(tag: &str, stream: &mut BufReader<S>) {
    let _ = write_line(stream, &format!("{tag} OK NOOP completed\r\n")).await;
}

/// Handle the LOGOUT command. Sends BYE + tagged OK.
pub async fn handle_logout<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    stream: &mut BufReader<S>,
) {
    let _ = write_line(stream, "* BYE Fake server logging out\r\n").await;
    let _ = write_line(stream, &format!("{tag} OK LOGOUT completed\r\n")).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    /// Run one handler against an in-memory duplex stream and return
    /// what it wrote to the client.
    async fn capture<F, Fut>(handler: F) -> String
    where
        F: FnOnce(BufReader<tokio::io::DuplexStream>) -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        let (client, server) = tokio::io::duplex(1024);
        handler(BufReader::new(server)).await;

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn capability_lists_starttls() {
        let output = capture(|mut s| async move { handle_capability("A1", &mut s).await }).await;
        assert!(output.contains("* CAPABILITY IMAP4rev1 STARTTLS"));
        assert!(output.ends_with("A1 OK CAPABILITY completed\r\n"));
    }

    #[tokio::test]
    async fn noop_echoes_tag() {
        let output = capture(|mut s| async move { handle_noop("X7", &mut s).await }).await;
        assert_eq!(output, "X7 OK NOOP completed\r\n");
    }

    #[tokio::test]
    async fn logout_sends_bye_before_ok() {
        let output = capture(|mut s| async move { handle_logout("A0005", &mut s).await }).await;
        let bye = output.find("* BYE").unwrap();
        let ok = output.find("A0005 OK LOGOUT completed").unwrap();
        assert!(bye < ok);
    }
}
