//! Export helpers: CSV message history and download file names

use crate::error::{ClientError, ClientResult};
use crate::models::{Message, Sender};

/// Default file name of the CSV export
pub const MESSAGES_CSV_FILENAME: &str = "chatbot_messages.csv";

const CSV_HEADER: [&str; 4] = ["User", "Message", "Response", "Timestamp"];

/// Render message history as CSV.
///
/// Each row pairs a user message with the bot message right after it.
/// Messages that are not part of such a pair are skipped.
pub fn messages_to_csv(messages: &[Message]) -> ClientResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    let mut rows = 0usize;
    let mut i = 0;
    while i < messages.len() {
        match (messages.get(i), messages.get(i + 1)) {
            (Some(question), Some(answer))
                if question.sender == Sender::User && answer.sender == Sender::Bot =>
            {
                let timestamp = question.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
                writer
                    .write_record([
                        question.sender.as_str(),
                        question.content.as_str(),
                        answer.content.as_str(),
                        timestamp.as_str(),
                    ])
                    .map_err(csv_error)?;
                rows += 1;
                i += 2;
            }
            _ => i += 1,
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ClientError::Storage(format!("CSV flush failed: {}", e)))?;
    tracing::debug!(messages = messages.len(), rows, "Rendered message CSV");
    String::from_utf8(bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

fn csv_error(e: csv::Error) -> ClientError {
    ClientError::Storage(format!("CSV write failed: {}", e))
}

/// `chat_<email>.pdf` with `@` and `.` replaced by `_`
pub fn chat_pdf_filename(email: &str) -> String {
    let safe: String = email
        .chars()
        .map(|c| if c == '@' || c == '.' { '_' } else { c })
        .collect();
    format!("chat_{}.pdf", safe)
}

/// Admin report download for one chatbot
pub fn chatbot_report_filename(chatbot_id: &str) -> String {
    format!("{}-report.pdf", chatbot_id)
}

/// User report download, stamped with epoch milliseconds
pub fn user_report_filename(millis: i64) -> String {
    format!("chatbot_report_{}.pdf", millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn msg(sender: Sender, content: &str) -> Message {
        Message {
            sender,
            content: content.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap(),
            session_id: Some("s1".into()),
            email: None,
        }
    }

    #[test]
    fn test_csv_pairs_user_and_bot() {
        let messages = vec![
            msg(Sender::Bot, "Welcome!"),
            msg(Sender::User, "Hi, what's the price?"),
            msg(Sender::Bot, "Plans start at ₹999, billed monthly"),
            msg(Sender::User, "unanswered"),
        ];
        let csv = messages_to_csv(&messages).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "User,Message,Response,Timestamp");
        assert_eq!(
            lines[1],
            "user,\"Hi, what's the price?\",\"Plans start at ₹999, billed monthly\",2026-10-01 09:30:00"
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_csv_quotes_embedded_quotes() {
        let messages = vec![msg(Sender::User, "say \"hi\""), msg(Sender::Bot, "hi")];
        let csv = messages_to_csv(&messages).unwrap();
        assert!(csv.contains("\"say \"\"hi\"\"\""));
    }

    #[test]
    fn test_empty_history_is_header_only() {
        assert_eq!(messages_to_csv(&[]).unwrap(), "User,Message,Response,Timestamp\n");
    }

    #[test]
    fn test_filenames() {
        assert_eq!(chat_pdf_filename("a.b@c.com"), "chat_a_b_c_com.pdf");
        assert_eq!(chatbot_report_filename("cb1"), "cb1-report.pdf");
        assert_eq!(user_report_filename(1760000000000), "chatbot_report_1760000000000.pdf");
    }
}
