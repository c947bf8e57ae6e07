use serenity::http::Http;
use serenity::model::channel::{Message, ReactionType};

use crate::respond::Reply;

/// Maximum characters per Discord message (2000 is the limit; we use 1950 for safety).
const CHUNK_MAX: usize = 1950;

const OK_HAND: &str = "\u{1f44c}"; // 👌

/// Split `text` into chunks of at most [`CHUNK_MAX`] bytes on line
/// boundaries, so a link list never has a URL cut in half. A single line
/// longer than the limit is split at a char boundary.
pub fn split_chunks(text: &str) -> Vec<String> {
    if text.len() <= CHUNK_MAX {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let mut line = line;
        while line.len() > CHUNK_MAX {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let mut cut = CHUNK_MAX;
            while !line.is_char_boundary(cut) {
                cut -= 1;
            }
            chunks.push(line[..cut].to_string());
            line = &line[cut..];
        }

        let needed = if current.is_empty() {
            line.len()
        } else {
            current.len() + 1 + line.len()
        };
        if needed > CHUNK_MAX {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Deliver a command reply: a reaction on the command message, or text
/// chunks in the same channel.
pub async fn deliver(http: &Http, msg: &Message, reply: &Reply) -> Result<(), serenity::Error> {
    match reply {
        Reply::Ok => {
            let reaction = ReactionType::Unicode(OK_HAND.to_string());
            http.create_reaction(msg.channel_id, msg.id, &reaction)
                .await?;
        }
        Reply::Text(text) => {
            for chunk in split_chunks(text) {
                msg.channel_id.say(http, &chunk).await?;
            }
        }
        // Resolved to text by the handler before delivery.
        Reply::Pong => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_single_chunk() {
        let chunks = split_chunks("<https://a.example>");
        assert_eq!(chunks, vec!["<https://a.example>"]);
    }

    #[test]
    fn long_link_list_splits_between_lines() {
        let line = format!("<https://meet.example/{}>", "a".repeat(80));
        let text = vec![line.clone(); 60].join("\n");
        let chunks = split_chunks(&text);

        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX, "chunk too large: {}", c.len());
            assert!(c.lines().all(|l| l == line), "a line was cut");
        }
        let total: usize = chunks.iter().map(|c| c.lines().count()).sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn very_long_line_still_splits() {
        let text = "é".repeat(3000);
        let chunks = split_chunks(&text);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX);
        }
        assert_eq!(chunks.concat(), text);
    }
}
