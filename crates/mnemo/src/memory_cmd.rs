use std::io::Read;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use mnemo_config::MnemoConfig;
use mnemo_core::{CaptureKind, MemoryRecord, SavedAs};
use mnemo_memory::{HttpStoreClient, NoopEnricher, Persister, SaveRequest, recall_memory};

pub async fn handle_save(
    content: Option<String>,
    file: Option<String>,
    title: Option<String>,
    tags: Option<String>,
    conversation_id: Option<String>,
    json: bool,
) -> Result<()> {
    let content = resolve_content(content, file)?;

    let config = MnemoConfig::load()?;
    let store = store_client(&config);
    let persister = Persister::new(&config.store.platform, config.chunking.limits());

    let outcome = persister
        .save(
            &store,
            &NoopEnricher,
            SaveRequest {
                content,
                title,
                tags: parse_tags(tags),
                conversation_id,
            },
        )
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let verb = match outcome.saved_as {
        SavedAs::Created => "Saved",
        SavedAs::Updated => "Updated",
    };
    match outcome.part_count {
        Some(parts) => {
            println!(
                "{verb} memory as {parts} part(s) + index ({} chars total).",
                outcome.total_size
            );
            println!(
                "  Session: {}",
                outcome.session_id.as_deref().unwrap_or("-")
            );
            println!("  Index record: {}", outcome.record_ids.last().map_or("-", String::as_str));
        }
        None => {
            println!(
                "{verb} memory {} ({} chars).",
                outcome.record_ids.first().map_or("-", String::as_str),
                outcome.total_size
            );
        }
    }
    if let Some(conversation_id) = &outcome.conversation_id {
        println!("  Conversation: {conversation_id}");
    }
    if outcome.degraded_lookup {
        eprintln!(
            "Warning: living-document lookup failed; saved as a new record. \
             Duplicates may exist for this conversation."
        );
    }

    Ok(())
}

pub async fn handle_get(id: &str, full: bool, json: bool) -> Result<()> {
    let config = MnemoConfig::load()?;
    let store = store_client(&config);

    let result = recall_memory(&store, id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if full {
        match result.assembled_content() {
            Some(assembled) => println!("{assembled}"),
            None => println!("{}", result.record.content),
        }
        return Ok(());
    }

    print_record_summary(&result.record);
    if !result.parts.is_empty() {
        println!(
            "Parts: {} ({} chars total)",
            result.parts.len(),
            result.declared_total_size.unwrap_or(0)
        );
        for part in &result.parts {
            println!(
                "  {}  {}",
                short_id(&part.id, 12),
                truncate_chars(&part.content, 60)
            );
        }
        println!();
        println!("Run with --full to print the reassembled transcript.");
    }

    Ok(())
}

pub fn handle_config_show(json: bool) -> Result<()> {
    let config = MnemoConfig::load()?.redacted_for_display();

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Config file: {}", MnemoConfig::config_path()?.display());
    println!();
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn print_record_summary(record: &MemoryRecord) {
    println!("ID: {}", record.id);
    println!("Title: {}", record.title);
    println!("Platform: {}", record.platform);
    println!(
        "Conversation: {}",
        record.conversation_id.as_deref().unwrap_or("-")
    );
    println!("Saved: {}", format_timestamp(record.metadata.saved_at));
    if record.tags.is_empty() {
        println!("Tags: -");
    } else {
        println!("Tags: {}", record.tags.join(", "));
    }
    match &record.metadata.capture {
        CaptureKind::Single => {
            println!("Capture: single");
            println!();
            println!("{}", record.content);
        }
        CaptureKind::ChunkedPart {
            session_id,
            part_number,
            total_parts,
            ..
        } => {
            println!("Capture: part {part_number}/{total_parts} of session {session_id}");
        }
        CaptureKind::ChunkedIndex {
            session_id,
            part_count,
            total_size,
            ..
        } => {
            println!("Capture: index of session {session_id} ({part_count} parts, {total_size} chars)");
            println!();
            println!("{}", record.content);
        }
    }
}

fn resolve_content(content: Option<String>, file: Option<String>) -> Result<String> {
    if let Some(content) = content {
        if file.is_some() {
            bail!("Pass the transcript as an argument or via --file, not both.");
        }
        return Ok(content);
    }

    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read transcript from '{path}'"));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read transcript from stdin")?;
    Ok(buffer)
}

fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn store_client(config: &MnemoConfig) -> HttpStoreClient {
    HttpStoreClient::new(&config.store.base_url, &config.store.api_key)
}

fn short_id(id: &str, len: usize) -> String {
    id.chars().take(len).collect()
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert!(parse_tags(None).is_empty());
        assert_eq!(
            parse_tags(Some("rust, memory,, chunking ".to_string())),
            vec!["rust", "memory", "chunking"]
        );
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_resolve_content_rejects_both_sources() {
        let err = resolve_content(Some("text".to_string()), Some("file.txt".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn test_resolve_content_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.txt");
        std::fs::write(&path, "Human: hi\n").unwrap();
        let content =
            resolve_content(None, Some(path.to_string_lossy().into_owned())).unwrap();
        assert_eq!(content, "Human: hi\n");
    }
}
