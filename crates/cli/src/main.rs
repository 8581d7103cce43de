mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use passage_assembly::{
    render_document_content, DocumentMatch, DocumentResult, LocalDocument, SectionOptions,
};
use passage_core::config::load_dotenv;
use passage_core::{tokenizer_from_name, PassageConfig, ScoredHit};

use crate::cli::{CliArgs, Command, InputArgs};

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();

    // Logs go to stderr so stdout stays clean JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = PassageConfig::from_env();
    config.log_summary();

    let output = run(args, &config).await?;
    println!("{output}");
    Ok(())
}

/// Execute one command and return its JSON output.
async fn run(args: CliArgs, config: &PassageConfig) -> Result<String> {
    let tokenizer_name = args.tokenizer.as_deref().unwrap_or(&config.tokenizer);

    let output = match args.command {
        Command::Sections {
            input,
            max_tokens,
            max_sections,
            no_overlap,
        } => {
            let result = open_result(&input, tokenizer_name).await?;
            let mut options = SectionOptions::from(&config.render);
            if let Some(max_tokens) = max_tokens {
                options.max_tokens = max_tokens;
            }
            if let Some(max_sections) = max_sections {
                options.max_sections = max_sections;
            }
            if no_overlap {
                options.overlapping_chunks = false;
            }
            info!(
                doc = %result.id(),
                max_tokens = options.max_tokens,
                max_sections = options.max_sections,
                overlapping = options.overlapping_chunks,
                "Rendering ranked sections"
            );
            let sections = result
                .render_sections_with(&options)
                .await
                .context("failed to render sections")?;
            serde_json::to_string_pretty(&sections)?
        }
        Command::All { input, max_tokens } => {
            let result = open_result(&input, tokenizer_name).await?;
            let max_tokens = max_tokens.unwrap_or(config.render.max_tokens);
            info!(doc = %result.id(), max_tokens, "Rendering all sections");
            let sections = result
                .render_all_sections(max_tokens)
                .await
                .context("failed to render sections")?;
            serde_json::to_string_pretty(&sections)?
        }
        Command::Content { input, max_tokens } => {
            let result = open_result(&input, tokenizer_name).await?;
            let max_tokens = max_tokens.unwrap_or(config.search.content_max_tokens);
            info!(doc = %result.id(), max_tokens, "Rendering document content");
            let content = render_document_content(&result, max_tokens)
                .await
                .context("failed to render content")?;
            let doc_match = DocumentMatch {
                uri: result.uri().to_string(),
                content,
                score: result.score(),
            };
            serde_json::to_string_pretty(&doc_match)?
        }
    };
    Ok(output)
}

async fn open_result(input: &InputArgs, tokenizer_name: &str) -> Result<DocumentResult> {
    let tokenizer = tokenizer_from_name(tokenizer_name)
        .with_context(|| format!("unknown tokenizer '{tokenizer_name}'"))?;
    let hits = read_hits(&input.hits).await?;
    let source = Arc::new(LocalDocument::from_file(&input.document, tokenizer.clone()));
    DocumentResult::new(source, hits, tokenizer).context("invalid hits")
}

async fn read_hits(path: &Path) -> Result<Vec<ScoredHit>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read hits from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse hits in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_inputs(dir: &Path, text: &str, hits: &str) -> (String, String) {
        let doc = dir.join("doc.txt");
        let hits_path = dir.join("hits.json");
        std::fs::write(&doc, text).unwrap();
        std::fs::write(&hits_path, hits).unwrap();
        (doc.display().to_string(), hits_path.display().to_string())
    }

    fn args(parts: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("passage").chain(parts.iter().copied())).unwrap()
    }

    #[tokio::test]
    async fn sections_prints_rendered_json() {
        let dir = tempfile::tempdir().unwrap();
        let (doc, hits) = write_inputs(
            dir.path(),
            &"abcdefghij".repeat(10),
            r#"[{"start_pos": 20, "end_pos": 29, "score": 0.7}]"#,
        );
        let config = PassageConfig::for_profile("CLI_SECTIONS_TEST");
        let out = run(
            args(&[
                "sections",
                "--document",
                doc.as_str(),
                "--hits",
                hits.as_str(),
                "--max-tokens",
                "10",
                "--no-overlap",
                "--tokenizer",
                "char",
            ]),
            &config,
        )
        .await
        .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["text"], "abcdefghij");
        assert_eq!(parsed[0]["token_count"], 10);
        assert_eq!(parsed[0]["score"], 0.7);
    }

    #[tokio::test]
    async fn content_joins_sections() {
        let dir = tempfile::tempdir().unwrap();
        let (doc, hits) = write_inputs(
            dir.path(),
            "0123456789",
            r#"[{"start_pos": 0, "end_pos": 1, "score": 0.5}, {"start_pos": 8, "end_pos": 9, "score": 0.5}]"#,
        );
        let config = PassageConfig::for_profile("CLI_CONTENT_TEST");
        let out = run(
            args(&[
                "content",
                "--document",
                doc.as_str(),
                "--hits",
                hits.as_str(),
                "--max-tokens",
                "2",
                "--tokenizer",
                "char",
            ]),
            &config,
        )
        .await
        .unwrap();

        let parsed: DocumentMatch = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.content, "01\n...\n89");
        assert_eq!(parsed.score, 0.5);
    }

    #[tokio::test]
    async fn malformed_hits_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (doc, hits) = write_inputs(dir.path(), "text", "not json");
        let config = PassageConfig::for_profile("CLI_BAD_HITS_TEST");
        let err = run(args(&["all", "--document", doc.as_str(), "--hits", hits.as_str()]), &config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to parse hits"));
    }

    #[tokio::test]
    async fn profiled_tokenizer_wins_over_plain_key() {
        std::env::set_var("PASSAGE_TOKENIZER", "char");
        std::env::set_var("CLITOK_PASSAGE_TOKENIZER", "wordpiece");
        let dir = tempfile::tempdir().unwrap();
        let (doc, hits) = write_inputs(
            dir.path(),
            "text",
            r#"[{"start_pos": 0, "end_pos": 1, "score": 0.5}]"#,
        );

        let parsed = args(&["all", "--document", doc.as_str(), "--hits", hits.as_str()]);
        assert_eq!(parsed.tokenizer, None);

        let config = PassageConfig::for_profile("clitok");
        assert_eq!(config.tokenizer, "wordpiece");
        let err = run(parsed, &config).await.unwrap_err();
        assert_eq!(err.to_string(), "unknown tokenizer 'wordpiece'");
    }

    #[tokio::test]
    async fn tokenizer_flag_overrides_config() {
        std::env::set_var("CLIFLAG_PASSAGE_TOKENIZER", "wordpiece");
        let dir = tempfile::tempdir().unwrap();
        let (doc, hits) = write_inputs(
            dir.path(),
            "text",
            r#"[{"start_pos": 0, "end_pos": 1, "score": 0.5}]"#,
        );
        let config = PassageConfig::for_profile("cliflag");
        let out = run(
            args(&[
                "all",
                "--document",
                doc.as_str(),
                "--hits",
                hits.as_str(),
                "--tokenizer",
                "char",
            ]),
            &config,
        )
        .await
        .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["text"], "te");
    }
}
