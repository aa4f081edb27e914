//! `tango lookup`

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use tango::{Config, DetailResolver, WordCatalog, WordDetails};

pub(crate) async fn cmd_lookup(config: &Config, slug: &str, json: bool) -> Result<()> {
    let resolver = DetailResolver::from_config(config, Arc::new(WordCatalog::builtin()))
        .context("Failed to initialize resolver")?;

    let Some(resolved) = resolver.resolve(slug).await? else {
        bail!("Word not found: {}", slug);
    };

    match resolved.generation_time {
        Some(t) => eprintln!("[{}] generated in {} ms", resolved.status.as_str(), t.as_millis()),
        None => eprintln!("[{}]", resolved.status.as_str()),
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved.details)?);
    } else {
        print!("{}", render_details(&resolved.details));
    }
    Ok(())
}

fn render_details(d: &WordDetails) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", d.word, d.pronunciation);
    for meaning in &d.meanings {
        let _ = writeln!(out, "\n[{}] {}", meaning.part_of_speech, meaning.meaning);
        for dm in &meaning.detailed_meanings {
            let _ = writeln!(out, "  {}. {} ({})", dm.number, dm.definition, dm.frequency);
            if !dm.example.is_empty() {
                let _ = writeln!(out, "     {}", dm.example);
                let _ = writeln!(out, "     {}", dm.example_japanese);
            }
        }
    }
    if !d.synonyms.is_empty() {
        let _ = writeln!(out, "\nSynonyms: {}", d.synonyms.join(", "));
    }
    if !d.toeic_examples.is_empty() {
        let _ = writeln!(out, "\nTOEIC examples:");
        for ex in &d.toeic_examples {
            let _ = writeln!(out, "  - {}\n    {}", ex.english, ex.japanese);
        }
    }
    if !d.nuance.is_empty() {
        let _ = writeln!(out, "\n{}", d.nuance);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tango::details::{Meaning, ToeicExample};

    #[test]
    fn test_render_details() {
        let details = WordDetails {
            word: "bid".into(),
            pronunciation: "/bɪd/".into(),
            meanings: vec![Meaning {
                part_of_speech: "名詞".into(),
                meaning: "入札".into(),
                detailed_meanings: vec![],
            }],
            synonyms: vec!["offer".into(), "tender".into()],
            toeic_examples: vec![ToeicExample {
                english: "We won the bid.".into(),
                japanese: "入札を勝ち取った。".into(),
            }],
            ..Default::default()
        };
        let out = render_details(&details);
        assert!(out.starts_with("bid  /bɪd/\n"));
        assert!(out.contains("[名詞] 入札"));
        assert!(out.contains("Synonyms: offer, tender"));
        assert!(out.contains("  - We won the bid."));
    }
}
