use studio_config::StudioConfig;
use studio_core::{Category, StudioError};
use studio_memory::MemoryStore;
use studio_runtime::bootstrap;

use super::MemoryAction;

pub(super) fn cmd_memory(
    config: StudioConfig,
    user: &str,
    action: MemoryAction,
) -> studio_core::Result<()> {
    let store = bootstrap::open_memory(&config);

    match action {
        MemoryAction::List { category, json } => {
            let category = category.as_deref().map(parse_category).transpose()?;
            let memories: Vec<_> = store
                .all(user)
                .into_iter()
                .filter(|m| match category {
                    Some(c) => m.category == c || m.category == Category::General,
                    None => true,
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&memories)?);
                return Ok(());
            }
            if memories.is_empty() {
                println!("No memories for {user}.");
                return Ok(());
            }
            println!("\x1b[1mMemories for {user}\x1b[0m ({})", memories.len());
            println!("{}", "-".repeat(80));
            for m in &memories {
                println!(
                    "\x1b[90m{}\x1b[0m  {:.1}  \x1b[36m{:<8}\x1b[0m  {}",
                    short_hash(&m.content_hash),
                    m.score,
                    m.category.as_str(),
                    m.content
                );
            }
        }
        MemoryAction::Stats => {
            let stats = store.stats(user);
            println!("🧠 Memory stats for {user}");
            println!("   count:     {}", stats.count);
            println!("   avg score: {:.2}", stats.avg_score);
            for (category, n) in &stats.categories {
                println!("   {:<10} {n}", category.as_str());
            }
            if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
                println!("   oldest:    {}", oldest.to_rfc3339());
                println!("   newest:    {}", newest.to_rfc3339());
            }
        }
        MemoryAction::Users => {
            let users = store.users();
            if users.is_empty() {
                println!("No users with memories.");
            }
            for u in users {
                println!("{u}");
            }
        }
        MemoryAction::Add {
            content,
            category,
            score,
        } => {
            let category = parse_category(&category)?;
            if store.save(user, &content, category, score)? {
                println!("✅ Saved ({category})");
            } else {
                println!("⚠️  Not saved: empty, too low-scoring, or a near-duplicate");
            }
        }
        MemoryAction::Rescore { hash, score } => {
            let hash = resolve_hash(&store, user, &hash)?;
            if store.update_score(user, &hash, score)? {
                println!("✅ {} rescored to {:.1}", short_hash(&hash), score.clamp(1.0, 5.0));
            }
        }
        MemoryAction::Delete { hash } => {
            let hash = resolve_hash(&store, user, &hash)?;
            if store.delete(user, &hash)? {
                println!("✅ Deleted {}", short_hash(&hash));
            }
        }
        MemoryAction::Clear => {
            if store.clear_user(user)? {
                println!("✅ Cleared all memories for {user}");
            } else {
                println!("No memories for {user}.");
            }
        }
    }
    Ok(())
}

fn parse_category(raw: &str) -> studio_core::Result<Category> {
    raw.parse().map_err(StudioError::Memory)
}

fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}

/// Full content hash for a unique prefix of one of the user's memories.
fn resolve_hash(store: &MemoryStore, user: &str, prefix: &str) -> studio_core::Result<String> {
    let matches: Vec<String> = store
        .all(user)
        .into_iter()
        .map(|m| m.content_hash)
        .filter(|h| h.starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [hash] => Ok(hash.clone()),
        [] => Err(StudioError::Memory(format!("no memory of {user} matches '{prefix}'"))),
        _ => Err(StudioError::Memory(format!(
            "'{prefix}' matches {} memories; use a longer prefix",
            matches.len()
        ))),
    }
}
